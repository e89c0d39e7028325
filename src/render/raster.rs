//! In-memory RGBA rasterizer implementing [`Surface`].
//!
//! Good enough for headless runs and tests: curves are stamped as discs along
//! the path, polygons are scanline filled at pixel centers.

use super::surface::{Color, PixelBuffer, Rect, Surface};
use crate::error::{EngineError, EngineResult};
use crate::math::{CubicBezier, Vec2};

/// RGBA pixel surface that mirrors an HTML canvas
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    /// Create a transparent canvas. Both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> EngineResult<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::surface(format!("invalid canvas size {}x{}", width, height)));
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        })
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Paint the whole canvas one color (no blending)
    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color.to_array());
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over blend of one pixel
    fn blend(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = self.index(x as u32, y as u32);
        if color.a == 255 {
            self.pixels[i..i + 4].copy_from_slice(&color.to_array());
            return;
        }

        let sa = color.a as f32 / 255.0;
        let da = self.pixels[i + 3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (c, s) in src.iter().enumerate() {
            let d = self.pixels[i + c] as f32;
            let v = (*s as f32 * sa + d * da * (1.0 - sa)) / out_a;
            self.pixels[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Color) {
        let r = radius.max(0.5);
        let x0 = (center.x - r).floor() as i32;
        let x1 = (center.x + r).ceil() as i32;
        let y0 = (center.y - r).floor() as i32;
        let y1 = (center.y + r).ceil() as i32;
        let r2 = r * r;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

impl Surface for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn stroke_cubic(&mut self, curve: &CubicBezier, line_width: f32, color: Color) -> EngineResult<()> {
        if !curve.is_finite() || !line_width.is_finite() {
            return Err(EngineError::surface("non-finite stroke"));
        }
        let radius = line_width / 2.0;
        let length = curve.approximate_length(16);
        // Stamps closer than half a radius leave no visible gaps
        let spacing = (radius * 0.5).max(0.5);
        let steps = ((length / spacing).ceil() as usize).max(1);

        for i in 0..=steps {
            let p = curve.evaluate(i as f32 / steps as f32);
            self.fill_disc(p, radius, color);
        }
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) -> EngineResult<()> {
        if points.len() < 3 {
            return Ok(());
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(EngineError::surface("non-finite polygon"));
        }

        let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let y_start = (min_y.floor() as i32).max(0);
        let y_end = (max_y.ceil() as i32).min(self.height as i32 - 1);

        let mut crossings = Vec::new();
        for y in y_start..=y_end {
            let sy = y as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                    let t = (sy - a.y) / (b.y - a.y);
                    crossings.push(a.x + (b.x - a.x) * t);
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                let x_start = (span[0] - 0.5).ceil() as i32;
                let x_end = (span[1] - 0.5).ceil() as i32;
                for x in x_start.max(0)..x_end.min(self.width as i32) {
                    self.blend(x, y, color);
                }
            }
        }
        Ok(())
    }

    fn read_pixels(&self, rect: Rect) -> EngineResult<PixelBuffer> {
        if !rect.fits_within(self.width, self.height) {
            return Err(rect.bounds_error(self.width, self.height));
        }

        let row_bytes = rect.width as usize * 4;
        let mut data = Vec::with_capacity(row_bytes * rect.height as usize);
        for y in rect.y..rect.y + rect.height {
            let start = self.index(rect.x as u32, y as u32);
            data.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        PixelBuffer::new(rect.width as u32, rect.height as u32, data)
    }

    fn put_pixels(&mut self, pixels: &PixelBuffer, x: i32, y: i32) -> EngineResult<()> {
        let target = Rect::new(x, y, pixels.width() as i32, pixels.height() as i32);
        let Some(visible) = target.clip_to(self.width, self.height) else {
            return Ok(());
        };

        let src = pixels.as_rgba();
        let row_bytes = visible.width as usize * 4;
        for row in 0..visible.height {
            let sy = (visible.y - y + row) as usize;
            let sx = (visible.x - x) as usize;
            let s = (sy * pixels.width() as usize + sx) * 4;
            let d = self.index(visible.x as u32, (visible.y + row) as u32);
            self.pixels[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Color = Color::rgb(35, 31, 32);

    #[test]
    fn test_zero_size_rejected() {
        assert!(PixelCanvas::new(0, 10).is_err());
    }

    #[test]
    fn test_fill_polygon_square() {
        let mut canvas = PixelCanvas::new(10, 10).unwrap();
        let square = [
            Vec2::new(2.0, 2.0),
            Vec2::new(6.0, 2.0),
            Vec2::new(6.0, 6.0),
            Vec2::new(2.0, 6.0),
        ];
        canvas.fill_polygon(&square, INK).unwrap();

        assert_eq!(canvas.pixel(2, 2), [35, 31, 32, 255]);
        assert_eq!(canvas.pixel(5, 5), [35, 31, 32, 255]);
        assert_eq!(canvas.pixel(6, 6), [0, 0, 0, 0]);
        assert_eq!(canvas.pixel(1, 3), [0, 0, 0, 0]);

        let painted = canvas.as_rgba().chunks_exact(4).filter(|p| p[3] > 0).count();
        assert_eq!(painted, 16);
    }

    #[test]
    fn test_stroke_cubic_marks_path() {
        let mut canvas = PixelCanvas::new(50, 50).unwrap();
        let line = CubicBezier::from_quadratic(
            Vec2::new(5.0, 25.0),
            Vec2::new(25.0, 25.0),
            Vec2::new(45.0, 25.0),
        );
        canvas.stroke_cubic(&line, 4.0, INK).unwrap();

        assert_eq!(canvas.pixel(25, 25)[3], 255);
        assert_eq!(canvas.pixel(44, 25)[3], 255);
        assert_eq!(canvas.pixel(25, 35)[3], 0);
    }

    #[test]
    fn test_alpha_blend() {
        let mut canvas = PixelCanvas::new(4, 4).unwrap();
        canvas.fill(Color::rgb(0, 0, 255));
        let tri = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)];
        canvas.fill_polygon(&tri, Color::rgba(255, 0, 0, 128)).unwrap();

        let p = canvas.pixel(0, 0);
        assert_eq!(p[3], 255);
        assert!(p[0] > 120 && p[2] > 120);
    }

    #[test]
    fn test_read_put_round_trip() {
        let mut canvas = PixelCanvas::new(20, 20).unwrap();
        let tri = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        canvas.fill_polygon(&tri, INK).unwrap();

        let block = canvas.read_pixels(Rect::new(0, 0, 10, 10)).unwrap();
        canvas.put_pixels(&block, 10, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(canvas.pixel(x, y), canvas.pixel(x + 10, y + 10));
            }
        }
    }

    #[test]
    fn test_read_out_of_bounds() {
        let canvas = PixelCanvas::new(20, 20).unwrap();
        let err = canvas.read_pixels(Rect::new(15, 0, 10, 10)).unwrap_err();
        assert!(matches!(err, EngineError::Bounds { .. }));
    }

    #[test]
    fn test_put_clips_offscreen() {
        let mut canvas = PixelCanvas::new(10, 10).unwrap();
        let mut src = PixelCanvas::new(4, 4).unwrap();
        src.fill(INK);
        let block = src.read_pixels(Rect::new(0, 0, 4, 4)).unwrap();

        canvas.put_pixels(&block, 8, -2).unwrap();
        assert_eq!(canvas.pixel(9, 0)[3], 255);
        assert_eq!(canvas.pixel(9, 1)[3], 255);
        assert_eq!(canvas.pixel(9, 2)[3], 0);
        assert_eq!(canvas.pixel(7, 0)[3], 0);

        canvas.put_pixels(&block, 50, 50).unwrap();
    }

    #[test]
    fn test_clear_rect() {
        let mut canvas = PixelCanvas::new(10, 10).unwrap();
        canvas.fill(INK);
        canvas.clear_rect(Rect::new(0, 0, 5, 10)).unwrap();
        assert_eq!(canvas.pixel(4, 9), [0, 0, 0, 0]);
        assert_eq!(canvas.pixel(5, 9)[3], 255);
    }
}
