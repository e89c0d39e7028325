use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use super::surface::{Color, PixelBuffer, Rect, Surface};
use crate::error::{EngineError, EngineResult};
use crate::math::{CubicBezier, Vec2};

/// Wrapper around a browser 2D context
pub struct WebCanvas {
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl WebCanvas {
    /// Size the canvas backing store and take its 2D context
    pub fn from_canvas(canvas: &HtmlCanvasElement, width: u32, height: u32) -> EngineResult<Self> {
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| EngineError::surface("Failed to get 2D context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::surface("Context is not a CanvasRenderingContext2d"))?;

        Ok(Self { ctx, width, height })
    }
}

fn js_error(value: JsValue) -> EngineError {
    EngineError::surface(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

impl Surface for WebCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn stroke_cubic(&mut self, curve: &CubicBezier, line_width: f32, color: Color) -> EngineResult<()> {
        let ctx = &self.ctx;
        ctx.save();
        ctx.begin_path();
        ctx.set_line_cap("round");
        ctx.set_line_width(line_width as f64);
        ctx.set_stroke_style_str(&color.to_css());
        ctx.move_to(curve.start.x as f64, curve.start.y as f64);
        ctx.bezier_curve_to(
            curve.control1.x as f64,
            curve.control1.y as f64,
            curve.control2.x as f64,
            curve.control2.y as f64,
            curve.end.x as f64,
            curve.end.y as f64,
        );
        ctx.stroke();
        ctx.restore();
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) -> EngineResult<()> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };

        let ctx = &self.ctx;
        ctx.save();
        ctx.begin_path();
        ctx.set_fill_style_str(&color.to_css());
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        ctx.close_path();
        ctx.fill();
        ctx.restore();
        Ok(())
    }

    fn read_pixels(&self, rect: Rect) -> EngineResult<PixelBuffer> {
        if !rect.fits_within(self.width, self.height) {
            return Err(rect.bounds_error(self.width, self.height));
        }
        let image = self
            .ctx
            .get_image_data(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64)
            .map_err(js_error)?;
        PixelBuffer::new(image.width(), image.height(), image.data().0)
    }

    fn put_pixels(&mut self, pixels: &PixelBuffer, x: i32, y: i32) -> EngineResult<()> {
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(pixels.as_rgba()),
            pixels.width(),
            pixels.height(),
        )
        .map_err(js_error)?;
        self.ctx.put_image_data(&image, x as f64, y as f64).map_err(js_error)
    }

    fn clear_rect(&mut self, rect: Rect) -> EngineResult<()> {
        self.ctx
            .clear_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
        Ok(())
    }
}
