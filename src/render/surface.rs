//! The drawing contract the engine renders through.
//!
//! Anything that can stroke a cubic, fill a polygon, and read or write a
//! rectangle of RGBA pixels can host the animation.

use std::fmt;
use std::str::FromStr;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::math::{CubicBezier, Vec2};

/// Straight (non-premultiplied) RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// CSS form accepted by canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a as f32 / 255.0)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for Color {
    type Err = EngineError;

    /// Parses `#rrggbb`, `rgb(r, g, b)` and `rgba(r, g, b, a)` with `a` in [0, 1]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || EngineError::config(format!("unrecognized color '{}'", s));

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 {
                return Err(bad());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
            return Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(bad());
        };
        let body = body.strip_suffix(')').ok_or_else(bad)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();

        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(bad());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| bad());
        let alpha = if has_alpha {
            let a: f32 = parts[3].parse().map_err(|_| bad())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(bad());
            }
            (a * 255.0).round() as u8
        } else {
            255
        };

        Ok(Color::rgba(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha))
    }
}

impl TryFrom<String> for Color {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Integer pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest integer rect covering a floating point box
    pub fn covering(min: Vec2, max: Vec2) -> Self {
        let x0 = min.x.floor() as i32;
        let y0 = min.y.floor() as i32;
        let x1 = max.x.ceil() as i32;
        let y1 = max.y.ceil() as i32;
        Self::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Offset by `(dx, dy)`, or `None` when the far edges leave `i32` range
    pub fn checked_translate(&self, dx: i32, dy: i32) -> Option<Self> {
        let x = self.x.checked_add(dx)?;
        let y = self.y.checked_add(dy)?;
        x.checked_add(self.width)?;
        y.checked_add(self.height)?;
        Some(Self::new(x, y, self.width, self.height))
    }

    /// Offset by `(dx, dy)`, clamping the origin to `i32` range
    pub fn saturating_translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }

    /// Whether the rect lies entirely inside a canvas of the given size
    pub fn fits_within(&self, canvas_width: u32, canvas_height: u32) -> bool {
        !self.is_empty()
            && self.x >= 0
            && self.y >= 0
            && self.x as i64 + self.width as i64 <= canvas_width as i64
            && self.y as i64 + self.height as i64 <= canvas_height as i64
    }

    /// Intersection with the canvas area, if any
    pub fn clip_to(&self, canvas_width: u32, canvas_height: u32) -> Option<Rect> {
        let x0 = (self.x as i64).max(0);
        let y0 = (self.y as i64).max(0);
        let x1 = (self.x as i64 + self.width as i64).min(canvas_width as i64);
        let y1 = (self.y as i64 + self.height as i64).min(canvas_height as i64);
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            // Inside the canvas, so every edge fits in i32
            Some(Rect::new(x0 as i32, y0 as i32, (x1 - x0) as i32, (y1 - y0) as i32))
        }
    }

    pub(crate) fn bounds_error(&self, canvas_width: u32, canvas_height: u32) -> EngineError {
        EngineError::Bounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            canvas_width,
            canvas_height,
        }
    }
}

/// Owned RGBA pixel block, row-major, 4 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> EngineResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(EngineError::surface(format!(
                "pixel buffer {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Fully transparent block, used to clear regions
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// 2D drawing backend
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Stroke a cubic curve with round caps
    fn stroke_cubic(&mut self, curve: &CubicBezier, line_width: f32, color: Color) -> EngineResult<()>;

    /// Fill a closed polygon (even-odd rule)
    fn fill_polygon(&mut self, points: &[Vec2], color: Color) -> EngineResult<()>;

    /// Copy a rectangle of pixels that lies inside the canvas
    fn read_pixels(&self, rect: Rect) -> EngineResult<PixelBuffer>;

    /// Replace pixels at (x, y) with the buffer, clipping to the canvas.
    /// Unlike drawing, this does not blend.
    fn put_pixels(&mut self, pixels: &PixelBuffer, x: i32, y: i32) -> EngineResult<()>;

    /// Reset a rectangle to transparent
    fn clear_rect(&mut self, rect: Rect) -> EngineResult<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let blank = PixelBuffer::transparent(rect.width as u32, rect.height as u32);
        self.put_pixels(&blank, rect.x, rect.y)
    }
}
