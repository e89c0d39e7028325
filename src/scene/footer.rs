use crate::data::FooterConfig;
use crate::error::EngineResult;
use crate::math::Vec2;
use crate::render::{Color, Rect, Surface};

/// Dashed ground strip along the bottom of the canvas. Every draw shifts the
/// dash pattern by `speed` so the ground appears to scroll.
#[derive(Debug, Clone)]
pub struct Footer {
    width: f32,
    height: f32,
    speed: f32,
    color: Color,
    dash: f32,
    phase: f32,
}

impl Footer {
    pub fn new(config: &FooterConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            speed: config.speed,
            color: config.color,
            dash: config.dash,
            phase: 0.0,
        }
    }

    /// Current pattern shift in [0, 2 * dash)
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Strip area on a canvas of the given size
    pub fn area(&self, canvas_width: u32, canvas_height: u32) -> Rect {
        let x = (canvas_width as f32 - self.width) / 2.0;
        let y = canvas_height as f32 - self.height;
        Rect::covering(Vec2::new(x, y), Vec2::new(x + self.width, canvas_height as f32))
    }

    pub fn draw<S: Surface>(&mut self, surface: &mut S) -> EngineResult<()> {
        let (cw, ch) = (surface.width(), surface.height());
        if self.width <= 0.0 || self.height <= 0.0 {
            return Ok(());
        }

        surface.clear_rect(self.area(cw, ch))?;

        let period = self.dash * 2.0;
        let left = (cw as f32 - self.width) / 2.0;
        let right = left + self.width;
        let top = ch as f32 - self.height;
        let bottom = ch as f32;

        // First dash starts one period early so the left edge is always covered
        let mut x = left - period + self.phase;
        while x < right {
            let x0 = x.max(left);
            let x1 = (x + self.dash).min(right);
            if x1 > x0 {
                let quad = [
                    Vec2::new(x0, top),
                    Vec2::new(x1, top),
                    Vec2::new(x1, bottom),
                    Vec2::new(x0, bottom),
                ];
                surface.fill_polygon(&quad, self.color)?;
            }
            x += period;
        }

        self.phase = (self.phase + self.speed).rem_euclid(period);
        Ok(())
    }
}
