use crate::bloom::heart_outline;
use crate::data::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::math::Vec2;
use crate::render::{Color, Rect, Surface};

/// Sprite width in pixels at scale 1
pub const SEED_SIZE: f32 = 20.0;
/// Scales within this distance of 1 count as settled
const SCALE_EPSILON: f32 = 1e-3;
const SPRITE_SEGMENTS: usize = 32;

/// The heart-shaped seed that shrinks into place and drops to the trunk base
#[derive(Debug, Clone)]
pub struct Seed {
    anchor: Vec2,
    offset: Vec2,
    target: Vec2,
    scale: f32,
    color: Color,
    /// Area covered by the last draw, cleared before the next one
    drawn: Option<Rect>,
}

impl Seed {
    pub fn new(anchor: Vec2, target: Vec2, scale: f32, color: Color) -> Self {
        Self {
            anchor,
            offset: Vec2::ZERO,
            target,
            scale,
            color,
            drawn: None,
        }
    }

    pub fn from_config(config: &EngineConfig, canvas_height: u32) -> Self {
        Self::new(
            config.seed_anchor(canvas_height),
            config.seed_target(canvas_height),
            config.seed.scale,
            config.seed.color,
        )
    }

    /// Current sprite center
    pub fn position(&self) -> Vec2 {
        self.anchor + self.offset
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    pub fn can_scale(&self) -> bool {
        self.scale > 1.0 + SCALE_EPSILON
    }

    /// Multiply the scale by `factor`, never dropping below 1, and redraw
    pub fn scale<S: Surface>(&mut self, surface: &mut S, factor: f32) -> EngineResult<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(EngineError::config(format!("seed scale factor must be positive, got {}", factor)));
        }
        let next = self.scale * factor;
        self.scale = if next <= 1.0 + SCALE_EPSILON { 1.0 } else { next };
        self.draw(surface)
    }

    pub fn can_move(&self) -> bool {
        self.offset != self.target
    }

    /// Step toward the target offset by up to `|dx|`, `|dy|` per axis.
    /// Each axis lands exactly on its target and never passes it.
    pub fn move_by<S: Surface>(&mut self, surface: &mut S, dx: f32, dy: f32) -> EngineResult<()> {
        if !(dx.is_finite() && dy.is_finite()) {
            return Err(EngineError::config("seed move must be finite"));
        }
        self.offset = Vec2::new(
            approach(self.offset.x, self.target.x, dx.abs()),
            approach(self.offset.y, self.target.y, dy.abs()),
        );
        self.draw(surface)
    }

    /// The per-axis move that covers `speed` pixels along the straight line
    /// to the target, or the whole remaining distance when that is shorter
    pub fn step_toward(&self, speed: f32) -> Vec2 {
        let remaining = self.target - self.offset;
        if remaining.length() <= speed {
            remaining
        } else {
            remaining.normalize().scale(speed)
        }
    }

    /// Clear the previous sprite and draw it at the current position and scale
    pub fn draw<S: Surface>(&mut self, surface: &mut S) -> EngineResult<()> {
        if let Some(previous) = self.drawn.take() {
            surface.clear_rect(previous)?;
        }
        let size = SEED_SIZE * self.scale;
        surface.fill_polygon(&heart_outline(self.position(), size, SPRITE_SEGMENTS), self.color)?;
        self.drawn = Some(self.bounds());
        Ok(())
    }

    /// Pixel area the sprite occupies at its current position and scale
    pub fn bounds(&self) -> Rect {
        // The outline's tip hangs about 0.53x its width below the center
        let half = Vec2::new(SEED_SIZE, SEED_SIZE * 1.1).scale(self.scale / 2.0);
        let margin = Vec2::new(1.0, 1.0);
        Rect::covering(self.position() - half - margin, self.position() + half + margin)
    }

    /// Pointer hit test against the sprite bounds
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let b = self.bounds();
        x >= b.x as f32 && y >= b.y as f32 && x < (b.x + b.width) as f32 && y < (b.y + b.height) as f32
    }
}

fn approach(current: f32, target: f32, step: f32) -> f32 {
    let remaining = target - current;
    if remaining.abs() <= step {
        target
    } else {
        current + step.copysign(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CARD_HEIGHT, CARD_WIDTH};
    use crate::render::PixelCanvas;

    const RED: Color = Color::rgb(190, 26, 37);

    fn seed() -> Seed {
        Seed::new(Vec2::new(50.0, 50.0), Vec2::new(0.0, 30.0), 2.0, RED)
    }

    #[test]
    fn test_scale_reaches_exactly_one() {
        let mut canvas = PixelCanvas::new(100, 100).unwrap();
        let mut seed = seed();
        let mut calls = 0;
        while seed.can_scale() {
            seed.scale(&mut canvas, 0.95).unwrap();
            calls += 1;
            assert!(calls < 100);
        }
        // 2 * 0.95^13 is still above 1, the next call floors it
        assert_eq!(seed.scale_factor(), 1.0);
        assert_eq!(calls, 14);
    }

    #[test]
    fn test_bad_scale_factor() {
        let mut canvas = PixelCanvas::new(100, 100).unwrap();
        let mut seed = seed();
        assert!(seed.scale(&mut canvas, 0.0).is_err());
        assert!(seed.scale(&mut canvas, f32::INFINITY).is_err());
        assert_eq!(seed.scale_factor(), 2.0);
    }

    #[test]
    fn test_move_clamps_to_target() {
        let mut canvas = PixelCanvas::new(100, 100).unwrap();
        let mut seed = seed();
        let mut calls = 0;
        while seed.can_move() {
            seed.move_by(&mut canvas, 0.0, 4.0).unwrap();
            calls += 1;
        }
        assert_eq!(calls, 8);
        assert_eq!(seed.offset(), Vec2::new(0.0, 30.0));
        assert_eq!(seed.position(), Vec2::new(50.0, 80.0));
    }

    #[test]
    fn test_move_toward_negative_target() {
        let mut canvas = PixelCanvas::new(100, 100).unwrap();
        let mut seed = Seed::new(Vec2::new(50.0, 50.0), Vec2::new(-5.0, 0.0), 1.0, RED);
        seed.move_by(&mut canvas, 3.0, 3.0).unwrap();
        assert_eq!(seed.offset(), Vec2::new(-3.0, 0.0));
        seed.move_by(&mut canvas, 3.0, 3.0).unwrap();
        assert_eq!(seed.offset(), Vec2::new(-5.0, 0.0));
        assert!(!seed.can_move());
    }

    #[test]
    fn test_step_toward_diagonal_target() {
        let mut canvas = PixelCanvas::new(100, 100).unwrap();
        let mut seed = Seed::new(Vec2::new(20.0, 20.0), Vec2::new(30.0, 40.0), 1.0, RED);
        let first = seed.step_toward(4.0);
        assert!((first.x - 2.4).abs() < 1e-4 && (first.y - 3.2).abs() < 1e-4);

        let mut calls = 0;
        while seed.can_move() {
            let step = seed.step_toward(4.0);
            seed.move_by(&mut canvas, step.x, step.y).unwrap();
            calls += 1;
            assert!(calls < 100);
        }
        // 50 px at 4 per call
        assert_eq!(calls, 13);
        assert_eq!(seed.offset(), Vec2::new(30.0, 40.0));
    }

    #[test]
    fn test_redraw_clears_previous_sprite() {
        let mut canvas = PixelCanvas::new(100, 100).unwrap();
        let mut seed = seed();
        seed.draw(&mut canvas).unwrap();
        assert!(canvas.pixel(50, 50)[3] > 0);

        for _ in 0..8 {
            seed.move_by(&mut canvas, 0.0, 4.0).unwrap();
        }
        assert_eq!(canvas.pixel(50, 50)[3], 0);
        assert!(canvas.pixel(50, 80)[3] > 0);
    }

    #[test]
    fn test_contains_tracks_position() {
        let mut seed = seed();
        assert!(seed.contains(50.0, 50.0));
        assert!(!seed.contains(50.0, 80.0));

        let mut canvas = PixelCanvas::new(100, 100).unwrap();
        for _ in 0..30 {
            seed.move_by(&mut canvas, 0.0, 1.0).unwrap();
        }
        assert!(seed.contains(50.0, 80.0));
    }

    #[test]
    fn test_card_seed() {
        let config = EngineConfig::card().unwrap();
        let seed = Seed::from_config(&config, CARD_HEIGHT);
        assert_eq!(seed.position(), Vec2::new(530.0, 340.0));
        assert!(seed.can_scale());
        assert!(seed.bounds().fits_within(CARD_WIDTH, CARD_HEIGHT));
    }
}
