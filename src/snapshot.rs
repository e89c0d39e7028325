//! Named pixel captures that slide across the canvas.
//!
//! A snapshot copies a rectangle once; afterwards only its draw offset
//! changes. Each pan call clears the area the snapshot last covered and puts
//! the captured pixels back at the new offset, so the region appears to slide
//! over whatever is underneath.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::render::{PixelBuffer, Rect, Surface};

/// A captured region plus its current draw offset
#[derive(Debug, Clone)]
pub struct Snapshot {
    pixels: PixelBuffer,
    source: Rect,
    offset: (i32, i32),
    /// Canvas area currently showing this snapshot
    footprint: Rect,
}

impl Snapshot {
    pub fn source(&self) -> Rect {
        self.source
    }

    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

/// Holds every live snapshot, keyed by name
#[derive(Debug, Clone)]
pub struct PanBoard {
    step: i32,
    snapshots: HashMap<String, Snapshot>,
}

impl PanBoard {
    /// `step` is the most a snapshot moves per axis in one pan call
    pub fn new(step: i32) -> EngineResult<Self> {
        if step <= 0 {
            return Err(EngineError::config(format!("pan step must be positive, got {}", step)));
        }
        Ok(Self {
            step,
            snapshots: HashMap::new(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Snapshot> {
        self.snapshots.get(name)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Capture `rect` under `name`, replacing any earlier capture of that name
    pub fn snapshot<S: Surface>(&mut self, surface: &S, name: &str, rect: Rect) -> EngineResult<()> {
        if !rect.fits_within(surface.width(), surface.height()) {
            return Err(rect.bounds_error(surface.width(), surface.height()));
        }
        let pixels = surface.read_pixels(rect)?;
        tracing::debug!(name, x = rect.x, y = rect.y, w = rect.width, h = rect.height, "captured snapshot");

        self.snapshots.insert(
            name.to_string(),
            Snapshot {
                pixels,
                source: rect,
                offset: (0, 0),
                footprint: rect,
            },
        );
        Ok(())
    }

    /// Move `name` one step toward offset `(dx, dy)` from its capture position
    /// and redraw it. Returns whether the target is still ahead.
    ///
    /// A target whose placed rect would not fit in `i32` coordinates is a
    /// bounds error and leaves the snapshot where it was.
    pub fn pan<S: Surface>(&mut self, surface: &mut S, name: &str, dx: i32, dy: i32) -> EngineResult<bool> {
        let step = self.step;
        let snap = self
            .snapshots
            .get_mut(name)
            .ok_or_else(|| EngineError::MissingSnapshot(name.to_string()))?;
        if snap.source.checked_translate(dx, dy).is_none() {
            return Err(snap
                .source
                .saturating_translate(dx, dy)
                .bounds_error(surface.width(), surface.height()));
        }

        let (ox, oy) = snap.offset;
        let next = (approach(ox, dx, step), approach(oy, dy, step));

        surface.clear_rect(snap.footprint)?;
        let placed = snap.source.saturating_translate(next.0, next.1);
        surface.put_pixels(&snap.pixels, placed.x, placed.y)?;
        snap.offset = next;
        snap.footprint = placed;

        let panning = next != (dx, dy);
        tracing::trace!(name, x = next.0, y = next.1, panning, "pan");
        Ok(panning)
    }
}

fn approach(current: i32, target: i32, step: i32) -> i32 {
    let remaining = target as i64 - current as i64;
    if remaining.abs() <= step as i64 {
        target
    } else {
        // Strictly between current and target, so it fits
        (current as i64 + step as i64 * remaining.signum()) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CARD_HEIGHT, CARD_WIDTH};
    use crate::render::{Color, PixelCanvas};

    const RED: Color = Color::rgb(190, 26, 37);

    fn striped_card() -> PixelCanvas {
        let mut canvas = PixelCanvas::new(CARD_WIDTH, CARD_HEIGHT).unwrap();
        canvas.fill(Color::rgb(255, 255, 255));
        // A red column marks x = 300 inside the captured region
        let column = PixelBuffer::new(1, CARD_HEIGHT, [190u8, 26, 37, 255].repeat(CARD_HEIGHT as usize)).unwrap();
        canvas.put_pixels(&column, 300, 0).unwrap();
        canvas
    }

    #[test]
    fn test_pan_step_count_and_exact_landing() {
        let mut canvas = striped_card();
        let mut board = PanBoard::new(10).unwrap();
        board.snapshot(&canvas, "p1", Rect::new(240, 0, 610, 680)).unwrap();

        let mut calls = 0;
        loop {
            calls += 1;
            if !board.pan(&mut canvas, "p1", 500, 0).unwrap() {
                break;
            }
        }
        assert_eq!(calls, 50);
        assert_eq!(board.get("p1").unwrap().offset(), (500, 0));
    }

    #[test]
    fn test_uneven_target_lands_exactly() {
        let mut canvas = striped_card();
        let mut board = PanBoard::new(7).unwrap();
        board.snapshot(&canvas, "p1", Rect::new(240, 0, 610, 680)).unwrap();

        let mut calls = 0;
        while board.pan(&mut canvas, "p1", 500, -3).unwrap() {
            calls += 1;
        }
        // ceil(500 / 7) = 72 calls, the last one returning false
        assert_eq!(calls + 1, 72);
        assert_eq!(board.get("p1").unwrap().offset(), (500, -3));
    }

    #[test]
    fn test_pan_moves_pixels() {
        let mut canvas = striped_card();
        let mut board = PanBoard::new(10).unwrap();
        board.snapshot(&canvas, "p1", Rect::new(240, 0, 610, 680)).unwrap();
        while board.pan(&mut canvas, "p1", 260, 0).unwrap() {}

        assert_eq!(canvas.pixel(560, 100), RED.to_array());
        // The vacated strip on the left is cleared
        assert_eq!(canvas.pixel(300, 100), [0, 0, 0, 0]);
    }

    #[test]
    fn test_round_trip_in_place() {
        let mut canvas = striped_card();
        let before = canvas.clone();
        let mut board = PanBoard::new(10).unwrap();
        board.snapshot(&canvas, "p1", Rect::new(240, 0, 610, 680)).unwrap();

        assert!(!board.pan(&mut canvas, "p1", 0, 0).unwrap());
        assert_eq!(canvas.as_rgba(), before.as_rgba());
        assert_eq!(board.get("p1").unwrap().offset(), (0, 0));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let canvas = striped_card();
        let mut board = PanBoard::new(10).unwrap();
        let err = board.snapshot(&canvas, "p2", Rect::new(500, 0, 610, 680)).unwrap_err();
        assert!(matches!(err, EngineError::Bounds { x: 500, .. }));
        assert!(board.is_empty());

        assert!(board.snapshot(&canvas, "empty", Rect::new(0, 0, 0, 10)).is_err());
    }

    #[test]
    fn test_unknown_snapshot() {
        let mut canvas = striped_card();
        let mut board = PanBoard::new(10).unwrap();
        let err = board.pan(&mut canvas, "nope", 10, 0).unwrap_err();
        assert_eq!(err, EngineError::MissingSnapshot("nope".to_string()));
    }

    #[test]
    fn test_recapture_replaces() {
        let mut canvas = striped_card();
        let mut board = PanBoard::new(10).unwrap();
        board.snapshot(&canvas, "p1", Rect::new(240, 0, 610, 680)).unwrap();
        board.pan(&mut canvas, "p1", 100, 0).unwrap();
        board.snapshot(&canvas, "p1", Rect::new(0, 0, 100, 100)).unwrap();

        let snap = board.get("p1").unwrap();
        assert_eq!(snap.offset(), (0, 0));
        assert_eq!(snap.source(), Rect::new(0, 0, 100, 100));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_independent_snapshots() {
        let mut canvas = striped_card();
        let mut board = PanBoard::new(10).unwrap();
        board.snapshot(&canvas, "left", Rect::new(0, 0, 100, 100)).unwrap();
        board.snapshot(&canvas, "right", Rect::new(600, 0, 100, 100)).unwrap();

        let mut left = true;
        let mut right = true;
        while left || right {
            if left {
                left = board.pan(&mut canvas, "left", 30, 0).unwrap();
            }
            if right {
                right = board.pan(&mut canvas, "right", -50, 20).unwrap();
            }
        }
        assert_eq!(board.get("left").unwrap().offset(), (30, 0));
        assert_eq!(board.get("right").unwrap().offset(), (-50, 20));
    }

    #[test]
    fn test_unrepresentable_target_rejected() {
        let mut canvas = striped_card();
        let mut board = PanBoard::new(10).unwrap();
        board.snapshot(&canvas, "p1", Rect::new(240, 0, 610, 680)).unwrap();

        for (dx, dy) in [(i32::MAX, 0), (0, i32::MAX - 100)] {
            let err = board.pan(&mut canvas, "p1", dx, dy).unwrap_err();
            assert!(matches!(err, EngineError::Bounds { .. }), "{:?}", err);
        }
        assert_eq!(board.get("p1").unwrap().offset(), (0, 0));

        // Far left still fits once the width is added, so it just steps
        assert!(board.pan(&mut canvas, "p1", i32::MIN, 0).unwrap());
        assert_eq!(board.get("p1").unwrap().offset(), (-10, 0));
    }

    #[test]
    fn test_far_offscreen_target() {
        let mut canvas = striped_card();
        let mut board = PanBoard::new(1_000_000).unwrap();
        board.snapshot(&canvas, "p1", Rect::new(240, 0, 610, 680)).unwrap();

        assert!(board.pan(&mut canvas, "p1", -2_000_000_000, 0).unwrap());
        assert_eq!(board.get("p1").unwrap().offset(), (-1_000_000, 0));
        assert_eq!(canvas.pixel(300, 100), [0, 0, 0, 0]);
    }

    #[test]
    fn test_zero_step_rejected() {
        assert!(PanBoard::new(0).is_err());
    }
}
