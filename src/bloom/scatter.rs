use std::f32::consts::TAU;

use super::shape::{bloom_color, heart_outline, in_heart};
use crate::data::{BloomConfig, BloomShape};
use crate::error::{EngineError, EngineResult};
use crate::growth::{BranchId, BranchTree};
use crate::math::Vec2;
use crate::render::{Color, Surface};

/// Consecutive rejected samples after which a branch counts as exhausted
const MISS_LIMIT: u32 = 48;
/// Polygon segments per bloom outline
const OUTLINE_SEGMENTS: usize = 24;

/// A decorative mark attached to a grown branch
#[derive(Debug, Clone, PartialEq)]
pub struct Bloom {
    pub branch: BranchId,
    /// Curve parameter of the anchor point on the branch. The bloom itself
    /// sits up to `spread` pixels from that anchor, so `position` is not
    /// `curve.evaluate(t)`.
    pub t: f32,
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
    pub revealed: bool,
}

/// Per-branch placement bookkeeping
#[derive(Debug, Clone, Default)]
struct BranchSlot {
    capacity: usize,
    placed: usize,
    misses: u32,
    saturated: bool,
}

/// Scatters a bounded number of blooms over fully grown branches
pub struct BloomScatterer {
    max: usize,
    origin: Vec2,
    size: Vec2,
    shape: BloomShape,
    min_size: f32,
    max_size: f32,
    spread: f32,
    seed: u32,
    blooms: Vec<Bloom>,
    slots: Vec<BranchSlot>,
}

impl BloomScatterer {
    pub fn new(config: &BloomConfig, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            max: config.num,
            origin: config.origin(canvas_width, canvas_height),
            size: Vec2::new(config.width, config.height),
            shape: config.shape,
            min_size: config.min_size,
            max_size: config.max_size,
            spread: config.spread,
            seed: config.seed,
            blooms: Vec::with_capacity(config.num),
            slots: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.blooms.len()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn blooms(&self) -> &[Bloom] {
        &self.blooms
    }

    /// More blooms can still be placed on this tree
    pub fn can_flower(&self, tree: &BranchTree) -> bool {
        if self.blooms.len() >= self.max {
            return false;
        }
        if self.slots.is_empty() {
            return tree.iter().any(|(id, _)| tree.is_grown(id));
        }
        self.eligible(tree).next().is_some()
    }

    /// Accept up to `batch` new blooms, drawing each as soon as it is placed.
    /// Returns whether flowering can continue.
    pub fn step<S: Surface>(&mut self, tree: &BranchTree, surface: &mut S, batch: usize) -> EngineResult<bool> {
        if batch == 0 {
            return Err(EngineError::config("flower batch must be at least 1"));
        }
        if self.slots.len() != tree.len() {
            self.allocate(tree);
        }

        let mut accepted = 0;
        while accepted < batch && self.blooms.len() < self.max {
            let eligible: Vec<BranchId> = self.eligible(tree).collect();
            if eligible.is_empty() {
                break;
            }

            let id = eligible[self.next_u32() as usize % eligible.len()];
            let t = self.next_unit();
            let angle = self.next_unit() * TAU;
            let reach = self.next_unit().sqrt() * self.spread;
            let anchor = tree.get(id).curve.evaluate(t);
            let position = anchor + Vec2::new(angle.cos(), angle.sin()).scale(reach);

            let slot = &mut self.slots[id.index()];
            if !Self::inside(self.shape, self.origin, self.size, position) {
                slot.misses += 1;
                if slot.misses >= MISS_LIMIT {
                    slot.saturated = true;
                    tracing::debug!(branch = id.index(), placed = slot.placed, "branch exhausted");
                }
                continue;
            }

            slot.misses = 0;
            slot.placed += 1;
            if slot.placed >= slot.capacity {
                slot.saturated = true;
            }

            let size = self.min_size + self.next_unit() * (self.max_size - self.min_size);
            let color = bloom_color(self.next_u32());
            let mut bloom = Bloom { branch: id, t, position, size, color, revealed: false };
            surface.fill_polygon(&heart_outline(position, size, OUTLINE_SEGMENTS), color)?;
            bloom.revealed = true;
            self.blooms.push(bloom);
            accepted += 1;
        }

        let flowering = self.can_flower(tree);
        tracing::trace!(count = self.blooms.len(), flowering, "flower tick");
        Ok(flowering)
    }

    /// Split the global maximum across branches by arc length
    fn allocate(&mut self, tree: &BranchTree) {
        let total = tree.total_arc_length();
        self.slots = tree
            .iter()
            .map(|(_, branch)| {
                let capacity = if total > 0.0 {
                    (self.max as f32 * branch.arc_length / total).ceil() as usize
                } else {
                    0
                };
                BranchSlot {
                    capacity,
                    saturated: capacity == 0,
                    ..Default::default()
                }
            })
            .collect();
    }

    fn eligible<'a>(&'a self, tree: &'a BranchTree) -> impl Iterator<Item = BranchId> + 'a {
        tree.iter()
            .map(|(id, _)| id)
            .filter(move |&id| tree.is_grown(id) && !self.slots[id.index()].saturated)
    }

    fn inside(shape: BloomShape, origin: Vec2, size: Vec2, p: Vec2) -> bool {
        let in_box = p.x >= origin.x && p.y >= origin.y && p.x <= origin.x + size.x && p.y <= origin.y + size.y;
        match shape {
            BloomShape::Box => in_box,
            BloomShape::Heart => in_box && in_heart(p, origin, size),
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        self.seed
    }

    fn next_unit(&mut self) -> f32 {
        (self.next_u32() % 10000) as f32 / 10000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BranchSpec, EngineConfig, CARD_HEIGHT, CARD_WIDTH};
    use crate::growth::{build_tree, GrowthEngine, GrowthStep};
    use crate::math::CubicBezier;
    use crate::render::PixelCanvas;

    fn grown_card() -> (EngineConfig, BranchTree, PixelCanvas) {
        let config = EngineConfig::card().unwrap();
        let mut tree = build_tree(&config.branches).unwrap();
        let mut canvas = PixelCanvas::new(CARD_WIDTH, CARD_HEIGHT).unwrap();
        let engine = GrowthEngine::default();
        while engine.step(&mut tree, &mut canvas, GrowthStep::Natural).unwrap() {}
        (config, tree, canvas)
    }

    #[test]
    fn test_count_monotonic_and_bounded() {
        let (config, tree, mut canvas) = grown_card();
        let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);

        let mut last = 0;
        let mut calls = 0;
        while scatterer.step(&tree, &mut canvas, 2).unwrap() {
            assert!(scatterer.count() >= last);
            assert!(scatterer.count() <= 700);
            last = scatterer.count();
            calls += 1;
            assert!(calls < 5_000);
        }
        assert!(scatterer.count() <= 700);
        assert!(!scatterer.can_flower(&tree));

        // Further calls are stable
        let settled = scatterer.count();
        scatterer.step(&tree, &mut canvas, 2).unwrap();
        assert_eq!(scatterer.count(), settled);
    }

    #[test]
    fn test_card_reaches_maximum() {
        let (config, tree, mut canvas) = grown_card();
        let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);
        while scatterer.step(&tree, &mut canvas, 2).unwrap() {}
        assert_eq!(scatterer.count(), 700);
    }

    #[test]
    fn test_batch_size_respected() {
        let (config, tree, mut canvas) = grown_card();
        let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);
        scatterer.step(&tree, &mut canvas, 3).unwrap();
        assert_eq!(scatterer.count(), 3);
        scatterer.step(&tree, &mut canvas, 5).unwrap();
        assert_eq!(scatterer.count(), 8);
    }

    #[test]
    fn test_blooms_inside_box_and_revealed() {
        let (config, tree, mut canvas) = grown_card();
        let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);
        for _ in 0..100 {
            scatterer.step(&tree, &mut canvas, 2).unwrap();
        }
        let origin = config.bloom.origin(CARD_WIDTH, CARD_HEIGHT);
        for bloom in scatterer.blooms() {
            assert!(bloom.revealed);
            assert!(bloom.position.x >= origin.x && bloom.position.x <= origin.x + 1080.0);
            assert!(bloom.position.y >= origin.y && bloom.position.y <= origin.y + 650.0);
            assert!((0.0..=1.0).contains(&bloom.t));
        }
    }

    #[test]
    fn test_deterministic_sequence() {
        let (config, tree, _) = grown_card();
        let run = || {
            let mut canvas = PixelCanvas::new(CARD_WIDTH, CARD_HEIGHT).unwrap();
            let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);
            for _ in 0..50 {
                scatterer.step(&tree, &mut canvas, 2).unwrap();
            }
            scatterer.blooms().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_ungrown_tree_does_not_flower() {
        let config = EngineConfig::card().unwrap();
        let tree = build_tree(&config.branches).unwrap();
        let mut canvas = PixelCanvas::new(CARD_WIDTH, CARD_HEIGHT).unwrap();
        let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);

        assert!(!scatterer.can_flower(&tree));
        assert!(!scatterer.step(&tree, &mut canvas, 2).unwrap());
        assert_eq!(scatterer.count(), 0);
    }

    #[test]
    fn test_branch_outside_box_saturates() {
        let mut config = EngineConfig::card().unwrap();
        config.bloom.width = 50.0;
        config.bloom.height = 50.0;
        config.bloom.x = Some(0.0);
        config.bloom.y = Some(0.0);
        config.bloom.spread = 0.0;

        let far = BranchSpec::new(
            CubicBezier::from_quadratic(Vec2::new(500.0, 600.0), Vec2::new(500.0, 550.0), Vec2::new(500.0, 500.0)),
            4.0,
            2,
        );
        let mut tree = build_tree(&[far]).unwrap();
        let mut canvas = PixelCanvas::new(CARD_WIDTH, CARD_HEIGHT).unwrap();
        while GrowthEngine::default().step(&mut tree, &mut canvas, GrowthStep::Natural).unwrap() {}

        let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);
        assert!(!scatterer.step(&tree, &mut canvas, 2).unwrap());
        assert_eq!(scatterer.count(), 0);
    }

    #[test]
    fn test_heart_shape_constrains() {
        let (mut config, tree, mut canvas) = grown_card();
        config.bloom.shape = BloomShape::Heart;
        let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);
        for _ in 0..50 {
            scatterer.step(&tree, &mut canvas, 2).unwrap();
        }
        let origin = config.bloom.origin(CARD_WIDTH, CARD_HEIGHT);
        let size = Vec2::new(config.bloom.width, config.bloom.height);
        assert!(scatterer.count() > 0);
        for bloom in scatterer.blooms() {
            assert!(in_heart(bloom.position, origin, size));
        }
    }

    #[test]
    fn test_zero_batch_rejected() {
        let (config, tree, mut canvas) = grown_card();
        let mut scatterer = BloomScatterer::new(&config.bloom, CARD_WIDTH, CARD_HEIGHT);
        assert!(scatterer.step(&tree, &mut canvas, 0).is_err());
    }
}
