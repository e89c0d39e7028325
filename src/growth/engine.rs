use super::tree::{BranchId, BranchTree};
use crate::data::GrowthConfig;
use crate::error::{EngineError, EngineResult};
use crate::render::{Color, Surface};

/// Fractions this close to 1 are snapped to exactly 1
const COMPLETE_EPSILON: f32 = 1e-5;

/// How far active branches advance in one growth tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthStep {
    /// Each branch advances by `1 / length`, so it finishes in `length` ticks
    Natural,
    /// Every active branch advances by the same fraction
    Uniform(f32),
}

/// Advances branch growth and draws the newly grown curve pieces
#[derive(Debug, Clone)]
pub struct GrowthEngine {
    pub color: Color,
    pub taper: f32,
}

impl GrowthEngine {
    pub fn new(config: &GrowthConfig) -> Self {
        Self {
            color: config.color,
            taper: config.taper,
        }
    }

    /// One growth tick over the whole tree, depth-first so a parent is always
    /// advanced before its children are considered. Returns whether any branch
    /// is still short of fraction 1.
    pub fn step<S: Surface>(&self, tree: &mut BranchTree, surface: &mut S, step: GrowthStep) -> EngineResult<bool> {
        if let GrowthStep::Uniform(delta) = step {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(EngineError::config(format!("growth delta must be positive, got {}", delta)));
            }
        }

        let roots = tree.roots().to_vec();
        for root in roots {
            self.visit(tree, surface, root, true, step)?;
        }

        let growing = !tree.is_complete();
        tracing::trace!(growing, "growth tick");
        Ok(growing)
    }

    fn visit<S: Surface>(
        &self,
        tree: &mut BranchTree,
        surface: &mut S,
        id: BranchId,
        active: bool,
        step: GrowthStep,
    ) -> EngineResult<()> {
        if !active {
            return Ok(());
        }

        let before = tree.growth(id);
        if before < 1.0 {
            let branch = tree.get(id);
            let delta = match step {
                GrowthStep::Natural => 1.0 / branch.length as f32,
                GrowthStep::Uniform(delta) => delta,
            };
            let mut after = (before + delta).min(1.0);
            if after >= 1.0 - COMPLETE_EPSILON {
                after = 1.0;
            }

            // Only the new increment is drawn; earlier pieces are already on the canvas
            let piece = branch.curve.segment(before, after);
            let width = branch.width_at((before + after) / 2.0, self.taper);
            surface.stroke_cubic(&piece, width, self.color)?;

            tree.set_growth(id, after);
            if after >= 1.0 {
                tracing::debug!(branch = id.index(), "branch fully grown");
            }
        }

        let parent_growth = tree.growth(id);
        let children = tree.get(id).children.clone();
        for child in children {
            let ready = parent_growth >= tree.get(child).threshold;
            self.visit(tree, surface, child, ready, step)?;
        }
        Ok(())
    }
}

impl Default for GrowthEngine {
    fn default() -> Self {
        Self::new(&GrowthConfig::default())
    }
}
