//! Phase machine that sequences the whole card.
//!
//! The engine never waits. Callers either drive each phase through the
//! `can_*` / step pairs, or call [`Engine::tick`] once per frame and let the
//! configured cadence pick the step. Every step leaves the engine consistent,
//! so a run can be abandoned between any two calls.

use std::fmt;

use crate::bloom::BloomScatterer;
use crate::data::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::growth::{build_tree, BranchTree, GrowthEngine, GrowthStep};
use crate::render::{Rect, Surface};
use crate::scene::{Footer, Seed};
use crate::snapshot::PanBoard;

/// Where the card is in its sequence. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SeedScaling,
    SeedMoving,
    Growing,
    Flowering,
    /// Index into the configured pan passes
    Panning(usize),
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::SeedScaling => write!(f, "seed-scaling"),
            Phase::SeedMoving => write!(f, "seed-moving"),
            Phase::Growing => write!(f, "growing"),
            Phase::Flowering => write!(f, "flowering"),
            Phase::Panning(pass) => write!(f, "panning({})", pass),
            Phase::Done => write!(f, "done"),
        }
    }
}

/// One card: owns the surface and every animated part drawn on it
pub struct Engine<S: Surface> {
    surface: S,
    config: EngineConfig,
    phase: Phase,
    seed: Seed,
    footer: Footer,
    growth: GrowthEngine,
    /// Built when growth begins
    tree: Option<BranchTree>,
    blooms: BloomScatterer,
    board: PanBoard,
    /// Whether the current pan pass has captured its region
    pass_captured: bool,
}

impl<S: Surface> Engine<S> {
    #[tracing::instrument(skip(surface, config))]
    pub fn new(surface: S, width: u32, height: u32, config: EngineConfig) -> EngineResult<Self> {
        if surface.width() != width || surface.height() != height {
            return Err(EngineError::surface(format!(
                "surface is {}x{}, expected {}x{}",
                surface.width(),
                surface.height(),
                width,
                height
            )));
        }

        let seed = Seed::from_config(&config, height);
        let footer = Footer::new(&config.footer);
        let growth = GrowthEngine::new(&config.growth);
        let blooms = BloomScatterer::new(&config.bloom, width, height);
        let board = PanBoard::new(config.pan.step)?;
        tracing::debug!(branches = config.branches.len(), blooms = config.bloom.num, "engine ready");

        Ok(Self {
            surface,
            config,
            phase: Phase::Idle,
            seed,
            footer,
            growth,
            tree: None,
            blooms,
            board,
            pass_captured: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn tree(&self) -> Option<&BranchTree> {
        self.tree.as_ref()
    }

    pub fn blooms(&self) -> &BloomScatterer {
        &self.blooms
    }

    pub fn snapshots(&self) -> &PanBoard {
        &self.board
    }

    /// Pointer hit test on the seed sprite
    pub fn seed_contains(&self, x: f32, y: f32) -> bool {
        self.seed.contains(x, y)
    }

    /// Redraw the waiting seed. Only meaningful before the sequence starts.
    pub fn draw_idle(&mut self) -> EngineResult<()> {
        self.require("draw_idle", self.phase == Phase::Idle)?;
        self.seed.draw(&mut self.surface)
    }

    /// Leave `Idle`. Returns false, doing nothing, once the sequence is underway.
    pub fn start(&mut self) -> EngineResult<bool> {
        if self.phase != Phase::Idle {
            return Ok(false);
        }
        self.enter(Phase::SeedScaling)?;
        self.settle()?;
        Ok(true)
    }

    pub fn can_scale(&self) -> bool {
        self.seed.can_scale()
    }

    pub fn scale(&mut self, factor: f32) -> EngineResult<()> {
        self.require("scale", self.phase == Phase::SeedScaling)?;
        self.seed.scale(&mut self.surface, factor)?;
        self.settle()
    }

    pub fn can_move(&self) -> bool {
        self.seed.can_move()
    }

    pub fn move_seed(&mut self, dx: f32, dy: f32) -> EngineResult<()> {
        self.require("move", self.phase == Phase::SeedMoving)?;
        self.seed.move_by(&mut self.surface, dx, dy)?;
        self.settle()
    }

    /// Advance the ground strip. Cosmetic, allowed in any phase.
    pub fn draw_footer(&mut self) -> EngineResult<()> {
        self.footer.draw(&mut self.surface)
    }

    pub fn can_grow(&self) -> bool {
        match &self.tree {
            Some(tree) => !tree.is_complete(),
            None => !self.config.branches.is_empty(),
        }
    }

    /// One natural growth tick
    pub fn grow(&mut self) -> EngineResult<bool> {
        self.grow_with(GrowthStep::Natural)
    }

    pub fn grow_with(&mut self, step: GrowthStep) -> EngineResult<bool> {
        self.require("grow", self.phase == Phase::Growing)?;
        let Some(tree) = self.tree.as_mut() else {
            return Err(self.invalid("grow"));
        };
        let growing = self.growth.step(tree, &mut self.surface, step)?;
        self.settle()?;
        Ok(growing)
    }

    pub fn can_flower(&self) -> bool {
        self.tree.as_ref().is_some_and(|tree| self.blooms.can_flower(tree))
    }

    pub fn flower(&mut self, batch: usize) -> EngineResult<bool> {
        self.require("flower", self.phase == Phase::Flowering)?;
        let Some(tree) = self.tree.as_ref() else {
            return Err(self.invalid("flower"));
        };
        let flowering = self.blooms.step(tree, &mut self.surface, batch)?;
        self.settle()?;
        Ok(flowering)
    }

    /// Capture a named region. Allowed once flowering has finished.
    pub fn snapshot(&mut self, name: &str, rect: Rect) -> EngineResult<()> {
        let Phase::Panning(pass) = self.phase else {
            return Err(self.invalid("snapshot"));
        };
        self.board.snapshot(&self.surface, name, rect)?;
        if self.config.pan.passes[pass].name == name {
            self.pass_captured = true;
        }
        Ok(())
    }

    /// Slide a captured region one step toward `(dx, dy)`. When the current
    /// pass's region lands, the next pass begins.
    pub fn pan(&mut self, name: &str, dx: i32, dy: i32) -> EngineResult<bool> {
        let Phase::Panning(pass) = self.phase else {
            return Err(self.invalid("pan"));
        };
        let panning = self.board.pan(&mut self.surface, name, dx, dy)?;
        if !panning && self.config.pan.passes[pass].name == name {
            let next = if pass + 1 < self.config.pan.passes.len() {
                Phase::Panning(pass + 1)
            } else {
                Phase::Done
            };
            self.enter(next)?;
        }
        Ok(panning)
    }

    /// Run one step of the current phase with the configured cadence and
    /// return the phase afterwards
    pub fn tick(&mut self) -> EngineResult<Phase> {
        match self.phase {
            Phase::Idle | Phase::Done => {}
            Phase::SeedScaling => self.scale(self.config.cadence.seed_scale)?,
            Phase::SeedMoving => {
                let step = self.seed.step_toward(self.config.cadence.seed_speed());
                self.move_seed(step.x, step.y)?;
                self.draw_footer()?;
            }
            Phase::Growing => {
                self.grow()?;
            }
            Phase::Flowering => {
                self.flower(self.config.bloom.batch)?;
            }
            Phase::Panning(pass) => {
                let pass = self.config.pan.passes[pass].clone();
                if !self.pass_captured {
                    self.snapshot(&pass.name, pass.rect)?;
                }
                self.pan(&pass.name, pass.target[0], pass.target[1])?;
                self.draw_footer()?;
            }
        }
        Ok(self.phase)
    }

    /// Skip forward past every phase whose work is already finished
    fn settle(&mut self) -> EngineResult<()> {
        loop {
            let finished = match self.phase {
                Phase::SeedScaling => !self.seed.can_scale(),
                Phase::SeedMoving => !self.seed.can_move(),
                Phase::Growing => !self.can_grow(),
                Phase::Flowering => !self.can_flower(),
                Phase::Idle | Phase::Panning(_) | Phase::Done => false,
            };
            if !finished {
                return Ok(());
            }
            let next = match self.phase {
                Phase::SeedScaling => Phase::SeedMoving,
                Phase::SeedMoving => Phase::Growing,
                Phase::Growing => Phase::Flowering,
                _ => Phase::Panning(0),
            };
            self.enter(next)?;
        }
    }

    fn enter(&mut self, next: Phase) -> EngineResult<()> {
        match next {
            Phase::Growing => {
                self.tree = Some(build_tree(&self.config.branches)?);
            }
            Phase::Panning(_) => self.pass_captured = false,
            _ => {}
        }
        tracing::debug!(from = %self.phase, to = %next, "phase change");
        self.phase = next;
        Ok(())
    }

    fn require(&self, operation: &'static str, allowed: bool) -> EngineResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> EngineError {
        EngineError::InvalidPhase {
            operation,
            phase: self.phase.to_string(),
        }
    }
}
