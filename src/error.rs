//! Error taxonomy shared by every mutating engine operation.
//!
//! Predicates (`can_*`) never fail; only steps that touch the surface or the
//! phase machine return an [`EngineResult`].

/// Convenience result type used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced to the caller. Nothing is retried internally.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed configuration or geometry, detected at build time.
    #[error("config error: {0}")]
    Config(String),

    /// A pixel rectangle that does not fit inside the canvas.
    #[error("rect {x},{y} {width}x{height} exceeds canvas {canvas_width}x{canvas_height}")]
    Bounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        canvas_width: u32,
        canvas_height: u32,
    },

    /// A phase-specific step was invoked while the director was elsewhere.
    #[error("`{operation}` is not valid during the {phase} phase")]
    InvalidPhase {
        operation: &'static str,
        phase: String,
    },

    /// `pan` was asked to move a snapshot that was never captured.
    #[error("no snapshot named '{0}'")]
    MissingSnapshot(String),

    /// The drawing backend rejected a call.
    #[error("surface error: {0}")]
    Surface(String),
}

impl EngineError {
    /// Build an [`EngineError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`EngineError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }
}
