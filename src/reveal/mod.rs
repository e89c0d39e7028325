//! Collaborators shown once the card is done. They only observe the engine.

pub mod clock;
pub mod typewriter;

pub use clock::{elapsed_text, Elapsed};
pub use typewriter::Typewriter;

/// CSS scale that fits a fixed design size into the viewport with a 10% margin.
/// Never enlarges past the design size.
pub fn fit_scale(viewport_width: f32, viewport_height: f32, design_width: f32, design_height: f32) -> f32 {
    let sx = viewport_width / design_width;
    let sy = viewport_height / design_height;
    sx.min(sy).min(1.0) * 0.9
}
