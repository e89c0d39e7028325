//! Programmatic checks of rendered output.

pub mod metrics;

pub use metrics::{analyze_buffer, analyze_pixels, PixelMetrics, VisualAnalyzer};
