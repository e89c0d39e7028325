//! Pixel metrics for checking what actually reached the canvas
//!
//! Used by tests to confirm that growth, flowering and panning painted where
//! expected, and exposed to JavaScript for diagnostics.

use wasm_bindgen::prelude::*;

use crate::render::{PixelBuffer, Rect};

/// Minimum alpha for a pixel to count as painted
const PAINTED_ALPHA: u8 = 8;

/// Summary of one RGBA frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelMetrics {
    /// Pixels with visible alpha
    pub painted: u32,
    /// Painted share of the frame (0-1)
    pub coverage: f32,
    /// Smallest rect containing every painted pixel
    pub bounds: Option<Rect>,
    /// Share of painted pixels that are saturated reds (bloom and seed colors)
    pub red_share: f32,
    /// Share of painted pixels that are dark and unsaturated (branch ink)
    pub ink_share: f32,
}

/// Analyze raw pixel data (RGBA format, 4 bytes per pixel)
pub fn analyze_pixels(pixels: &[u8], width: u32, height: u32) -> PixelMetrics {
    let pixel_count = width as usize * height as usize;
    if pixel_count == 0 || pixels.len() < pixel_count * 4 {
        return PixelMetrics::default();
    }

    let mut painted = 0u32;
    let mut red = 0u32;
    let mut ink = 0u32;
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);

    for (i, px) in pixels[..pixel_count * 4].chunks_exact(4).enumerate() {
        if px[3] < PAINTED_ALPHA {
            continue;
        }
        painted += 1;

        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);

        let (h, s, v) = rgb_to_hsv(px[0] as f32 / 255.0, px[1] as f32 / 255.0, px[2] as f32 / 255.0);
        if s > 0.3 && v > 0.3 && (h < 30.0 || h > 320.0) {
            red += 1;
        } else if s < 0.25 && v < 0.3 {
            ink += 1;
        }
    }

    let share = |n: u32| if painted > 0 { n as f32 / painted as f32 } else { 0.0 };
    PixelMetrics {
        painted,
        coverage: painted as f32 / pixel_count as f32,
        bounds: (painted > 0).then(|| Rect::new(x0 as i32, y0 as i32, (x1 - x0 + 1) as i32, (y1 - y0 + 1) as i32)),
        red_share: share(red),
        ink_share: share(ink),
    }
}

/// Same as [`analyze_pixels`] for an owned buffer
pub fn analyze_buffer(buffer: &PixelBuffer) -> PixelMetrics {
    analyze_pixels(buffer.as_rgba(), buffer.width(), buffer.height())
}

/// Convert RGB (0-1) to HSV (hue: 0-360, saturation: 0-1, value: 0-1)
fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta < 0.0001 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, max)
}

/// WASM-bindgen wrapper for analyzing pixels from JavaScript
#[wasm_bindgen]
pub struct VisualAnalyzer;

#[wasm_bindgen]
impl VisualAnalyzer {
    /// Analyze pixel data and return JSON metrics
    #[wasm_bindgen]
    pub fn analyze(pixels: &[u8], width: u32, height: u32) -> String {
        let metrics = analyze_pixels(pixels, width, height);
        let bounds = match metrics.bounds {
            Some(r) => format!("[{}, {}, {}, {}]", r.x, r.y, r.width, r.height),
            None => "null".to_string(),
        };
        format!(
            r#"{{
  "painted": {},
  "coverage": {:.4},
  "bounds": {},
  "redShare": {:.4},
  "inkShare": {:.4}
}}"#,
            metrics.painted, metrics.coverage, bounds, metrics.red_share, metrics.ink_share
        )
    }
}
