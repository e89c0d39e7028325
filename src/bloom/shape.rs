use std::f32::consts::TAU;

use crate::math::Vec2;
use crate::render::Color;

/// Half-extent of the implicit heart in its own coordinates
const HEART_EXTENT: f32 = 1.25;

/// Outline of a small heart centered on `center`, `size` pixels across.
/// Canvas y grows downward, so the lobes point up.
pub fn heart_outline(center: Vec2, size: f32, segments: usize) -> Vec<Vec2> {
    // The parametric heart spans roughly 32 units horizontally
    let unit = size / 32.0;
    (0..segments.max(8))
        .map(|i| {
            let t = i as f32 / segments.max(8) as f32 * TAU;
            let x = 16.0 * t.sin().powi(3);
            let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
            Vec2::new(center.x + x * unit, center.y - y * unit)
        })
        .collect()
}

/// Whether a point of the box `[origin, origin + size]` falls inside the heart
/// `(x² + y² − 1)³ − x²y³ < 0` stretched over that box
pub fn in_heart(point: Vec2, origin: Vec2, size: Vec2) -> bool {
    let x = ((point.x - origin.x) / size.x * 2.0 - 1.0) * HEART_EXTENT;
    let y = (1.0 - (point.y - origin.y) / size.y * 2.0) * HEART_EXTENT;
    let a = x * x + y * y - 1.0;
    a * a * a - x * x * y * y * y < 0.0
}

/// Rose-to-crimson bloom color picked from a seed value
pub fn bloom_color(seed: u32) -> Color {
    // Hue wraps around red: 0.92..1.0 then 0.0..0.04
    let hue = (0.92 + (seed % 1000) as f32 * 0.00012).fract();
    let saturation = 0.45 + ((seed / 1000) % 100) as f32 * 0.005;
    let value = 0.85 + ((seed / 100_000) % 100) as f32 * 0.0015;
    let [r, g, b] = hsv_to_rgb(hue, saturation, value);
    Color::rgba(r, g, b, 217)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let h = h * 6.0;
    let i = h.floor() as i32;
    let f = h - h.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}
