use super::Vec2;

/// Cubic Bézier curve used for branch geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    pub fn new(start: Vec2, control1: Vec2, control2: Vec2, end: Vec2) -> Self {
        Self { start, control1, control2, end }
    }

    /// Exact degree elevation of a quadratic curve (start, control, end)
    pub fn from_quadratic(start: Vec2, control: Vec2, end: Vec2) -> Self {
        let two_thirds = 2.0 / 3.0;
        Self {
            start,
            control1: start.lerp(&control, two_thirds),
            control2: end.lerp(&control, two_thirds),
            end,
        }
    }

    /// Evaluate curve at parameter t (0.0 to 1.0)
    pub fn evaluate(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;

        self.start.scale(b0) + self.control1.scale(b1) + self.control2.scale(b2) + self.end.scale(b3)
    }

    /// Split at t with de Casteljau, returning the (left, right) halves
    pub fn split(&self, t: f32) -> (CubicBezier, CubicBezier) {
        let t = t.clamp(0.0, 1.0);
        let p01 = self.start.lerp(&self.control1, t);
        let p12 = self.control1.lerp(&self.control2, t);
        let p23 = self.control2.lerp(&self.end, t);
        let p012 = p01.lerp(&p12, t);
        let p123 = p12.lerp(&p23, t);
        let mid = p012.lerp(&p123, t);

        (
            CubicBezier::new(self.start, p01, p012, mid),
            CubicBezier::new(mid, p123, p23, self.end),
        )
    }

    /// The piece of this curve between t0 and t1
    pub fn segment(&self, t0: f32, t1: f32) -> CubicBezier {
        let t0 = t0.clamp(0.0, 1.0);
        let t1 = t1.clamp(t0, 1.0);
        if t1 <= 0.0 {
            return CubicBezier::new(self.start, self.start, self.start, self.start);
        }

        let (left, _) = self.split(t1);
        let (_, piece) = left.split(t0 / t1);
        piece
    }

    /// Sample curve at N evenly spaced parameters
    pub fn sample(&self, n: usize) -> Vec<Vec2> {
        (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1).max(1) as f32;
                self.evaluate(t)
            })
            .collect()
    }

    /// Total approximate length of the curve
    pub fn approximate_length(&self, samples: usize) -> f32 {
        self.sample(samples)
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.control1.is_finite() && self.control2.is_finite() && self.end.is_finite()
    }
}
