//! Recursive branch geometry description.
//!
//! Two spellings are accepted for each branch. The compact one is a flat
//! array, `[x1, y1, x2, y2, x3, y3, width, length, [children]]`, where the
//! three points are start, control and end of a quadratic curve; a fourth
//! point pair makes it cubic, and one extra number after `length` sets the
//! activation threshold. The record spelling is
//! `{ points, width, length, threshold, children }`.

use serde_yaml::Value;

use crate::error::{EngineError, EngineResult};
use crate::math::{CubicBezier, Vec2};

/// Default fraction of the parent that must be grown before a child starts
pub const DEFAULT_THRESHOLD: f32 = 1.0;

/// Immutable geometry of one branch and its children
#[derive(Debug, Clone, PartialEq)]
pub struct BranchSpec {
    pub curve: CubicBezier,
    /// Stroke width at the base of the branch
    pub width: f32,
    /// Number of natural growth steps from 0 to fully grown
    pub length: u32,
    /// Parent growth fraction at which this branch activates
    pub threshold: f32,
    pub children: Vec<BranchSpec>,
}

impl BranchSpec {
    pub fn new(curve: CubicBezier, width: f32, length: u32) -> Self {
        Self {
            curve,
            width,
            length,
            threshold: DEFAULT_THRESHOLD,
            children: Vec::new(),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_children(mut self, children: Vec<BranchSpec>) -> Self {
        self.children = children;
        self
    }

    /// Parse the `branch` entry of a config: a single branch or a list of roots
    pub fn parse_roots(value: &Value) -> EngineResult<Vec<BranchSpec>> {
        let roots = match value {
            Value::Sequence(items) if items.first().is_some_and(|v| v.is_number()) => {
                vec![Self::parse(value, "branch")?]
            }
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| Self::parse(item, &format!("branch[{}]", i)))
                .collect::<EngineResult<Vec<_>>>()?,
            Value::Mapping(_) => vec![Self::parse(value, "branch")?],
            _ => return Err(EngineError::config("branch: expected an array or a mapping")),
        };

        if roots.is_empty() {
            return Err(EngineError::config("branch: at least one root branch is required"));
        }
        Ok(roots)
    }

    /// Parse one branch (and, recursively, its children)
    pub fn parse(value: &Value, path: &str) -> EngineResult<BranchSpec> {
        let spec = match value {
            Value::Sequence(items) => Self::parse_compact(items, path)?,
            Value::Mapping(_) => Self::parse_record(value, path)?,
            _ => return Err(EngineError::config(format!("{}: expected an array or a mapping", path))),
        };
        spec.validate(path)?;
        Ok(spec)
    }

    fn parse_compact(items: &[Value], path: &str) -> EngineResult<BranchSpec> {
        let numbers: Vec<f32> = items
            .iter()
            .take_while(|v| v.is_number())
            .map(|v| v.as_f64().unwrap_or(f64::NAN) as f32)
            .collect();
        let rest = &items[numbers.len()..];

        let (curve, tail) = match numbers.len() {
            8 | 9 => (
                CubicBezier::from_quadratic(
                    Vec2::new(numbers[0], numbers[1]),
                    Vec2::new(numbers[2], numbers[3]),
                    Vec2::new(numbers[4], numbers[5]),
                ),
                &numbers[6..],
            ),
            10 | 11 => (
                CubicBezier::new(
                    Vec2::new(numbers[0], numbers[1]),
                    Vec2::new(numbers[2], numbers[3]),
                    Vec2::new(numbers[4], numbers[5]),
                    Vec2::new(numbers[6], numbers[7]),
                ),
                &numbers[8..],
            ),
            n => {
                return Err(EngineError::config(format!(
                    "{}: expected 8 to 11 leading numbers, found {}",
                    path, n
                )))
            }
        };

        let width = tail[0];
        let length = step_count(tail[1], path)?;
        let threshold = tail.get(2).copied().unwrap_or(DEFAULT_THRESHOLD);

        let children = match rest {
            [] => Vec::new(),
            [Value::Sequence(kids)] => Self::parse_children(kids, path)?,
            _ => {
                return Err(EngineError::config(format!(
                    "{}: trailing entry must be a single list of children",
                    path
                )))
            }
        };

        Ok(BranchSpec { curve, width, length, threshold, children })
    }

    fn parse_record(value: &Value, path: &str) -> EngineResult<BranchSpec> {
        let points = value
            .get("points")
            .and_then(Value::as_sequence)
            .ok_or_else(|| EngineError::config(format!("{}: missing 'points'", path)))?;
        let points = points
            .iter()
            .enumerate()
            .map(|(i, p)| parse_point(p, &format!("{}.points[{}]", path, i)))
            .collect::<EngineResult<Vec<_>>>()?;

        let curve = match points.as_slice() {
            [a, b, c] => CubicBezier::from_quadratic(*a, *b, *c),
            [a, b, c, d] => CubicBezier::new(*a, *b, *c, *d),
            _ => {
                return Err(EngineError::config(format!(
                    "{}: 'points' needs 3 or 4 points, found {}",
                    path,
                    points.len()
                )))
            }
        };

        let width = number_field(value, "width", path)?;
        let length = step_count(number_field(value, "length", path)?, path)?;
        let threshold = match value.get("threshold") {
            Some(v) => v
                .as_f64()
                .ok_or_else(|| EngineError::config(format!("{}: 'threshold' must be a number", path)))?
                as f32,
            None => DEFAULT_THRESHOLD,
        };

        let children = match value.get("children") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(kids)) => Self::parse_children(kids, path)?,
            Some(_) => return Err(EngineError::config(format!("{}: 'children' must be a list", path))),
        };

        Ok(BranchSpec { curve, width, length, threshold, children })
    }

    fn parse_children(kids: &[Value], path: &str) -> EngineResult<Vec<BranchSpec>> {
        kids.iter()
            .enumerate()
            .map(|(i, kid)| Self::parse(kid, &format!("{}.children[{}]", path, i)))
            .collect()
    }

    pub(crate) fn validate(&self, path: &str) -> EngineResult<()> {
        if !self.curve.is_finite() {
            return Err(EngineError::config(format!("{}: coordinates must be finite", path)));
        }
        if !self.width.is_finite() || self.width < 0.0 {
            return Err(EngineError::config(format!(
                "{}: width must be a non-negative number, got {}",
                path, self.width
            )));
        }
        if self.length == 0 {
            return Err(EngineError::config(format!("{}: length must be at least one step", path)));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(EngineError::config(format!(
                "{}: threshold must be within [0, 1], got {}",
                path, self.threshold
            )));
        }
        Ok(())
    }

    /// Total number of branches in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|c| c.count()).sum::<usize>()
    }

    /// Depth of this subtree (a leaf is 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}

fn parse_point(value: &Value, path: &str) -> EngineResult<Vec2> {
    match value.as_sequence().map(Vec::as_slice) {
        Some([x, y]) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Ok(Vec2::new(x as f32, y as f32)),
            _ => Err(EngineError::config(format!("{}: coordinates must be numbers", path))),
        },
        _ => Err(EngineError::config(format!("{}: expected [x, y]", path))),
    }
}

fn number_field(value: &Value, key: &str, path: &str) -> EngineResult<f32> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|n| n as f32)
        .ok_or_else(|| EngineError::config(format!("{}: missing or non-numeric '{}'", path, key)))
}

fn step_count(raw: f32, path: &str) -> EngineResult<u32> {
    if !raw.is_finite() || raw < 1.0 || raw.fract() != 0.0 {
        return Err(EngineError::config(format!(
            "{}: length must be a positive whole number of steps, got {}",
            path, raw
        )));
    }
    Ok(raw as u32)
}
