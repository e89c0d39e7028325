use serde::Deserialize;
use serde_yaml::Value;

use super::branch_spec::BranchSpec;
use crate::error::{EngineError, EngineResult};
use crate::math::Vec2;
use crate::render::{Color, Rect};

/// The card as shipped: a 1100x680 canvas with one trunk and five limbs
pub const CARD_YAML: &str = r#"
bloom: { num: 700, width: 1080, height: 650 }
footer: { width: 1200, height: 5, speed: 10 }
seed: { x: 530, color: "rgb(190, 26, 37)", scale: 2 }
branch:
  - [535, 680, 570, 250, 500, 200, 30, 100, [
      [540, 500, 455, 417, 340, 400, 13, 100, [
        [450, 435, 434, 430, 394, 395, 2, 40]
      ]],
      [550, 445, 600, 356, 680, 345, 12, 100, [
        [578, 400, 648, 409, 661, 426, 3, 80]
      ]],
      [539, 281, 537, 248, 534, 217, 3, 40],
      [546, 397, 413, 247, 328, 244, 9, 80, [
        [427, 286, 383, 253, 371, 205, 2, 40],
        [498, 345, 435, 315, 395, 330, 4, 60]
      ]],
      [546, 357, 608, 252, 678, 221, 6, 100, [
        [590, 293, 646, 277, 648, 271, 2, 80]
      ]]
    ]]
"#;

pub const CARD_WIDTH: u32 = 1100;
pub const CARD_HEIGHT: u32 = 680;

/// How blooms are constrained inside their bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BloomShape {
    /// Anywhere inside the box
    #[default]
    Box,
    /// Inside a heart curve inscribed in the box
    Heart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BloomConfig {
    /// Maximum number of blooms
    pub num: usize,
    pub width: f32,
    pub height: f32,
    /// Box origin; centered on the canvas when omitted
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub shape: BloomShape,
    /// Seed for the placement sequence
    #[serde(default = "default_bloom_seed")]
    pub seed: u32,
    /// Blooms accepted per flowering tick
    #[serde(default = "default_bloom_batch")]
    pub batch: usize,
    #[serde(default = "default_bloom_min_size")]
    pub min_size: f32,
    #[serde(default = "default_bloom_max_size")]
    pub max_size: f32,
    /// Maximum distance a bloom may sit from its branch
    #[serde(default = "default_bloom_spread")]
    pub spread: f32,
}

fn default_bloom_seed() -> u32 { 42 }
fn default_bloom_batch() -> usize { 2 }
fn default_bloom_min_size() -> f32 { 6.0 }
fn default_bloom_max_size() -> f32 { 12.0 }
fn default_bloom_spread() -> f32 { 60.0 }

impl BloomConfig {
    /// Top-left corner of the bloom box on a canvas of the given size
    pub fn origin(&self, canvas_width: u32, canvas_height: u32) -> Vec2 {
        Vec2::new(
            self.x.unwrap_or((canvas_width as f32 - self.width) / 2.0),
            self.y.unwrap_or((canvas_height as f32 - self.height) / 2.0),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FooterConfig {
    pub width: f32,
    pub height: f32,
    /// Pixels the strip texture advances per draw
    pub speed: f32,
    #[serde(default = "default_ink")]
    pub color: Color,
    /// Length of one dash; the gap after it is the same
    #[serde(default = "default_footer_dash")]
    pub dash: f32,
}

fn default_footer_dash() -> f32 { 20.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    pub x: f32,
    /// Vertical position; mid-canvas when omitted
    #[serde(default)]
    pub y: Option<f32>,
    pub color: Color,
    /// Initial scale factor, at least 1
    pub scale: f32,
    /// Offset the seed travels after shrinking; defaults to dropping onto the
    /// base of the first root branch
    #[serde(default)]
    pub target: Option<[f32; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrowthConfig {
    #[serde(default = "default_ink")]
    pub color: Color,
    /// Width multiplier per natural growth step
    #[serde(default = "default_taper")]
    pub taper: f32,
}

fn default_taper() -> f32 { 0.97 }

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            color: default_ink(),
            taper: default_taper(),
        }
    }
}

/// One snapshot-and-slide pass
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PanPass {
    pub name: String,
    pub rect: Rect,
    /// Final draw offset relative to where the region was captured
    pub target: [i32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct PanConfig {
    /// Pixels moved per axis per pan call
    #[serde(default = "default_pan_step")]
    pub step: i32,
    #[serde(default = "default_pan_passes")]
    pub passes: Vec<PanPass>,
}

fn default_pan_step() -> i32 { 10 }

/// Targets are offsets from the capture position: `p1` captured at x = 240
/// and moved by 260 lands at x = 500.
fn default_pan_passes() -> Vec<PanPass> {
    vec![
        PanPass {
            name: "p1".to_string(),
            rect: Rect::new(240, 0, 610, 680),
            target: [260, 0],
        },
        PanPass {
            name: "p2".to_string(),
            rect: Rect::new(490, 0, 610, 680),
            target: [0, 0],
        },
    ]
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            step: default_pan_step(),
            passes: default_pan_passes(),
        }
    }
}

/// Per-tick amounts used when the director drives itself
#[derive(Debug, Clone, Deserialize)]
pub struct CadenceConfig {
    #[serde(default = "default_seed_scale")]
    pub seed_scale: f32,
    /// Seed travel per tick; only its length is used, the direction always
    /// points at the seed target
    #[serde(default = "default_seed_move")]
    pub seed_move: [f32; 2],
}

impl CadenceConfig {
    /// Pixels the seed travels per tick
    pub fn seed_speed(&self) -> f32 {
        let [dx, dy] = self.seed_move;
        Vec2::new(dx, dy).length()
    }
}

fn default_seed_scale() -> f32 { 0.95 }
fn default_seed_move() -> [f32; 2] { [0.0, 2.0] }

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            seed_scale: default_seed_scale(),
            seed_move: default_seed_move(),
        }
    }
}

fn default_ink() -> Color {
    Color::rgb(35, 31, 32)
}

/// YAML input format
#[derive(Debug, Deserialize)]
struct ConfigInput {
    bloom: BloomConfig,
    footer: FooterConfig,
    seed: SeedConfig,
    #[serde(default)]
    growth: GrowthConfig,
    #[serde(default)]
    pan: PanConfig,
    #[serde(default)]
    cadence: CadenceConfig,
    branch: Value,
}

/// Parsed and validated engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub bloom: BloomConfig,
    pub footer: FooterConfig,
    pub seed: SeedConfig,
    pub growth: GrowthConfig,
    pub pan: PanConfig,
    pub cadence: CadenceConfig,
    /// Root branches, in drawing order
    pub branches: Vec<BranchSpec>,
}

impl EngineConfig {
    /// Parse from YAML string (JSON is accepted too)
    pub fn from_yaml(yaml: &str) -> EngineResult<Self> {
        let input: ConfigInput = serde_yaml::from_str(yaml)
            .map_err(|e| EngineError::config(format!("YAML parse error: {}", e)))?;

        let branches = BranchSpec::parse_roots(&input.branch)?;
        let config = Self {
            bloom: input.bloom,
            footer: input.footer,
            seed: input.seed,
            growth: input.growth,
            pan: input.pan,
            cadence: input.cadence,
            branches,
        };
        config.validate()?;
        Ok(config)
    }

    /// The shipped card configuration
    pub fn card() -> EngineResult<Self> {
        Self::from_yaml(CARD_YAML)
    }

    fn validate(&self) -> EngineResult<()> {
        let bloom = &self.bloom;
        if !(bloom.width > 0.0 && bloom.height > 0.0) {
            return Err(EngineError::config("bloom: width and height must be positive"));
        }
        if !(bloom.min_size > 0.0 && bloom.min_size <= bloom.max_size && bloom.max_size.is_finite()) {
            return Err(EngineError::config("bloom: need 0 < min_size <= max_size"));
        }
        if !(bloom.spread >= 0.0 && bloom.spread.is_finite()) {
            return Err(EngineError::config("bloom: spread must be a non-negative number"));
        }
        if bloom.batch == 0 {
            return Err(EngineError::config("bloom: batch must be at least 1"));
        }

        let footer = &self.footer;
        if !(footer.width >= 0.0 && footer.height >= 0.0 && footer.speed.is_finite()) {
            return Err(EngineError::config("footer: width/height must be non-negative, speed finite"));
        }
        if !(footer.dash > 0.0 && footer.dash.is_finite()) {
            return Err(EngineError::config("footer: dash must be positive"));
        }

        let seed = &self.seed;
        if !(seed.scale >= 1.0 && seed.scale.is_finite()) {
            return Err(EngineError::config(format!("seed: scale must be >= 1, got {}", seed.scale)));
        }
        if !seed.x.is_finite() || seed.y.is_some_and(|y| !y.is_finite()) {
            return Err(EngineError::config("seed: position must be finite"));
        }
        if seed.target.is_some_and(|[dx, dy]| !dx.is_finite() || !dy.is_finite()) {
            return Err(EngineError::config("seed: target must be finite"));
        }

        if !(self.growth.taper > 0.0 && self.growth.taper <= 1.0) {
            return Err(EngineError::config("growth: taper must be within (0, 1]"));
        }

        if self.pan.step <= 0 {
            return Err(EngineError::config("pan: step must be positive"));
        }
        if self.pan.passes.is_empty() {
            return Err(EngineError::config("pan: at least one pass is required"));
        }
        for (i, pass) in self.pan.passes.iter().enumerate() {
            if pass.rect.is_empty() {
                return Err(EngineError::config(format!("pan.passes[{}]: empty rect", i)));
            }
            if self.pan.passes[..i].iter().any(|p| p.name == pass.name) {
                return Err(EngineError::config(format!("pan.passes[{}]: duplicate name '{}'", i, pass.name)));
            }
        }

        let cadence = &self.cadence;
        if !(cadence.seed_scale > 0.0 && cadence.seed_scale < 1.0) {
            return Err(EngineError::config("cadence: seed_scale must be within (0, 1)"));
        }
        let speed = cadence.seed_speed();
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(EngineError::config("cadence: seed_move must be a finite, non-zero step"));
        }
        Ok(())
    }

    /// Where the seed sits before it moves
    pub fn seed_anchor(&self, canvas_height: u32) -> Vec2 {
        Vec2::new(self.seed.x, self.seed.y.unwrap_or(canvas_height as f32 / 2.0))
    }

    /// Offset the seed travels; defaults to the base of the first root
    pub fn seed_target(&self, canvas_height: u32) -> Vec2 {
        match self.seed.target {
            Some([dx, dy]) => Vec2::new(dx, dy),
            None => {
                let anchor = self.seed_anchor(canvas_height);
                let base_y = self.branches.first().map(|b| b.curve.start.y).unwrap_or(anchor.y);
                Vec2::new(0.0, base_y - anchor.y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_config() {
        let config = EngineConfig::card().unwrap();
        assert_eq!(config.bloom.num, 700);
        assert_eq!(config.footer.speed, 10.0);
        assert_eq!(config.seed.color, Color::rgb(190, 26, 37));
        assert_eq!(config.branches.len(), 1);

        let root = &config.branches[0];
        assert_eq!(root.children.len(), 5);
        assert_eq!(root.count(), 11);
        assert_eq!(root.depth(), 3);
    }

    #[test]
    fn test_defaults_filled_in() {
        let config = EngineConfig::card().unwrap();
        assert_eq!(config.bloom.batch, 2);
        assert_eq!(config.bloom.shape, BloomShape::Box);
        assert_eq!(config.pan.step, 10);
        assert_eq!(config.pan.passes.len(), 2);
        assert_eq!(config.pan.passes[0].rect, Rect::new(240, 0, 610, 680));
        assert_eq!(config.cadence.seed_move, [0.0, 2.0]);
        assert_eq!(config.growth.taper, 0.97);
    }

    #[test]
    fn test_bloom_box_centered() {
        let config = EngineConfig::card().unwrap();
        assert_eq!(config.bloom.origin(CARD_WIDTH, CARD_HEIGHT), Vec2::new(10.0, 15.0));
    }

    #[test]
    fn test_seed_drops_to_trunk_base() {
        let config = EngineConfig::card().unwrap();
        assert_eq!(config.seed_anchor(CARD_HEIGHT), Vec2::new(530.0, 340.0));
        assert_eq!(config.seed_target(CARD_HEIGHT), Vec2::new(0.0, 340.0));
    }

    #[test]
    fn test_json_accepted() {
        let json = r##"{
            "bloom": {"num": 10, "width": 100, "height": 100, "shape": "heart"},
            "footer": {"width": 100, "height": 2, "speed": 4},
            "seed": {"x": 50, "y": 20, "color": "#ff0000", "scale": 1.5, "target": [0, 30]},
            "pan": {"step": 5, "passes": [{"name": "only", "rect": {"x": 0, "y": 0, "width": 50, "height": 50}, "target": [25, 0]}]},
            "branch": [50, 100, 50, 70, 50, 40, 4, 10]
        }"##;
        let config = EngineConfig::from_yaml(json).unwrap();
        assert_eq!(config.bloom.shape, BloomShape::Heart);
        assert_eq!(config.pan.passes[0].target, [25, 0]);
        assert_eq!(config.seed_target(100), Vec2::new(0.0, 30.0));
    }

    #[test]
    fn test_malformed_branch_fails() {
        let yaml = CARD_YAML.replace("[539, 281, 537, 248, 534, 217, 3, 40]", "[539, 281, 537, 248, 534, -3, 40]");
        let err = EngineConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_invalid_seed_scale() {
        let yaml = CARD_YAML.replace("scale: 2", "scale: 0.5");
        assert!(EngineConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_duplicate_pass_names() {
        let yaml = format!(
            "{}\npan:\n  passes:\n    - {{ name: a, rect: {{ x: 0, y: 0, width: 1, height: 1 }}, target: [0, 0] }}\n    - {{ name: a, rect: {{ x: 0, y: 0, width: 1, height: 1 }}, target: [0, 0] }}\n",
            CARD_YAML
        );
        let err = EngineConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_still_seed_cadence_rejected() {
        let yaml = format!("{}\ncadence: {{ seed_move: [0, 0] }}\n", CARD_YAML);
        let err = EngineConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("seed_move"));

        let yaml = format!("{}\ncadence: {{ seed_move: [.inf, 0] }}\n", CARD_YAML);
        assert!(EngineConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_missing_section() {
        let err = EngineConfig::from_yaml("bloom: { num: 1, width: 1, height: 1 }").unwrap_err();
        assert!(err.to_string().contains("YAML parse error"));
    }
}
