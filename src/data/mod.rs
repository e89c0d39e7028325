pub mod branch_spec;
pub mod config;

pub use branch_spec::BranchSpec;
pub use config::{
    BloomConfig, BloomShape, CadenceConfig, EngineConfig, FooterConfig, GrowthConfig, PanConfig, PanPass,
    SeedConfig, CARD_HEIGHT, CARD_WIDTH, CARD_YAML,
};
