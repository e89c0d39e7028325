//! Sequencing for the card: seed entry, growth, flowering and the pan reveal.

mod director;

pub use director::{Engine, Phase};
