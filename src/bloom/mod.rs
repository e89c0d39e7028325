pub mod scatter;
pub mod shape;

pub use scatter::{Bloom, BloomScatterer};
pub use shape::{bloom_color, heart_outline, in_heart};
