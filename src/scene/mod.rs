//! Sprites drawn before and around the tree: the seed and the ground strip.

pub mod footer;
pub mod seed;

pub use footer::Footer;
pub use seed::{Seed, SEED_SIZE};
