pub mod tree;
pub mod engine;

pub use tree::{build_tree, Branch, BranchId, BranchTree};
pub use engine::{GrowthEngine, GrowthStep};
