use crate::data::BranchSpec;
use crate::error::EngineResult;
use crate::math::CubicBezier;

/// Samples used when measuring a branch's arc length
const ARC_SAMPLES: usize = 64;

/// Index of a branch in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub(crate) usize);

impl BranchId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Immutable geometry of one grown curve segment
#[derive(Debug, Clone)]
pub struct Branch {
    pub curve: CubicBezier,
    /// Stroke width at the base
    pub width: f32,
    /// Natural growth steps
    pub length: u32,
    /// Parent fraction required before this branch grows
    pub threshold: f32,
    /// Depth from the root (0 = root)
    pub depth: usize,
    /// Children in drawing order
    pub children: Vec<BranchId>,
    /// Approximate length of the full curve in pixels
    pub arc_length: f32,
}

impl Branch {
    /// Stroke width at parameter t, tapering by `taper` per natural step
    pub fn width_at(&self, t: f32, taper: f32) -> f32 {
        self.width * taper.powf(t.clamp(0.0, 1.0) * self.length as f32)
    }
}

/// Arena of branches plus a side table of growth fractions
#[derive(Debug, Clone)]
pub struct BranchTree {
    branches: Vec<Branch>,
    roots: Vec<BranchId>,
    growth: Vec<f32>,
}

/// Build the arena from validated specs. Branches are stored in preorder,
/// so arena order is also drawing order.
pub fn build_tree(roots: &[BranchSpec]) -> EngineResult<BranchTree> {
    let mut tree = BranchTree {
        branches: Vec::with_capacity(roots.iter().map(BranchSpec::count).sum()),
        roots: Vec::with_capacity(roots.len()),
        growth: Vec::new(),
    };

    for (i, spec) in roots.iter().enumerate() {
        let id = tree.insert(spec, 0, &format!("branch[{}]", i))?;
        tree.roots.push(id);
    }
    tree.growth = vec![0.0; tree.branches.len()];

    tracing::debug!(branches = tree.branches.len(), roots = tree.roots.len(), "built branch tree");
    Ok(tree)
}

impl BranchTree {
    fn insert(&mut self, spec: &BranchSpec, depth: usize, path: &str) -> EngineResult<BranchId> {
        spec.validate(path)?;

        let id = BranchId(self.branches.len());
        self.branches.push(Branch {
            curve: spec.curve,
            width: spec.width,
            length: spec.length,
            threshold: spec.threshold,
            depth,
            children: Vec::with_capacity(spec.children.len()),
            arc_length: spec.curve.approximate_length(ARC_SAMPLES),
        });

        for (i, child) in spec.children.iter().enumerate() {
            let child_id = self.insert(child, depth + 1, &format!("{}.children[{}]", path, i))?;
            self.branches[id.0].children.push(child_id);
        }
        Ok(id)
    }

    pub fn get(&self, id: BranchId) -> &Branch {
        &self.branches[id.0]
    }

    pub fn roots(&self) -> &[BranchId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// All branches in preorder
    pub fn iter(&self) -> impl Iterator<Item = (BranchId, &Branch)> {
        self.branches.iter().enumerate().map(|(i, b)| (BranchId(i), b))
    }

    /// Growth fraction in [0, 1]
    pub fn growth(&self, id: BranchId) -> f32 {
        self.growth[id.0]
    }

    pub(crate) fn set_growth(&mut self, id: BranchId, fraction: f32) {
        self.growth[id.0] = fraction.clamp(0.0, 1.0);
    }

    pub fn is_grown(&self, id: BranchId) -> bool {
        self.growth[id.0] >= 1.0
    }

    /// Every branch has reached fraction 1
    pub fn is_complete(&self) -> bool {
        self.growth.iter().all(|&g| g >= 1.0)
    }

    pub fn total_arc_length(&self) -> f32 {
        self.branches.iter().map(|b| b.arc_length).sum()
    }
}
