//! Node placement and edge topology policies.

use crate::constants::*;
use glam::Vec3;
use rand::Rng;

/// How anchors and edges are produced for a build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutPolicy {
    /// `node_count` anchors sampled uniformly inside an ellipsoid; straight
    /// edges join every pair closer than `threshold`.
    Procedural { node_count: usize, threshold: f32 },
    /// Hand-authored anchors joined by curved ribbons from [`FIXED_LINKS`].
    Fixed,
}

impl LayoutPolicy {
    pub fn procedural() -> Self {
        LayoutPolicy::Procedural {
            node_count: PROCEDURAL_NODE_COUNT,
            threshold: EDGE_DISTANCE_THRESHOLD,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutPolicy::Procedural { .. } => "procedural",
            LayoutPolicy::Fixed => "fixed",
        }
    }
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        LayoutPolicy::Fixed
    }
}

pub struct FixedNode {
    pub anchor: [f32; 3],
    pub size: f32,
}

const HUB: f32 = 2.2;
const INNER: f32 = 1.4;
const OUTER: f32 = 1.0;

/// Hub at the origin, an inner ring of six and an outer shell of seven.
pub const FIXED_NODES: [FixedNode; 14] = [
    FixedNode { anchor: [0.0, 0.0, 0.0], size: HUB },
    FixedNode { anchor: [12.0, 3.0, 4.0], size: INNER },
    FixedNode { anchor: [6.0, -4.0, -10.0], size: INNER },
    FixedNode { anchor: [-6.0, 5.0, -9.0], size: INNER },
    FixedNode { anchor: [-12.0, -2.0, 3.0], size: INNER },
    FixedNode { anchor: [-5.0, 4.0, 11.0], size: INNER },
    FixedNode { anchor: [6.0, -5.0, 10.0], size: INNER },
    FixedNode { anchor: [24.0, 8.0, -4.0], size: OUTER },
    FixedNode { anchor: [15.0, -12.0, -16.0], size: OUTER },
    FixedNode { anchor: [-4.0, 12.0, -20.0], size: OUTER },
    FixedNode { anchor: [-22.0, 6.0, -8.0], size: OUTER },
    FixedNode { anchor: [-20.0, -10.0, 12.0], size: OUTER },
    FixedNode { anchor: [0.0, -14.0, 18.0], size: OUTER },
    FixedNode { anchor: [18.0, 10.0, 16.0], size: OUTER },
];

/// Ribbon adjacency, in creation order.
pub const FIXED_LINKS: [(usize, usize); 24] = [
    // hub spokes
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (0, 5),
    (0, 6),
    // inner ring
    (1, 2),
    (2, 3),
    (3, 4),
    (4, 5),
    (5, 6),
    (6, 1),
    // inner to outer
    (1, 7),
    (2, 8),
    (3, 9),
    (4, 10),
    (4, 11),
    (6, 12),
    (1, 13),
    // outer shell
    (7, 8),
    (8, 9),
    (9, 10),
    (11, 12),
    (12, 13),
];

/// Sample a point uniformly inside the ellipsoid with the given semi-axes.
///
/// Rejection sampling from the bounding box; the acceptance rate is π/6, so
/// the loop ends after two draws on average.
pub fn sample_in_ellipsoid<R: Rng + ?Sized>(rng: &mut R, semi_axes: Vec3) -> Vec3 {
    loop {
        let unit = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if unit.length_squared() <= 1.0 {
            return unit * semi_axes;
        }
    }
}

/// Sample a point uniformly inside an axis-aligned cube centred on the origin.
pub fn sample_in_cube<R: Rng + ?Sized>(rng: &mut R, side: f32) -> Vec3 {
    let h = side * 0.5;
    Vec3::new(
        rng.gen_range(-h..=h),
        rng.gen_range(-h..=h),
        rng.gen_range(-h..=h),
    )
}

/// Every unordered pair `(i, j)` with `i < j` whose anchors are closer than
/// `threshold`, in scan order.
pub fn edges_within_threshold(anchors: &[Vec3], threshold: f32) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for i in 0..anchors.len() {
        for j in (i + 1)..anchors.len() {
            if anchors[i].distance(anchors[j]) < threshold {
                out.push((i, j));
            }
        }
    }
    out
}

#[inline]
pub fn is_accent(ribbon_index: usize) -> bool {
    ribbon_index % ACCENT_EVERY == 0
}
