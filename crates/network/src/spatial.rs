//! Point index for endpoint and lake-vertex snapping

use kiddo::{KdTree, SquaredEuclidean};

/// 2-D k-d tree over world coordinates with integer payloads.
///
/// Distances are squared-Euclidean throughout; callers pass radii already
/// squared. Range-query results are sorted by (distance, payload) so that
/// traversal order is stable across tree internals.
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            tree: KdTree::new(),
        }
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.tree.size() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Insert a point with its payload
    pub fn insert(&mut self, point: [f64; 2], payload: usize) {
        self.tree.add(&point, payload as u64);
    }

    /// All payloads within `radius_sq` of `point`, as (payload, distance²).
    pub fn within_radius_sq(&self, point: [f64; 2], radius_sq: f64) -> Vec<(usize, f64)> {
        let mut hits: Vec<(usize, f64)> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&point, radius_sq)
            .into_iter()
            .map(|n| (n.item as usize, n.distance))
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits
    }

    /// The nearest payload within `radius_sq` of `point`, if any.
    pub fn nearest_within(&self, point: [f64; 2], radius_sq: f64) -> Option<(usize, f64)> {
        if self.is_empty() {
            return None;
        }
        let nearest = self.tree.nearest_one::<SquaredEuclidean>(&point);
        (nearest.distance <= radius_sq).then_some((nearest.item as usize, nearest.distance))
    }
}
