//! K-d tree over the locations of planted tree nodes.
//!
//! The k-d tree answers the coarse query; exact boundary handling and
//! tie-breaking by insertion order are applied on top of it using the stored
//! positions, so results do not depend on the k-d tree's internal ordering.

use kiddo::{KdTree, SquaredEuclidean};

use crate::common::Point2D;
use crate::path_planning::tree::NodeId;

/// Slack applied to squared radii before the exact re-check
const QUERY_SLACK: f64 = 1e-9;

pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    positions: Vec<Point2D>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            tree: KdTree::new(),
            positions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Register the location of node `id`.
    ///
    /// Nodes must be inserted in id order, matching the tree arena.
    pub fn insert(&mut self, id: NodeId, position: Point2D) {
        debug_assert_eq!(id.index(), self.positions.len(), "spatial index out of sync with tree");
        self.tree.add(&position.to_array(), id.index() as u64);
        self.positions.push(position);
    }

    /// Closest node to `query`; ties go to the earliest inserted node
    pub fn nearest(&self, query: Point2D) -> Option<NodeId> {
        if self.is_empty() {
            return None;
        }
        let best = self.tree.nearest_one::<SquaredEuclidean>(&query.to_array());
        let reach = best.distance * (1.0 + QUERY_SLACK) + QUERY_SLACK;

        let mut winner: Option<(f64, usize)> = None;
        for candidate in self.tree.within::<SquaredEuclidean>(&query.to_array(), reach) {
            let index = candidate.item as usize;
            let d = self.positions[index].distance_squared(&query);
            let better = match winner {
                None => true,
                Some((best_d, best_index)) => d < best_d || (d == best_d && index < best_index),
            };
            if better {
                winner = Some((d, index));
            }
        }

        // The k-d tree itself always reports a node, fall back to it if the
        // re-check came back empty (non-finite query)
        Some(NodeId::new(winner.map(|(_, i)| i).unwrap_or(best.item as usize)))
    }

    /// Nodes within `radius` of `query` (inclusive), excluding nodes located
    /// exactly at `query`, in insertion order
    pub fn within(&self, query: Point2D, radius: f64) -> Vec<NodeId> {
        if self.is_empty() || !(radius >= 0.0) {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        let reach = radius_sq * (1.0 + QUERY_SLACK) + QUERY_SLACK;

        let mut found: Vec<usize> = self
            .tree
            .within::<SquaredEuclidean>(&query.to_array(), reach)
            .into_iter()
            .map(|n| n.item as usize)
            .filter(|&i| {
                let p = &self.positions[i];
                *p != query && p.distance_squared(&query) <= radius_sq
            })
            .collect();
        found.sort_unstable();
        found.into_iter().map(NodeId::new).collect()
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(points: &[(f64, f64)]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            index.insert(NodeId::new(i), Point2D::new(x, y));
        }
        index
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::new();
        assert!(index.is_empty());
        assert!(index.nearest(Point2D::origin()).is_none());
        assert!(index.within(Point2D::origin(), 10.0).is_empty());
    }

    #[test]
    fn test_nearest_returns_expected_node() {
        let index = index_of(&[(0.0, 0.0), (10.0, 0.0), (4.0, 3.0)]);
        assert_eq!(index.nearest(Point2D::new(3.9, 2.9)), Some(NodeId::new(2)));
        assert_eq!(index.nearest(Point2D::new(9.0, -1.0)), Some(NodeId::new(1)));
    }

    #[test]
    fn test_nearest_tie_goes_to_first_inserted() {
        let index = index_of(&[(5.0, 5.0), (1.0, 0.0), (-1.0, 0.0), (0.0, 1.0)]);
        assert_eq!(index.nearest(Point2D::origin()), Some(NodeId::new(1)));
    }

    #[test]
    fn test_nearest_is_idempotent() {
        let index = index_of(&[(0.0, 0.0), (2.0, 2.0), (2.0, 2.0000001), (7.0, 1.0)]);
        let q = Point2D::new(2.5, 2.5);
        let first = index.nearest(q);
        assert_eq!(index.nearest(q), first);
    }

    #[test]
    fn test_within_is_inclusive_sorted_and_excludes_query_point() {
        let index = index_of(&[(0.0, 0.0), (3.0, 4.0), (1.0, 1.0), (6.0, 0.0), (0.0, -5.0)]);
        let found = index.within(Point2D::origin(), 5.0);
        assert_eq!(found, vec![NodeId::new(1), NodeId::new(2), NodeId::new(4)]);
    }

    #[test]
    fn test_within_tracks_insertions() {
        let mut index = index_of(&[(0.0, 0.0)]);
        assert!(index.within(Point2D::new(1.0, 0.0), 0.5).is_empty());
        index.insert(NodeId::new(1), Point2D::new(1.2, 0.0));
        assert_eq!(index.within(Point2D::new(1.0, 0.0), 0.5), vec![NodeId::new(1)]);
        assert_eq!(index.nearest(Point2D::new(1.0, 0.0)), Some(NodeId::new(1)));
        assert_eq!(index.len(), 2);
    }
}
