//! Common traits defining the seams between planner components

use crate::common::types::*;
use crate::path_planning::edge::Edge;
use crate::utils::grid_map::OccupancyMap;

/// Motion model used to connect two configurations.
///
/// Implementations decide the shape and cost of an edge; the planner only
/// sees `Edge` values and the boolean verdict of `collision_free`.
pub trait EdgeModel {
    /// Short human readable name, used in logs
    fn name(&self) -> &'static str;

    /// Build the edge from `from` to `to`, or `None` if the model cannot
    /// connect them at all
    fn connect(&self, from: &Configuration, to: &Configuration) -> Option<Edge>;

    /// Arc-length step used to discretize edges for collision checking
    fn collision_step(&self) -> f64;

    /// Dense waypoint sequence for collision checking
    fn trajectory(&self, edge: &Edge) -> Vec<Point2D> {
        edge.sample(self.collision_step())
    }

    /// Coarse waypoint sequence used when reporting the tree
    fn polyline(&self, edge: &Edge) -> Vec<Point2D>;

    /// False when the trajectory is degenerate, leaves the map or touches an
    /// obstacle cell
    fn collision_free(&self, map: &OccupancyMap, trajectory: &[Point2D]) -> bool {
        trajectory_is_free(map, trajectory)
    }

    /// Convenience: discretize `edge` and check it
    fn edge_is_free(&self, map: &OccupancyMap, edge: &Edge) -> bool {
        self.collision_free(map, &self.trajectory(edge))
    }
}

/// Shared waypoint test used by every edge model
pub fn trajectory_is_free(map: &OccupancyMap, trajectory: &[Point2D]) -> bool {
    match (trajectory.first(), trajectory.last()) {
        (Some(first), Some(last)) if first != last => {
            trajectory.iter().all(|p| map.is_free(p.x, p.y))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map() -> OccupancyMap {
        OccupancyMap::from_rows(3, 3, &["...", "...", "..."]).unwrap()
    }

    #[test]
    fn test_degenerate_trajectory_is_rejected() {
        let map = open_map();
        let p = Point2D::new(1.0, 1.0);
        assert!(!trajectory_is_free(&map, &[p, p]));
        assert!(!trajectory_is_free(&map, &[]));
    }

    #[test]
    fn test_out_of_bounds_waypoint_is_rejected() {
        let map = open_map();
        let path = [Point2D::new(1.0, 1.0), Point2D::new(2.5, 2.5), Point2D::new(3.0, 2.5)];
        assert!(!trajectory_is_free(&map, &path));
    }

    #[test]
    fn test_free_trajectory() {
        let map = open_map();
        let path = [Point2D::new(0.0, 0.0), Point2D::new(2.9, 2.9)];
        assert!(trajectory_is_free(&map, &path));
    }
}
