//! Sampling-based planning: the search tree, its spatial index, the edge
//! models and the RRT / RRT* policies that grow the tree.

pub mod dubins_path;
pub mod edge;
pub mod planner;
pub mod rrt;
pub mod rrt_star;
pub mod sampler;
pub mod solution;
pub mod spatial_index;
pub mod tree;

pub use dubins_path::{DubinsConfig, DubinsCurve, DubinsPath, DubinsWord};
pub use edge::{Edge, EdgeShape, StraightLine, StraightLineConfig};
pub use planner::{Algorithm, MotionModelKind, Planner, PlannerConfig, LEGACY_HEADING_RANGE};
pub use sampler::Sampler;
pub use solution::Solution;
pub use spatial_index::SpatialIndex;
pub use tree::{Node, NodeId, Tree};
