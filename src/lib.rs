//! grid_rrt - RRT and RRT* planning on occupancy grids
//!
//! This crate grows a tree of collision-free configurations from a start
//! pose towards a goal on a 2D grid map, with either straight-line edges or
//! curvature-bounded Dubins curves.

// Core modules
pub mod common;
pub mod utils;

// Planning
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Configuration, EdgeModel, Path2D, Point2D};
pub use common::{PlannerError, PlannerResult};
pub use path_planning::{Algorithm, MotionModelKind, Planner, PlannerConfig, Solution};
pub use utils::{OccupancyMap, Problem};
