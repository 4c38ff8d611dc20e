//! Map loading, problem files and plotting

pub mod grid_map;
pub mod problem_file;
pub mod visualization;

pub use grid_map::{Cell, OccupancyMap};
pub use problem_file::Problem;
pub use visualization::{colors, plot_solution, PathStyle, PointStyle, Visualizer};
