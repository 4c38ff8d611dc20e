//! Common types, traits, and error definitions for grid_rrt
//!
//! This module provides the foundational building blocks shared by the
//! planner, the edge models and the I/O glue.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
