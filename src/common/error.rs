//! Error types for grid_rrt

use std::fmt;

/// Main error type for the planner and its I/O glue
#[derive(Debug)]
pub enum PlannerError {
    /// Problem description could not be parsed
    ParseError(String),
    /// Invalid parameter
    InvalidParameter(String),
    /// Tree or planner state was asked to do something inconsistent
    PlanningError(String),
    /// I/O error
    IoError(std::io::Error),
    /// Visualization error
    VisualizationError(String),
}

impl PlannerError {
    pub(crate) fn parse(line: usize, msg: impl fmt::Display) -> Self {
        PlannerError::ParseError(format!("line {}: {}", line, msg))
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            PlannerError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PlannerError::PlanningError(msg) => write!(f, "Planning error: {}", msg),
            PlannerError::IoError(e) => write!(f, "I/O error: {}", e),
            PlannerError::VisualizationError(msg) => write!(f, "Visualization error: {}", msg),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(e: std::io::Error) -> Self {
        PlannerError::IoError(e)
    }
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
