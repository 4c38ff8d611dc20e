//! Tree edges and the holonomic straight-line edge model

use crate::common::{trajectory_is_free, Configuration, EdgeModel, PlannerError, PlannerResult, Point2D};
use crate::path_planning::dubins_path::DubinsPath;
use crate::utils::grid_map::OccupancyMap;

/// Geometry of an edge, discretized on demand
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeShape {
    Straight,
    Dubins(DubinsPath),
}

/// Directed connection from a parent configuration to a child configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: Configuration,
    pub to: Configuration,
    pub cost: f64,
    pub shape: EdgeShape,
}

impl Edge {
    pub fn new(from: Configuration, to: Configuration, cost: f64, shape: EdgeShape) -> Self {
        Edge { from, to, cost, shape }
    }

    /// Waypoints spaced roughly `step` apart; the first is exactly the
    /// source position and the last exactly the destination position.
    pub fn sample(&self, step: f64) -> Vec<Point2D> {
        let start = self.from.position();
        let end = self.to.position();
        let mut points = match &self.shape {
            EdgeShape::Straight => {
                let n = (self.cost / step).ceil().max(1.0) as usize;
                (0..n).map(|i| start.lerp(&end, i as f64 / n as f64)).collect::<Vec<_>>()
            }
            EdgeShape::Dubins(path) => path
                .sample_many(&self.from, step)
                .iter()
                .map(|q| q.position())
                .collect::<Vec<_>>(),
        };
        if let Some(first) = points.first_mut() {
            *first = start;
        }
        points.push(end);
        points
    }
}

/// Configuration for the straight-line edge model
#[derive(Debug, Clone)]
pub struct StraightLineConfig {
    /// Spacing of collision-check waypoints
    pub step: f64,
    /// Reject edges steeper than `max_slope` (legacy behaviour, off by default)
    pub legacy_slope_check: bool,
    pub max_slope: f64,
}

impl Default for StraightLineConfig {
    fn default() -> Self {
        Self {
            step: 0.01,
            legacy_slope_check: false,
            max_slope: 9.0,
        }
    }
}

impl StraightLineConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.step > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "straight-line step must be positive, got {}",
                self.step
            )));
        }
        Ok(())
    }
}

/// Holonomic edge model: straight segments, Euclidean cost
#[derive(Debug, Clone)]
pub struct StraightLine {
    config: StraightLineConfig,
}

impl StraightLine {
    pub fn new(config: StraightLineConfig) -> PlannerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StraightLineConfig {
        &self.config
    }

    fn too_steep(&self, first: &Point2D, last: &Point2D) -> bool {
        let dx = (last.x - first.x).abs();
        let dy = (last.y - first.y).abs();
        dy > self.config.max_slope * dx
    }
}

impl Default for StraightLine {
    fn default() -> Self {
        Self {
            config: StraightLineConfig::default(),
        }
    }
}

impl EdgeModel for StraightLine {
    fn name(&self) -> &'static str {
        "straight"
    }

    fn connect(&self, from: &Configuration, to: &Configuration) -> Option<Edge> {
        let cost = from.position().distance(&to.position());
        if !cost.is_finite() {
            return None;
        }
        Some(Edge::new(*from, *to, cost, EdgeShape::Straight))
    }

    fn collision_step(&self) -> f64 {
        self.config.step
    }

    fn polyline(&self, edge: &Edge) -> Vec<Point2D> {
        vec![edge.from.position(), edge.to.position()]
    }

    fn collision_free(&self, map: &OccupancyMap, trajectory: &[Point2D]) -> bool {
        if self.config.legacy_slope_check {
            if let (Some(first), Some(last)) = (trajectory.first(), trajectory.last()) {
                if self.too_steep(first, last) {
                    return false;
                }
            }
        }
        trajectory_is_free(map, trajectory)
    }
}
