//! Planning context shared by the RRT and RRT* policies.
//!
//! A `Planner` owns everything a run mutates: the tree, the spatial index
//! and the sampler. It is built once per problem and dropped after the
//! solution has been extracted.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{debug, info, warn};

use crate::common::{Configuration, EdgeModel, PlannerError, PlannerResult, Point2D};
use crate::path_planning::dubins_path::{DubinsConfig, DubinsCurve};
use crate::path_planning::edge::{Edge, StraightLine, StraightLineConfig};
use crate::path_planning::sampler::Sampler;
use crate::path_planning::solution::Solution;
use crate::path_planning::spatial_index::SpatialIndex;
use crate::path_planning::tree::{NodeId, Tree};
use crate::utils::grid_map::OccupancyMap;

/// Sampling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Rrt,
    RrtStar,
}

impl FromStr for Algorithm {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rrt" => Ok(Algorithm::Rrt),
            "rrt_star" | "rrt*" | "rrtstar" => Ok(Algorithm::RrtStar),
            other => Err(PlannerError::InvalidParameter(format!(
                "unknown algorithm '{}', expected 'rrt' or 'rrt_star'",
                other
            ))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Rrt => write!(f, "rrt"),
            Algorithm::RrtStar => write!(f, "rrt_star"),
        }
    }
}

/// Edge model family, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionModelKind {
    Straight,
    Dubins,
}

impl MotionModelKind {
    /// Goal bias used when none is given explicitly
    pub fn default_goal_sample_rate(self) -> f64 {
        match self {
            MotionModelKind::Straight => 0.001,
            MotionModelKind::Dubins => 0.005,
        }
    }

    /// Start configuration at `p`; curves start facing up
    pub fn start_configuration(self, p: Point2D) -> Configuration {
        match self {
            MotionModelKind::Straight => Configuration::planar(p.x, p.y),
            MotionModelKind::Dubins => Configuration::new(p.x, p.y, FRAC_PI_2),
        }
    }

    pub fn goal_configuration(self, p: Point2D) -> Configuration {
        Configuration::planar(p.x, p.y)
    }

    pub fn build(
        self,
        straight: StraightLineConfig,
        dubins: DubinsConfig,
    ) -> PlannerResult<Box<dyn EdgeModel>> {
        let model: Box<dyn EdgeModel> = match self {
            MotionModelKind::Straight => Box::new(StraightLine::new(straight)?),
            MotionModelKind::Dubins => Box::new(DubinsCurve::new(dubins)?),
        };
        Ok(model)
    }
}

impl FromStr for MotionModelKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "straight" | "holonomic" => Ok(MotionModelKind::Straight),
            "dubins" | "curve" => Ok(MotionModelKind::Dubins),
            other => Err(PlannerError::InvalidParameter(format!(
                "unknown motion model '{}', expected 'straight' or 'dubins'",
                other
            ))),
        }
    }
}

impl fmt::Display for MotionModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionModelKind::Straight => write!(f, "straight"),
            MotionModelKind::Dubins => write!(f, "dubins"),
        }
    }
}

/// Heading range of uniformly sampled configurations used by older runs
pub const LEGACY_HEADING_RANGE: f64 = 1000.0;

/// Configuration for the planner
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub algorithm: Algorithm,
    /// RRT* neighborhood radius
    pub radius: f64,
    /// Probability of drawing the goal instead of a random sample
    pub goal_sample_rate: f64,
    /// Uniform headings are drawn from [0, heading_range)
    pub heading_range: f64,
    /// Fixed sampling seed, `None` for a fresh one
    pub seed: Option<u64>,
    /// Log progress every this many iterations (0 disables)
    pub progress_interval: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Rrt,
            radius: 5.0,
            goal_sample_rate: 0.001,
            heading_range: 2.0 * PI,
            seed: None,
            progress_interval: 10_000,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.radius > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !(0.0..=1.0).contains(&self.goal_sample_rate) {
            return Err(PlannerError::InvalidParameter(format!(
                "goal sample rate must be in [0, 1], got {}",
                self.goal_sample_rate
            )));
        }
        if !(self.heading_range >= 0.0) || !self.heading_range.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "heading range must be finite and non-negative, got {}",
                self.heading_range
            )));
        }
        Ok(())
    }
}

pub struct Planner {
    pub(crate) map: OccupancyMap,
    pub(crate) model: Box<dyn EdgeModel>,
    pub(crate) config: PlannerConfig,
    pub(crate) sampler: Sampler,
    pub(crate) tree: Tree,
    pub(crate) index: SpatialIndex,
    pub(crate) goal: Configuration,
    iterations: usize,
}

impl Planner {
    pub fn new(
        map: OccupancyMap,
        model: Box<dyn EdgeModel>,
        start: Configuration,
        goal: Configuration,
        config: PlannerConfig,
    ) -> PlannerResult<Self> {
        config.validate()?;
        if map.free_cell_count() == 0 {
            return Err(PlannerError::InvalidParameter("map has no free cell to sample".to_string()));
        }
        if !map.is_free(start.x, start.y) {
            warn!("start ({}, {}) is not on a free cell", start.x, start.y);
        }

        let sampler = Sampler::new(goal, config.goal_sample_rate, config.heading_range, config.seed);
        let tree = Tree::new(start);
        let mut index = SpatialIndex::new();
        index.insert(tree.root(), start.position());

        Ok(Planner {
            map,
            model,
            config,
            sampler,
            tree,
            index,
            goal,
            iterations: 0,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn map(&self) -> &OccupancyMap {
        &self.map
    }

    pub fn model(&self) -> &dyn EdgeModel {
        self.model.as_ref()
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn start(&self) -> Configuration {
        self.tree.node(self.tree.root()).config
    }

    pub fn goal(&self) -> Configuration {
        self.goal
    }

    /// Sampling iterations performed so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn is_goal(&self, id: NodeId) -> bool {
        self.tree.node(id).config.same_position(&self.goal)
    }

    /// Run until a node lands exactly on the goal.
    ///
    /// There is no iteration bound: an unreachable goal keeps this looping.
    pub fn plan(&mut self) -> PlannerResult<NodeId> {
        let started = Instant::now();
        self.log_start();
        if self.is_goal(self.tree.root()) {
            info!("start coincides with goal, nothing to plan");
            return Ok(self.tree.root());
        }
        loop {
            if let Some(id) = self.step()? {
                self.log_finish(id, started);
                return Ok(id);
            }
        }
    }

    /// Like `plan`, but gives up after `max_iterations` samples
    pub fn plan_bounded(&mut self, max_iterations: usize) -> PlannerResult<Option<NodeId>> {
        let started = Instant::now();
        self.log_start();
        if self.is_goal(self.tree.root()) {
            return Ok(Some(self.tree.root()));
        }
        for _ in 0..max_iterations {
            if let Some(id) = self.step()? {
                self.log_finish(id, started);
                return Ok(Some(id));
            }
        }
        info!(
            "no solution after {} iterations ({} nodes)",
            self.iterations,
            self.tree.len()
        );
        Ok(None)
    }

    /// One sampling iteration; returns the goal node once it is planted
    pub fn step(&mut self) -> PlannerResult<Option<NodeId>> {
        self.iterations += 1;
        if self.config.progress_interval > 0 && self.iterations % self.config.progress_interval == 0 {
            debug!("iter: {}, number of nodes: {}", self.iterations, self.tree.len());
        }
        match self.config.algorithm {
            Algorithm::Rrt => self.rrt_step(),
            Algorithm::RrtStar => self.rrt_star_step(),
        }
    }

    /// Extract the path to `id` and the explored edge set
    pub fn solution(&self, id: NodeId) -> Solution {
        Solution::extract(&self.tree, self.model.as_ref(), id)
    }

    pub(crate) fn edge_is_free(&self, edge: &Edge) -> bool {
        self.model.edge_is_free(&self.map, edge)
    }

    /// Plant `config` under `parent` and register it with the spatial index
    pub(crate) fn attach(&mut self, parent: NodeId, config: Configuration, edge: Edge) -> PlannerResult<NodeId> {
        let id = self.tree.insert(parent, config, edge)?;
        self.index.insert(id, config.position());
        debug!(
            "node {} at ({:.3}, {:.3}) under {}, cost {:.3}",
            id,
            config.x,
            config.y,
            parent,
            self.tree.cost(id)
        );
        Ok(id)
    }

    fn log_start(&self) {
        let start = self.start();
        info!(
            "{} planning with {} edges on a {}x{} map from ({}, {}) to ({}, {})",
            self.config.algorithm,
            self.model.name(),
            self.map.columns(),
            self.map.rows(),
            start.x,
            start.y,
            self.goal.x,
            self.goal.y
        );
    }

    fn log_finish(&self, id: NodeId, started: Instant) {
        info!(
            "goal reached after {} iterations in {:.3}s: {} nodes, path cost {:.4}",
            self.iterations,
            started.elapsed().as_secs_f64(),
            self.tree.len(),
            self.tree.cost(id)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner_on(rows: &[&str], start: (f64, f64), goal: (f64, f64), config: PlannerConfig) -> Planner {
        let columns = rows[0].len();
        let map = OccupancyMap::from_rows(columns, rows.len(), rows).unwrap();
        Planner::new(
            map,
            Box::new(StraightLine::default()),
            Configuration::planar(start.0, start.1),
            Configuration::planar(goal.0, goal.1),
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("rrt".parse::<Algorithm>().unwrap(), Algorithm::Rrt);
        assert_eq!("rrt_star".parse::<Algorithm>().unwrap(), Algorithm::RrtStar);
        assert_eq!("RRT*".parse::<Algorithm>().unwrap(), Algorithm::RrtStar);
        assert!("dijkstra".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::RrtStar.to_string(), "rrt_star");
    }

    #[test]
    fn test_motion_model_kind() {
        assert_eq!("dubins".parse::<MotionModelKind>().unwrap(), MotionModelKind::Dubins);
        assert!("boat".parse::<MotionModelKind>().is_err());
        let start = MotionModelKind::Dubins.start_configuration(Point2D::new(1.0, 2.0));
        assert_eq!(start.heading, FRAC_PI_2);
        let model = MotionModelKind::Dubins
            .build(StraightLineConfig::default(), DubinsConfig::default())
            .unwrap();
        assert_eq!(model.name(), "dubins");
    }

    #[test]
    fn test_config_validation() {
        let bad_radius = PlannerConfig {
            radius: 0.0,
            ..Default::default()
        };
        assert!(bad_radius.validate().is_err());
        let bad_rate = PlannerConfig {
            goal_sample_rate: 1.5,
            ..Default::default()
        };
        assert!(bad_rate.validate().is_err());
        assert!(PlannerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_map_without_free_cells_is_rejected() {
        let map = OccupancyMap::from_rows(2, 1, &["##"]).unwrap();
        let result = Planner::new(
            map,
            Box::new(StraightLine::default()),
            Configuration::planar(0.5, 0.5),
            Configuration::planar(1.5, 0.5),
            PlannerConfig::default(),
        );
        assert!(matches!(result, Err(PlannerError::InvalidParameter(_))));
    }

    #[test]
    fn test_start_equals_goal_is_immediate() {
        let mut planner = planner_on(&["...", "..."], (1.0, 1.0), (1.0, 1.0), PlannerConfig::default());
        let id = planner.plan().unwrap();
        assert_eq!(id, planner.tree().root());
        assert_eq!(planner.iterations(), 0);

        let solution = planner.solution(id);
        assert_eq!(solution.path.points, vec![Point2D::new(1.0, 1.0)]);
        assert!(solution.explored.is_empty());
    }

    #[test]
    fn test_open_grid_scenario() {
        let config = PlannerConfig {
            seed: Some(2024),
            ..Default::default()
        };
        let rows = [".....", ".....", ".....", ".....", "....."];
        let mut planner = planner_on(&rows, (0.0, 0.0), (4.0, 4.0), config);
        let id = planner.plan_bounded(1_000_000).unwrap().expect("open grid must be solved");

        let solution = planner.solution(id);
        assert_eq!(solution.path.first(), Some(&Point2D::new(0.0, 0.0)));
        assert_eq!(solution.path.last(), Some(&Point2D::new(4.0, 4.0)));
        assert_eq!(solution.explored.len(), planner.tree().len() - 1);

        let text = solution.to_string();
        let mut lines = text.lines();
        let n: usize = lines.next().unwrap().parse().unwrap();
        let last_pair = lines.nth(n - 1).unwrap();
        assert_eq!(last_pair, "4.0 4.0");
    }

    #[test]
    fn test_wall_keeps_planner_running() {
        let rows = ["..#..", "..#..", "..#..", "..#..", "..#.."];
        let config = PlannerConfig {
            seed: Some(11),
            goal_sample_rate: 0.05,
            ..Default::default()
        };
        let mut planner = planner_on(&rows, (0.5, 0.5), (4.5, 4.5), config);
        assert_eq!(planner.plan_bounded(3_000).unwrap(), None);
        assert_eq!(planner.iterations(), 3_000);
        for (_, node) in planner.tree().iter() {
            assert!(node.config.x < 2.0);
        }
    }

    #[test]
    fn test_same_seed_same_tree() {
        let rows = ["......", "..##..", "......", "......"];
        let run = || {
            let config = PlannerConfig {
                seed: Some(5),
                ..Default::default()
            };
            let mut planner = planner_on(&rows, (0.5, 0.5), (5.5, 3.5), config);
            planner.plan_bounded(400).unwrap();
            planner
                .tree()
                .iter()
                .map(|(_, n)| (n.config.x.to_bits(), n.config.y.to_bits()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
