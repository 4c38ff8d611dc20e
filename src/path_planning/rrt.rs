//! RRT (Rapidly-exploring Random Tree) policy
//!
//! Each iteration connects a fresh sample straight to its nearest tree node
//! and keeps it if the connecting edge is collision-free.

use log::trace;

use crate::common::PlannerResult;
use crate::path_planning::planner::Planner;
use crate::path_planning::tree::NodeId;

impl Planner {
    pub(crate) fn rrt_step(&mut self) -> PlannerResult<Option<NodeId>> {
        let sample = self.sampler.sample(&self.map);
        let nearest = match self.index.nearest(sample.position()) {
            Some(id) => id,
            None => return Ok(None),
        };

        let from = self.tree.node(nearest).config;
        let edge = match self.model.connect(&from, &sample) {
            Some(edge) => edge,
            None => return Ok(None),
        };
        if !self.edge_is_free(&edge) {
            trace!("rejected edge {} -> ({:.3}, {:.3})", nearest, sample.x, sample.y);
            return Ok(None);
        }

        let id = self.attach(nearest, sample, edge)?;
        Ok(if self.is_goal(id) { Some(id) } else { None })
    }
}
