//! Solution extraction and the textual result format.
//!
//! The output lists the path from start to goal followed by every explored
//! segment:
//!
//! ```text
//! <n>
//! x y            (n lines)
//! <m>
//! x1 y1 x2 y2    (m lines)
//! ```

use std::fmt;
use std::io::{self, Write};

use itertools::Itertools;

use crate::common::{EdgeModel, Path2D, Point2D};
use crate::path_planning::tree::{NodeId, Tree};

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Accumulated cost of the goal node
    pub cost: f64,
    /// Start to goal, following the edge geometry
    pub path: Path2D,
    /// Segments of every non-root node's incoming edge, in insertion order
    pub explored: Vec<(Point2D, Point2D)>,
}

impl Solution {
    pub fn extract(tree: &Tree, model: &dyn EdgeModel, goal: NodeId) -> Self {
        let mut path = Path2D::new();
        for id in tree.path_from_root(goal) {
            let node = tree.node(id);
            if let Some(edge) = node.edge() {
                let mut polyline = model.polyline(edge);
                // The endpoint opens the next edge or is pushed below
                polyline.pop();
                path.points.extend(polyline);
            }
            if id == goal {
                path.push(node.config.position());
            }
        }

        let explored = tree
            .iter()
            .filter_map(|(_, node)| node.edge())
            .flat_map(|edge| model.polyline(edge).into_iter().tuple_windows::<(_, _)>())
            .collect();

        Solution {
            cost: tree.cost(goal),
            path,
            explored,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.path.len())?;
        for p in &self.path.points {
            writeln!(f, "{:?} {:?}", p.x, p.y)?;
        }
        writeln!(f, "{}", self.explored.len())?;
        for (a, b) in &self.explored {
            writeln!(f, "{:?} {:?} {:?} {:?}", a.x, a.y, b.x, b.y)?;
        }
        Ok(())
    }
}
