//! Arena-backed search tree.
//!
//! Nodes are addressed by `NodeId`, parents are stored as ids and every node
//! caches its accumulated cost from the root. Rewiring keeps those caches
//! exact by recomputing the moved subtree.

use std::fmt;

use crate::common::{Configuration, PlannerError, PlannerResult};
use crate::path_planning::edge::Edge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub config: Configuration,
    parent: Option<NodeId>,
    edge: Option<Edge>,
    cost: f64,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Incoming edge from the parent, `None` for the root
    pub fn edge(&self) -> Option<&Edge> {
        self.edge.as_ref()
    }

    /// Accumulated cost from the root
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(root: Configuration) -> Self {
        Tree {
            nodes: vec![Node {
                config: root,
                parent: None,
                edge: None,
                cost: 0.0,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn cost(&self, id: NodeId) -> f64 {
        self.nodes[id.0].cost
    }

    /// Nodes in insertion order together with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    fn check(&self, id: NodeId) -> PlannerResult<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(PlannerError::PlanningError(format!("unknown node {}", id)))
        }
    }

    /// Plant a new node under `parent` reached through `edge`
    pub fn insert(&mut self, parent: NodeId, config: Configuration, edge: Edge) -> PlannerResult<NodeId> {
        self.check(parent)?;
        let id = NodeId(self.nodes.len());
        let cost = self.nodes[parent.0].cost + edge.cost;
        self.nodes.push(Node {
            config,
            parent: Some(parent),
            edge: Some(edge),
            cost,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// True if `ancestor` lies on the parent chain of `id` (or is `id`)
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
            current = self.nodes[c.0].parent;
        }
        false
    }

    /// Replace the parent and incoming edge of `id` in place and refresh the
    /// cached cost of its whole subtree
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId, edge: Edge) -> PlannerResult<()> {
        self.check(id)?;
        self.check(new_parent)?;
        if id == self.root() {
            return Err(PlannerError::PlanningError("the root cannot be rewired".to_string()));
        }
        if self.is_ancestor(id, new_parent) {
            return Err(PlannerError::PlanningError(format!(
                "rewiring {} under {} would create a cycle",
                id, new_parent
            )));
        }

        if let Some(old_parent) = self.nodes[id.0].parent {
            self.nodes[old_parent.0].children.retain(|&c| c != id);
        }
        self.nodes[new_parent.0].children.push(id);

        let node = &mut self.nodes[id.0];
        node.parent = Some(new_parent);
        node.edge = Some(edge);
        self.propagate_cost(id);
        Ok(())
    }

    /// Recompute cached costs for `id` and all of its descendants
    fn propagate_cost(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            let cost = match (node.parent, node.edge.as_ref()) {
                (Some(parent), Some(edge)) => self.nodes[parent.0].cost + edge.cost,
                _ => 0.0,
            };
            self.nodes[current.0].cost = cost;
            stack.extend(self.nodes[current.0].children.iter().copied());
        }
    }

    /// Ids from the root down to `id`
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            path.push(c);
            if path.len() > self.nodes.len() {
                break;
            }
            current = self.nodes[c.0].parent;
        }
        path.reverse();
        path
    }

    /// Sum of edge costs along the parent chain, computed without the cache
    pub fn path_cost(&self, id: NodeId) -> f64 {
        self.path_from_root(id)
            .iter()
            .filter_map(|&n| self.nodes[n.0].edge.as_ref())
            .fold(0.0, |acc, e| acc + e.cost)
    }

    /// Number of parent hops from `id` to the root, `None` if the chain does
    /// not reach the root within `len()` steps
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut current = id;
        for steps in 0..=self.nodes.len() {
            match self.nodes[current.0].parent {
                None => return if current == self.root() { Some(steps) } else { None },
                Some(p) => current = p,
            }
        }
        None
    }
}
