//! The graph store owning all nodes of a d-DNNF.
use std::collections::BTreeSet;

use thiserror::Error;

use ddnnf_formula::{Lit, Var};

use crate::node::{Node, NodeId, NodeKind};

/// Errors reported by the checked graph building operations.
///
/// These arise from malformed input files (duplicate constants, duplicate
/// literals, edges out of leaves); the readers wrap them with position
/// information.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("graph already contains a true node")]
    DuplicateTrue,
    #[error("graph already contains a false node")]
    DuplicateFalse,
    #[error("graph already contains a node for literal {0}")]
    DuplicateLiteral(Lit),
    #[error("literal {0} is outside the declared variable range")]
    LiteralOutOfRange(Lit),
    #[error("node id {0} is out of range or deleted")]
    InvalidNodeId(NodeId),
    #[error("{kind:?} node {id} cannot have children")]
    LeafParent { id: NodeId, kind: NodeKind },
}

/// A d-DNNF graph.
///
/// Nodes live in a slot table indexed by [`NodeId`]; deleting a node nulls
/// its slot and [`simplify`](Ddnnf::simplify) compacts the table again. The
/// store tracks the root, the unique TRUE/FALSE constant nodes, one node per
/// signed literal and the set of variables mentioned by reachable literals.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Ddnnf {
    nodes: Vec<Option<Node>>,
    root: Option<NodeId>,
    true_id: Option<NodeId>,
    false_id: Option<NodeId>,
    /// Literal node ids indexed by `Lit::code()`.
    literals: Vec<Option<NodeId>>,
    mentioned_vars: BTreeSet<Var>,
    total_variables: usize,
}

impl Ddnnf {
    /// Creates an empty graph.
    pub fn new() -> Ddnnf {
        Ddnnf::default()
    }

    /// Empties all state.
    pub fn reset(&mut self) {
        *self = Ddnnf::default();
    }

    /// Makes room in the literal table for the variables `1..=num_vars`.
    ///
    /// Also raises the declared variable bound to at least `num_vars`. The
    /// bound may exceed the number of variables that are actually mentioned.
    pub fn prepare_literals(&mut self, num_vars: usize) {
        if self.literals.len() < 2 * num_vars {
            self.literals.resize(2 * num_vars, None);
        }
        self.total_variables = self.total_variables.max(num_vars);
    }

    /// Appends a node of the given kind, enforcing the uniqueness rules.
    ///
    /// At most one TRUE and one FALSE node may exist, each literal may have
    /// at most one node, and a literal's variable must be within the range
    /// declared via [`prepare_literals`](Ddnnf::prepare_literals).
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeId, GraphError> {
        match kind {
            NodeKind::True if self.true_id.is_some() => return Err(GraphError::DuplicateTrue),
            NodeKind::False if self.false_id.is_some() => return Err(GraphError::DuplicateFalse),
            NodeKind::Literal(lit) => {
                if lit.code() >= self.literals.len() {
                    return Err(GraphError::LiteralOutOfRange(lit));
                }
                if self.literals[lit.code()].is_some() {
                    return Err(GraphError::DuplicateLiteral(lit));
                }
            }
            _ => {}
        }
        Ok(self.push_node(kind))
    }

    /// Inserts the edge `parent -> child`, updating both adjacency sides.
    ///
    /// Duplicate edges are silently absorbed. Fails on unknown endpoints and
    /// on parents that are not gates.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> Result<(), GraphError> {
        let parent_node = self.get_node(parent).ok_or(GraphError::InvalidNodeId(parent))?;
        if !parent_node.is_gate() {
            return Err(GraphError::LeafParent {
                id: parent,
                kind: parent_node.kind(),
            });
        }
        if self.get_node(child).is_none() {
            return Err(GraphError::InvalidNodeId(child));
        }
        self.link(parent, child);
        Ok(())
    }

    /// Marks `id` as the root node.
    ///
    /// Panics when `id` does not name a live node.
    pub fn set_root(&mut self, id: NodeId) {
        assert!(self.get_node(id).is_some(), "root {} is not a live node", id);
        self.root = Some(id);
    }

    /// The node with the given id, `None` for deleted or out-of-range ids.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(|slot| slot.as_ref())
    }

    /// The id of the node for the given literal, if one exists.
    pub fn get_literal_id(&self, lit: Lit) -> Option<NodeId> {
        self.literals.get(lit.code()).copied().flatten()
    }

    /// Whether `id` is the root node.
    pub fn is_root(&self, id: NodeId) -> bool {
        self.root == Some(id)
    }

    /// The root node id, `None` for an empty graph.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The id of the TRUE node, if one exists.
    pub fn true_id(&self) -> Option<NodeId> {
        self.true_id
    }

    /// The id of the FALSE node, if one exists.
    pub fn false_id(&self) -> Option<NodeId> {
        self.false_id
    }

    /// Number of node slots. After simplification all slots are live and ids
    /// are dense in `0..node_count()`.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges, counted over the child sets.
    pub fn edge_count(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .map(|node| node.children().len())
            .sum()
    }

    /// The declared upper bound on variable indices.
    pub fn total_variables(&self) -> usize {
        self.total_variables
    }

    /// Variables appearing in some literal node.
    pub fn mentioned_vars(&self) -> &BTreeSet<Var> {
        &self.mentioned_vars
    }

    /// All live nodes in ascending id order.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|node| (NodeId::from_index(index), node))
        })
    }

    /// Appends a node without the uniqueness checks of
    /// [`add_node`](Ddnnf::add_node). Callers must have validated the kind.
    pub(crate) fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        match kind {
            NodeKind::True => self.true_id = Some(id),
            NodeKind::False => self.false_id = Some(id),
            NodeKind::Literal(lit) => {
                self.literals[lit.code()] = Some(id);
                self.mentioned_vars.insert(lit.var());
            }
            _ => {}
        }
        self.nodes.push(Some(Node::new(kind)));
        id
    }

    /// Creates the TRUE and FALSE nodes when absent and returns
    /// `(true_id, false_id)`.
    pub(crate) fn ensure_constants(&mut self) -> (NodeId, NodeId) {
        let true_id = match self.true_id {
            Some(id) => id,
            None => self.push_node(NodeKind::True),
        };
        let false_id = match self.false_id {
            Some(id) => id,
            None => self.push_node(NodeKind::False),
        };
        (true_id, false_id)
    }

    pub(crate) fn set_root_internal(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The live node behind `id`; panics on deleted ids. Internal passes only
    /// hold ids of live nodes.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        match &self.nodes[id.index()] {
            Some(node) => node,
            None => panic!("node {} was deleted", id),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.nodes[id.index()] {
            Some(node) => node,
            None => panic!("node {} was deleted", id),
        }
    }

    /// Inserts the edge `parent -> child` on both adjacency sides.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).add_child(child);
        self.node_mut(child).add_parent(parent);
    }

    /// Removes the edge `parent -> child` from both adjacency sides.
    pub(crate) fn unlink(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).remove_child(child);
        self.node_mut(child).remove_parent(parent);
    }

    /// Deletes a node slot and clears the bookkeeping pointing at it.
    ///
    /// The caller must already have detached the node from every surviving
    /// child and parent.
    pub(crate) fn remove_node(&mut self, id: NodeId) {
        let node = self.nodes[id.index()].take();
        match node {
            Some(node) => match node.kind() {
                NodeKind::True => self.true_id = None,
                NodeKind::False => self.false_id = None,
                NodeKind::Literal(lit) => self.literals[lit.code()] = None,
                _ => {}
            },
            None => panic!("node {} was already deleted", id),
        }
    }

    pub(crate) fn recompute_mentioned_vars(&mut self) {
        self.mentioned_vars.clear();
        for slot in &self.nodes {
            if let Some(lit) = slot.as_ref().and_then(|node| node.lit()) {
                self.mentioned_vars.insert(lit.var());
            }
        }
    }

    /// Replaces the old-to-new id mapping produced by re-indexing: rewrites
    /// the literal table, the constant ids and the root.
    pub(crate) fn remap_tables(&mut self, remap: &[Option<NodeId>]) {
        for slot in self.literals.iter_mut() {
            if let Some(id) = *slot {
                *slot = remap[id.index()];
            }
        }
        self.true_id = self.true_id.and_then(|id| remap[id.index()]);
        self.false_id = self.false_id.and_then(|id| remap[id.index()]);
        self.root = self.root.and_then(|id| remap[id.index()]);
    }

    pub(crate) fn replace_slots(&mut self, nodes: Vec<Option<Node>>) {
        self.nodes = nodes;
    }

    pub(crate) fn take_slot(&mut self, id: NodeId) -> Option<Node> {
        self.nodes[id.index()].take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddnnf_formula::lit;

    #[test]
    fn duplicate_constants_are_rejected() {
        let mut graph = Ddnnf::new();
        graph.add_node(NodeKind::True).unwrap();
        assert!(matches!(
            graph.add_node(NodeKind::True),
            Err(GraphError::DuplicateTrue)
        ));
        graph.add_node(NodeKind::False).unwrap();
        assert!(matches!(
            graph.add_node(NodeKind::False),
            Err(GraphError::DuplicateFalse)
        ));
    }

    #[test]
    fn literal_slots_are_unique_and_bounded() {
        let mut graph = Ddnnf::new();
        graph.prepare_literals(2);
        graph.add_node(NodeKind::Literal(lit!(1))).unwrap();
        assert!(matches!(
            graph.add_node(NodeKind::Literal(lit!(1))),
            Err(GraphError::DuplicateLiteral(_))
        ));
        graph.add_node(NodeKind::Literal(lit!(-1))).unwrap();
        assert!(matches!(
            graph.add_node(NodeKind::Literal(lit!(3))),
            Err(GraphError::LiteralOutOfRange(_))
        ));
        assert_eq!(graph.get_literal_id(lit!(1)), Some(NodeId::from_index(0)));
        assert_eq!(graph.get_literal_id(lit!(-2)), None);
    }

    #[test]
    fn edges_keep_both_directions_in_sync() {
        let mut graph = Ddnnf::new();
        graph.prepare_literals(1);
        let a = graph.add_node(NodeKind::And).unwrap();
        let l = graph.add_node(NodeKind::Literal(lit!(1))).unwrap();
        graph.add_edge(a, l).unwrap();
        graph.add_edge(a, l).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.get_node(a).unwrap().children().contains(&l));
        assert!(graph.get_node(l).unwrap().parents().contains(&a));
    }

    #[test]
    fn leaves_cannot_be_edge_sources() {
        let mut graph = Ddnnf::new();
        graph.prepare_literals(1);
        let l = graph.add_node(NodeKind::Literal(lit!(1))).unwrap();
        let t = graph.add_node(NodeKind::True).unwrap();
        assert!(matches!(
            graph.add_edge(l, t),
            Err(GraphError::LeafParent { .. })
        ));
        assert!(matches!(
            graph.add_edge(t, l),
            Err(GraphError::LeafParent { .. })
        ));
    }

    #[test]
    fn invalid_ids_are_rejected() {
        let mut graph = Ddnnf::new();
        let a = graph.add_node(NodeKind::And).unwrap();
        assert!(matches!(
            graph.add_edge(a, NodeId::from_index(7)),
            Err(GraphError::InvalidNodeId(_))
        ));
    }

    #[test]
    fn reset_empties_everything() {
        let mut graph = Ddnnf::new();
        graph.prepare_literals(3);
        graph.add_node(NodeKind::And).unwrap();
        graph.reset();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.total_variables(), 0);
        assert_eq!(graph.root(), None);
    }
}
