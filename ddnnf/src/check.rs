//! Canonical-form checker used by tests.
use std::collections::BTreeSet;

use ddnnf_formula::Var;

use crate::graph::Ddnnf;
use crate::node::{NodeId, NodeKind};

impl Ddnnf {
    /// Verifies every invariant of a simplified graph and reports the first
    /// violation found.
    ///
    /// Only available with the `internal-testing` feature; production code
    /// maintains these invariants instead of checking them.
    pub fn check_canonical(&self) -> Result<(), String> {
        if self.node_count() == 0 {
            if self.root().is_some() {
                return Err("empty graph with a root".into());
            }
            return Ok(());
        }
        let root = match self.root() {
            Some(root) => root,
            None => return Err("non-empty graph without a root".into()),
        };
        if root.index() != self.node_count() - 1 {
            return Err(format!(
                "root {} is not the last of {} nodes",
                root,
                self.node_count()
            ));
        }

        let mut true_nodes = 0;
        let mut false_nodes = 0;
        let mut literal_vars = BTreeSet::new();

        for index in 0..self.node_count() {
            let id = NodeId::from_index(index);
            let node = match self.get_node(id) {
                Some(node) => node,
                None => return Err(format!("deleted slot {} in a simplified graph", id)),
            };

            if node.parents().is_empty() != (id == root) {
                return Err(format!("node {} breaks the parentless-iff-root rule", id));
            }

            for &child in node.children() {
                if child.index() >= index {
                    return Err(format!("child {} of node {} breaks postorder", child, id));
                }
                let child_node = self
                    .get_node(child)
                    .ok_or_else(|| format!("edge {} -> {} into a deleted node", id, child))?;
                if !child_node.parents().contains(&id) {
                    return Err(format!("edge {} -> {} lacks its parent entry", id, child));
                }
            }
            for &parent in node.parents() {
                let parent_node = self
                    .get_node(parent)
                    .ok_or_else(|| format!("parent {} of {} is deleted", parent, id))?;
                if !parent_node.children().contains(&id) {
                    return Err(format!("edge {} -> {} lacks its child entry", parent, id));
                }
            }

            match node.kind() {
                NodeKind::And | NodeKind::Or => {
                    if node.children().len() < 2 {
                        return Err(format!("gate {} has fewer than two children", id));
                    }
                    for &child in node.children() {
                        let child_kind = self.node(child).kind();
                        if child_kind == NodeKind::True
                            || child_kind == NodeKind::False
                            || child_kind == node.kind()
                        {
                            return Err(format!(
                                "{:?} node {} has a {:?} child",
                                node.kind(),
                                id,
                                child_kind
                            ));
                        }
                    }
                }
                NodeKind::Literal(lit) => {
                    if !node.children().is_empty() {
                        return Err(format!("literal node {} has children", id));
                    }
                    if self.get_literal_id(lit) != Some(id) {
                        return Err(format!("literal table misses node {} for {}", id, lit));
                    }
                    literal_vars.insert(lit.var());
                }
                NodeKind::True => {
                    if !node.children().is_empty() {
                        return Err(format!("true node {} has children", id));
                    }
                    if self.true_id() != Some(id) {
                        return Err(format!("true node {} is not tracked", id));
                    }
                    true_nodes += 1;
                }
                NodeKind::False => {
                    if !node.children().is_empty() {
                        return Err(format!("false node {} has children", id));
                    }
                    if self.false_id() != Some(id) {
                        return Err(format!("false node {} is not tracked", id));
                    }
                    false_nodes += 1;
                }
            }
        }

        if true_nodes > 1 || false_nodes > 1 {
            return Err("more than one constant node of the same kind".into());
        }
        let mentioned: BTreeSet<Var> = self.mentioned_vars().iter().copied().collect();
        if mentioned != literal_vars {
            return Err("mentioned_vars does not match the reachable literals".into());
        }
        Ok(())
    }
}
