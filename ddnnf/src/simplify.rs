//! Canonicalization of the graph after mutations.
//!
//! [`Ddnnf::simplify`] runs three phases: constant propagation with gate
//! normalization (postorder from the root), removal of unreachable
//! subgraphs, and dense re-indexing in postorder. Every reader and every
//! conditioning step ends here, so all graphs handed back to callers are in
//! canonical form.
use std::collections::VecDeque;

use log::debug;

use crate::graph::Ddnnf;
use crate::node::{Node, NodeId, NodeKind};

/// DFS work item: a node is expanded on `Enter` and processed on `Exit`,
/// after all of its descendants.
enum Walk {
    Enter(NodeId),
    Exit(NodeId),
}

impl Ddnnf {
    /// Restores canonical form.
    ///
    /// After this returns, no gate has a constant or same-kind child, no
    /// gate has fewer than two children, every node is reachable from the
    /// root, and ids are dense in postorder with the root last. Simplifying
    /// an already canonical graph leaves it unchanged, ids included.
    pub fn simplify(&mut self) {
        let root = match self.root() {
            Some(root) => root,
            None => return,
        };
        // The replacement rules below need both constants to exist; the
        // sweep removes them again when nothing ends up referencing them.
        let (true_id, false_id) = self.ensure_constants();
        self.propagate_constants(root, true_id, false_id);
        self.sweep_unreachable();
        self.reindex();
        self.recompute_mentioned_vars();
        debug!(
            "simplified to {} nodes, {} edges",
            self.node_count(),
            self.edge_count()
        );
    }

    /// Phase 1: constant propagation and gate normalization, bottom-up.
    fn propagate_constants(&mut self, root: NodeId, true_id: NodeId, false_id: NodeId) {
        let mut visited = vec![false; self.node_count()];
        let mut stack = vec![Walk::Enter(root)];
        while let Some(step) = stack.pop() {
            match step {
                Walk::Enter(id) => {
                    if visited[id.index()] {
                        continue;
                    }
                    visited[id.index()] = true;
                    stack.push(Walk::Exit(id));
                    // Reverse push so children are expanded in ascending order.
                    for &child in self.node(id).children().iter().rev() {
                        if !visited[child.index()] {
                            stack.push(Walk::Enter(child));
                        }
                    }
                }
                Walk::Exit(id) => {
                    if self.node(id).is_gate() {
                        self.simplify_gate(id, true_id, false_id);
                    }
                }
            }
        }
    }

    /// Applies the gate rules to a single AND/OR node whose descendants are
    /// already simplified.
    fn simplify_gate(&mut self, id: NodeId, true_id: NodeId, false_id: NodeId) {
        let kind = self.node(id).kind();
        let (absorbing, neutral) = match kind {
            NodeKind::And => (false_id, true_id),
            NodeKind::Or => (true_id, false_id),
            _ => unreachable!(),
        };

        let children: Vec<NodeId> = self.node(id).children().iter().copied().collect();
        if children.contains(&absorbing) {
            // FALSE child of an AND / TRUE child of an OR absorbs the gate.
            self.replace_node(id, absorbing);
            return;
        }
        for &child in &children {
            if child == neutral {
                self.unlink(id, child);
            }
        }
        match self.node(id).children().len() {
            // Every child was the neutral constant.
            0 => {
                self.replace_node(id, neutral);
                return;
            }
            // A gate over a single child is that child.
            1 => {
                let child = *self.node(id).children().iter().next().unwrap();
                self.replace_node(id, child);
                return;
            }
            _ => {}
        }

        // Merge same-kind children into this gate. Only the connecting edge
        // is removed; a child shared with another parent stays alive and a
        // child orphaned here is collected by the unreachable sweep.
        let children: Vec<NodeId> = self.node(id).children().iter().copied().collect();
        for child in children {
            if self.node(child).kind() == kind {
                self.unlink(id, child);
                let grandchildren: Vec<NodeId> =
                    self.node(child).children().iter().copied().collect();
                for grandchild in grandchildren {
                    self.link(id, grandchild);
                }
            }
        }
    }

    /// Redirects every parent of `id` to `target`, detaches `id` from its
    /// children and deletes it. Updates the root when `id` was the root.
    pub(crate) fn replace_node(&mut self, id: NodeId, target: NodeId) {
        debug_assert_ne!(id, target);
        let parents: Vec<NodeId> = self.node(id).parents().iter().copied().collect();
        for parent in parents {
            self.unlink(parent, id);
            self.link(parent, target);
        }
        let children: Vec<NodeId> = self.node(id).children().iter().copied().collect();
        for child in children {
            self.unlink(id, child);
        }
        if self.is_root(id) {
            self.set_root_internal(target);
        }
        self.remove_node(id);
    }

    /// Phase 2: removes every node not reachable from the root.
    ///
    /// Starts from the parentless non-root nodes and walks down: each
    /// deletion may orphan children, which are then deleted in turn. The
    /// root is never enqueued even when a dead subgraph referenced it.
    fn sweep_unreachable(&mut self) {
        let mut queue: VecDeque<NodeId> = self
            .nodes()
            .filter(|(id, node)| node.parents().is_empty() && !self.is_root(*id))
            .map(|(id, _)| id)
            .collect();
        while let Some(id) = queue.pop_front() {
            let children: Vec<NodeId> = self.node(id).children().iter().copied().collect();
            for child in children {
                self.node_mut(child).remove_parent(id);
                if self.node(child).parents().is_empty() && !self.is_root(child) {
                    queue.push_back(child);
                }
            }
            self.node_mut(id).remove_all_children();
            self.remove_node(id);
        }
    }

    /// Phase 3: assigns dense ids `0..n` in postorder from the root, so the
    /// root ends up with the highest id.
    fn reindex(&mut self) {
        let root = match self.root() {
            Some(root) => root,
            None => return,
        };
        let order = self.postorder_from(root);
        let mut remap: Vec<Option<NodeId>> = vec![None; self.node_count()];
        for (new_index, &old) in order.iter().enumerate() {
            remap[old.index()] = Some(NodeId::from_index(new_index));
        }
        let mut slots: Vec<Option<Node>> = Vec::with_capacity(order.len());
        for &old in &order {
            let mut node = match self.take_slot(old) {
                Some(node) => node,
                None => panic!("node {} appeared twice in postorder", old),
            };
            node.remap_ids(&remap);
            slots.push(Some(node));
        }
        self.replace_slots(slots);
        self.remap_tables(&remap);
    }

    /// Postorder over the nodes reachable from `start`, children in
    /// ascending id order before their parents.
    fn postorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_count());
        let mut visited = vec![false; self.node_count()];
        let mut stack = vec![Walk::Enter(start)];
        while let Some(step) = stack.pop() {
            match step {
                Walk::Enter(id) => {
                    if visited[id.index()] {
                        continue;
                    }
                    visited[id.index()] = true;
                    stack.push(Walk::Exit(id));
                    for &child in self.node(id).children().iter().rev() {
                        if !visited[child.index()] {
                            stack.push(Walk::Enter(child));
                        }
                    }
                }
                Walk::Exit(id) => order.push(id),
            }
        }
        order
    }

    /// Returns a deep copy in which every OR has at most two children,
    /// re-indexed to dense postorder ids.
    ///
    /// Wide ORs are rewritten into balanced binary trees: the first two
    /// queued children are replaced by a fresh OR over the pair until two
    /// children remain. The copy is *not* re-simplified, which would merge
    /// the fresh ORs right back into their parents. This is the shape the
    /// strict c2d dialect requires.
    pub fn binarize_ors(&self) -> Ddnnf {
        let mut graph = self.clone();
        let root = match graph.root() {
            Some(root) => root,
            None => return graph,
        };
        for id in graph.postorder_from(root) {
            if graph.node(id).kind() != NodeKind::Or {
                continue;
            }
            let mut queue: VecDeque<NodeId> = graph.node(id).children().iter().copied().collect();
            while queue.len() > 2 {
                let first = queue.pop_front().unwrap();
                let second = queue.pop_front().unwrap();
                graph.unlink(id, first);
                graph.unlink(id, second);
                let or = graph.push_node(NodeKind::Or);
                graph.link(or, first);
                graph.link(or, second);
                graph.link(id, or);
                queue.push_back(or);
            }
        }
        graph.reindex();
        graph.recompute_mentioned_vars();
        graph
    }
}
