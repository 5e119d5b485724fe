//! Conditioning a formula on literal assignments.
//!
//! Conditioning on `v` specializes the formula under the assumption that
//! `v` holds: every occurrence of `v` becomes TRUE, every occurrence of
//! `-v` becomes FALSE, and the result is re-rooted under an AND asserting
//! `v`, so the conditioned formula is `v ∧ (f | v=true)`.
use std::collections::BTreeSet;

use thiserror::Error;

use ddnnf_formula::{Lit, Var};

use crate::graph::Ddnnf;
use crate::node::NodeKind;

/// Errors reported by [`Ddnnf::condition`] and [`Ddnnf::condition_all`].
#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("cannot condition an empty graph")]
    EmptyGraph,
    #[error("literal {0} is outside the declared variable range")]
    OutOfRange(Lit),
    #[error("cannot condition on both {0} and -{0}")]
    Contradiction(Var),
}

impl Ddnnf {
    /// Conditions the formula on a single literal and re-simplifies.
    ///
    /// Conditioning on the same literal twice is a no-op beyond the first
    /// call; conditioning on the negation of an already asserted literal
    /// collapses the formula to FALSE.
    pub fn condition(&mut self, lit: Lit) -> Result<(), ConditionError> {
        if self.root().is_none() {
            return Err(ConditionError::EmptyGraph);
        }
        if lit.index() >= self.total_variables() {
            return Err(ConditionError::OutOfRange(lit));
        }
        let (true_id, false_id) = self.ensure_constants();
        // The asserted literal holds everywhere, its negation nowhere.
        if let Some(id) = self.get_literal_id(lit) {
            self.replace_node(id, true_id);
        }
        if let Some(id) = self.get_literal_id(!lit) {
            self.replace_node(id, false_id);
        }
        // Re-root under an AND asserting the literal itself.
        let lit_id = self.push_node(NodeKind::Literal(lit));
        let and_id = self.push_node(NodeKind::And);
        self.link(and_id, lit_id);
        if let Some(root) = self.root() {
            self.link(and_id, root);
        }
        self.set_root_internal(and_id);
        self.simplify();
        Ok(())
    }

    /// Conditions the formula on a set of literals, one at a time.
    ///
    /// Rejects contradictory sets (both `v` and `-v` asserted) before
    /// touching the graph. Duplicates are harmless here; the conditioning
    /// itself is idempotent per literal.
    pub fn condition_all(&mut self, lits: &[Lit]) -> Result<(), ConditionError> {
        let set: BTreeSet<Lit> = lits.iter().copied().collect();
        for &lit in &set {
            if set.contains(&!lit) {
                return Err(ConditionError::Contradiction(lit.var()));
            }
        }
        for &lit in &set {
            self.condition(lit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddnnf_formula::{lit, lits};

    use crate::node::NodeId;

    /// The S1 graph: `x1 ∨ ¬x1`.
    fn tautology() -> Ddnnf {
        let mut graph = Ddnnf::new();
        graph.prepare_literals(1);
        let l1 = graph.add_node(NodeKind::Literal(lit!(1))).unwrap();
        let n1 = graph.add_node(NodeKind::Literal(lit!(-1))).unwrap();
        let root = graph.add_node(NodeKind::Or).unwrap();
        graph.add_edge(root, l1).unwrap();
        graph.add_edge(root, n1).unwrap();
        graph.set_root(root);
        graph.simplify();
        graph
    }

    #[test]
    fn conditioning_collapses_the_tautology() {
        let mut graph = tautology();
        graph.condition(lit!(1)).unwrap();
        // -1 became FALSE, 1 became TRUE, the OR became TRUE, and the
        // asserting AND spliced down to the plain literal.
        assert_eq!(graph.node_count(), 1);
        let root = graph.get_node(graph.root().unwrap()).unwrap();
        assert_eq!(root.lit(), Some(lit!(1)));
        graph.check_canonical().unwrap();
    }

    #[test]
    fn conditioning_twice_changes_nothing_more() {
        let mut graph = tautology();
        graph.condition(lit!(1)).unwrap();
        let once = graph.clone();
        graph.condition(lit!(1)).unwrap();
        assert_eq!(graph, once);
    }

    #[test]
    fn conditioning_both_signs_in_sequence_yields_false() {
        let mut graph = tautology();
        graph.condition(lit!(1)).unwrap();
        graph.condition(lit!(-1)).unwrap();
        assert_eq!(graph.node_count(), 1);
        let root = graph.get_node(graph.root().unwrap()).unwrap();
        assert_eq!(root.kind(), NodeKind::False);
    }

    #[test]
    fn contradictory_batches_are_rejected_up_front() {
        let mut graph = tautology();
        let before = graph.clone();
        let result = graph.condition_all(&lits![1, -1]);
        assert!(matches!(result, Err(ConditionError::Contradiction(_))));
        assert_eq!(graph, before);
    }

    #[test]
    fn out_of_range_literals_are_rejected() {
        let mut graph = tautology();
        assert!(matches!(
            graph.condition(lit!(2)),
            Err(ConditionError::OutOfRange(_))
        ));
        assert!(matches!(
            Ddnnf::new().condition(lit!(1)),
            Err(ConditionError::EmptyGraph)
        ));
    }

    #[test]
    fn conditioning_commutes_for_disjoint_variables() {
        // (x1 ∧ x2) ∨ (¬x1 ∧ x3)
        fn example() -> Ddnnf {
            let mut graph = Ddnnf::new();
            graph.prepare_literals(3);
            let l1 = graph.add_node(NodeKind::Literal(lit!(1))).unwrap();
            let l2 = graph.add_node(NodeKind::Literal(lit!(2))).unwrap();
            let a1 = graph.add_node(NodeKind::And).unwrap();
            graph.add_edge(a1, l1).unwrap();
            graph.add_edge(a1, l2).unwrap();
            let n1 = graph.add_node(NodeKind::Literal(lit!(-1))).unwrap();
            let l3 = graph.add_node(NodeKind::Literal(lit!(3))).unwrap();
            let a2 = graph.add_node(NodeKind::And).unwrap();
            graph.add_edge(a2, n1).unwrap();
            graph.add_edge(a2, l3).unwrap();
            let root = graph.add_node(NodeKind::Or).unwrap();
            graph.add_edge(root, a1).unwrap();
            graph.add_edge(root, a2).unwrap();
            graph.set_root(root);
            graph.simplify();
            graph
        }

        let mut batched = example();
        batched.condition_all(&lits![-1, 3]).unwrap();

        // Conditioning order must not matter for the resulting function;
        // node ids may differ, the shape may not.
        let mut reversed = example();
        reversed.condition(lit!(3)).unwrap();
        reversed.condition(lit!(-1)).unwrap();

        // S4: the survivor is -1 ∧ 3 either way.
        for graph in [&batched, &reversed] {
            assert_eq!(graph.node_count(), 3);
            let root = graph.get_node(graph.root().unwrap()).unwrap();
            assert_eq!(root.kind(), NodeKind::And);
            let children: Vec<Option<Lit>> = root
                .children()
                .iter()
                .map(|&id| graph.get_node(id).unwrap().lit())
                .collect();
            assert!(children.contains(&Some(lit!(-1))));
            assert!(children.contains(&Some(lit!(3))));
            graph.check_canonical().unwrap();
        }
    }

    #[test]
    fn conditioning_a_literal_root_keeps_the_assertion() {
        let mut graph = Ddnnf::new();
        graph.prepare_literals(2);
        let l1 = graph.add_node(NodeKind::Literal(lit!(1))).unwrap();
        graph.set_root(l1);
        graph.simplify();
        assert_eq!(graph.root(), Some(NodeId::from_index(0)));
        graph.condition(lit!(1)).unwrap();
        let root = graph.get_node(graph.root().unwrap()).unwrap();
        assert_eq!(root.lit(), Some(lit!(1)));
        assert_eq!(graph.node_count(), 1);
    }
}
