//! In-memory representation of d-DNNF formulas.
//!
//! A d-DNNF is a rooted DAG whose internal nodes are AND/OR gates and whose
//! leaves are literals or boolean constants. The [`Ddnnf`] graph store owns
//! the nodes and keeps the parent and child adjacency as exact converses.
//! After every load and every [conditioning](Ddnnf::condition) step the
//! [simplifier](Ddnnf::simplify) restores canonical form: constants are
//! propagated, trivial and same-kind gates are absorbed, unreachable
//! subgraphs are removed and node ids are re-assigned densely in postorder,
//! so that the root always has the highest id.

pub mod condition;
pub mod graph;
pub mod node;

mod simplify;

#[cfg(any(test, feature = "internal-testing"))]
pub mod check;

pub use condition::ConditionError;
pub use graph::{Ddnnf, GraphError};
pub use node::{Node, NodeId, NodeKind};
