//! Writers for the three output formats.
use std::io::{self, Write};

use ddnnf::{Ddnnf, NodeId, NodeKind};

/// Writes `graph` in the ddnnf dialect: header `nnf N E V`, one node per
/// line in id order, OR nodes of arbitrary fanout.
///
/// The decision variable hint of OR nodes is not tracked by the graph and
/// is always emitted as 0.
pub fn write_nnf(target: &mut impl Write, graph: &Ddnnf) -> io::Result<()> {
    let mut buf = itoa::Buffer::new();
    writeln!(
        target,
        "nnf {} {} {}",
        graph.node_count(),
        graph.edge_count(),
        graph.total_variables()
    )?;
    for (_, node) in graph.nodes() {
        match node.kind() {
            NodeKind::Literal(lit) => {
                target.write_all(b"L ")?;
                target.write_all(buf.format(lit.to_signed()).as_bytes())?;
            }
            // TRUE is an empty conjunction `A 0`
            NodeKind::And | NodeKind::True => {
                target.write_all(b"A ")?;
                target.write_all(buf.format(node.children().len()).as_bytes())?;
                for &child in node.children() {
                    target.write_all(b" ")?;
                    target.write_all(buf.format(child.index()).as_bytes())?;
                }
            }
            // FALSE is an empty disjunction `O 0 0`
            NodeKind::Or | NodeKind::False => {
                target.write_all(b"O 0 ")?;
                target.write_all(buf.format(node.children().len()).as_bytes())?;
                for &child in node.children() {
                    target.write_all(b" ")?;
                    target.write_all(buf.format(child.index()).as_bytes())?;
                }
            }
        }
        target.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes `graph` in the strict c2d dialect.
///
/// Works on a clone whose wide ORs have been rewritten into balanced binary
/// trees; the original graph is left untouched.
pub fn write_c2d(target: &mut impl Write, graph: &Ddnnf) -> io::Result<()> {
    write_nnf(target, &graph.binarize_ors())
}

/// Writes `graph` in the d4 dialect.
///
/// Nodes are emitted in reverse id order so the root receives d4 id 1.
/// Literal nodes are wrapped in a unary OR declaration and contribute a
/// guarded edge to an undeclared true node with id `N + 1`.
pub fn write_d4(target: &mut impl Write, graph: &Ddnnf) -> io::Result<()> {
    let root = match graph.root() {
        Some(root) => root,
        None => return Ok(()),
    };
    // A simplified graph contains a constant only as its root.
    match graph.get_node(root).map(|node| node.kind()) {
        Some(NodeKind::False) => return target.write_all(b"f 1 0\n"),
        Some(NodeKind::True) => return target.write_all(b"t 1 0\n"),
        _ => {}
    }

    let count = graph.node_count();
    let d4_id = |id: NodeId| count - id.index();

    for (id, node) in graph.nodes().rev() {
        match node.kind() {
            NodeKind::And => writeln!(target, "a {} 0", d4_id(id))?,
            NodeKind::Or | NodeKind::Literal(_) => writeln!(target, "o {} 0", d4_id(id))?,
            _ => {}
        }
    }

    let fake_true = count + 1;
    for (id, node) in graph.nodes() {
        if let NodeKind::Literal(lit) = node.kind() {
            writeln!(target, "{} {} {} 0", d4_id(id), fake_true, lit)?;
        } else {
            for &child in node.children() {
                writeln!(target, "{} {} 0", d4_id(id), d4_id(child))?;
            }
        }
    }
    Ok(())
}
