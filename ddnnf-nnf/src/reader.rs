//! Parsers for the three input formats.
use std::io;
use std::str::FromStr;

use anyhow::Error;
use thiserror::Error;

use ddnnf::{Ddnnf, GraphError, NodeId, NodeKind};
use ddnnf_formula::{Lit, Var};

/// Possible errors while parsing an nnf or d4 file.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: expected header \"nnf <nodes> <edges> <vars>\", got \"{header}\"")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: missing token")]
    UnexpectedEnd { line: usize },
    #[error("line {line}: trailing tokens")]
    TrailingTokens { line: usize },
    #[error("line {line}: invalid integer token \"{token}\"")]
    InvalidInt { line: usize, token: String },
    #[error("line {line}: unknown node kind \"{kind}\"")]
    UnknownNodeKind { line: usize, kind: String },
    #[error("line {line}: literal 0 is not allowed")]
    ZeroLiteral { line: usize },
    #[error("line {line}: literal {literal} is out of range")]
    LiteralOutOfRange { line: usize, literal: isize },
    #[error("line {line}: child {child} of node {node} is not an earlier node")]
    ForwardReference {
        line: usize,
        child: usize,
        node: usize,
    },
    #[error("line {line}: strict c2d or node with {count} children")]
    StrictOrFanout { line: usize, count: usize },
    #[error("line {line}: node declared after the first edge")]
    NodeAfterEdges { line: usize },
    #[error("line {line}: edge endpoint {id} is out of range")]
    EdgeOutOfRange { line: usize, id: isize },
    #[error("line {line}: edge from node {id} to itself")]
    SelfEdge { line: usize, id: isize },
    #[error("line {line}: unterminated edge")]
    UnterminatedEdge { line: usize },
    #[error("line {line}: {source}")]
    Graph { line: usize, source: GraphError },
    #[error("input defines no nodes")]
    NoNodes,
    #[error("no root node found")]
    NoRoot,
}

fn int<T: FromStr>(line: usize, token: Option<&str>) -> Result<T, ParserError> {
    let token = token.ok_or(ParserError::UnexpectedEnd { line })?;
    token.parse().map_err(|_| ParserError::InvalidInt {
        line,
        token: token.to_owned(),
    })
}

fn end_of_line<'a>(
    line: usize,
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<(), ParserError> {
    if tokens.next().is_some() {
        return Err(ParserError::TrailingTokens { line });
    }
    Ok(())
}

fn graph_err(line: usize) -> impl FnOnce(GraphError) -> ParserError {
    move |source| ParserError::Graph { line, source }
}

/// Parses the c2d `nnf` syntax.
///
/// In `strict` mode (the "c2d" format) every non-constant OR node must have
/// exactly two children; the permissive mode (the "ddnnf" format) accepts
/// any fanout. The last non-constant node becomes the root and the graph is
/// simplified before it is returned.
pub fn read_nnf(input: impl io::Read, strict: bool) -> Result<Ddnnf, Error> {
    use io::BufRead;

    let mut graph = Ddnnf::new();
    let mut header_seen = false;
    let mut last_node = None;
    let mut last_nonconstant = None;

    for (index, line) in io::BufReader::new(input).lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();
        let first = match tokens.next() {
            Some(token) => token,
            None => continue,
        };

        if !header_seen {
            if first != "nnf" {
                return Err(ParserError::InvalidHeader {
                    line: line_no,
                    header: line.clone(),
                }
                .into());
            }
            let _nodes: usize = int(line_no, tokens.next())?;
            let _edges: usize = int(line_no, tokens.next())?;
            let vars: usize = int(line_no, tokens.next())?;
            end_of_line(line_no, &mut tokens)?;
            graph.prepare_literals(vars);
            header_seen = true;
            continue;
        }

        let (id, constant) = match first {
            "L" => {
                let number: isize = int(line_no, tokens.next())?;
                if number == 0 {
                    return Err(ParserError::ZeroLiteral { line: line_no }.into());
                }
                if number.unsigned_abs() > graph.total_variables() {
                    return Err(ParserError::LiteralOutOfRange {
                        line: line_no,
                        literal: number,
                    }
                    .into());
                }
                let id = graph
                    .add_node(NodeKind::Literal(Lit::from_signed(number)))
                    .map_err(graph_err(line_no))?;
                (id, false)
            }
            "A" => {
                let count: usize = int(line_no, tokens.next())?;
                if count == 0 {
                    // `A 0` denotes TRUE
                    let id = graph.add_node(NodeKind::True).map_err(graph_err(line_no))?;
                    (id, true)
                } else {
                    let id = graph.add_node(NodeKind::And).map_err(graph_err(line_no))?;
                    read_children(&mut graph, id, count, line_no, &mut tokens)?;
                    (id, false)
                }
            }
            "O" => {
                // The first field is a decision variable hint; read and ignore.
                let _hint: isize = int(line_no, tokens.next())?;
                let count: usize = int(line_no, tokens.next())?;
                if count == 0 {
                    // `O j 0` denotes FALSE
                    let id = graph
                        .add_node(NodeKind::False)
                        .map_err(graph_err(line_no))?;
                    (id, true)
                } else {
                    if strict && count != 2 {
                        return Err(ParserError::StrictOrFanout {
                            line: line_no,
                            count,
                        }
                        .into());
                    }
                    let id = graph.add_node(NodeKind::Or).map_err(graph_err(line_no))?;
                    read_children(&mut graph, id, count, line_no, &mut tokens)?;
                    (id, false)
                }
            }
            _ => {
                return Err(ParserError::UnknownNodeKind {
                    line: line_no,
                    kind: first.to_owned(),
                }
                .into())
            }
        };
        end_of_line(line_no, &mut tokens)?;
        last_node = Some(id);
        if !constant {
            last_nonconstant = Some(id);
        }
    }

    let root = last_nonconstant.or(last_node).ok_or(ParserError::NoNodes)?;
    graph.set_root(root);
    graph.simplify();
    Ok(graph)
}

/// Reads `count` child references of `id`, which must all name earlier
/// nodes.
fn read_children<'a>(
    graph: &mut Ddnnf,
    id: NodeId,
    count: usize,
    line_no: usize,
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<(), ParserError> {
    for _ in 0..count {
        let child: usize = int(line_no, tokens.next())?;
        if child >= id.index() {
            return Err(ParserError::ForwardReference {
                line: line_no,
                child,
                node: id.index(),
            });
        }
        graph
            .add_edge(id, NodeId::from_index(child))
            .map_err(graph_err(line_no))?;
    }
    Ok(())
}

/// Parses the d4 output syntax.
///
/// Node lines (`a`/`o`/`t`/`f`, trailing tokens ignored) assign d4 ids
/// starting at 1; the following edge lines `src dst [lit...] 0` may carry
/// literals, which become an intermediate AND over the destination and the
/// literal nodes. The root is the lowest-id node without parents. The graph
/// is simplified before it is returned.
pub fn read_d4(input: impl io::Read) -> Result<Ddnnf, Error> {
    use io::BufRead;

    let mut graph = Ddnnf::new();
    // Ghost slot so that graph ids align with the 1-based d4 ids; the
    // simplifier sweeps it.
    graph.add_node(NodeKind::And)?;
    let mut declared = 0usize;
    let mut in_edges = false;

    for (index, line) in io::BufReader::new(input).lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();
        let first = match tokens.next() {
            Some(token) => token,
            None => continue,
        };

        match first {
            "a" | "o" | "t" | "f" => {
                if in_edges {
                    return Err(ParserError::NodeAfterEdges { line: line_no }.into());
                }
                let kind = match first {
                    "a" => NodeKind::And,
                    "o" => NodeKind::Or,
                    "t" => NodeKind::True,
                    _ => NodeKind::False,
                };
                graph.add_node(kind).map_err(graph_err(line_no))?;
                declared += 1;
                // d4 node lines carry an index and a terminating 0; ignored.
            }
            _ if first.starts_with(|c: char| c.is_ascii_digit() || c == '-') => {
                in_edges = true;
                let src: isize = int(line_no, Some(first))?;
                let dst: isize = int(line_no, tokens.next())?;
                for endpoint in [src, dst] {
                    if endpoint < 1 || endpoint as usize > declared {
                        return Err(ParserError::EdgeOutOfRange {
                            line: line_no,
                            id: endpoint,
                        }
                        .into());
                    }
                }
                if src == dst {
                    return Err(ParserError::SelfEdge {
                        line: line_no,
                        id: src,
                    }
                    .into());
                }
                let src = NodeId::from_index(src as usize);
                let dst = NodeId::from_index(dst as usize);

                let mut edge_lits = Vec::new();
                let mut terminated = false;
                for token in tokens.by_ref() {
                    let number: isize = int(line_no, Some(token))?;
                    if number == 0 {
                        terminated = true;
                        break;
                    }
                    if number.unsigned_abs() > Var::MAX_COUNT {
                        return Err(ParserError::LiteralOutOfRange {
                            line: line_no,
                            literal: number,
                        }
                        .into());
                    }
                    let lit = Lit::from_signed(number);
                    graph.prepare_literals(lit.index() + 1);
                    let lit_id = match graph.get_literal_id(lit) {
                        Some(id) => id,
                        None => graph
                            .add_node(NodeKind::Literal(lit))
                            .map_err(graph_err(line_no))?,
                    };
                    edge_lits.push(lit_id);
                }
                if !terminated {
                    return Err(ParserError::UnterminatedEdge { line: line_no }.into());
                }

                if edge_lits.is_empty() {
                    graph.add_edge(src, dst).map_err(graph_err(line_no))?;
                } else {
                    // The literals guard the edge: src -> AND(dst, lits...)
                    let and_id = graph.add_node(NodeKind::And)?;
                    graph.add_edge(src, and_id).map_err(graph_err(line_no))?;
                    graph.add_edge(and_id, dst).map_err(graph_err(line_no))?;
                    for lit_id in edge_lits {
                        graph.add_edge(and_id, lit_id).map_err(graph_err(line_no))?;
                    }
                }
            }
            _ => {
                return Err(ParserError::UnknownNodeKind {
                    line: line_no,
                    kind: first.to_owned(),
                }
                .into())
            }
        }
    }

    if declared == 0 {
        return Err(ParserError::NoNodes.into());
    }
    let root = (1..=declared)
        .map(NodeId::from_index)
        .find(|&id| match graph.get_node(id) {
            Some(node) => node.parents().is_empty(),
            None => false,
        })
        .ok_or(ParserError::NoRoot)?;
    graph.set_root(root);
    graph.simplify();
    Ok(graph)
}
