//! File format support for the ddnnf toolkit.
//!
//! Three textual formats share the graph engine:
//!
//! - **ddnnf**: the c2d `nnf` syntax with OR nodes of arbitrary fanout.
//! - **c2d**: the strict c2d syntax, where every non-constant OR node has
//!   exactly two children.
//! - **d4**: the d4 compiler's output syntax, where nodes are declared by
//!   single-letter lines and edges may carry literals.
//!
//! Every reader hands the parsed graph to the simplifier before returning,
//! so loaded graphs are always in canonical form.

use std::io;

use anyhow::Error;

use ddnnf::Ddnnf;

mod reader;
mod writer;

pub use reader::{read_d4, read_nnf, ParserError};
pub use writer::{write_c2d, write_d4, write_nnf};

/// The three on-disk formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    Ddnnf,
    C2d,
    D4,
}

impl Format {
    /// Parses a graph from `input` in this format.
    pub fn read(self, input: impl io::Read) -> Result<Ddnnf, Error> {
        match self {
            Format::Ddnnf => read_nnf(input, false),
            Format::C2d => read_nnf(input, true),
            Format::D4 => read_d4(input),
        }
    }

    /// Writes `graph` to `target` in this format.
    pub fn write(self, target: &mut impl io::Write, graph: &Ddnnf) -> io::Result<()> {
        match self {
            Format::Ddnnf => write_nnf(target, graph),
            Format::C2d => write_c2d(target, graph),
            Format::D4 => write_d4(target, graph),
        }
    }
}
