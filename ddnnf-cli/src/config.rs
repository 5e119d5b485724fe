//! Command line parsing.
//!
//! The option surface is fixed: multi-character single-dash flags select
//! the input and output formats, and `-c` swallows signed integers up to
//! the next token that looks like a flag. That grammar does not fit a
//! declarative argument parser, so it is handled by hand here.
use std::path::PathBuf;

use thiserror::Error;

use ddnnf_formula::{Lit, Var};
use ddnnf_nnf::Format;

pub const USAGE: &str = "\
usage: ddnnf -i[_c2d|_d4] <input> [options]

  -h, --help        print this help and exit
  -i <file>         read <file> in the ddnnf format (wide OR nodes allowed)
  -i_c2d <file>     read <file> in the strict c2d format
  -i_d4 <file>      read <file> in the d4 format
  -o <file>         write the result to <file> in the ddnnf format
  -o_c2d <file>     write the result to <file> in the strict c2d format
  -o_d4 <file>      write the result to <file> in the d4 format
  -c l1 l2 ... lk   condition on the given nonzero literals

Exactly one input is required; at most one output may be given.
";

/// Errors for invalid command lines.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("unknown option \"{0}\"")]
    UnknownOption(String),
    #[error("missing file argument for {0}")]
    MissingFileArg(&'static str),
    #[error("multiple input files given")]
    MultipleInputs,
    #[error("multiple output files given")]
    MultipleOutputs,
    #[error("no input file given")]
    NoInput,
    #[error("missing conditioning literals after -c")]
    MissingConditionLiterals,
    #[error("invalid conditioning literal \"{0}\"")]
    InvalidLiteral(String),
    #[error("cannot condition on 0")]
    ZeroLiteral,
    #[error("duplicate conditioning literal {0}")]
    DuplicateLiteral(isize),
    #[error("conditioning on both {0} and {1}")]
    ContradictoryLiterals(isize, isize),
}

/// A parsed command line.
#[derive(Debug)]
pub enum Command {
    /// `-h`/`--help`: print usage and exit successfully.
    Help,
    Run(Config),
}

#[derive(Debug)]
pub struct Config {
    pub input: PathBuf,
    pub input_format: Format,
    pub output: Option<(PathBuf, Format)>,
    pub conditions: Vec<Lit>,
}

/// Whether a token ends a `-c` literal list: `-` followed by a letter, so
/// negative literals pass through.
fn is_flag_like(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('-') && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
}

/// Parses the arguments following the program name.
pub fn parse_args(args: impl Iterator<Item = String>) -> Result<Command, UsageError> {
    let mut input = None;
    let mut output = None;
    let mut conditions: Vec<Lit> = Vec::new();
    let mut args = args.peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-i" | "-i_c2d" | "-i_d4" => {
                if input.is_some() {
                    return Err(UsageError::MultipleInputs);
                }
                let (name, format) = match arg.as_str() {
                    "-i" => ("-i", Format::Ddnnf),
                    "-i_c2d" => ("-i_c2d", Format::C2d),
                    _ => ("-i_d4", Format::D4),
                };
                let file = args.next().ok_or(UsageError::MissingFileArg(name))?;
                input = Some((PathBuf::from(file), format));
            }
            "-o" | "-o_c2d" | "-o_d4" => {
                if output.is_some() {
                    return Err(UsageError::MultipleOutputs);
                }
                let (name, format) = match arg.as_str() {
                    "-o" => ("-o", Format::Ddnnf),
                    "-o_c2d" => ("-o_c2d", Format::C2d),
                    _ => ("-o_d4", Format::D4),
                };
                let file = args.next().ok_or(UsageError::MissingFileArg(name))?;
                output = Some((PathBuf::from(file), format));
            }
            "-c" => {
                if args.peek().is_none() {
                    return Err(UsageError::MissingConditionLiterals);
                }
                while let Some(token) = args.next_if(|token| !is_flag_like(token)) {
                    let number: isize = token
                        .parse()
                        .map_err(|_| UsageError::InvalidLiteral(token.clone()))?;
                    if number == 0 {
                        return Err(UsageError::ZeroLiteral);
                    }
                    if number.unsigned_abs() > Var::MAX_COUNT {
                        return Err(UsageError::InvalidLiteral(token));
                    }
                    let lit = Lit::from_signed(number);
                    if conditions.contains(&lit) {
                        return Err(UsageError::DuplicateLiteral(number));
                    }
                    if conditions.contains(&!lit) {
                        return Err(UsageError::ContradictoryLiterals(-number, number));
                    }
                    conditions.push(lit);
                }
            }
            _ => return Err(UsageError::UnknownOption(arg)),
        }
    }

    let (input, input_format) = input.ok_or(UsageError::NoInput)?;
    Ok(Command::Run(Config {
        input,
        input_format,
        output,
        conditions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, UsageError> {
        parse_args(args.iter().map(|arg| arg.to_string()))
    }

    fn config(args: &[&str]) -> Config {
        match parse(args).unwrap() {
            Command::Run(config) => config,
            Command::Help => panic!("unexpected help command"),
        }
    }

    #[test]
    fn input_format_selection() {
        assert_eq!(config(&["-i", "a.nnf"]).input_format, Format::Ddnnf);
        assert_eq!(config(&["-i_c2d", "a.nnf"]).input_format, Format::C2d);
        assert_eq!(config(&["-i_d4", "a.nnf"]).input_format, Format::D4);
        assert_eq!(config(&["-i", "a.nnf"]).input, PathBuf::from("a.nnf"));
    }

    #[test]
    fn output_is_optional() {
        assert!(config(&["-i", "a.nnf"]).output.is_none());
        let config = config(&["-i", "a.nnf", "-o_d4", "b.nnf"]);
        assert_eq!(config.output, Some((PathBuf::from("b.nnf"), Format::D4)));
    }

    #[test]
    fn help_wins() {
        assert!(matches!(parse(&["-h"]), Ok(Command::Help)));
        assert!(matches!(parse(&["--help"]), Ok(Command::Help)));
        assert!(matches!(parse(&["-i", "a.nnf", "-h"]), Ok(Command::Help)));
    }

    #[test]
    fn conditioning_literals_stop_at_flags() {
        let config = config(&["-i", "a.nnf", "-c", "1", "-2", "3", "-o", "b.nnf"]);
        let numbers: Vec<isize> = config.conditions.iter().map(|l| l.to_signed()).collect();
        assert_eq!(numbers, [1, -2, 3]);
        assert!(config.output.is_some());
    }

    #[test]
    fn conditioning_rejects_bad_literals() {
        assert!(matches!(
            parse(&["-i", "a.nnf", "-c"]),
            Err(UsageError::MissingConditionLiterals)
        ));
        assert!(matches!(
            parse(&["-i", "a.nnf", "-c", "0"]),
            Err(UsageError::ZeroLiteral)
        ));
        assert!(matches!(
            parse(&["-i", "a.nnf", "-c", "x"]),
            Err(UsageError::InvalidLiteral(_))
        ));
        assert!(matches!(
            parse(&["-i", "a.nnf", "-c", "1", "1"]),
            Err(UsageError::DuplicateLiteral(1))
        ));
        assert!(matches!(
            parse(&["-i", "a.nnf", "-c", "1", "-1"]),
            Err(UsageError::ContradictoryLiterals(1, -1))
        ));
    }

    #[test]
    fn option_conflicts_are_rejected() {
        assert!(matches!(parse(&[]), Err(UsageError::NoInput)));
        assert!(matches!(
            parse(&["-i", "a.nnf", "-i_d4", "b.nnf"]),
            Err(UsageError::MultipleInputs)
        ));
        assert!(matches!(
            parse(&["-i", "a.nnf", "-o", "b.nnf", "-o_c2d", "c.nnf"]),
            Err(UsageError::MultipleOutputs)
        ));
        assert!(matches!(
            parse(&["-i"]),
            Err(UsageError::MissingFileArg("-i"))
        ));
        assert!(matches!(
            parse(&["--frobnicate"]),
            Err(UsageError::UnknownOption(_))
        ));
        assert!(matches!(
            parse(&["-i", "a.nnf", "stray"]),
            Err(UsageError::UnknownOption(_))
        ));
    }
}
