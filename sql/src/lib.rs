//! SQL parser for the restricted dialect of §4.5.
//!
//! Produces a `Command` the executor (`engine`) type-checks and runs
//! against live table metadata; this crate knows nothing about callbacks,
//! row storage, or the wire protocol.

pub mod ast;
pub mod parser;

pub use ast::{Assignment, Command, CommandKind, Literal, Projection, WhereTerm, DEFAULT_LIMIT, DEFAULT_OFFSET};
pub use parser::parse;
