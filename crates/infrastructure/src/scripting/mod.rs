//! Script sandbox.
//!
//! Pre-request and post-request scripts are written in a small call-only
//! language. See [`parser`] for the syntax and [`executor`] for the calls a
//! script may make.

pub mod executor;
pub mod parser;

pub use executor::ScriptExecutor;
pub use parser::{ScriptParseError, parse_script};
