//! Bundle parsing.
//!
//! This module handles:
//! - Parsing bundle source into an oxc AST
//! - Locating the top-level bootstrap call
//! - Regex pre-screening of the bootstrap format

pub mod ast_parser;
pub mod webpack;

pub use ast_parser::{find_bootstrap_call, parse_program};
pub use webpack::WebpackSniffer;
