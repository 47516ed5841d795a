//! C++ header frontend: tree-sitter parse, then lowering into a
//! [`HeaderModel`](cxxbind_model::HeaderModel).
//!
//! ```text
//! header text → tree-sitter-cpp → Tree → lower → HeaderModel (+ diagnostics)
//! ```

mod parser;
mod lower;
mod error;

pub use parser::parse;
pub use lower::{lower, Lowered};
pub use error::HeaderError;

use cxxbind_common::SourceFile;
use miette::Result;

/// Parse and lower a header.
pub fn parse_file(source: &SourceFile) -> Result<Lowered> {
    let tree = parser::parse(&source.content)?;
    Ok(lower::lower(&tree, source))
}

/// Like [`parse_file`], but any syntax error fails the header.
pub fn parse_file_strict(source: &SourceFile) -> Result<Lowered> {
    let lowered = parse_file(source)?;
    if let Some(diag) = lowered.first_error() {
        return Err(HeaderError::syntax(source, diag).into());
    }
    Ok(lowered)
}
