//! Component sources and type expression parsing for strata

pub mod error;
pub mod source;
pub mod type_expr;

use std::path::Path;

use strata_core::{Program, ProgramBuilder};

pub use error::ParserError;
pub use source::{ComponentSource, SourceFile, SourceSet};
pub use type_expr::parse_type_expression;

/// Build the program for the components declared in `entry`
pub fn compile(sources: &SourceSet, entry: impl AsRef<Path>) -> Result<Program, ParserError> {
    let entry_names = sources.entry_names(entry)?;
    Ok(ProgramBuilder::new(sources).build(entry_names)?)
}
