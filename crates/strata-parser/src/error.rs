use std::path::PathBuf;

use strata_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Parse error in '{input}' at offset {position}: {message}")]
    Parse {
        input: String,
        position: usize,
        message: String,
    },

    #[error("Invalid source {path}: {message}")]
    InvalidSource { path: PathBuf, message: String },

    #[error("Component '{name}' declared in both {first} and {second}")]
    DuplicateComponent {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Property '{property}' declared twice in component '{component}'")]
    DuplicateProperty { component: String, property: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Entry source not found: {0}")]
    EntryNotFound(PathBuf),

    #[error("Entry '{entry}' matches both {first} and {second}")]
    AmbiguousEntry {
        entry: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
