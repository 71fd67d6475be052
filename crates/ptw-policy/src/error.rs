//! Errors raised while building a capability table.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or interpret a capability table.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The table file does not exist.
    #[error("policy file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The table file could not be read.
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The table is not valid YAML or names unknown roles, actions or scopes.
    #[error("failed to parse policy YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// An action name did not match any known action.
    #[error("unknown action {name:?}")]
    UnknownAction { name: String },
}
