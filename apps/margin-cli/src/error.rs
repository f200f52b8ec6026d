//! Error types for the margin CLI.
//!
//! Per-SKU calculation failures are not errors at this level: they are
//! recorded in the batch report and the run continues. These variants abort
//! the whole run.

use crate::config::ConfigError;

/// CLI errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
