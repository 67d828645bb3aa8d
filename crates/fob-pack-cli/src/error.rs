//! Error handling for the fob-pack CLI.
//!
//! `CliError` is what commands return; library and configuration failures
//! convert into it through `#[from]`. `main` turns it into a miette report.

mod report;

use std::path::PathBuf;
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failures of the pack run itself
    #[error("Pack error: {0}")]
    Pack(#[from] fob_pack::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--config` points to a file that doesn't exist
    #[error("Config file not found: {}\n\nHint: Create fob-pack.toml or pass an existing file to --config", .0.display())]
    NotFound(PathBuf),

    /// A layer failed to deserialize, or the merged options are invalid
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
