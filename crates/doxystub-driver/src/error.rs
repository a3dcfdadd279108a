//! Error types for doxystub-driver.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur while running a batch.
#[derive(Error, Diagnostic, Debug)]
pub enum DriverError {
    /// Failed to read an input or configuration file.
    #[error("Failed to read {}: {source}", path.display())]
    #[diagnostic(code(doxystub::read))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write an output file.
    #[error("Failed to write {}: {source}", path.display())]
    #[diagnostic(code(doxystub::write))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse a declaration export.
    #[error("Failed to parse declarations in {}: {source}", path.display())]
    #[diagnostic(code(doxystub::parse_input))]
    ParseInput {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    #[diagnostic(code(doxystub::parse_config))]
    ParseToml(#[from] toml::de::Error),

    /// The formatter could not be started.
    #[error("Failed to run `{command}`: {source}")]
    #[diagnostic(code(doxystub::spawn))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The formatter ran and reported failure.
    #[error("Formatter `{command}` failed with {status}")]
    #[diagnostic(code(doxystub::format), help("{stderr}"))]
    Format {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// No top-level entity with the requested name.
    #[error("No unit named '{0}' in this batch")]
    #[diagnostic(code(doxystub::unit_not_found))]
    UnitNotFound(String),

    /// A fatal condition of the translation itself.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] doxystub_core::CoreError),
}
