//! Error types for environment construction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an environment rebuild or configuration load.
///
/// None of these are recoverable mid-rebuild: a half-built environment is
/// never handed to the caller.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Capacity arithmetic or a bounded copy would exceed the computed size.
    #[error("internal error, overflow while formatting {name}")]
    Overflow { name: String },

    /// Reserving storage for the environment or an entry failed.
    #[error("unable to allocate {requested} slots for {what}")]
    Allocation { what: &'static str, requested: usize },

    /// An entry without a `=` separator or with an empty name.
    #[error("malformed environment entry: {0:?}")]
    MalformedEntry(String),

    /// A variable name that cannot be formatted into an entry.
    #[error("invalid variable name: {0:?}")]
    InvalidName(String),

    /// A pattern that can never match a well-formed entry.
    #[error("invalid pattern: {0:?}")]
    InvalidPattern(String),

    /// An entry containing a NUL byte cannot cross the exec boundary.
    #[error("environment entry for {name} contains an interior NUL byte")]
    InteriorNul { name: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML parse error.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EnvError>;
