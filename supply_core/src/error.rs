//! Error types for the supply_core library.
//!
//! Store persistence reports [`LoadError`] and [`SaveError`], user-entered
//! values that break a record constraint report [`ValidationError`]. All of
//! them fold into the crate-wide [`Error`].

use std::io;
use std::path::PathBuf;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// A field value that violates a supplement or calculator constraint
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("daily_dose must be greater than zero when auto-decrement is enabled")]
    ZeroDailyDose,

    #[error("{field} must be greater than zero (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("at least one option is required")]
    NoOptions,
}

/// Failure to read a `.sup` file into a store
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unable to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid JSON or a missing required field
    #[error("invalid supplement file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid supplement #{index} in {path:?}: {source}")]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        #[source]
        source: ValidationError,
    },
}

/// Failure to write a store to a `.sup` file
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("unable to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to serialize store for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to replace {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Core error type for supply_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("Invalid value: {0}")]
    Validation(#[from] ValidationError),

    /// No supplement with the given id in the store
    #[error("No supplement with id {0}")]
    NotFound(Uuid),

    #[error("A supplement with id {0} already exists")]
    DuplicateId(Uuid),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
