use std::path::PathBuf;
use thiserror::Error;

/// A settings value outside its allowed range. Nothing is applied when this
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max} minutes, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("theme name must not be empty")]
    EmptyTheme,
}

/// A persisted value that could not be used. Always recovered by falling
/// back to defaults; only ever logged.
#[derive(Debug, Error)]
pub enum StorageReadError {
    #[error("stored value under '{key}' is not valid JSON")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value under '{key}' is out of range")]
    Invalid {
        key: &'static str,
        #[source]
        source: ValidationError,
    },
}

/// Failures opening or writing the on-disk store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create storage directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write storage file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode storage contents")]
    Encode(#[from] serde_json::Error),

    #[error("could not determine a data directory (HOME is not set)")]
    NoDataDir,
}
