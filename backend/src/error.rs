use std::io;
use std::path::{Path, PathBuf};

/// Errors raised by the account and child stores
///
/// A malformed line found while loading is not an error: it is logged,
/// counted in the store's `LoadReport` and dropped.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A backing file or directory could not be created while initialising a store
    #[error("Unable to initialise {}: {source}", .path.display())]
    Configuration { path: PathBuf, source: io::Error },

    #[error("I/O failure on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{kind} '{key}' already exists")]
    DuplicateEntity { kind: &'static str, key: String },

    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },

    #[error("Hash algorithm '{0}' is unavailable")]
    HashUnavailable(String),

    /// The name cannot be used as a single path segment
    #[error("'{0}' is not a usable name")]
    InvalidName(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn configuration(path: &Path, source: io::Error) -> Self {
        StoreError::Configuration {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
