use core::result::Result as CoreResult;
use std::io::Error as IoError;
use std::path::PathBuf;

use serde_json::Error as JsonError;
use thiserror::Error;

/// Result type for cache operations.
pub type Result<T> = CoreResult<T, CacheError>;

/// Errors raised by the question/answer cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Durable data exists but could not be parsed into entries.
    #[error("Cache file {path} is corrupt: {source}")]
    Corrupt {
        /// Location of the unreadable data
        path: PathBuf,
        /// Parser failure
        #[source]
        source: JsonError,
    },

    /// A threshold or count was outside its allowed range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading or writing the durable copy failed.
    #[error("Cache IO error: {0}")]
    Io(#[from] IoError),

    /// Entries could not be serialized for writing.
    #[error("Cache serialization error: {0}")]
    Serialize(#[from] JsonError),
}

impl CacheError {
    /// Whether the error came from unparseable durable data.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}
