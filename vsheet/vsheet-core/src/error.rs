//! Error types raised by the document and recent-pointer stores.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by the stores. Translating these into transport-level
/// responses is left to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document is stored under the id
    #[error("document {0} not found")]
    NotFound(String),

    /// The stored bytes exist but are not a valid document
    #[error("document {id} is corrupt: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key cannot be used as a storage name
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a record failed
    #[error("serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
