//! Error types for the adapter.

use thiserror::Error;

/// Failure reported by the external query executor.
///
/// Carries the executor's own message; the adapter never retries and adds
/// no interpretation of its own.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExecuteError {
    /// The underlying executor's message.
    pub message: String,
}

impl ExecuteError {
    /// Creates an execute error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Adapter-level errors.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The external executor reported failure.
    #[error("execute failed: {0}")]
    Execute(#[from] ExecuteError),

    /// The named model is not in the registry.
    #[error("model not registered: {0}")]
    UnknownModel(String),

    /// An INSERT ... RETURNING id produced no id.
    #[error("insert returned no id")]
    MissingReturnedId,

    /// updateOrCreate was called on a record without an id value.
    #[error("update-or-create requires an id field on the record")]
    MissingRecordId,
}

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
