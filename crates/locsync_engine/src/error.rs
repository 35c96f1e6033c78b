//! Error types for the sync engine.

use locsync_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The engine was configured incorrectly. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Reconciliation was requested with no language selected.
    #[error("no language available to fetch")]
    NoLanguage,

    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The remote answered with something that could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Restoring the persisted snapshot failed.
    #[error("rehydration failed: {0}")]
    Rehydration(String),

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Another reconciliation is already in flight.
    #[error("a sync is already in progress")]
    SyncInProgress,

    /// The rehydration gate has already run.
    #[error("persisted state has already been rehydrated")]
    AlreadyRehydrated,
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if re-invoking reconciliation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::SyncInProgress => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection reset").is_retryable());
        assert!(!SyncError::transport_fatal("401 unauthorized").is_retryable());
        assert!(SyncError::SyncInProgress.is_retryable());
        assert!(!SyncError::Configuration("apiKey missing".into()).is_retryable());
        assert!(!SyncError::NoLanguage.is_retryable());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            SyncError::NoLanguage.to_string(),
            "no language available to fetch"
        );

        let err = SyncError::Storage(StorageError::InvalidKey("a/b".into()));
        assert!(err.to_string().contains("a/b"));
    }
}
