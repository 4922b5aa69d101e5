//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends
//! must implement, and the storage-layer error type.

use async_trait::async_trait;
use bytes::Bytes;
use tavola_core::{classify, ClassifiedError, ErrorSource};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Storage backend returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    fn status(&self) -> Option<u16> {
        match self {
            StorageError::Http { status, .. } => Some(*status),
            StorageError::NotFound(_) => Some(404),
            StorageError::PermissionDenied(_) => Some(403),
            _ => None,
        }
    }

    /// Classify this failure for the pipeline. Timeouts route through the
    /// network bucket; everything else is storage-sourced.
    pub fn to_classified(&self) -> ClassifiedError {
        let source = match self {
            StorageError::Timeout(_) => ErrorSource::Unknown,
            _ => ErrorSource::Storage {
                status: self.status(),
            },
        };
        classify(source, &self.to_string())
    }
}

/// Validate an object path before it reaches a backend. Paths are generated
/// centrally, so anything with traversal sequences or a leading slash is a
/// caller bug.
pub fn validate_path(path: &str) -> StorageResult<()> {
    if path.is_empty() || path.contains("..") || path.starts_with('/') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Object-storage gateway
///
/// All storage backends (Supabase, in-memory) implement this trait. The
/// orchestrator works against it without coupling to a backend.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write an object. Overwrite semantics: writing the same path twice is
    /// allowed, which makes a retried write after a transient failure safe.
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Delete an object. Call sites using this for cleanup treat failures
    /// as best-effort and log them.
    async fn remove(&self, bucket: &str, path: &str) -> StorageResult<()>;

    /// List object paths under a prefix.
    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>>;

    /// Check whether a bucket exists. Callers treat a failing check
    /// optimistically: the subsequent write will fail clearly on its own if
    /// the bucket is truly absent.
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Derive the stable public URL for an object. Pure; fails only when
    /// bucket or path is empty.
    fn public_url(&self, bucket: &str, path: &str) -> StorageResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavola_core::ErrorKind;

    #[test]
    fn not_found_classifies_fatal_storage() {
        let err = StorageError::NotFound("gallery/x.png".to_string()).to_classified();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(!err.retryable);
    }

    #[test]
    fn permission_classifies_fatal_storage() {
        let err = StorageError::PermissionDenied("bucket gallery".to_string()).to_classified();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(!err.retryable);
    }

    #[test]
    fn write_failure_classifies_retryable_storage() {
        let err = StorageError::WriteFailed("backend hiccup".to_string()).to_classified();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(err.retryable);
    }

    #[test]
    fn timeout_classifies_retryable_network() {
        let err = StorageError::Timeout("put gallery/x.png".to_string()).to_classified();
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(err.retryable);
    }

    #[test]
    fn validate_path_rejects_traversal() {
        assert!(validate_path("photos/../secret").is_err());
        assert!(validate_path("/absolute").is_err());
        assert!(validate_path("").is_err());
        assert!(validate_path("photos/dish.png").is_ok());
    }
}
