//! Catalog abstraction trait and record types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tavola_core::{classify, ClassifiedError, ErrorKind, ErrorSource};
use thiserror::Error;
use uuid::Uuid;

/// Catalog operation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Insert failed: {0}")]
    InsertFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid table name: {0}")]
    InvalidTable(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// Classify this failure for the pipeline. Database faults are
    /// retryable; a bad table name is a configuration bug and is not.
    pub fn to_classified(&self) -> ClassifiedError {
        match self {
            CatalogError::InvalidTable(_) => {
                tracing::error!(error = %self, "Catalog misconfigured");
                ClassifiedError::new(
                    ErrorKind::Database,
                    "The catalog is misconfigured. Please contact an administrator.",
                    false,
                )
            }
            _ => classify(ErrorSource::Database, &self.to_string()),
        }
    }
}

/// Metadata row for an object about to be cataloged. The id and timestamp
/// are assigned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct NewCatalogRecord {
    pub bucket: String,
    pub storage_path: String,
    pub public_url: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Caller-supplied metadata, stored verbatim
    pub metadata: Option<serde_json::Value>,
}

/// A persisted catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogRecord {
    pub id: Uuid,
    pub bucket: String,
    pub storage_path: String,
    pub public_url: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Catalog gateway
///
/// The orchestrator persists and compensates through this trait without
/// coupling to a backend. No transaction spans the catalog and object
/// storage; consistency comes from compensating cleanup.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a row and return its generated id.
    async fn insert(&self, table: &str, record: &NewCatalogRecord) -> CatalogResult<Uuid>;

    /// Delete a row. Cleanup call sites treat failures as best-effort and
    /// log them.
    async fn delete(&self, table: &str, id: Uuid) -> CatalogResult<()>;

    /// Fetch a row by id.
    async fn select_one(&self, table: &str, id: Uuid) -> CatalogResult<Option<CatalogRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_failure_classifies_retryable_database() {
        let err = CatalogError::InsertFailed("pool exhausted".to_string()).to_classified();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(err.retryable);
    }

    #[test]
    fn invalid_table_is_not_retryable() {
        let err = CatalogError::InvalidTable("1bad".to_string()).to_classified();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(!err.retryable);
        assert!(!err.message.contains("1bad"));
    }
}
