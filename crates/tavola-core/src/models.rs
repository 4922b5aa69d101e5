//! Domain models for the upload pipeline

use bytes::Bytes;
use uuid::Uuid;

use crate::error::ClassifiedError;

/// Immutable input to one upload attempt. Created by the caller, consumed
/// once by the orchestrator.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw file bytes
    pub data: Bytes,
    /// Original filename as supplied by the caller
    pub file_name: String,
    /// Declared MIME type
    pub content_type: String,
    /// Upload-type tag selecting the storage policy (e.g. "gallery", "logo")
    pub upload_type: String,
    /// Explicit bucket, bypassing policy resolution for the destination
    pub bucket_override: Option<String>,
    /// Explicit folder prefix, bypassing policy resolution for the destination
    pub folder_override: Option<String>,
    /// Whether to persist a catalog row for the stored object
    pub save_to_catalog: bool,
    /// Catalog table receiving the row; `None` uses the configured default
    pub catalog_table: Option<String>,
    /// Caller-supplied metadata forwarded verbatim into the catalog row
    pub metadata: Option<serde_json::Value>,
    /// Per-request override of the retry budget
    pub max_retries: Option<u32>,
}

impl UploadRequest {
    pub fn new(
        data: impl Into<Bytes>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        upload_type: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            upload_type: upload_type.into(),
            bucket_override: None,
            folder_override: None,
            save_to_catalog: true,
            catalog_table: None,
            metadata: None,
            max_retries: None,
        }
    }

    /// Send the object to an explicit bucket/folder instead of the policy
    /// destination. The policy target still supplies the validation
    /// constraints.
    pub fn with_destination(
        mut self,
        bucket: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        self.bucket_override = Some(bucket.into());
        self.folder_override = Some(folder.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_catalog_table(mut self, table: impl Into<String>) -> Self {
        self.catalog_table = Some(table.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Skip catalog persistence entirely; the upload ends after URL minting.
    pub fn without_catalog(mut self) -> Self {
        self.save_to_catalog = false;
        self
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Successful outcome of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Stable public URL, immediately usable for display
    pub public_url: String,
    /// Bucket the object was written to
    pub bucket: String,
    /// Object path within the bucket
    pub storage_path: String,
    /// Catalog row id, present when persistence was requested
    pub catalog_id: Option<Uuid>,
}

/// Outcome of one upload attempt: exactly one of receipt or classified error,
/// by construction.
pub type UploadResult = Result<UploadReceipt, ClassifiedError>;
