//! Upload orchestrator
//!
//! Drives one upload through validate → write → mint URL → catalog insert,
//! rolling back partial side effects on failure. Each invocation owns the
//! lifecycle of a single upload attempt; concurrent invocations share
//! nothing mutable and may run fully in parallel.

use std::sync::Arc;

use tavola_catalog::{CatalogStore, NewCatalogRecord};
use tavola_core::validation::validate;
use tavola_core::{policy, PipelineConfig, UploadReceipt, UploadRequest, UploadResult};
use tavola_storage::{object_path, ObjectStorage};

use crate::retry::{with_retry, RetryPolicy};

const DEFAULT_CATALOG_TABLE: &str = "media_catalog";

/// Upload pipeline service
///
/// Explicitly constructed and dependency-injected; holds no ambient global
/// state, so multiple instances and concurrent test runs do not interfere.
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    catalog: Arc<dyn CatalogStore>,
    retry: RetryPolicy,
    catalog_table: String,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            storage,
            catalog,
            retry: RetryPolicy::default(),
            catalog_table: DEFAULT_CATALOG_TABLE.to_string(),
        }
    }

    /// Wire a service from configuration: the retry budget and default
    /// catalog table come from the config, the backends from the factories.
    pub fn from_config(
        config: &PipelineConfig,
        storage: Arc<dyn ObjectStorage>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        Self::new(storage, catalog)
            .with_retry_policy(RetryPolicy::default().with_max_retries(config.max_retries))
            .with_catalog_table(config.catalog_table.clone())
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_catalog_table(mut self, table: impl Into<String>) -> Self {
        self.catalog_table = table.into();
        self
    }

    /// Run one upload through the pipeline.
    ///
    /// An explicit destination override on the request wins over policy
    /// resolution, but the policy target still supplies the validation
    /// constraints. On failure after the object write, the object is
    /// removed (best-effort) before the error is returned, so a requested
    /// catalog row and its object always exist together or not at all.
    pub async fn upload(&self, request: UploadRequest) -> UploadResult {
        let target = policy::resolve(&request.upload_type);
        validate(&request, &target)?;

        let bucket = request
            .bucket_override
            .clone()
            .unwrap_or_else(|| target.bucket.clone());
        let folder = request
            .folder_override
            .clone()
            .unwrap_or_else(|| target.folder.clone());
        let storage_path = object_path(&folder, &request.file_name)?;

        // A failing or negative check never blocks the write, which will
        // fail clearly on its own if the bucket is absent.
        match self.storage.bucket_exists(&bucket).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(bucket = %bucket, "Bucket not visible before write, proceeding")
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    "Bucket existence check failed, proceeding optimistically"
                );
            }
        }

        let retry = match request.max_retries {
            Some(n) => self.retry.clone().with_max_retries(n),
            None => self.retry.clone(),
        };

        tracing::info!(
            bucket = %bucket,
            path = %storage_path,
            size = request.size_bytes(),
            upload_type = %request.upload_type,
            "Processing upload"
        );

        let put_storage = Arc::clone(&self.storage);
        let put_bucket = bucket.clone();
        let put_path = storage_path.clone();
        let put_content_type = request.content_type.clone();
        let put_data = request.data.clone();
        with_retry(&retry, "storage.put", move || {
            let storage = Arc::clone(&put_storage);
            let bucket = put_bucket.clone();
            let path = put_path.clone();
            let content_type = put_content_type.clone();
            let data = put_data.clone();
            async move {
                storage
                    .put(&bucket, &path, data, &content_type)
                    .await
                    .map_err(|e| e.to_classified())
            }
        })
        .await?;

        let public_url = match self.storage.public_url(&bucket, &storage_path) {
            Ok(url) => url,
            Err(e) => {
                self.remove_object_best_effort(&bucket, &storage_path).await;
                return Err(e.to_classified());
            }
        };

        let mut catalog_id = None;
        if request.save_to_catalog {
            let table = request
                .catalog_table
                .clone()
                .unwrap_or_else(|| self.catalog_table.clone());
            let record = NewCatalogRecord {
                bucket: bucket.clone(),
                storage_path: storage_path.clone(),
                public_url: public_url.clone(),
                file_name: request.file_name.clone(),
                content_type: request.content_type.clone(),
                size_bytes: request.size_bytes() as i64,
                metadata: request.metadata.clone(),
            };

            let insert_catalog = Arc::clone(&self.catalog);
            let insert_table = table.clone();
            let inserted = with_retry(&retry, "catalog.insert", move || {
                let catalog = Arc::clone(&insert_catalog);
                let table = insert_table.clone();
                let record = record.clone();
                async move {
                    catalog
                        .insert(&table, &record)
                        .await
                        .map_err(|e| e.to_classified())
                }
            })
            .await;

            match inserted {
                Ok(id) => catalog_id = Some(id),
                Err(e) => {
                    // The object must never outlive its requested catalog row.
                    self.remove_object_best_effort(&bucket, &storage_path).await;
                    return Err(e);
                }
            }
        }

        tracing::info!(
            bucket = %bucket,
            path = %storage_path,
            catalog_id = ?catalog_id,
            "Upload complete"
        );

        Ok(UploadReceipt {
            public_url,
            bucket,
            storage_path,
            catalog_id,
        })
    }

    /// Upload several files as independent sequential pipeline runs. One
    /// result per input; a failure never rolls back earlier successes.
    pub async fn upload_batch(&self, requests: Vec<UploadRequest>) -> Vec<UploadResult> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.upload(request).await);
        }
        results
    }

    /// Compensating cleanup. Failures are logged and never escalate: they
    /// must not mask the failure that triggered the rollback.
    async fn remove_object_best_effort(&self, bucket: &str, path: &str) {
        match self.storage.remove(bucket, path).await {
            Ok(()) => {
                tracing::info!(bucket = %bucket, path = %path, "Rolled back stored object")
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    path = %path,
                    "Cleanup of stored object failed"
                );
            }
        }
    }
}
