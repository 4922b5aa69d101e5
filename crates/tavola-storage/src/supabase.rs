//! Supabase storage backend
//!
//! Talks to the hosted Supabase storage API over HTTP. Writes are upserts
//! so a retried write after a transient failure is safe. Public URLs follow
//! the fixed pattern `{base}/storage/v1/object/public/{bucket}/{path}`.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Response};

use crate::traits::{validate_path, ObjectStorage, StorageError, StorageResult};

/// Characters escaped inside a path segment of an object URL. `/` stays
/// literal because object paths span folders.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'#')
    .add(b'%');

/// How long a positive bucket-existence probe stays valid. Avoids one remote
/// round-trip per write for buckets already seen healthy.
const BUCKET_CACHE_TTL: Duration = Duration::from_secs(60);

/// Supabase storage implementation
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
    known_buckets: RwLock<HashMap<String, Instant>>,
}

impl SupabaseStorage {
    /// Create a new SupabaseStorage instance
    ///
    /// # Arguments
    /// * `base_url` - Project base URL (e.g. "https://xyz.supabase.co")
    /// * `service_key` - Service-role key authorized for storage writes
    /// * `timeout` - Per-request timeout; a hit maps to a retryable failure
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> StorageResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            StorageError::ConfigError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            known_buckets: RwLock::new(HashMap::new()),
        })
    }

    fn object_endpoint(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            utf8_percent_encode(path, PATH_ESCAPES)
        )
    }

    fn map_send_error(op: &str, err: reqwest::Error) -> StorageError {
        if err.is_timeout() {
            StorageError::Timeout(format!("{}: {}", op, err))
        } else {
            StorageError::WriteFailed(format!("{}: connection error: {}", op, err))
        }
    }

    async fn error_for_status(op: &str, response: Response) -> StorageError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        match status {
            404 => StorageError::NotFound(format!("{}: {}", op, body)),
            401 | 403 => StorageError::PermissionDenied(format!("{}: {}", op, body)),
            _ => StorageError::Http {
                status,
                message: format!("{}: {}", op, body),
            },
        }
    }

    fn bucket_cached(&self, bucket: &str) -> bool {
        self.known_buckets
            .read()
            .ok()
            .and_then(|cache| cache.get(bucket).copied())
            .is_some_and(|seen| seen.elapsed() < BUCKET_CACHE_TTL)
    }

    fn cache_bucket(&self, bucket: &str) {
        if let Ok(mut cache) = self.known_buckets.write() {
            cache.insert(bucket.to_string(), Instant::now());
        }
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        validate_path(path)?;
        let url = self.object_endpoint(bucket, path);
        let size = data.len();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await
            .map_err(|e| Self::map_send_error("put", e))?;

        if !response.status().is_success() {
            let err = Self::error_for_status("put", response).await;
            tracing::error!(
                error = %err,
                bucket = %bucket,
                path = %path,
                size = size,
                "Failed to write object"
            );
            return Err(err);
        }

        tracing::debug!(bucket = %bucket, path = %path, size = size, "Object written");
        Ok(())
    }

    async fn remove(&self, bucket: &str, path: &str) -> StorageResult<()> {
        validate_path(path)?;
        let url = self.object_endpoint(bucket, path);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| Self::map_send_error("remove", e))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status("remove", response).await);
        }

        tracing::debug!(bucket = %bucket, path = %path, "Object removed");
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>> {
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, bucket);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({ "prefix": prefix, "limit": 1000 }))
            .send()
            .await
            .map_err(|e| Self::map_send_error("list", e))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status("list", response).await);
        }

        let entries: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StorageError::ListFailed(format!("invalid response: {}", e)))?;

        let names = entries
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("name").and_then(|n| n.as_str()))
                    .map(|name| name.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(names)
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        if self.bucket_cached(bucket) {
            return Ok(true);
        }

        let url = format!("{}/storage/v1/bucket/{}", self.base_url, bucket);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| Self::map_send_error("bucket_exists", e))?;

        if response.status().is_success() {
            self.cache_bucket(bucket);
            return Ok(true);
        }
        if response.status().as_u16() == 404 {
            return Ok(false);
        }
        Err(Self::error_for_status("bucket_exists", response).await)
    }

    fn public_url(&self, bucket: &str, path: &str) -> StorageResult<String> {
        if bucket.is_empty() || path.is_empty() {
            return Err(StorageError::InvalidPath(
                "public URL requires a bucket and a path".to_string(),
            ));
        }
        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            utf8_percent_encode(path, PATH_ESCAPES)
        ))
    }
}
