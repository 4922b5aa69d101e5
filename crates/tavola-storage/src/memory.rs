//! In-memory storage backend
//!
//! Holds objects in a process-local map. Serves local development and tests;
//! test code can script failures for upcoming operations to exercise the
//! pipeline's retry and cleanup behavior.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::traits::{validate_path, ObjectStorage, StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// In-memory storage implementation
#[derive(Default)]
pub struct MemoryStorage {
    base_url: String,
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    put_failures: Mutex<VecDeque<StorageError>>,
    remove_failures: Mutex<VecDeque<StorageError>>,
}

impl MemoryStorage {
    /// Create a new MemoryStorage instance
    ///
    /// # Arguments
    /// * `base_url` - Base URL used when minting public URLs
    ///   (e.g. "http://localhost:54321")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Script a failure for an upcoming `put`. Failures are consumed in
    /// order before any write succeeds.
    pub fn fail_next_put(&self, error: StorageError) {
        self.put_failures.lock().unwrap().push_back(error);
    }

    /// Script a failure for an upcoming `remove`.
    pub fn fail_next_remove(&self, error: StorageError) {
        self.remove_failures.lock().unwrap().push_back(error);
    }

    pub fn contains(&self, bucket: &str, path: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), path.to_string()))
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        validate_path(path)?;
        if let Some(err) = self.put_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), path.to_string()),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn remove(&self, bucket: &str, path: &str) -> StorageResult<()> {
        validate_path(path)?;
        if let Some(err) = self.remove_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let removed = self
            .objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), path.to_string()));
        if removed.is_none() {
            return Err(StorageError::NotFound(format!("{}/{}", bucket, path)));
        }
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>> {
        let objects = self.objects.lock().unwrap();
        let mut names: Vec<String> = objects
            .keys()
            .filter(|(b, p)| b == bucket && p.starts_with(prefix))
            .map(|(_, p)| p.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn bucket_exists(&self, _bucket: &str) -> StorageResult<bool> {
        // Buckets materialize on first write
        Ok(true)
    }

    fn public_url(&self, bucket: &str, path: &str) -> StorageResult<String> {
        if bucket.is_empty() || path.is_empty() {
            return Err(StorageError::InvalidPath(
                "public URL requires a bucket and a path".to_string(),
            ));
        }
        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        ))
    }
}
