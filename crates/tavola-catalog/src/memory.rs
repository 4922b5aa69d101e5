//! In-memory catalog backend
//!
//! Process-local catalog for tests and local development. Test code can
//! script failures for upcoming inserts to exercise the pipeline's
//! compensating cleanup.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::traits::{CatalogError, CatalogRecord, CatalogResult, CatalogStore, NewCatalogRecord};

/// In-memory catalog implementation
#[derive(Default)]
pub struct MemoryCatalog {
    rows: Mutex<HashMap<(String, Uuid), CatalogRecord>>,
    insert_failures: Mutex<VecDeque<CatalogError>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a failure for an upcoming `insert`. Failures are consumed in
    /// order before any insert succeeds.
    pub fn fail_next_insert(&self, error: CatalogError) {
        self.insert_failures.lock().unwrap().push_back(error);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn rows_in(&self, table: &str) -> Vec<CatalogRecord> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((t, _), _)| t == table)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn insert(&self, table: &str, record: &NewCatalogRecord) -> CatalogResult<Uuid> {
        if let Some(err) = self.insert_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let id = Uuid::new_v4();
        let row = CatalogRecord {
            id,
            bucket: record.bucket.clone(),
            storage_path: record.storage_path.clone(),
            public_url: record.public_url.clone(),
            file_name: record.file_name.clone(),
            content_type: record.content_type.clone(),
            size_bytes: record.size_bytes,
            metadata: record.metadata.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert((table.to_string(), id), row);
        Ok(id)
    }

    async fn delete(&self, table: &str, id: Uuid) -> CatalogResult<()> {
        self.rows.lock().unwrap().remove(&(table.to_string(), id));
        Ok(())
    }

    async fn select_one(&self, table: &str, id: Uuid) -> CatalogResult<Option<CatalogRecord>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(table.to_string(), id))
            .cloned())
    }
}
