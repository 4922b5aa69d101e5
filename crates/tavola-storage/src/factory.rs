//! Storage backend factory

use std::sync::Arc;
use std::time::Duration;

use tavola_core::{PipelineConfig, StorageBackendKind};

use crate::memory::MemoryStorage;
use crate::supabase::SupabaseStorage;
use crate::traits::{ObjectStorage, StorageError, StorageResult};

/// Default base URL of a locally running Supabase stack; used by the memory
/// backend so minted URLs keep the real shape.
const LOCAL_BASE_URL: &str = "http://localhost:54321";

/// Create a storage backend based on configuration
pub fn create_storage(config: &PipelineConfig) -> StorageResult<Arc<dyn ObjectStorage>> {
    match config.storage_backend {
        StorageBackendKind::Supabase => {
            let base_url = config.supabase_url.clone().ok_or_else(|| {
                StorageError::ConfigError("SUPABASE_URL not configured".to_string())
            })?;
            let service_key = config.supabase_service_key.clone().ok_or_else(|| {
                StorageError::ConfigError("SUPABASE_SERVICE_KEY not configured".to_string())
            })?;

            let storage = SupabaseStorage::new(
                base_url,
                service_key,
                Duration::from_secs(config.request_timeout_secs),
            )?;
            Ok(Arc::new(storage))
        }
        StorageBackendKind::Memory => {
            let base_url = config
                .supabase_url
                .clone()
                .unwrap_or_else(|| LOCAL_BASE_URL.to_string());
            Ok(Arc::new(MemoryStorage::new(base_url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supabase_backend_requires_url_and_key() {
        let config = PipelineConfig::default();
        assert!(matches!(
            create_storage(&config),
            Err(StorageError::ConfigError(_))
        ));
    }

    #[test]
    fn memory_backend_needs_no_credentials() {
        let config = PipelineConfig {
            storage_backend: StorageBackendKind::Memory,
            ..PipelineConfig::default()
        };
        let storage = create_storage(&config).unwrap();
        let url = storage.public_url("gallery", "photos/a.png").unwrap();
        assert_eq!(
            url,
            "http://localhost:54321/storage/v1/object/public/gallery/photos/a.png"
        );
    }
}
