//! Shared helpers for upload pipeline integration tests

use std::sync::Arc;
use std::time::Duration;

use tavola_catalog::MemoryCatalog;
use tavola_storage::MemoryStorage;
use tavola_upload::{RetryPolicy, UploadService};

pub const BASE_URL: &str = "http://localhost:54321";

/// Millisecond-scale retry policy so retry-path tests stay fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
        backoff_multiplier: 2.0,
    }
}

/// Build a pipeline over in-memory backends, returning the backends for
/// scripting failures and inspecting state.
pub fn setup_pipeline() -> (UploadService, Arc<MemoryStorage>, Arc<MemoryCatalog>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();

    let storage = Arc::new(MemoryStorage::new(BASE_URL));
    let catalog = Arc::new(MemoryCatalog::new());
    let service = UploadService::new(storage.clone(), catalog.clone())
        .with_retry_policy(fast_retry());
    (service, storage, catalog)
}

/// Fake PNG payload of the requested size.
pub fn png_bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size];
    if size >= 8 {
        data[..8].copy_from_slice(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
    data
}
