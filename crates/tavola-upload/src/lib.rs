//! Tavola Upload Library
//!
//! The upload orchestrator: composes policy resolution, validation, the
//! storage gateway and the catalog writer into one transaction-like
//! operation with bounded retries and compensating cleanup. The central
//! guarantee: when catalog persistence is requested, a stored object never
//! survives without its catalog row, and a catalog row is never created for
//! an object that failed to write.

pub mod retry;
pub mod service;

// Re-export commonly used types
pub use retry::{with_retry, RetryPolicy};
pub use service::UploadService;
pub use tavola_core::{ClassifiedError, ErrorKind, UploadReceipt, UploadRequest, UploadResult};
