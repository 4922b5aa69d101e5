//! Tavola Core Library
//!
//! This crate provides the domain types shared across the Tavola upload
//! pipeline: storage policy resolution, upload validation, error
//! classification, and configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod validation;

// Re-export commonly used types
pub use config::{PipelineConfig, StorageBackendKind};
pub use error::{classify, ClassifiedError, ErrorKind, ErrorSource};
pub use models::{UploadReceipt, UploadRequest, UploadResult};
pub use policy::{resolve, StorageTarget};
