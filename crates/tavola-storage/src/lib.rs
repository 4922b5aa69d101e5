//! Tavola Storage Library
//!
//! Object-storage gateway for the upload pipeline: the [`ObjectStorage`]
//! trait plus backends for hosted Supabase storage and an in-memory store.
//!
//! # Object paths
//!
//! Object paths are `{folder}/{sanitized stem}-{timestamp}-{suffix}.{ext}`
//! and are generated centrally in the `paths` module so every upload lands
//! at a unique, collision-free location. Paths must not contain `..` or a
//! leading `/`.

pub mod factory;
pub mod memory;
pub mod paths;
pub mod supabase;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use memory::MemoryStorage;
pub use paths::object_path;
pub use supabase::SupabaseStorage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
