//! Configuration module
//!
//! Env-driven configuration for the upload pipeline with documented
//! defaults. The pipeline itself is dependency-injected; this struct only
//! carries what the backend factories need.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_CATALOG_TABLE: &str = "media_catalog";

/// Available object-storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    /// Hosted Supabase storage over HTTP
    Supabase,
    /// In-process map; for tests and local development
    Memory,
}

impl FromStr for StorageBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supabase" => Ok(StorageBackendKind::Supabase),
            "memory" => Ok(StorageBackendKind::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackendKind::Supabase => write!(f, "supabase"),
            StorageBackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// Pipeline configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub storage_backend: StorageBackendKind,
    /// Base URL of the Supabase project (e.g. "https://xyz.supabase.co")
    pub supabase_url: Option<String>,
    /// Service-role key used for storage writes
    pub supabase_service_key: Option<String>,
    /// Postgres connection string for the catalog
    pub database_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub catalog_table: String,
}

impl PipelineConfig {
    /// Load configuration from environment variables, reading a `.env` file
    /// when present. Missing optional values stay `None`; parse failures on
    /// typed values are errors.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("Invalid STORAGE_BACKEND value: {}", v))?,
            Err(_) => StorageBackendKind::Supabase,
        };

        let request_timeout_secs = env_parse("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let max_retries = env_parse("UPLOAD_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;

        Ok(Self {
            storage_backend,
            supabase_url: env::var("SUPABASE_URL").ok(),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            request_timeout_secs,
            max_retries,
            catalog_table: env::var("CATALOG_TABLE")
                .unwrap_or_else(|_| DEFAULT_CATALOG_TABLE.to_string()),
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackendKind::Supabase,
            supabase_url: None,
            supabase_service_key: None,
            database_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            catalog_table: DEFAULT_CATALOG_TABLE.to_string(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v
            .parse()
            .with_context(|| format!("Invalid {} value: {}", key, v)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_round_trips() {
        for kind in [StorageBackendKind::Supabase, StorageBackendKind::Memory] {
            assert_eq!(kind.to_string().parse::<StorageBackendKind>().unwrap(), kind);
        }
        assert!("nfs".parse::<StorageBackendKind>().is_err());
    }

    #[test]
    fn defaults_are_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.storage_backend, StorageBackendKind::Supabase);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.catalog_table, "media_catalog");
    }
}
