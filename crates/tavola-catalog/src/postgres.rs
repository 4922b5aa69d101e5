//! Postgres catalog backend
//!
//! Repository over a `PgPool`. Table names arrive at runtime (the caller may
//! route uploads to different catalog tables), so statements are built with
//! the runtime query API and the identifier is validated before it is ever
//! interpolated.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tavola_core::PipelineConfig;
use uuid::Uuid;

use crate::traits::{CatalogError, CatalogRecord, CatalogResult, CatalogStore, NewCatalogRecord};

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT_SECS: u64 = 30;
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Setup the catalog connection pool and run pending migrations
pub async fn connect(database_url: &str) -> Result<PgPool> {
    tracing::info!("Connecting to catalog database...");
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .connect(database_url)
        .await
        .context("Failed to connect to catalog database")?;

    tracing::info!(max_connections = MAX_CONNECTIONS, "Catalog database connected");

    // Migrations live at the workspace root
    let migrations_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run catalog migrations")?;
    tracing::info!("Catalog migrations applied");

    Ok(pool)
}

/// Setup the catalog pool from configuration.
pub async fn connect_from_config(config: &PipelineConfig) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL not configured")?;
    connect(url).await
}

/// Reject anything that is not a plain lower-case SQL identifier. Runs
/// before a table name is interpolated into a statement.
fn validate_table(table: &str) -> CatalogResult<()> {
    let valid = !table.is_empty()
        && table.len() <= MAX_IDENTIFIER_LENGTH
        && table
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(CatalogError::InvalidTable(table.to_string()))
    }
}

/// Postgres catalog implementation
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn insert(&self, table: &str, record: &NewCatalogRecord) -> CatalogResult<Uuid> {
        validate_table(table)?;
        let sql = format!(
            "INSERT INTO {} \
             (bucket, storage_path, public_url, file_name, content_type, size_bytes, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
            table
        );

        let id: Uuid = sqlx::query_scalar(&sql)
            .bind(&record.bucket)
            .bind(&record.storage_path)
            .bind(&record.public_url)
            .bind(&record.file_name)
            .bind(&record.content_type)
            .bind(record.size_bytes)
            .bind(&record.metadata)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    table = %table,
                    storage_path = %record.storage_path,
                    "Failed to insert catalog row"
                );
                CatalogError::InsertFailed(e.to_string())
            })?;

        tracing::debug!(table = %table, id = %id, "Catalog row inserted");
        Ok(id)
    }

    async fn delete(&self, table: &str, id: Uuid) -> CatalogResult<()> {
        validate_table(table)?;
        let sql = format!("DELETE FROM {} WHERE id = $1", table);

        sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, table = %table, id = %id, "Failed to delete catalog row");
                CatalogError::DeleteFailed(e.to_string())
            })?;

        tracing::debug!(table = %table, id = %id, "Catalog row deleted");
        Ok(())
    }

    async fn select_one(&self, table: &str, id: Uuid) -> CatalogResult<Option<CatalogRecord>> {
        validate_table(table)?;
        let sql = format!(
            "SELECT id, bucket, storage_path, public_url, file_name, content_type, \
             size_bytes, metadata, created_at FROM {} WHERE id = $1",
            table
        );

        sqlx::query_as::<_, CatalogRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::QueryFailed(e.to_string()))
    }
}
