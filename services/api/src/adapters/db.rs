//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DocumentStore` port from the `core` crate. Records are appended as JSON
//! documents to a single PostgreSQL table using `sqlx`.

use async_trait::async_trait;
use medtrack_core::{DocumentStore, PortError, PortResult};
use sqlx::PgPool;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DocumentStore` port.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn add_record(&self, collection: &str, record: serde_json::Value) -> PortResult<String> {
        let id = Uuid::new_v4();
        let body = serde_json::to_string(&record).map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query("INSERT INTO records (id, collection, body) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(collection)
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(id.to_string())
    }
}
