//! services/api/src/adapters/memory_store.rs
//!
//! A `DocumentStore` that keeps records in process memory. Used when no
//! database is configured, and by the tests.

use async_trait::async_trait;
use medtrack_core::{DocumentStore, PortResult};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub collection: String,
    pub body: serde_json::Value,
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    records: Mutex<Vec<StoredRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in `collection`, in insertion order.
    pub async fn records(&self, collection: &str) -> Vec<StoredRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|r| r.collection == collection)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add_record(&self, collection: &str, record: serde_json::Value) -> PortResult<String> {
        let id = Uuid::new_v4().to_string();
        self.records.lock().await.push(StoredRecord {
            id: id.clone(),
            collection: collection.to_string(),
            body: record,
        });
        Ok(id)
    }
}
