//! Key-value store backends for the counter row.
//!
//! This module handles:
//! - The [`CounterStore`] contract (get, atomic add, put)
//! - DynamoDB backend
//! - In-memory backend for local runs and tests

pub mod dynamo;
pub mod memory;

use async_trait::async_trait;

use crate::counter::Counter;
use crate::error::StoreError;

pub use dynamo::DynamoStore;
pub use memory::{MemoryConfig, MemoryStore};

/// Storage contract required by the counter service.
///
/// `add` must be a single server-side read-modify-write so that concurrent
/// increments of the same row are never lost.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read the row with the given key, `None` if it was never written.
    async fn get(&self, id: &str) -> Result<Option<Counter>, StoreError>;

    /// Atomically add `delta` to `count` and set `updated_at`, creating the
    /// row if absent. Returns the row after the update.
    async fn add(&self, id: &str, delta: i64, updated_at: &str) -> Result<Counter, StoreError>;

    /// Unconditionally overwrite the row.
    async fn put(&self, counter: &Counter) -> Result<(), StoreError>;

    /// Create the backing table if it does not exist yet.
    async fn ensure_table(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
