//! In-memory counter store.
//!
//! Serves local runs without DynamoDB and unit tests. Failure modes can be
//! injected through [`MemoryConfig`].

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::counter::{Counter, MAX_COUNT};
use crate::error::StoreError;

use super::CounterStore;

/// Configuration for in-memory store behavior.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    /// Whether every call fails.
    pub fail_requests: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Counter store backed by a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    config: MemoryConfig,
    rows: Arc<DashMap<String, Counter>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with custom behavior.
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            config,
            rows: Arc::new(DashMap::new()),
        }
    }

    /// Create a store whose every call fails.
    pub fn failing() -> Self {
        Self::with_config(MemoryConfig {
            fail_requests: true,
            ..Default::default()
        })
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row has been written.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    async fn simulate(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail_requests {
            return Err(StoreError::Unavailable(format!(
                "simulated {operation} failure"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Counter>, StoreError> {
        self.simulate("get").await?;
        Ok(self.rows.get(id).map(|row| row.value().clone()))
    }

    async fn add(&self, id: &str, delta: i64, updated_at: &str) -> Result<Counter, StoreError> {
        self.simulate("add").await?;

        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self
            .rows
            .entry(id.to_string())
            .or_insert_with(|| Counter::new(id, 0, updated_at));

        // Same bound DynamoDB enforces server-side, checked before writing.
        let count = entry
            .count
            .checked_add(i128::from(delta))
            .filter(|count| count.abs() <= MAX_COUNT)
            .ok_or_else(|| StoreError::Overflow {
                id: id.to_string(),
                delta,
            })?;

        entry.count = count;
        entry.updated_at = updated_at.to_string();
        Ok(entry.value().clone())
    }

    async fn put(&self, counter: &Counter) -> Result<(), StoreError> {
        self.simulate("put").await?;
        self.rows.insert(counter.id.clone(), counter.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
