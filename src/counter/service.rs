//! Counter operations on top of a [`CounterStore`].

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::metrics;
use crate::store::CounterStore;
use crate::utils::now_timestamp;

use super::types::{Counter, COUNTER_ID};

/// Reads and mutates the single counter row.
///
/// Holds no counter state of its own; concurrent increments are made safe by
/// the store's atomic add.
#[derive(Clone)]
pub struct CounterService {
    store: Arc<dyn CounterStore>,
    id: String,
}

impl std::fmt::Debug for CounterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterService")
            .field("store", &self.store.name())
            .field("id", &self.id)
            .finish()
    }
}

impl CounterService {
    /// Create a service for the global counter.
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self {
            store,
            id: COUNTER_ID.to_string(),
        }
    }

    /// Backend name.
    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Current value; an absent row reads as zero and is not written.
    #[instrument(skip(self))]
    pub async fn read(&self) -> Result<Counter, StoreError> {
        let _timer = metrics::timer_store("get");
        let counter = self.store.get(&self.id).await?;
        Ok(counter.unwrap_or_else(|| Counter::never(&self.id)))
    }

    /// Atomically add `delta` and refresh the timestamp.
    #[instrument(skip(self))]
    pub async fn increment(&self, delta: i64) -> Result<Counter, StoreError> {
        let _timer = metrics::timer_store("add");
        let counter = self.store.add(&self.id, delta, &now_timestamp()).await?;
        metrics::inc_counter_increments();
        debug!(count = counter.count, "counter incremented");
        Ok(counter)
    }

    /// Overwrite the row with zero and a fresh timestamp.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<Counter, StoreError> {
        let _timer = metrics::timer_store("put");
        let counter = Counter::new(&self.id, 0, now_timestamp());
        self.store.put(&counter).await?;
        metrics::inc_counter_resets();
        Ok(counter)
    }

    /// Create the table and write the zero row if it is absent.
    #[instrument(skip(self))]
    pub async fn setup(&self) -> Result<Counter, StoreError> {
        self.store.ensure_table().await?;

        match self.store.get(&self.id).await? {
            Some(existing) => Ok(existing),
            None => {
                let counter = Counter::new(&self.id, 0, now_timestamp());
                self.store.put(&counter).await?;
                Ok(counter)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn service() -> (CounterService, MemoryStore) {
        let store = MemoryStore::new();
        (CounterService::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn read_never_initialized_does_not_write() {
        let (service, store) = service();

        let counter = service.read().await.unwrap();
        assert_eq!(counter, Counter::never(COUNTER_ID));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn increment_adds_and_refreshes_timestamp() {
        let (service, _) = service();

        let first = service.increment(3).await.unwrap();
        assert_eq!(first.count, 3);
        assert!(first.is_initialized());

        let second = service.increment(4).await.unwrap();
        assert_eq!(second.count, 7);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn negative_and_zero_increments_are_accepted() {
        let (service, _) = service();

        assert_eq!(service.increment(-5).await.unwrap().count, -5);
        assert_eq!(service.increment(0).await.unwrap().count, -5);
    }

    #[tokio::test]
    async fn reset_always_yields_zero() {
        let (service, _) = service();
        service.increment(41).await.unwrap();

        let counter = service.reset().await.unwrap();
        assert_eq!(counter.count, 0);
        assert!(counter.is_initialized());
        assert_eq!(service.read().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn setup_seeds_zero_row_once() {
        let (service, store) = service();

        let seeded = service.setup().await.unwrap();
        assert_eq!(seeded.count, 0);
        assert_eq!(store.len(), 1);

        service.increment(2).await.unwrap();
        let again = service.setup().await.unwrap();
        assert_eq!(again.count, 2);
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let service = CounterService::new(Arc::new(MemoryStore::failing()));

        tokio_test::assert_err!(service.read().await);
        tokio_test::assert_err!(service.increment(1).await);
        tokio_test::assert_err!(service.reset().await);
    }
}
