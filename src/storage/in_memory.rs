//! In-memory record store for development and tests

use crate::core::error::{MarketError, MarketResult};
use crate::core::record::Record;
use crate::core::store::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Snapshot store behind a `RwLock`
///
/// Cloning shares the underlying collection.
#[derive(Debug, Clone)]
pub struct InMemoryRecordStore<T> {
    records: Arc<RwLock<Arc<Vec<T>>>>,
}

impl<T: Record> InMemoryRecordStore<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store holding `records` in the given order
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(Arc::new(records))),
        }
    }

    fn current(&self) -> MarketResult<Arc<Vec<T>>> {
        let records = self
            .records
            .read()
            .map_err(|e| MarketError::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(Arc::clone(&records))
    }
}

impl<T: Record> Default for InMemoryRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryRecordStore<T> {
    async fn snapshot(&self) -> MarketResult<Arc<Vec<T>>> {
        self.current()
    }

    async fn prepend(&self, record: T) -> MarketResult<T> {
        let mut records = self
            .records
            .write()
            .map_err(|e| MarketError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        let mut next = Vec::with_capacity(records.len() + 1);
        next.push(record.clone());
        next.extend(records.iter().cloned());
        *records = Arc::new(next);

        Ok(record)
    }

    async fn get(&self, id: &str) -> MarketResult<Option<T>> {
        Ok(self.current()?.iter().find(|r| r.id() == id).cloned())
    }

    async fn len(&self) -> MarketResult<usize> {
        Ok(self.current()?.len())
    }
}

/// Listing id source
///
/// Ids are decimal strings seeded from the creation-time epoch milliseconds and
/// strictly increasing afterwards, so two listings added within the same
/// millisecond still get distinct ids.
#[derive(Debug)]
pub struct ListingIdGenerator {
    next: AtomicU64,
}

impl ListingIdGenerator {
    pub fn new() -> Self {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        Self::starting_at(now)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_id(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

impl Default for ListingIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
