//! Record store trait
//!
//! Stores hand out immutable snapshots. Writers build a new snapshot and swap
//! it in, so a query running against an older snapshot is never disturbed.

use crate::core::error::MarketResult;
use crate::core::record::Record;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for one record collection
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// The current snapshot, in collection order
    async fn snapshot(&self) -> MarketResult<Arc<Vec<T>>>;

    /// Insert a record at the front of the collection
    async fn prepend(&self, record: T) -> MarketResult<T>;

    /// Look up a record by id
    async fn get(&self, id: &str) -> MarketResult<Option<T>>;

    async fn len(&self) -> MarketResult<usize>;

    async fn is_empty(&self) -> MarketResult<bool> {
        Ok(self.len().await? == 0)
    }
}
