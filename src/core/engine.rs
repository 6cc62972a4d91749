//! The catalog query engine
//!
//! Filter first, then stable-sort the reduced set. The input slice is never
//! touched; the view is a fresh vector, so two views over the same snapshot
//! (grid and table, say) cannot interfere.

use crate::core::predicate::RecordPredicate;
use crate::core::query::RecordQuery;
use crate::core::record::{Record, SortKey};
use crate::core::sort::comparator;
use crate::core::summary::Summary;
use serde::Serialize;

/// Filtered and ordered view of `records`
pub fn run_query<T: Record>(records: &[T], query: &RecordQuery<T::Sort>) -> Vec<T> {
    let predicate = RecordPredicate::build(query);

    let mut view: Vec<T> = records
        .iter()
        .filter(|record| predicate.matches(*record))
        .cloned()
        .collect();

    // slice::sort_by is stable: ties keep input order
    view.sort_by(comparator::<T>(query.sort));

    tracing::debug!(
        resource = T::resource_name(),
        sort = query.sort.as_str(),
        filtered = view.len(),
        total = records.len(),
        "catalog query evaluated"
    );

    view
}

/// A view together with its summary
#[derive(Debug, Clone, Serialize)]
pub struct QueryView<T> {
    pub items: Vec<T>,
    pub summary: Summary,
}

impl<T: Record> QueryView<T> {
    /// Run the query and summarize the result against the whole collection
    pub fn evaluate(records: &[T], query: &RecordQuery<T::Sort>) -> Self {
        let items = run_query(records, query);
        let summary = Summary::summarize(&items, records);
        Self { items, summary }
    }
}
