//! Summary statistics over a query view

use crate::core::record::Record;
use serde::Serialize;

/// Aggregates shown above a view
///
/// Value and completion figures always describe the filtered view, not the
/// whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub filtered_count: usize,
    pub total_count: usize,
    /// Sum of price (listings) or amount (transactions) over the view
    pub total_value: f64,
    /// Completed transactions in the view; always 0 for listings
    pub completed_count: usize,
    /// round(completed / filtered * 100), or 0 for an empty view
    pub completion_rate_percent: u32,
}

impl Summary {
    pub fn summarize<T: Record>(view: &[T], all: &[T]) -> Self {
        let filtered_count = view.len();
        let total_value = view.iter().map(|r| r.value()).sum();
        let completed_count = view.iter().filter(|r| r.is_completed()).count();

        Self {
            filtered_count,
            total_count: all.len(),
            total_value,
            completed_count,
            completion_rate_percent: completion_rate(completed_count, filtered_count),
        }
    }
}

fn completion_rate(completed: usize, filtered: usize) -> u32 {
    if filtered == 0 {
        return 0;
    }
    (completed as f64 / filtered as f64 * 100.0).round() as u32
}
