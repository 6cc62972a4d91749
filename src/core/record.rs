//! Record traits defining what the catalog query engine can work on

use crate::core::user::Role;
use std::cmp::Ordering;
use std::fmt::Debug;

/// A sort key enum attached to a record type.
///
/// Parsing is lenient: any text that is not a known key maps to the
/// record's default ordering instead of failing.
pub trait SortKey: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Parse a key, falling back to `Self::default()` for unknown text
    fn parse_lenient(raw: &str) -> Self;

    /// Canonical text of this key
    fn as_str(&self) -> &'static str;
}

/// Base trait for all records served by the query engine.
///
/// A record exposes:
/// - id: Unique identifier token
/// - searchable fields: matched case-insensitively by the free-text term
/// - facet: the enum value matched by the category/status filter
/// - value: the monetary field summed by the aggregator
/// - party: the field a viewer of a given role is scoped by (if any)
pub trait Record: Clone + Debug + Send + Sync + 'static {
    /// Ordering keys supported by this record type
    type Sort: SortKey;

    /// The plural resource name used in URLs (e.g., "listings")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "listing")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier of this record
    fn id(&self) -> &str;

    /// Fields matched by the free-text search term
    fn searchable_fields(&self) -> Vec<&str>;

    /// Category or status, as its canonical text
    fn facet(&self) -> &str;

    /// Price or amount
    fn value(&self) -> f64;

    /// Whether the record counts as completed for the completion rate
    fn is_completed(&self) -> bool {
        false
    }

    /// The party field a viewer with `role` is scoped by.
    ///
    /// `None` means the record is visible to every viewer.
    fn party(&self, _role: Role) -> Option<&str> {
        None
    }

    /// Three-way comparison under the given sort key
    fn compare(&self, other: &Self, key: Self::Sort) -> Ordering;
}
