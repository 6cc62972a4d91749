//! Query parameters for catalog views
//!
//! A [`RecordQuery`] is built per view from the free-text term, the
//! category/status filter, the sort key and (for transactions) the viewer.
//! It is transient and never stored.

use crate::core::record::SortKey;
use crate::core::user::ViewerIdentity;
use serde::{Deserialize, Serialize};

/// Filter value meaning "no restriction"
pub const ALL_SENTINEL: &str = "all";

/// Category or status filter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FacetFilter {
    /// Matches every record
    #[default]
    All,
    /// Matches records whose facet text is exactly this value
    Exact(String),
}

impl FacetFilter {
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_SENTINEL {
            FacetFilter::All
        } else {
            FacetFilter::Exact(raw.to_string())
        }
    }

    /// Case-sensitive match against a record's facet text
    pub fn matches(&self, facet: &str) -> bool {
        match self {
            FacetFilter::All => true,
            FacetFilter::Exact(expected) => expected == facet,
        }
    }
}

impl From<String> for FacetFilter {
    fn from(raw: String) -> Self {
        FacetFilter::parse(&raw)
    }
}

impl From<FacetFilter> for String {
    fn from(filter: FacetFilter) -> Self {
        match filter {
            FacetFilter::All => ALL_SENTINEL.to_string(),
            FacetFilter::Exact(value) => value,
        }
    }
}

/// One query against a record collection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordQuery<S: SortKey> {
    /// Free-text term; lower-cased and trimmed before matching
    pub search_term: String,

    /// Category (listings) or status (transactions) filter
    pub filter: FacetFilter,

    /// Ordering of the resulting view
    pub sort: S,

    /// Viewer used for role-scoped visibility
    ///
    /// `None` applies no visibility restriction.
    pub viewer: Option<ViewerIdentity>,
}

impl<S: SortKey> RecordQuery<S> {
    pub fn new() -> Self {
        Self {
            search_term: String::new(),
            filter: FacetFilter::All,
            sort: S::default(),
            viewer: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn filter(mut self, filter: impl AsRef<str>) -> Self {
        self.filter = FacetFilter::parse(filter.as_ref());
        self
    }

    pub fn sort(mut self, sort: S) -> Self {
        self.sort = sort;
        self
    }

    /// Set the sort key from text, unknown keys falling back to the default
    pub fn sort_by(mut self, raw: &str) -> Self {
        self.sort = S::parse_lenient(raw);
        self
    }

    pub fn viewer(mut self, viewer: ViewerIdentity) -> Self {
        self.viewer = Some(viewer);
        self
    }
}

/// Query string of the listing view
///
/// # Example
/// ```text
/// GET /api/listings?search=corp&category=APIs&sort=price
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingQueryParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Query string of the transaction view
///
/// # Example
/// ```text
/// GET /api/transactions?search=vitamin&status=Completed
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionQueryParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

fn build<S: SortKey>(
    search: Option<&str>,
    filter: Option<&str>,
    sort: Option<&str>,
) -> RecordQuery<S> {
    RecordQuery::new()
        .search(search.unwrap_or_default())
        .filter(filter.unwrap_or(ALL_SENTINEL))
        .sort_by(sort.unwrap_or_default())
}

impl ListingQueryParams {
    pub fn to_query<S: SortKey>(&self) -> RecordQuery<S> {
        build(
            self.search.as_deref(),
            self.category.as_deref(),
            self.sort.as_deref(),
        )
    }
}

impl TransactionQueryParams {
    pub fn to_query<S: SortKey>(&self) -> RecordQuery<S> {
        build(
            self.search.as_deref(),
            self.status.as_deref(),
            self.sort.as_deref(),
        )
    }
}
