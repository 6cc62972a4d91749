//! # Surplus Market
//!
//! Catalog query engine and application state for a pharmaceutical
//! surplus-trading marketplace, where sellers list surplus raw materials and
//! buyers browse them and review their transactions.
//!
//! ## Features
//!
//! - **Catalog query engine**: free-text search, category/status facets and
//!   stable ordering over listings and transactions, with live summaries
//! - **Role-scoped views**: buyers and sellers only see transactions their
//!   company is a party to
//! - **Explicit application state**: [`MarketHost`](server::MarketHost) owns
//!   the current user, page and record stores behind controlled entry points
//! - **Collaborator boundaries**: identity and prediction services sit behind
//!   the [`AuthProvider`](core::AuthProvider) and
//!   [`ForecastSource`](core::ForecastSource) traits
//! - **REST surface**: axum routes with tracing and CORS layers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use surplus_market::prelude::*;
//!
//! let listings = fixtures::listings();
//! let query = RecordQuery::new()
//!     .filter("APIs")
//!     .sort(ListingSort::Price);
//!
//! let view = QueryView::evaluate(&listings, &query);
//! assert_eq!(view.summary.filtered_count, 3);
//! assert_eq!(view.summary.total_value, 9000.0);
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Query engine ===
    pub use crate::core::{
        engine::{QueryView, run_query},
        query::{FacetFilter, ListingQueryParams, RecordQuery, TransactionQueryParams},
        record::{Record, SortKey},
        summary::Summary,
    };

    // === Domain ===
    pub use crate::core::{
        fixtures,
        listing::{Category, Listing, ListingCard, ListingDraft, ListingSort},
        transaction::{Transaction, TransactionSort, TransactionStatus},
        user::{NavItem, Page, Role, User, ViewerIdentity, Workspace},
    };

    // === Collaborators ===
    pub use crate::core::{
        auth::{AuthProvider, InMemoryAuthProvider, SignInRequest, SignUpRequest},
        forecast::{ForecastSource, StaticForecastSource},
    };

    // === Errors and events ===
    pub use crate::core::{
        error::{MarketError, MarketResult},
        events::{EventBus, MarketEvent},
    };

    // === Storage ===
    #[cfg(feature = "forecast-http")]
    pub use crate::storage::HttpForecastClient;
    pub use crate::storage::InMemoryRecordStore;
    pub use crate::core::store::RecordStore;

    // === Config ===
    pub use crate::config::{ForecastConfig, MarketConfig, init_tracing};

    // === Server ===
    pub use crate::server::{MarketHost, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
}
