//! Core module: domain records, the catalog query engine and collaborator boundaries

pub mod auth;
pub mod engine;
pub mod error;
pub mod events;
pub mod fixtures;
pub mod forecast;
pub mod listing;
pub mod predicate;
pub mod query;
pub mod record;
pub mod sort;
pub mod store;
pub mod summary;
pub mod transaction;
pub mod user;

pub use auth::{AuthEvent, AuthProvider, AuthUser, InMemoryAuthProvider, Session, UserMetadata};
pub use engine::{QueryView, run_query};
pub use error::{MarketError, MarketResult};
pub use events::{EventBus, EventEnvelope, MarketEvent};
pub use forecast::{ForecastSource, StaticForecastSource};
pub use listing::{Category, Listing, ListingDraft, ListingSort};
pub use query::{FacetFilter, RecordQuery};
pub use record::{Record, SortKey};
pub use store::RecordStore;
pub use summary::Summary;
pub use transaction::{Transaction, TransactionSort, TransactionStatus};
pub use user::{NavItem, Page, Role, User, ViewerIdentity, Workspace};
