//! Application host and HTTP surface

pub mod builder;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::{MarketHost, SessionView, TransactionDetail, WorkspaceView};
pub use router::build_routes;
