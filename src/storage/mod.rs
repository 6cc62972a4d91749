//! Storage and collaborator backends

#[cfg(feature = "forecast-http")]
pub mod forecast_http;
pub mod in_memory;

#[cfg(feature = "forecast-http")]
pub use forecast_http::HttpForecastClient;
pub use in_memory::{InMemoryRecordStore, ListingIdGenerator};
