//! ServerBuilder for assembling the host and its HTTP surface

use super::host::MarketHost;
use super::router::build_routes;
use crate::config::MarketConfig;
use crate::core::auth::{AuthProvider, InMemoryAuthProvider};
use crate::core::events::EventBus;
use crate::core::fixtures;
use crate::core::forecast::ForecastSource;
use crate::core::listing::Listing;
use crate::core::store::RecordStore;
use crate::core::transaction::Transaction;
use crate::storage::InMemoryRecordStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the marketplace server
///
/// Every collaborator is optional. Unset stores start from the seed catalog
/// (or empty when `seed_fixtures` is off), the auth provider defaults to
/// [`InMemoryAuthProvider`] and the forecast source to the HTTP client
/// pointed at `forecast.base_url`.
///
/// # Example
///
/// ```ignore
/// let config = MarketConfig::from_yaml_file("market.yaml")?;
/// let addr = config.bind_address.clone();
/// ServerBuilder::new()
///     .with_config(config)
///     .serve(&addr)
///     .await?;
/// ```
pub struct ServerBuilder {
    config: MarketConfig,
    listings: Option<Arc<dyn RecordStore<Listing>>>,
    transactions: Option<Arc<dyn RecordStore<Transaction>>>,
    auth: Option<Arc<dyn AuthProvider>>,
    forecast: Option<Arc<dyn ForecastSource>>,
    event_bus: Option<EventBus>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: MarketConfig::default(),
            listings: None,
            transactions: None,
            auth: None,
            forecast: None,
            event_bus: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: MarketConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_listing_store(mut self, store: impl RecordStore<Listing> + 'static) -> Self {
        self.listings = Some(Arc::new(store));
        self
    }

    pub fn with_transaction_store(
        mut self,
        store: impl RecordStore<Transaction> + 'static,
    ) -> Self {
        self.transactions = Some(Arc::new(store));
        self
    }

    pub fn with_auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    pub fn with_forecast_source(mut self, source: impl ForecastSource + 'static) -> Self {
        self.forecast = Some(Arc::new(source));
        self
    }

    /// Use a bus buffering up to `capacity` events per slow subscriber
    pub fn with_event_bus(mut self, capacity: usize) -> Self {
        self.event_bus = Some(EventBus::new(capacity));
        self
    }

    /// Merge extra routes into the router
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<Arc<MarketHost>> {
        Ok(Arc::new(self.into_parts()?.0))
    }

    fn into_parts(mut self) -> Result<(MarketHost, Vec<Router>)> {
        let seed = self.config.seed_fixtures;

        let listings = self.listings.take().unwrap_or_else(|| {
            let records = if seed { fixtures::listings() } else { Vec::new() };
            Arc::new(InMemoryRecordStore::with_records(records))
        });
        let transactions = self.transactions.take().unwrap_or_else(|| {
            let records = if seed {
                fixtures::transactions()
            } else {
                Vec::new()
            };
            Arc::new(InMemoryRecordStore::with_records(records))
        });
        let auth = self
            .auth
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryAuthProvider::new()));
        let forecast = match self.forecast.take() {
            Some(source) => source,
            None => default_forecast_source(&self.config)?,
        };
        let event_bus = self.event_bus.take().unwrap_or_default();

        let host = MarketHost::new(
            self.config,
            listings,
            transactions,
            auth,
            forecast,
            event_bus,
        );
        Ok((host, self.custom_routes))
    }

    /// Build the router with tracing and permissive CORS layers
    pub fn build(self) -> Result<Router> {
        let (host, custom_routes) = self.into_parts()?;
        Ok(Self::router(Arc::new(host), custom_routes))
    }

    fn router(host: Arc<MarketHost>, custom_routes: Vec<Router>) -> Router {
        let mut app = build_routes(host);
        for custom in custom_routes {
            app = app.merge(custom);
        }
        app.layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Serve the application with graceful shutdown
    ///
    /// Before accepting connections, an existing identity-service session is
    /// restored and the auth listener is started. SIGTERM and Ctrl+C stop the
    /// server after in-flight requests finish.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let (host, custom_routes) = self.into_parts()?;
        let host = Arc::new(host);

        if let Some(user) = host.restore_session().await? {
            tracing::info!(email = %user.email, "restored existing session");
        }
        let listener_task = host.spawn_auth_listener();

        let app = Self::router(host, custom_routes);
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        listener_task.abort();
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "forecast-http")]
fn default_forecast_source(config: &MarketConfig) -> Result<Arc<dyn ForecastSource>> {
    Ok(Arc::new(crate::storage::HttpForecastClient::new(
        &config.forecast,
    )?))
}

#[cfg(not(feature = "forecast-http"))]
fn default_forecast_source(_config: &MarketConfig) -> Result<Arc<dyn ForecastSource>> {
    Err(anyhow::anyhow!(
        "No forecast source configured. Call .with_forecast_source() or enable the forecast-http feature"
    ))
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A signal handler that cannot be installed never resolves, leaving the
/// other one in charge.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forecast::StaticForecastSource;
    use crate::core::user::Role;

    #[tokio::test]
    async fn test_default_host_is_seeded() {
        let host = ServerBuilder::new()
            .with_forecast_source(StaticForecastSource::default())
            .build_host()
            .unwrap();
        let view = host.listings_view(&Default::default()).await.unwrap();
        assert_eq!(view.summary.total_count, 5);
    }

    #[tokio::test]
    async fn test_seed_fixtures_off() {
        let config = MarketConfig {
            seed_fixtures: false,
            ..Default::default()
        };
        let host = ServerBuilder::new()
            .with_config(config)
            .with_forecast_source(StaticForecastSource::default())
            .build_host()
            .unwrap();
        host.demo_login(Role::Buyer).unwrap();
        let view = host.transactions_view(&Default::default()).await.unwrap();
        assert_eq!(view.summary.total_count, 0);
        assert_eq!(view.summary.completion_rate_percent, 0);
    }

    #[tokio::test]
    async fn test_custom_event_bus_is_used() {
        let host = ServerBuilder::new()
            .with_event_bus(4)
            .with_forecast_source(StaticForecastSource::default())
            .build_host()
            .unwrap();
        let mut rx = host.event_bus().subscribe();
        host.demo_login(Role::Seller).unwrap();
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event.action(), "session_started");
    }

    #[tokio::test]
    async fn test_router_answers_health_and_cors_preflight() {
        use axum::body::Body;
        use axum::http::{Method, Request, StatusCode};
        use tower::ServiceExt;

        let router = ServerBuilder::new()
            .with_forecast_source(StaticForecastSource::default())
            .build()
            .unwrap();

        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/listings")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(preflight).await.unwrap();
        assert!(
            response
                .headers()
                .contains_key("access-control-allow-origin")
        );
    }

    #[tokio::test]
    async fn test_custom_routes_are_merged() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use axum::routing::get;
        use tower::ServiceExt;

        let router = ServerBuilder::new()
            .with_forecast_source(StaticForecastSource::default())
            .with_custom_routes(Router::new().route("/version", get(|| async { "0.1.0" })))
            .build()
            .unwrap();

        let response = router
            .oneshot(Request::get("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
