//! Route table

use crate::server::handlers;
use crate::server::host::MarketHost;
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Build every route of the marketplace API
///
/// - `GET /health`
/// - `GET|POST|DELETE /api/session`, `POST /api/session/demo`, `POST /api/accounts`
/// - `GET /api/navigation`, `PUT /api/page`, `GET /api/workspace`
/// - `GET|POST /api/listings`
/// - `GET /api/transactions`, `GET /api/transactions/{id}`
/// - `GET /api/insights/{monthly,market-demand,forecast-periods,surplus}`,
///   `POST /api/insights/forecast`
pub fn build_routes(host: Arc<MarketHost>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/session",
            get(handlers::get_session)
                .post(handlers::sign_in)
                .delete(handlers::logout),
        )
        .route("/api/session/demo", post(handlers::demo_login))
        .route("/api/accounts", post(handlers::sign_up))
        .route("/api/navigation", get(handlers::navigation))
        .route("/api/page", put(handlers::change_page))
        .route("/api/workspace", get(handlers::workspace))
        .route(
            "/api/listings",
            get(handlers::list_listings).post(handlers::create_listing),
        )
        .route("/api/transactions", get(handlers::list_transactions))
        .route("/api/transactions/{id}", get(handlers::get_transaction))
        .route("/api/insights/monthly", get(handlers::monthly_forecast))
        .route("/api/insights/market-demand", get(handlers::market_demand))
        .route(
            "/api/insights/forecast-periods",
            get(handlers::forecast_periods),
        )
        .route("/api/insights/surplus", get(handlers::surplus_predictions))
        .route("/api/insights/forecast", post(handlers::horizon_forecast))
        .with_state(host)
}
