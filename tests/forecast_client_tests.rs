//! Tests for the HTTP prediction service client
//!
//! Each test binds a stub prediction service on an ephemeral local port and
//! points the client at it.

#![cfg(feature = "forecast-http")]

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use surplus_market::core::error::ForecastError;
use surplus_market::core::forecast::{DemandTrend, HorizonRequest};
use surplus_market::prelude::*;
use tokio::net::TcpListener;

async fn spawn_stub(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: String) -> HttpForecastClient {
    HttpForecastClient::new(&ForecastConfig {
        base_url,
        timeout_secs: 2,
    })
    .expect("Failed to build forecast client")
}

fn prediction_service() -> Router {
    Router::new()
        .route(
            "/forecast_monthly",
            get(|| async {
                Json(json!({
                    "forecasts": {
                        "M01AB": {"Month+1": 5.6, "Month+2": 5.4},
                        "N02BE": {"Month+1": 7.9, "Month+2": 8.1}
                    }
                }))
            }),
        )
        .route(
            "/market_demand",
            get(|| async {
                Json(json!({
                    "insights": [
                        {"drug": "M01AB", "trend": "Stable", "forecast": 5.6},
                        {"drug": "N02BE", "trend": "High", "forecast": 7.9}
                    ]
                }))
            }),
        )
        .route(
            "/forecast_periods",
            get(|| async {
                Json(json!({
                    "forecasts": {
                        "1_month": {"M01AB": 5.6},
                        "3_months": {"M01AB": 16.3}
                    }
                }))
            }),
        )
        .route(
            "/predict_surplus_auto",
            get(|| async {
                Json(json!({
                    "predictions": [{
                        "drug": "M01AB",
                        "prediction": "Surplus",
                        "forecast_demand": 5.6,
                        "features": {
                            "ForecastDemand": 5.6, "CurrentStock": 6.72, "Surplus": 1.12,
                            "ShelfLifeDays": 180, "LeadTimeDays": 30,
                            "UnitCost": 0.56, "WastageRate": 0.05
                        }
                    }],
                    "status": "success",
                    "count": 1
                }))
            }),
        )
        .route(
            "/forecast_all",
            post(|Json(request): Json<HorizonRequest>| async move {
                let forecast: Vec<f64> = (0..request.horizon).map(|d| 100.0 + d as f64).collect();
                Json(json!({ "forecast": forecast }))
            }),
        )
}

#[tokio::test]
async fn test_reads_every_endpoint() {
    let client = client(spawn_stub(prediction_service()).await);

    let monthly = client.monthly_forecast().await.unwrap();
    assert_eq!(monthly.forecasts.len(), 2);

    let insights = client.market_demand().await.unwrap();
    assert_eq!(insights[1].trend, DemandTrend::High);

    let periods = client.forecast_periods().await.unwrap();
    assert_eq!(periods.totals()["3_months"]["M01AB"], 16.3);

    let predictions = client.surplus_predictions().await.unwrap();
    assert_eq!(predictions[0].prediction, "Surplus");
    assert_eq!(predictions[0].features.lead_time_days, 30.0);

    let series = client.horizon_forecast(3).await.unwrap();
    assert_eq!(series, vec![100.0, 101.0, 102.0]);
}

#[tokio::test]
async fn test_error_field_is_a_failure() {
    let app = Router::new()
        .route(
            "/predict_surplus_auto",
            get(|| async { Json(json!({"predictions": [], "error": "model not loaded"})) }),
        )
        .route(
            "/forecast_periods",
            get(|| async { Json(json!({"error": "No forecasts available"})) }),
        );
    let client = client(spawn_stub(app).await);

    let err = client.surplus_predictions().await.unwrap_err();
    assert!(matches!(
        err,
        MarketError::Forecast(ForecastError::Service { ref message, .. }) if message == "model not loaded"
    ));

    let err = client.forecast_periods().await.unwrap_err();
    assert_eq!(err.error_code(), "FORECAST_SERVICE_ERROR");
}

#[tokio::test]
async fn test_non_success_status() {
    let app = Router::new().route(
        "/market_demand",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = client(spawn_stub(app).await);

    let err = client.market_demand().await.unwrap_err();
    match err {
        MarketError::Forecast(ForecastError::Status { status, endpoint }) => {
            assert_eq!(status, 500);
            assert_eq!(endpoint, "/market_demand");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_payload() {
    let app = Router::new().route(
        "/forecast_all",
        post(|| async { Json(json!({"forecast": "soon"})) }),
    );
    let client = client(spawn_stub(app).await);

    let err = client.horizon_forecast(7).await.unwrap_err();
    assert_eq!(err.error_code(), "FORECAST_BAD_PAYLOAD");
}

#[tokio::test]
async fn test_unreachable_service() {
    // Bind and drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(format!("http://{}", addr));
    let err = client.market_demand().await.unwrap_err();
    assert_eq!(err.error_code(), "FORECAST_UNREACHABLE");
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_configured_timeout_bounds_requests() {
    let app = Router::new().route(
        "/market_demand",
        get(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Json(json!({"insights": []}))
        }),
    );
    let base_url = spawn_stub(app).await;
    let client = HttpForecastClient::new(&ForecastConfig {
        base_url,
        timeout_secs: 1,
    })
    .unwrap();

    let started = std::time::Instant::now();
    let err = client.market_demand().await.unwrap_err();
    assert_eq!(err.error_code(), "FORECAST_UNREACHABLE");
    assert!(started.elapsed() < std::time::Duration::from_secs(4));
}

#[tokio::test]
async fn test_proxy_surfaces_bad_gateway() {
    let app = Router::new().route(
        "/market_demand",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base_url = spawn_stub(app).await;

    let market = ServerBuilder::new()
        .with_forecast_source(client(base_url))
        .build()
        .unwrap();
    let server = axum_test::TestServer::try_new(market).unwrap();

    let response = server.get("/api/insights/market-demand").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["code"], "FORECAST_BAD_STATUS");
    assert_eq!(body["details"]["status"], 503);
}
