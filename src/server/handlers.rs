//! HTTP handlers
//!
//! Thin adapters: extract, call one [`MarketHost`] entry point, serialize.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::core::auth::{SignInRequest, SignUpRequest};
use crate::core::error::MarketResult;
use crate::core::forecast::{
    ChartPoint, ForecastPeriods, HorizonRequest, MarketDemandResponse, MonthlyForecast,
    SurplusResponse, chart_points,
};
use crate::core::listing::{Listing, ListingCard, ListingDraft};
use crate::core::query::{ListingQueryParams, TransactionQueryParams};
use crate::core::summary::Summary;
use crate::core::transaction::Transaction;
use crate::core::user::{NavItem, Page, Role};
use crate::server::host::{MarketHost, SessionView, TransactionDetail, WorkspaceView};

pub type HostState = State<Arc<MarketHost>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoLoginRequest {
    #[serde(default)]
    pub user_type: Role,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: Page,
}

/// Listing view with expiry badges
#[derive(Debug, Serialize)]
pub struct ListingsResponse {
    pub items: Vec<ListingCard>,
    pub summary: Summary,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub items: Vec<Transaction>,
    pub summary: Summary,
}

#[derive(Debug, Serialize)]
pub struct HorizonResponse {
    pub forecast: Vec<f64>,
    pub points: Vec<ChartPoint>,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
    }))
}

// Session

pub async fn get_session(State(host): HostState) -> MarketResult<Json<SessionView>> {
    Ok(Json(host.session()?))
}

pub async fn sign_in(
    State(host): HostState,
    Json(request): Json<SignInRequest>,
) -> MarketResult<Json<SessionView>> {
    host.sign_in(request).await?;
    Ok(Json(host.session()?))
}

pub async fn demo_login(
    State(host): HostState,
    Json(request): Json<DemoLoginRequest>,
) -> MarketResult<Json<SessionView>> {
    host.demo_login(request.user_type)?;
    Ok(Json(host.session()?))
}

pub async fn sign_up(
    State(host): HostState,
    Json(request): Json<SignUpRequest>,
) -> MarketResult<impl IntoResponse> {
    host.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(host.session()?)))
}

pub async fn logout(State(host): HostState) -> MarketResult<StatusCode> {
    host.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

// Navigation

pub async fn navigation(State(host): HostState) -> MarketResult<Json<Vec<NavItem>>> {
    Ok(Json(host.navigation()?))
}

pub async fn change_page(
    State(host): HostState,
    Json(request): Json<PageRequest>,
) -> MarketResult<Json<SessionView>> {
    host.navigate(request.page)?;
    Ok(Json(host.session()?))
}

pub async fn workspace(State(host): HostState) -> MarketResult<Json<WorkspaceView>> {
    Ok(Json(host.workspace()?))
}

// Catalog

pub async fn list_listings(
    State(host): HostState,
    Query(params): Query<ListingQueryParams>,
) -> MarketResult<Json<ListingsResponse>> {
    let view = host.listings_view(&params).await?;
    Ok(Json(ListingsResponse {
        items: host.listing_cards_today(view.items),
        summary: view.summary,
    }))
}

pub async fn create_listing(
    State(host): HostState,
    Json(draft): Json<ListingDraft>,
) -> MarketResult<(StatusCode, Json<Listing>)> {
    let listing = host.add_listing(draft).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn list_transactions(
    State(host): HostState,
    Query(params): Query<TransactionQueryParams>,
) -> MarketResult<Json<TransactionsResponse>> {
    let view = host.transactions_view(&params).await?;
    Ok(Json(TransactionsResponse {
        items: view.items,
        summary: view.summary,
    }))
}

pub async fn get_transaction(
    State(host): HostState,
    Path(id): Path<String>,
) -> MarketResult<Json<TransactionDetail>> {
    Ok(Json(host.transaction_detail(&id).await?))
}

// Insights

pub async fn monthly_forecast(State(host): HostState) -> MarketResult<Json<MonthlyForecast>> {
    Ok(Json(host.forecast().monthly_forecast().await?))
}

pub async fn market_demand(State(host): HostState) -> MarketResult<Json<MarketDemandResponse>> {
    let insights = host.forecast().market_demand().await?;
    Ok(Json(MarketDemandResponse { insights }))
}

pub async fn forecast_periods(State(host): HostState) -> MarketResult<Json<ForecastPeriods>> {
    Ok(Json(host.forecast().forecast_periods().await?))
}

pub async fn surplus_predictions(State(host): HostState) -> MarketResult<Json<SurplusResponse>> {
    let predictions = host.forecast().surplus_predictions().await?;
    Ok(Json(SurplusResponse {
        predictions,
        error: None,
    }))
}

pub async fn horizon_forecast(
    State(host): HostState,
    Json(request): Json<HorizonRequest>,
) -> MarketResult<Json<HorizonResponse>> {
    let forecast = host.forecast().horizon_forecast(request.horizon).await?;
    let points = chart_points(&forecast);
    Ok(Json(HorizonResponse { forecast, points }))
}
