//! HTTP handlers for per-location Poka stock

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{
    PokaInput, PokaItem, PokaState, PokaTotals, ReconciliationReport, SaleResult, ShadeSummary,
    SoldPoka,
};
use uuid::Uuid;

use super::{parse_location, DateRangeQuery};
use crate::error::AppResult;
use crate::services::sales::{SaleInput, SalesService};
use crate::services::PokaService;
use crate::AppState;

/// List active Poka at a location
pub async fn list_pokas(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> AppResult<Json<Vec<PokaItem>>> {
    let location = parse_location(&location)?;
    let service = PokaService::new(state.store);
    Ok(Json(service.list_active(location).await))
}

/// Register a Poka already held as opening stock
pub async fn add_poka(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Json(input): Json<PokaInput>,
) -> AppResult<Json<PokaItem>> {
    let location = parse_location(&location)?;
    let service = PokaService::new(state.store);
    let item = service.add_item(location, input).await?;
    Ok(Json(item))
}

/// Count and quantity totals of active Poka
pub async fn get_totals(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> AppResult<Json<PokaTotals>> {
    let location = parse_location(&location)?;
    let service = PokaService::new(state.store);
    Ok(Json(service.totals(location).await))
}

/// Active Poka grouped by shade
pub async fn get_shades(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> AppResult<Json<Vec<ShadeSummary>>> {
    let location = parse_location(&location)?;
    let service = PokaService::new(state.store);
    Ok(Json(service.shade_summary(location).await))
}

/// Sale register of a location
pub async fn list_sales(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<SoldPoka>>> {
    let location = parse_location(&location)?;
    let service = PokaService::new(state.store);
    Ok(Json(service.list_sales(location, query.into()).await))
}

/// Sell Poka out of a location
pub async fn record_sale(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Json(input): Json<SaleInput>,
) -> AppResult<Json<SaleResult>> {
    let location = parse_location(&location)?;
    let service = SalesService::new(state.store);
    let result = service.record_sale(location, input).await?;
    Ok(Json(result))
}

/// Ledger balance against tracked Poka
pub async fn get_reconciliation(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> AppResult<Json<ReconciliationReport>> {
    let location = parse_location(&location)?;
    let service = PokaService::new(state.store);
    Ok(Json(service.reconcile(location).await))
}

/// Current state of one Poka
pub async fn get_poka_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PokaState>> {
    let service = PokaService::new(state.store);
    let poka_state = service.state_of(id).await?;
    Ok(Json(poka_state))
}
