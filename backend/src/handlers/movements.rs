//! HTTP handlers for ledger movements

use axum::{extract::State, Json};
use shared::{GreyFabricEntry, ProductionResult, TransferResult, YarnEntry};

use crate::error::AppResult;
use crate::services::grey_fabric::{GreyFabricMovementInput, GreyFabricService};
use crate::services::production::{ProductionInput, ProductionService};
use crate::services::transfer::{TransferInput, TransferService};
use crate::services::yarn::{YarnMovementInput, YarnService};
use crate::AppState;

/// Record a yarn purchase, consumption or wastage
pub async fn add_yarn_entry(
    State(state): State<AppState>,
    Json(input): Json<YarnMovementInput>,
) -> AppResult<Json<YarnEntry>> {
    let service = YarnService::new(state.store);
    let entry = service.add_yarn_entry(input).await?;
    Ok(Json(entry))
}

/// Record grey fabric received or turned into finished goods
pub async fn add_grey_fabric_entry(
    State(state): State<AppState>,
    Json(input): Json<GreyFabricMovementInput>,
) -> AppResult<Json<GreyFabricEntry>> {
    let service = GreyFabricService::new(state.store);
    let entry = service.add_grey_fabric_entry(input).await?;
    Ok(Json(entry))
}

/// Record a production batch at Biratnagar
pub async fn record_production(
    State(state): State<AppState>,
    Json(input): Json<ProductionInput>,
) -> AppResult<Json<ProductionResult>> {
    let service = ProductionService::new(state.store);
    let result = service.record_production(input).await?;
    Ok(Json(result))
}

/// Transfer Poka from Biratnagar to Birgunj
pub async fn transfer_pokas(
    State(state): State<AppState>,
    Json(input): Json<TransferInput>,
) -> AppResult<Json<TransferResult>> {
    let service = TransferService::new(state.store);
    let result = service.transfer(input).await?;
    Ok(Json(result))
}
