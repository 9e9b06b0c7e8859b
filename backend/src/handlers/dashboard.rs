//! HTTP handlers for the stock dashboard

use axum::{extract::State, Json};
use shared::{DashboardStats, LowStockAlert};

use crate::services::DashboardService;
use crate::AppState;

/// Latest balances and today's movements
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardStats> {
    let service = DashboardService::new(state.store);
    Json(service.summary().await)
}

/// Ledgers below the low-stock threshold
pub async fn get_low_stock_alerts(State(state): State<AppState>) -> Json<Vec<LowStockAlert>> {
    let service = DashboardService::new(state.store);
    Json(service.low_stock_alerts().await)
}
