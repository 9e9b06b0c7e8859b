//! Route definitions for the Textile Stock Ledger

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/dashboard", dashboard_routes())
        .nest("/locations/:location", location_routes())
        .route("/pokas/:id", get(handlers::get_poka_state))
        .route("/ledgers/:ledger", get(handlers::list_ledger_entries))
        // Movements
        .route("/yarn", post(handlers::add_yarn_entry))
        .route("/grey-fabric", post(handlers::add_grey_fabric_entry))
        .route("/production", post(handlers::record_production))
        .route("/transfers", post(handlers::transfer_pokas))
}

/// Dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/alerts", get(handlers::get_low_stock_alerts))
}

/// Per-location Poka stock routes
fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/pokas", get(handlers::list_pokas).post(handlers::add_poka))
        .route("/totals", get(handlers::get_totals))
        .route("/shades", get(handlers::get_shades))
        .route("/sales", get(handlers::list_sales).post(handlers::record_sale))
        .route("/reconciliation", get(handlers::get_reconciliation))
}
