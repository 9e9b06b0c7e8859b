//! HTTP handlers for daily ledger listings

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::{DateRange, LedgerKind, LedgerRows};

use crate::error::{AppError, AppResult};
use crate::services::LedgerService;
use crate::AppState;

/// Optional inclusive date bounds
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl From<DateRangeQuery> for DateRange {
    fn from(query: DateRangeQuery) -> Self {
        DateRange::new(query.start, query.end)
    }
}

/// List entries of one ledger
pub async fn list_ledger_entries(
    State(state): State<AppState>,
    Path(ledger): Path<String>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<LedgerRows>> {
    let kind: LedgerKind = ledger
        .parse()
        .map_err(|_| AppError::NotFound(format!("Ledger {}", ledger)))?;

    let service = LedgerService::new(state.store);
    let rows = service.list_entries(kind, query.into()).await?;
    Ok(Json(rows))
}
