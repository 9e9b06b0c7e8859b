//! Biratnagar production service

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use shared::{DateRange, PokaInput, ProductionEntry, ProductionResult};

use crate::error::AppResult;
use crate::store::StockStore;

#[derive(Clone)]
pub struct ProductionService {
    store: Arc<StockStore>,
}

/// A production batch entered at Biratnagar
#[derive(Debug, Clone, Deserialize)]
pub struct ProductionInput {
    pub date: Option<NaiveDate>,
    pub items: Vec<PokaInput>,
}

impl ProductionService {
    pub fn new(store: Arc<StockStore>) -> Self {
        Self { store }
    }

    /// Register every Poka of the batch and add their sums to the day's production
    pub async fn record_production(&self, input: ProductionInput) -> AppResult<ProductionResult> {
        let date = input.date.unwrap_or_else(super::today);

        let result = self
            .store
            .biratnagar()
            .await
            .record_production(date, &input.items)
            .inspect_err(|e| {
                let count = input.items.len();
                tracing::warn!(date = %date, count, "Production rejected: {}", e)
            })?;

        tracing::info!(
            location = "biratnagar",
            date = %date,
            count = result.items.len(),
            meter = %result.total_meter,
            kg = %result.total_kg,
            "Recorded production"
        );
        self.store.persist().await;
        Ok(result)
    }

    pub async fn list_entries(&self, range: DateRange) -> Vec<ProductionEntry> {
        self.store.biratnagar().await.ledger().range(range)
    }
}
