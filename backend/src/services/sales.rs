//! Sales service for both finished-goods locations

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use shared::{Location, SaleResult};
use uuid::Uuid;

use crate::error::AppResult;
use crate::store::StockStore;

#[derive(Clone)]
pub struct SalesService {
    store: Arc<StockStore>,
}

/// Poka selected for sale at one location
#[derive(Debug, Clone, Deserialize)]
pub struct SaleInput {
    pub date: Option<NaiveDate>,
    pub poka_ids: Vec<Uuid>,
}

impl SalesService {
    pub fn new(store: Arc<StockStore>) -> Self {
        Self { store }
    }

    /// Sell the selected Poka out of `location`
    pub async fn record_sale(&self, location: Location, input: SaleInput) -> AppResult<SaleResult> {
        let date = input.date.unwrap_or_else(super::today);

        let result = match location {
            Location::Biratnagar => self
                .store
                .biratnagar()
                .await
                .record_sale(date, &input.poka_ids),
            Location::Birgunj => self.store.birgunj().await.record_sale(date, &input.poka_ids),
        };

        let result = result.inspect_err(|e| {
            tracing::warn!(
                location = %location,
                date = %date,
                count = input.poka_ids.len(),
                "Sale rejected: {}",
                e
            )
        })?;

        tracing::info!(
            location = %location,
            date = %date,
            count = result.items.len(),
            meter = %result.total_meter,
            kg = %result.total_kg,
            "Recorded sale"
        );
        self.store.persist().await;
        Ok(result)
    }
}
