//! Biratnagar to Birgunj transfer service

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use shared::TransferResult;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{self, StockStore};

#[derive(Clone)]
pub struct TransferService {
    store: Arc<StockStore>,
}

/// Poka selected at Biratnagar for dispatch to Birgunj
#[derive(Debug, Clone, Deserialize)]
pub struct TransferInput {
    pub date: Option<NaiveDate>,
    pub poka_ids: Vec<Uuid>,
}

impl TransferService {
    pub fn new(store: Arc<StockStore>) -> Self {
        Self { store }
    }

    /// Move the selected Poka and both ledger sides as one unit
    pub async fn transfer(&self, input: TransferInput) -> AppResult<TransferResult> {
        let date = input.date.unwrap_or_else(super::today);

        let result = {
            let mut biratnagar = self.store.biratnagar().await;
            let mut birgunj = self.store.birgunj().await;
            store::transfer(&mut biratnagar, &mut birgunj, date, &input.poka_ids)
        };

        let result = match result {
            Ok(result) => result,
            Err(e @ AppError::NonAtomicFailure(_)) => {
                let count = input.poka_ids.len();
                tracing::error!(date = %date, count, "Transfer rolled back: {}", e);
                return Err(e);
            }
            Err(e) => {
                let count = input.poka_ids.len();
                tracing::warn!(date = %date, count, "Transfer rejected: {}", e);
                return Err(e);
            }
        };

        tracing::info!(
            date = %date,
            count = result.items.len(),
            meter = %result.total_meter,
            kg = %result.total_kg,
            "Transferred Poka from Biratnagar to Birgunj"
        );
        self.store.persist().await;
        Ok(result)
    }
}
