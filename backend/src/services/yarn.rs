//! Yarn ledger service

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_movement, validate_not_all_zero, DateRange, YarnEntry};

use crate::error::{AppError, AppResult};
use crate::store::StockStore;

#[derive(Clone)]
pub struct YarnService {
    store: Arc<StockStore>,
}

/// One yarn movement; components left out count as 0
#[derive(Debug, Clone, Deserialize)]
pub struct YarnMovementInput {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub purchase: Decimal,
    #[serde(default)]
    pub consumption: Decimal,
    #[serde(default)]
    pub wastage: Decimal,
}

impl YarnMovementInput {
    fn validate(&self) -> AppResult<()> {
        for (field, value) in [
            ("purchase", self.purchase),
            ("consumption", self.consumption),
            ("wastage", self.wastage),
        ] {
            validate_movement(value).map_err(|msg| AppError::validation(field, msg))?;
        }
        validate_not_all_zero(&[self.purchase, self.consumption, self.wastage])
            .map_err(|msg| AppError::validation("purchase", msg))
    }
}

impl YarnService {
    pub fn new(store: Arc<StockStore>) -> Self {
        Self { store }
    }

    /// Add a movement to the yarn entry for the date, creating it if needed
    pub async fn add_yarn_entry(&self, input: YarnMovementInput) -> AppResult<YarnEntry> {
        if let Err(e) = input.validate() {
            tracing::warn!("Yarn movement rejected: {}", e);
            return Err(e);
        }
        let date = input.date.unwrap_or_else(super::today);

        let entry = {
            let mut ledger = self.store.yarn().await;
            let plan = ledger
                .plan(date, |entry| {
                    entry.add_movement(input.purchase, input.consumption, input.wastage)
                })
                .inspect_err(|e| tracing::warn!(date = %date, "Yarn movement rejected: {}", e))?;
            ledger.commit(plan)
        };

        tracing::info!(
            date = %date,
            purchase = %input.purchase,
            consumption = %input.consumption,
            wastage = %input.wastage,
            balance = %entry.balance,
            "Recorded yarn movement"
        );
        self.store.persist().await;
        Ok(entry)
    }

    pub async fn list_entries(&self, range: DateRange) -> Vec<YarnEntry> {
        self.store.yarn().await.range(range)
    }
}
