//! Grey (unfinished) fabric ledger service

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_movement, validate_not_all_zero, DateRange, GreyFabricEntry};

use crate::error::{AppError, AppResult};
use crate::store::StockStore;

#[derive(Clone)]
pub struct GreyFabricService {
    store: Arc<StockStore>,
}

/// One grey fabric movement in kg; the finished-goods meter figure is estimated
#[derive(Debug, Clone, Deserialize)]
pub struct GreyFabricMovementInput {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub receive: Decimal,
    #[serde(default)]
    pub finished_goods_kg: Decimal,
}

impl GreyFabricMovementInput {
    fn validate(&self) -> AppResult<()> {
        validate_movement(self.receive).map_err(|msg| AppError::validation("receive", msg))?;
        validate_movement(self.finished_goods_kg)
            .map_err(|msg| AppError::validation("finished_goods_kg", msg))?;
        validate_not_all_zero(&[self.receive, self.finished_goods_kg])
            .map_err(|msg| AppError::validation("receive", msg))
    }
}

impl GreyFabricService {
    pub fn new(store: Arc<StockStore>) -> Self {
        Self { store }
    }

    /// Add a movement to the grey fabric entry for the date, creating it if needed
    pub async fn add_grey_fabric_entry(
        &self,
        input: GreyFabricMovementInput,
    ) -> AppResult<GreyFabricEntry> {
        if let Err(e) = input.validate() {
            tracing::warn!("Grey fabric movement rejected: {}", e);
            return Err(e);
        }
        let date = input.date.unwrap_or_else(super::today);
        let ratio = self.store.settings().meters_per_kg;

        let entry = {
            let mut ledger = self.store.grey_fabric().await;
            let plan = ledger
                .plan(date, |entry| {
                    entry.add_movement(input.receive, input.finished_goods_kg, ratio)
                })
                .inspect_err(|e| {
                    tracing::warn!(date = %date, "Grey fabric movement rejected: {}", e)
                })?;
            ledger.commit(plan)
        };

        tracing::info!(
            date = %date,
            receive = %input.receive,
            finished_goods_kg = %input.finished_goods_kg,
            finished_goods_meter = %entry.finished_goods_meter,
            balance = %entry.balance,
            "Recorded grey fabric movement"
        );
        self.store.persist().await;
        Ok(entry)
    }

    pub async fn list_entries(&self, range: DateRange) -> Vec<GreyFabricEntry> {
        self.store.grey_fabric().await.range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StockConfig;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn movement(receive: i64, finished_goods_kg: i64) -> GreyFabricMovementInput {
        GreyFabricMovementInput {
            date: Some(day(1)),
            receive: Decimal::from(receive),
            finished_goods_kg: Decimal::from(finished_goods_kg),
        }
    }

    fn service(settings: StockConfig) -> GreyFabricService {
        GreyFabricService::new(Arc::new(StockStore::new(settings)))
    }

    #[tokio::test]
    async fn test_add_grey_fabric_entry() {
        let service = service(StockConfig {
            grey_fabric_opening_kg: Decimal::from(3000),
            ..StockConfig::default()
        });
        let entry = service.add_grey_fabric_entry(movement(250, 201)).await.unwrap();

        assert_eq!(entry.total, Decimal::from(3250));
        assert_eq!(entry.finished_goods_meter, Decimal::from(905));
        assert_eq!(entry.balance, Decimal::from(3049));
    }

    #[tokio::test]
    async fn test_meter_estimate_follows_configured_ratio() {
        let service = service(StockConfig {
            meters_per_kg: Decimal::from(4),
            ..StockConfig::default()
        });
        service.add_grey_fabric_entry(movement(100, 10)).await.unwrap();
        let entry = service.add_grey_fabric_entry(movement(0, 15)).await.unwrap();

        assert_eq!(entry.finished_goods_kg, Decimal::from(25));
        assert_eq!(entry.finished_goods_meter, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_all_zero_rejected() {
        let service = service(StockConfig::default());
        assert!(matches!(
            service.add_grey_fabric_entry(movement(0, 0)).await,
            Err(AppError::Validation { .. })
        ));
    }
}
