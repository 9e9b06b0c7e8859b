//! Read access to any of the four daily ledgers

use std::sync::Arc;

use shared::{DateRange, LedgerKind, LedgerRows};

use crate::error::{AppError, AppResult};
use crate::store::StockStore;

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<StockStore>,
}

impl LedgerService {
    pub fn new(store: Arc<StockStore>) -> Self {
        Self { store }
    }

    /// Entries of one ledger within an inclusive date range, ascending by date
    pub async fn list_entries(&self, kind: LedgerKind, range: DateRange) -> AppResult<LedgerRows> {
        if range.is_inverted() {
            return Err(AppError::validation("start", "Start date must not be after end date"));
        }

        let rows = match kind {
            LedgerKind::Yarn => LedgerRows::Yarn(self.store.yarn().await.range(range)),
            LedgerKind::GreyFabric => {
                LedgerRows::GreyFabric(self.store.grey_fabric().await.range(range))
            }
            LedgerKind::Biratnagar => {
                LedgerRows::Biratnagar(self.store.biratnagar().await.ledger().range(range))
            }
            LedgerKind::Birgunj => {
                LedgerRows::Birgunj(self.store.birgunj().await.ledger().range(range))
            }
        };

        tracing::debug!(ledger = kind.as_str(), rows = rows.len(), "Listed ledger entries");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StockConfig;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_list_entries_filters_by_range() {
        let store = Arc::new(StockStore::new(StockConfig::default()));
        {
            let mut yarn = store.yarn().await;
            for d in 1..=4 {
                let plan = yarn
                    .plan(day(d), |e| e.add_movement(Decimal::TEN, Decimal::ZERO, Decimal::ZERO))
                    .unwrap();
                yarn.commit(plan);
            }
        }
        let service = LedgerService::new(store);

        let rows = service
            .list_entries(LedgerKind::Yarn, DateRange::new(Some(day(2)), None))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);

        let empty = service.list_entries(LedgerKind::Birgunj, DateRange::all()).await.unwrap();
        assert!(matches!(empty, LedgerRows::Birgunj(ref rows) if rows.is_empty()));
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let service = LedgerService::new(Arc::new(StockStore::new(StockConfig::default())));
        let result = service
            .list_entries(LedgerKind::Yarn, DateRange::new(Some(day(5)), Some(day(1))))
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
