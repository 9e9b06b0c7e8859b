//! Dashboard aggregation over all four ledgers

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{
    is_low_stock, DailyEntry, DashboardStats, LedgerKind, LocationEntry, LowStockAlert, Measure,
};

use crate::store::StockStore;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<StockStore>,
}

impl DashboardService {
    pub fn new(store: Arc<StockStore>) -> Self {
        Self { store }
    }

    pub async fn summary(&self) -> DashboardStats {
        self.summary_for(super::today()).await
    }

    /// Latest balances plus the movements dated `today`
    ///
    /// A ledger with no entries reports 0, whatever its configured opening.
    pub async fn summary_for(&self, today: NaiveDate) -> DashboardStats {
        let yarn = self.store.yarn().await;
        let grey_fabric = self.store.grey_fabric().await;
        let biratnagar = self.store.biratnagar().await;
        let birgunj = self.store.birgunj().await;

        let biratnagar_balance = biratnagar
            .ledger()
            .latest()
            .map_or(Measure::ZERO, |e| e.closing());
        let birgunj_balance = birgunj
            .ledger()
            .latest()
            .map_or(Measure::ZERO, |e| e.closing());
        let production_today = biratnagar.ledger().get(today);
        let godown_today = birgunj.ledger().get(today);

        DashboardStats {
            as_of: Some(today),
            yarn_balance: yarn.latest().map_or(Decimal::ZERO, |e| e.closing()),
            grey_fabric_balance: grey_fabric.latest().map_or(Decimal::ZERO, |e| e.closing()),
            biratnagar_meter: biratnagar_balance.meter,
            biratnagar_kg: biratnagar_balance.kg,
            birgunj_meter: birgunj_balance.meter,
            birgunj_kg: birgunj_balance.kg,
            today_production: production_today.map_or(Decimal::ZERO, |e| e.production_kg),
            today_transfers: production_today.map_or(Decimal::ZERO, |e| e.transfer_kg),
            today_sales: production_today
                .map_or(Decimal::ZERO, |e| e.sales().kg)
                .saturating_add(godown_today.map_or(Decimal::ZERO, |e| e.sales().kg)),
        }
    }

    /// Ledgers whose latest kg balance is below the configured threshold
    pub async fn low_stock_alerts(&self) -> Vec<LowStockAlert> {
        let threshold_kg = self.store.settings().low_stock_threshold_kg;
        let balances = [
            (LedgerKind::Yarn, self.store.yarn().await.current_balance()),
            (LedgerKind::GreyFabric, self.store.grey_fabric().await.current_balance()),
            (
                LedgerKind::Biratnagar,
                self.store.biratnagar().await.ledger().current_balance().kg,
            ),
            (
                LedgerKind::Birgunj,
                self.store.birgunj().await.ledger().current_balance().kg,
            ),
        ];

        let alerts: Vec<LowStockAlert> = balances
            .into_iter()
            .filter(|(_, balance_kg)| is_low_stock(*balance_kg, threshold_kg))
            .map(|(ledger, balance_kg)| LowStockAlert {
                ledger,
                balance_kg,
                threshold_kg,
            })
            .collect();

        for alert in &alerts {
            tracing::warn!(
                ledger = alert.ledger.as_str(),
                balance_kg = %alert.balance_kg,
                threshold_kg = %threshold_kg,
                "Low stock"
            );
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StockConfig;
    use crate::store::transfer;
    use shared::PokaInput;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[tokio::test]
    async fn test_empty_store_summary_is_zero() {
        let service = DashboardService::new(Arc::new(StockStore::new(StockConfig::default())));
        let stats = service.summary_for(day(1)).await;

        assert_eq!(stats.as_of, Some(day(1)));
        assert_eq!(stats.yarn_balance, Decimal::ZERO);
        assert_eq!(stats.birgunj_kg, Decimal::ZERO);
        assert_eq!(stats.today_sales, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_empty_ledgers_report_zero_despite_configured_opening() {
        let settings = StockConfig {
            yarn_opening_kg: dec(5000),
            grey_fabric_opening_kg: dec(3000),
            birgunj_opening: Measure::new(dec(8000), dec(1800)),
            ..StockConfig::default()
        };
        let store = Arc::new(StockStore::new(settings));
        let service = DashboardService::new(store.clone());

        let stats = service.summary_for(day(1)).await;
        assert_eq!(stats.yarn_balance, Decimal::ZERO);
        assert_eq!(stats.grey_fabric_balance, Decimal::ZERO);
        assert_eq!(stats.birgunj_meter, Decimal::ZERO);
        assert_eq!(stats.birgunj_kg, Decimal::ZERO);
        assert_eq!(stats.today_production, Decimal::ZERO);
        assert_eq!(stats.today_sales, Decimal::ZERO);

        // The first entry carries the configured opening forward
        {
            let mut yarn = store.yarn().await;
            let plan = yarn
                .plan(day(1), |entry| entry.add_movement(dec(400), dec(350), dec(12)))
                .unwrap();
            yarn.commit(plan);
        }
        let stats = service.summary_for(day(1)).await;
        assert_eq!(stats.yarn_balance, dec(5038));
    }

    #[tokio::test]
    async fn test_summary_for_day() {
        let store = Arc::new(StockStore::new(StockConfig::default()));
        {
            let mut biratnagar = store.biratnagar().await;
            let mut birgunj = store.birgunj().await;
            let produced = biratnagar
                .record_production(
                    day(2),
                    &[
                        PokaInput::new("P1", "SH-01", dec(100), dec(22)),
                        PokaInput::new("P2", "SH-01", dec(150), dec(33)),
                        PokaInput::new("P3", "SH-02", dec(80), dec(18)),
                    ],
                )
                .unwrap();
            let ids: Vec<_> = produced.items.iter().map(|item| item.id).collect();
            transfer(&mut biratnagar, &mut birgunj, day(2), &ids[..2]).unwrap();
            biratnagar.record_sale(day(2), &ids[2..]).unwrap();
            birgunj.record_sale(day(2), &ids[..1]).unwrap();
        }
        let service = DashboardService::new(store);

        let stats = service.summary_for(day(2)).await;
        assert_eq!(stats.today_production, dec(73));
        assert_eq!(stats.today_transfers, dec(55));
        assert_eq!(stats.today_sales, dec(40));
        assert_eq!(stats.biratnagar_kg, Decimal::ZERO);
        assert_eq!(stats.birgunj_meter, dec(150));
        assert_eq!(stats.birgunj_kg, dec(33));

        // Another day keeps the latest balances but has no movements
        let next = service.summary_for(day(3)).await;
        assert_eq!(next.birgunj_kg, dec(33));
        assert_eq!(next.today_production, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_low_stock_alerts() {
        let settings = StockConfig {
            yarn_opening_kg: dec(5000),
            grey_fabric_opening_kg: dec(100),
            biratnagar_opening: Measure::new(dec(9000), dec(2000)),
            birgunj_opening: Measure::new(dec(8000), dec(1800)),
            ..StockConfig::default()
        };
        let service = DashboardService::new(Arc::new(StockStore::new(settings)));

        let alerts = service.low_stock_alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].ledger, LedgerKind::GreyFabric);
        assert_eq!(alerts[0].threshold_kg, dec(500));
    }
}
