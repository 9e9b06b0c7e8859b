//! Dashboard projections

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LedgerKind, Location, PokaTotals};
use crate::types::Measure;

/// Headline figures for the stock dashboard
///
/// Balances come from the latest entry of each ledger; the `today_*`
/// figures come from entries dated `as_of` and are 0 when there is none.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub as_of: Option<NaiveDate>,
    pub yarn_balance: Decimal,
    pub grey_fabric_balance: Decimal,
    pub biratnagar_meter: Decimal,
    pub biratnagar_kg: Decimal,
    pub birgunj_meter: Decimal,
    pub birgunj_kg: Decimal,
    pub today_production: Decimal,
    pub today_transfers: Decimal,
    pub today_sales: Decimal,
}

/// A ledger whose latest kg balance has dropped below the configured threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LowStockAlert {
    pub ledger: LedgerKind,
    pub balance_kg: Decimal,
    pub threshold_kg: Decimal,
}

/// Ledger closing versus tracked Poka stock at one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub location: Location,
    pub ledger_balance: Measure,
    pub active: PokaTotals,
    /// `ledger_balance - active`; non-zero means untracked opening stock
    pub difference: Measure,
}

impl ReconciliationReport {
    pub fn new(location: Location, ledger_balance: Measure, active: PokaTotals) -> Self {
        Self {
            location,
            ledger_balance,
            active,
            difference: ledger_balance - active.measure(),
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.difference.is_zero()
    }
}
