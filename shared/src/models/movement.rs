//! Results of stock movements (production, sale, transfer)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{GodownEntry, Location, PokaItem, ProductionEntry};

/// Ledger row of either finished-goods location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "location", content = "entry", rename_all = "lowercase")]
pub enum FinishedGoodsEntry {
    Biratnagar(ProductionEntry),
    Birgunj(GodownEntry),
}

impl From<ProductionEntry> for FinishedGoodsEntry {
    fn from(entry: ProductionEntry) -> Self {
        FinishedGoodsEntry::Biratnagar(entry)
    }
}

impl From<GodownEntry> for FinishedGoodsEntry {
    fn from(entry: GodownEntry) -> Self {
        FinishedGoodsEntry::Birgunj(entry)
    }
}

/// Outcome of recording a production batch at Biratnagar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionResult {
    pub date: NaiveDate,
    pub items: Vec<PokaItem>,
    pub total_meter: Decimal,
    pub total_kg: Decimal,
    pub entry: ProductionEntry,
}

/// Outcome of a sale at either location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleResult {
    pub location: Location,
    pub date: NaiveDate,
    pub items: Vec<PokaItem>,
    pub total_meter: Decimal,
    pub total_kg: Decimal,
    pub entry: FinishedGoodsEntry,
}

/// Outcome of a Biratnagar to Birgunj transfer, for operator confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub date: NaiveDate,
    pub items: Vec<PokaItem>,
    pub total_meter: Decimal,
    pub total_kg: Decimal,
    pub biratnagar_entry: ProductionEntry,
    pub birgunj_entry: GodownEntry,
}
