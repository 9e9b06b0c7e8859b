//! Daily ledger entry models
//!
//! Every ledger keeps one entry per calendar date. An entry's derived fields
//! (total, balance) are always re-derived from its opening balance and the
//! day's cumulative movements, never adjusted by a delta.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::Location;
use crate::types::{checked_add, checked_sub, Measure, QuantityOverflow};

/// Default fabric conversion: 1 kg = 4.5 meters
pub const DEFAULT_METERS_PER_KG: Decimal = Decimal::from_parts(45, 0, 0, false, 1);

/// Estimate fabric length for a mass (display only, never used to validate)
pub fn estimate_meters(kg: Decimal, meters_per_kg: Decimal) -> Decimal {
    kg.saturating_mul(meters_per_kg).round_dp(2)
}

/// Estimate fabric mass for a length (display only, never used to validate)
pub fn estimate_kg(meter: Decimal, meters_per_kg: Decimal) -> Decimal {
    meter
        .checked_div(meters_per_kg)
        .map_or(Decimal::ZERO, |kg| kg.round_dp(2))
}

/// Behaviour shared by all daily balance sheets
pub trait DailyEntry: Clone + PartialEq {
    type Balance: Copy + PartialEq + std::fmt::Debug;

    /// Create an empty entry for `date` carrying `opening` forward
    fn open(date: NaiveDate, opening: Self::Balance) -> Self;

    fn date(&self) -> NaiveDate;

    fn opening(&self) -> Self::Balance;

    fn closing(&self) -> Self::Balance;

    /// Re-derive total and closing from the opening and the day's movements
    fn recompute(&mut self) -> Result<(), QuantityOverflow>;

    /// Whether the entry implies non-negative physical stock
    fn is_sound(&self) -> bool;

    /// Replace the opening balance and re-derive everything downstream of it
    fn reopen(&mut self, opening: Self::Balance) -> Result<(), QuantityOverflow>;

    /// Whether the stored derived fields match a fresh derivation
    fn is_consistent(&self) -> bool {
        let mut fresh = self.clone();
        fresh.recompute().is_ok() && fresh == *self
    }
}

/// Finished-goods ledgers that own an active Poka set
pub trait LocationEntry: DailyEntry<Balance = Measure> {
    const LOCATION: Location;

    fn add_sales(&mut self, sold: Measure) -> Result<(), QuantityOverflow>;

    fn sales(&self) -> Measure;
}

// ============================================================================
// Yarn
// ============================================================================

/// Raw yarn balance sheet for one day (kg)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YarnEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub opening_balance: Decimal,
    pub purchase: Decimal,
    pub total: Decimal,
    pub consumption: Decimal,
    pub wastage: Decimal,
    pub balance: Decimal,
}

impl YarnEntry {
    pub fn add_movement(
        &mut self,
        purchase: Decimal,
        consumption: Decimal,
        wastage: Decimal,
    ) -> Result<(), QuantityOverflow> {
        self.purchase = checked_add(self.purchase, purchase)?;
        self.consumption = checked_add(self.consumption, consumption)?;
        self.wastage = checked_add(self.wastage, wastage)?;
        self.recompute()
    }
}

impl DailyEntry for YarnEntry {
    type Balance = Decimal;

    fn open(date: NaiveDate, opening: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            opening_balance: opening,
            purchase: Decimal::ZERO,
            total: opening,
            consumption: Decimal::ZERO,
            wastage: Decimal::ZERO,
            balance: opening,
        }
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn opening(&self) -> Decimal {
        self.opening_balance
    }

    fn closing(&self) -> Decimal {
        self.balance
    }

    fn recompute(&mut self) -> Result<(), QuantityOverflow> {
        self.total = checked_add(self.opening_balance, self.purchase)?;
        self.balance = checked_sub(checked_sub(self.total, self.consumption)?, self.wastage)?;
        Ok(())
    }

    fn is_sound(&self) -> bool {
        [self.purchase, self.consumption, self.wastage, self.balance]
            .iter()
            .all(|q| *q >= Decimal::ZERO)
    }

    fn reopen(&mut self, opening: Decimal) -> Result<(), QuantityOverflow> {
        self.opening_balance = opening;
        self.recompute()
    }
}

// ============================================================================
// Grey (unfinished) fabric
// ============================================================================

/// Grey fabric balance sheet for one day (kg)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GreyFabricEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub opening_balance: Decimal,
    pub receive: Decimal,
    pub total: Decimal,
    /// Estimated from `finished_goods_kg`; not part of the balance
    pub finished_goods_meter: Decimal,
    pub finished_goods_kg: Decimal,
    pub balance: Decimal,
}

impl GreyFabricEntry {
    pub fn add_movement(
        &mut self,
        receive: Decimal,
        finished_goods_kg: Decimal,
        meters_per_kg: Decimal,
    ) -> Result<(), QuantityOverflow> {
        self.receive = checked_add(self.receive, receive)?;
        self.finished_goods_kg = checked_add(self.finished_goods_kg, finished_goods_kg)?;
        // Whole meters, as on the paper stock sheet
        self.finished_goods_meter = self
            .finished_goods_kg
            .checked_mul(meters_per_kg)
            .ok_or(QuantityOverflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        self.recompute()
    }
}

impl DailyEntry for GreyFabricEntry {
    type Balance = Decimal;

    fn open(date: NaiveDate, opening: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            opening_balance: opening,
            receive: Decimal::ZERO,
            total: opening,
            finished_goods_meter: Decimal::ZERO,
            finished_goods_kg: Decimal::ZERO,
            balance: opening,
        }
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn opening(&self) -> Decimal {
        self.opening_balance
    }

    fn closing(&self) -> Decimal {
        self.balance
    }

    fn recompute(&mut self) -> Result<(), QuantityOverflow> {
        self.total = checked_add(self.opening_balance, self.receive)?;
        self.balance = checked_sub(self.total, self.finished_goods_kg)?;
        Ok(())
    }

    fn is_sound(&self) -> bool {
        [self.receive, self.finished_goods_kg, self.finished_goods_meter, self.balance]
            .iter()
            .all(|q| *q >= Decimal::ZERO)
    }

    fn reopen(&mut self, opening: Decimal) -> Result<(), QuantityOverflow> {
        self.opening_balance = opening;
        self.recompute()
    }
}

// ============================================================================
// Biratnagar production
// ============================================================================

/// Finished goods at the Biratnagar production site for one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub opening_balance_meter: Decimal,
    pub opening_balance_kg: Decimal,
    pub production_meter: Decimal,
    pub production_kg: Decimal,
    pub sales_meter: Decimal,
    pub sales_kg: Decimal,
    pub transfer_meter: Decimal,
    pub transfer_kg: Decimal,
    pub balance_meter: Decimal,
    pub balance_kg: Decimal,
}

impl ProductionEntry {
    pub fn production(&self) -> Measure {
        Measure::new(self.production_meter, self.production_kg)
    }

    pub fn transfer(&self) -> Measure {
        Measure::new(self.transfer_meter, self.transfer_kg)
    }

    pub fn add_production(&mut self, produced: Measure) -> Result<(), QuantityOverflow> {
        let production = self.production().checked_add(produced)?;
        self.production_meter = production.meter;
        self.production_kg = production.kg;
        self.recompute()
    }

    pub fn add_transfer(&mut self, moved: Measure) -> Result<(), QuantityOverflow> {
        let transfer = self.transfer().checked_add(moved)?;
        self.transfer_meter = transfer.meter;
        self.transfer_kg = transfer.kg;
        self.recompute()
    }
}

impl DailyEntry for ProductionEntry {
    type Balance = Measure;

    fn open(date: NaiveDate, opening: Measure) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            opening_balance_meter: opening.meter,
            opening_balance_kg: opening.kg,
            production_meter: Decimal::ZERO,
            production_kg: Decimal::ZERO,
            sales_meter: Decimal::ZERO,
            sales_kg: Decimal::ZERO,
            transfer_meter: Decimal::ZERO,
            transfer_kg: Decimal::ZERO,
            balance_meter: opening.meter,
            balance_kg: opening.kg,
        }
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn opening(&self) -> Measure {
        Measure::new(self.opening_balance_meter, self.opening_balance_kg)
    }

    fn closing(&self) -> Measure {
        Measure::new(self.balance_meter, self.balance_kg)
    }

    fn recompute(&mut self) -> Result<(), QuantityOverflow> {
        let balance = self
            .opening()
            .checked_add(self.production())?
            .checked_sub(self.sales())?
            .checked_sub(self.transfer())?;
        self.balance_meter = balance.meter;
        self.balance_kg = balance.kg;
        Ok(())
    }

    fn is_sound(&self) -> bool {
        [self.production(), self.sales(), self.transfer(), self.closing()]
            .iter()
            .all(|m| !m.is_negative())
    }

    fn reopen(&mut self, opening: Measure) -> Result<(), QuantityOverflow> {
        self.opening_balance_meter = opening.meter;
        self.opening_balance_kg = opening.kg;
        self.recompute()
    }
}

impl LocationEntry for ProductionEntry {
    const LOCATION: Location = Location::Biratnagar;

    fn add_sales(&mut self, sold: Measure) -> Result<(), QuantityOverflow> {
        let sales = self.sales().checked_add(sold)?;
        self.sales_meter = sales.meter;
        self.sales_kg = sales.kg;
        self.recompute()
    }

    fn sales(&self) -> Measure {
        Measure::new(self.sales_meter, self.sales_kg)
    }
}

// ============================================================================
// Birgunj godown
// ============================================================================

/// Finished goods at the Birgunj godown for one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GodownEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub opening_balance_meter: Decimal,
    pub opening_balance_kg: Decimal,
    pub received_meter: Decimal,
    pub received_kg: Decimal,
    pub total_available_meter: Decimal,
    pub total_available_kg: Decimal,
    pub sales_meter: Decimal,
    pub sales_kg: Decimal,
    pub balance_meter: Decimal,
    pub balance_kg: Decimal,
}

impl GodownEntry {
    pub fn received(&self) -> Measure {
        Measure::new(self.received_meter, self.received_kg)
    }

    pub fn total_available(&self) -> Measure {
        Measure::new(self.total_available_meter, self.total_available_kg)
    }

    pub fn add_received(&mut self, received: Measure) -> Result<(), QuantityOverflow> {
        let total = self.received().checked_add(received)?;
        self.received_meter = total.meter;
        self.received_kg = total.kg;
        self.recompute()
    }
}

impl DailyEntry for GodownEntry {
    type Balance = Measure;

    fn open(date: NaiveDate, opening: Measure) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            opening_balance_meter: opening.meter,
            opening_balance_kg: opening.kg,
            received_meter: Decimal::ZERO,
            received_kg: Decimal::ZERO,
            total_available_meter: opening.meter,
            total_available_kg: opening.kg,
            sales_meter: Decimal::ZERO,
            sales_kg: Decimal::ZERO,
            balance_meter: opening.meter,
            balance_kg: opening.kg,
        }
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn opening(&self) -> Measure {
        Measure::new(self.opening_balance_meter, self.opening_balance_kg)
    }

    fn closing(&self) -> Measure {
        Measure::new(self.balance_meter, self.balance_kg)
    }

    fn recompute(&mut self) -> Result<(), QuantityOverflow> {
        let available = self.opening().checked_add(self.received())?;
        self.total_available_meter = available.meter;
        self.total_available_kg = available.kg;

        let balance = available.checked_sub(self.sales())?;
        self.balance_meter = balance.meter;
        self.balance_kg = balance.kg;
        Ok(())
    }

    fn is_sound(&self) -> bool {
        [self.received(), self.sales(), self.closing()]
            .iter()
            .all(|m| !m.is_negative())
    }

    fn reopen(&mut self, opening: Measure) -> Result<(), QuantityOverflow> {
        self.opening_balance_meter = opening.meter;
        self.opening_balance_kg = opening.kg;
        self.recompute()
    }
}

impl LocationEntry for GodownEntry {
    const LOCATION: Location = Location::Birgunj;

    fn add_sales(&mut self, sold: Measure) -> Result<(), QuantityOverflow> {
        let sales = self.sales().checked_add(sold)?;
        self.sales_meter = sales.meter;
        self.sales_kg = sales.kg;
        self.recompute()
    }

    fn sales(&self) -> Measure {
        Measure::new(self.sales_meter, self.sales_kg)
    }
}

// ============================================================================
// Ledger selection
// ============================================================================

/// The four balance sheets kept by the store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Yarn,
    GreyFabric,
    Biratnagar,
    Birgunj,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Yarn => "yarn",
            LedgerKind::GreyFabric => "grey_fabric",
            LedgerKind::Biratnagar => "biratnagar",
            LedgerKind::Birgunj => "birgunj",
        }
    }
}

impl From<Location> for LedgerKind {
    fn from(location: Location) -> Self {
        match location {
            Location::Biratnagar => LedgerKind::Biratnagar,
            Location::Birgunj => LedgerKind::Birgunj,
        }
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerKind::Yarn => write!(f, "Yarn"),
            LedgerKind::GreyFabric => write!(f, "Grey Fabric"),
            LedgerKind::Biratnagar => write!(f, "Biratnagar Finished Goods"),
            LedgerKind::Birgunj => write!(f, "Birgunj Godown"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown ledger: {0}. Use yarn, grey_fabric, biratnagar or birgunj")]
pub struct ParseLedgerKindError(pub String);

impl std::str::FromStr for LedgerKind {
    type Err = ParseLedgerKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yarn" => Ok(LedgerKind::Yarn),
            "grey_fabric" | "grey-fabric" | "greyfabric" | "unfinished" => {
                Ok(LedgerKind::GreyFabric)
            }
            "biratnagar" => Ok(LedgerKind::Biratnagar),
            "birgunj" | "birgun" => Ok(LedgerKind::Birgunj),
            _ => Err(ParseLedgerKindError(s.to_string())),
        }
    }
}

/// Entries of one ledger, tagged with the ledger they came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "ledger", content = "entries", rename_all = "snake_case")]
pub enum LedgerRows {
    Yarn(Vec<YarnEntry>),
    GreyFabric(Vec<GreyFabricEntry>),
    Biratnagar(Vec<ProductionEntry>),
    Birgunj(Vec<GodownEntry>),
}

impl LedgerRows {
    pub fn len(&self) -> usize {
        match self {
            LedgerRows::Yarn(rows) => rows.len(),
            LedgerRows::GreyFabric(rows) => rows.len(),
            LedgerRows::Biratnagar(rows) => rows.len(),
            LedgerRows::Birgunj(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_default_ratio() {
        assert_eq!(DEFAULT_METERS_PER_KG, dec("4.5"));
    }

    #[test]
    fn test_estimates() {
        assert_eq!(estimate_meters(dec("22"), DEFAULT_METERS_PER_KG), dec("99"));
        assert_eq!(estimate_kg(dec("100"), DEFAULT_METERS_PER_KG), dec("22.22"));
        assert_eq!(estimate_kg(dec("100"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_yarn_balance_derivation() {
        let mut entry = YarnEntry::open(day(1), dec("5000"));
        entry.add_movement(dec("400"), dec("350"), dec("12")).unwrap();

        assert_eq!(entry.total, dec("5400"));
        assert_eq!(entry.balance, dec("5038"));
        assert!(entry.is_sound());
        assert!(entry.is_consistent());
    }

    #[test]
    fn test_yarn_accumulates_movements() {
        let mut entry = YarnEntry::open(day(1), dec("100"));
        entry.add_movement(dec("50"), dec("20"), dec("0")).unwrap();
        entry.add_movement(dec("10"), dec("30"), dec("5")).unwrap();

        assert_eq!(entry.purchase, dec("60"));
        assert_eq!(entry.consumption, dec("50"));
        assert_eq!(entry.balance, dec("105"));
    }

    #[test]
    fn test_yarn_negative_balance_is_unsound() {
        let mut entry = YarnEntry::open(day(1), dec("10"));
        entry.add_movement(dec("0"), dec("11"), dec("0")).unwrap();
        assert!(!entry.is_sound());
    }

    #[test]
    fn test_grey_fabric_estimates_meter() {
        let mut entry = GreyFabricEntry::open(day(1), dec("3000"));
        entry.add_movement(dec("250"), dec("201"), DEFAULT_METERS_PER_KG).unwrap();

        // 201 * 4.5 = 904.5, rounded half away from zero
        assert_eq!(entry.finished_goods_meter, dec("905"));
        assert_eq!(entry.total, dec("3250"));
        assert_eq!(entry.balance, dec("3049"));
    }

    #[test]
    fn test_production_balance() {
        let mut entry = ProductionEntry::open(day(1), Measure::ZERO);
        entry.add_production(Measure::new(dec("250"), dec("55"))).unwrap();
        entry.add_transfer(Measure::new(dec("100"), dec("22"))).unwrap();
        entry.add_sales(Measure::new(dec("50"), dec("11"))).unwrap();

        assert_eq!(entry.closing(), Measure::new(dec("100"), dec("22")));
        assert!(entry.is_sound());
    }

    #[test]
    fn test_godown_total_available() {
        let mut entry = GodownEntry::open(day(1), Measure::new(dec("8000"), dec("1800")));
        entry.add_received(Measure::new(dec("100"), dec("22"))).unwrap();
        entry.add_sales(Measure::new(dec("100"), dec("22"))).unwrap();

        assert_eq!(entry.total_available(), Measure::new(dec("8100"), dec("1822")));
        assert_eq!(entry.closing(), Measure::new(dec("8000"), dec("1800")));
    }

    #[test]
    fn test_reopen_rederives_balance() {
        let mut entry = ProductionEntry::open(day(2), Measure::ZERO);
        entry.add_production(Measure::new(dec("10"), dec("2"))).unwrap();
        entry.reopen(Measure::new(dec("100"), dec("20"))).unwrap();

        assert_eq!(entry.closing(), Measure::new(dec("110"), dec("22")));
        assert!(entry.is_consistent());
    }

    #[test]
    fn test_overflowing_movement_is_reported() {
        let mut entry = YarnEntry::open(day(1), dec("0"));
        entry.add_movement(Decimal::MAX, dec("0"), dec("0")).unwrap();

        let result = entry.add_movement(Decimal::MAX, dec("0"), dec("0"));
        assert_eq!(result, Err(QuantityOverflow));

        let mut godown = GodownEntry::open(day(1), Measure::new(Decimal::MAX, dec("0")));
        assert!(godown.add_received(Measure::new(dec("1"), dec("0"))).is_err());
    }

    #[test]
    fn test_overflowing_stored_entry_is_inconsistent() {
        let mut entry = YarnEntry::open(day(1), Decimal::MAX);
        entry.purchase = Decimal::MAX;
        assert!(!entry.is_consistent());
    }

    #[test]
    fn test_tampered_entry_is_inconsistent() {
        let mut entry = YarnEntry::open(day(1), dec("100"));
        entry.balance = dec("99");
        assert!(!entry.is_consistent());
    }

    #[test]
    fn test_parse_ledger_kind() {
        assert_eq!(LedgerKind::from_str("grey-fabric"), Ok(LedgerKind::GreyFabric));
        assert_eq!(LedgerKind::from_str("Yarn"), Ok(LedgerKind::Yarn));
        assert_eq!(LedgerKind::from(Location::Birgunj), LedgerKind::Birgunj);
        assert!(LedgerKind::from_str("cotton").is_err());
    }

    #[test]
    fn test_ledger_rows_json_shape() {
        let rows = LedgerRows::GreyFabric(vec![GreyFabricEntry::open(day(1), dec("10"))]);
        let value = serde_json::to_value(&rows).unwrap();

        assert_eq!(value["ledger"], "grey_fabric");
        assert_eq!(value["entries"][0]["opening_balance"], "10");
        assert_eq!(value["entries"][0]["date"], "2024-06-01");
    }
}
