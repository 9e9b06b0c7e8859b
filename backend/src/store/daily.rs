//! Generic date-keyed balance sheet
//!
//! Mutations go through two steps: `plan` applies a movement to a copy of the
//! day's entry and re-chains every later entry, failing without side effects if
//! any of them would imply negative stock; `commit` installs the planned rows
//! and cannot fail. Compound operations plan every ledger they touch before
//! committing any of them.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use chrono::NaiveDate;
use shared::{DailyEntry, DateRange, LedgerKind, QuantityOverflow};

use crate::error::{AppError, AppResult};

/// Pending rows for one ledger: the touched day and every re-chained later day
#[derive(Debug, Clone)]
pub struct LedgerPlan<E> {
    rows: Vec<E>,
}

impl<E: DailyEntry> LedgerPlan<E> {
    /// The entry for the touched day as it will look once committed
    pub fn entry(&self) -> &E {
        &self.rows[0]
    }
}

#[derive(Debug, Clone)]
pub struct DailyLedger<E: DailyEntry> {
    kind: LedgerKind,
    initial: E::Balance,
    entries: BTreeMap<NaiveDate, E>,
}

impl<E: DailyEntry> DailyLedger<E> {
    pub fn new(kind: LedgerKind, initial: E::Balance) -> Self {
        Self {
            kind,
            initial,
            entries: BTreeMap::new(),
        }
    }

    /// Rebuild a ledger from stored rows, checking every invariant
    pub fn from_entries(kind: LedgerKind, initial: E::Balance, rows: Vec<E>) -> AppResult<Self> {
        let mut entries = BTreeMap::new();
        for row in rows {
            let date = row.date();
            if entries.insert(date, row).is_some() {
                return Err(AppError::Storage(format!(
                    "{} ledger has two entries for {}",
                    kind, date
                )));
            }
        }

        let ledger = Self { kind, initial, entries };
        ledger.verify()?;
        Ok(ledger)
    }

    /// Check derivation, soundness and opening continuity of every entry
    ///
    /// The first entry must open at the configured initial balance.
    pub fn verify(&self) -> AppResult<()> {
        if let Some(first) = self.entries.values().next() {
            if first.opening() != self.initial {
                return Err(AppError::Storage(format!(
                    "{} entry for {} opens at {:?}, not the configured {:?}",
                    self.kind,
                    first.date(),
                    first.opening(),
                    self.initial
                )));
            }
        }

        let mut previous: Option<&E> = None;
        for entry in self.entries.values() {
            if !entry.is_consistent() {
                return Err(AppError::Storage(format!(
                    "{} entry for {} does not match opening + inbound - outbound",
                    self.kind,
                    entry.date()
                )));
            }
            if !entry.is_sound() {
                return Err(AppError::Storage(format!(
                    "{} entry for {} implies negative stock",
                    self.kind,
                    entry.date()
                )));
            }
            if let Some(prev) = previous {
                if entry.opening() != prev.closing() {
                    return Err(AppError::Storage(format!(
                        "{} entry for {} does not open at the closing of {}",
                        self.kind,
                        entry.date(),
                        prev.date()
                    )));
                }
            }
            previous = Some(entry);
        }
        Ok(())
    }

    pub fn kind(&self) -> LedgerKind {
        self.kind
    }

    pub fn initial(&self) -> E::Balance {
        self.initial
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&E> {
        self.entries.get(&date)
    }

    pub fn latest(&self) -> Option<&E> {
        self.entries.values().next_back()
    }

    /// Latest closing, or the configured initial balance for an empty ledger
    pub fn current_balance(&self) -> E::Balance {
        self.latest().map_or(self.initial, DailyEntry::closing)
    }

    pub fn entries(&self) -> impl Iterator<Item = &E> {
        self.entries.values()
    }

    /// Entries within `range`, ascending by date
    pub fn range(&self, range: DateRange) -> Vec<E> {
        self.entries
            .values()
            .filter(|entry| range.contains(entry.date()))
            .cloned()
            .collect()
    }

    /// Opening balance a new entry on `date` would carry
    pub fn opening_for(&self, date: NaiveDate) -> E::Balance {
        self.entries
            .range(..date)
            .next_back()
            .map_or(self.initial, |(_, entry)| entry.closing())
    }

    /// Apply `movement` to the entry for `date` without touching the ledger
    pub fn plan(
        &self,
        date: NaiveDate,
        movement: impl FnOnce(&mut E) -> Result<(), QuantityOverflow>,
    ) -> AppResult<LedgerPlan<E>> {
        let mut entry = self
            .entries
            .get(&date)
            .cloned()
            .unwrap_or_else(|| E::open(date, self.opening_for(date)));
        movement(&mut entry)?;
        entry.recompute()?;
        self.ensure_sound(&entry)?;

        let mut carry = entry.closing();
        let mut rows = vec![entry];
        for later in self.entries.range((Excluded(date), Unbounded)).map(|(_, e)| e) {
            if later.opening() == carry {
                break;
            }
            let mut next = later.clone();
            next.reopen(carry)?;
            self.ensure_sound(&next)?;
            carry = next.closing();
            rows.push(next);
        }

        Ok(LedgerPlan { rows })
    }

    /// Install planned rows and return the touched day's entry
    pub fn commit(&mut self, plan: LedgerPlan<E>) -> E {
        let entry = plan.rows[0].clone();
        for row in plan.rows {
            self.entries.insert(row.date(), row);
        }
        entry
    }

    fn ensure_sound(&self, entry: &E) -> AppResult<()> {
        if entry.is_sound() {
            return Ok(());
        }
        Err(AppError::InsufficientStock(format!(
            "{} balance would go negative on {}",
            self.kind,
            entry.date()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::YarnEntry;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn kg(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn yarn(initial: i64) -> DailyLedger<YarnEntry> {
        DailyLedger::new(LedgerKind::Yarn, kg(initial))
    }

    fn apply(
        ledger: &mut DailyLedger<YarnEntry>,
        date: NaiveDate,
        purchase: i64,
        consumption: i64,
    ) -> AppResult<YarnEntry> {
        let plan = ledger.plan(date, |e| {
            e.add_movement(kg(purchase), kg(consumption), Decimal::ZERO)
        })?;
        Ok(ledger.commit(plan))
    }

    fn assert_continuous(ledger: &DailyLedger<YarnEntry>) {
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_first_entry_opens_at_initial() {
        let mut ledger = yarn(5000);
        let entry = apply(&mut ledger, day(1), 400, 300).unwrap();

        assert_eq!(entry.opening_balance, kg(5000));
        assert_eq!(entry.balance, kg(5100));
    }

    #[test]
    fn test_plan_leaves_ledger_untouched() {
        let ledger = yarn(100);
        let plan = ledger
            .plan(day(1), |e| e.add_movement(kg(50), kg(0), Decimal::ZERO))
            .unwrap();

        assert_eq!(plan.entry().balance, kg(150));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_next_entry_opens_at_previous_closing() {
        let mut ledger = yarn(100);
        apply(&mut ledger, day(1), 50, 0).unwrap();
        let entry = apply(&mut ledger, day(3), 0, 20).unwrap();

        assert_eq!(entry.opening_balance, kg(150));
        assert_eq!(entry.balance, kg(130));
        assert_continuous(&ledger);
    }

    #[test]
    fn test_backdated_entry_rechains_later_days() {
        let mut ledger = yarn(100);
        apply(&mut ledger, day(1), 50, 0).unwrap();
        apply(&mut ledger, day(5), 10, 0).unwrap();

        apply(&mut ledger, day(3), 40, 0).unwrap();

        let later = ledger.get(day(5)).unwrap();
        assert_eq!(later.opening_balance, kg(190));
        assert_eq!(later.balance, kg(200));
        assert_continuous(&ledger);
    }

    #[test]
    fn test_backdated_entry_before_first_uses_initial() {
        let mut ledger = yarn(100);
        apply(&mut ledger, day(5), 10, 0).unwrap();
        apply(&mut ledger, day(1), 0, 30).unwrap();

        assert_eq!(ledger.get(day(1)).unwrap().opening_balance, kg(100));
        assert_eq!(ledger.get(day(5)).unwrap().opening_balance, kg(70));
        assert_continuous(&ledger);
    }

    #[test]
    fn test_negative_balance_rejected_without_mutation() {
        let mut ledger = yarn(10);
        apply(&mut ledger, day(1), 0, 5).unwrap();

        let result = apply(&mut ledger, day(1), 0, 6);
        assert!(matches!(result, Err(AppError::InsufficientStock(_))));
        assert_eq!(ledger.get(day(1)).unwrap().balance, kg(5));
    }

    #[test]
    fn test_backdated_consumption_cannot_starve_later_days() {
        let mut ledger = yarn(0);
        apply(&mut ledger, day(1), 100, 0).unwrap();
        apply(&mut ledger, day(5), 0, 90).unwrap();

        // Day 3 alone is fine (100 - 20), but day 5 would close at -10
        let result = apply(&mut ledger, day(3), 0, 20);
        assert!(matches!(result, Err(AppError::InsufficientStock(_))));
        assert!(ledger.get(day(3)).is_none());
        assert_continuous(&ledger);
    }

    #[test]
    fn test_repeated_updates_rederive_balance() {
        let mut ledger = yarn(0);
        for _ in 0..10 {
            apply(&mut ledger, day(1), 7, 3).unwrap();
        }
        let entry = ledger.get(day(1)).unwrap();
        let expected = entry.opening_balance + entry.purchase - entry.consumption - entry.wastage;
        assert_eq!(entry.balance, expected);
        assert_eq!(entry.balance, kg(40));
    }

    #[test]
    fn test_range_and_latest() {
        let mut ledger = yarn(0);
        for d in 1..=5 {
            apply(&mut ledger, day(d), 10, 0).unwrap();
        }

        let rows = ledger.range(DateRange::new(Some(day(2)), Some(day(4))));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, day(2));
        assert_eq!(ledger.latest().unwrap().date, day(5));
        assert_eq!(ledger.current_balance(), kg(50));
        assert_eq!(yarn(42).current_balance(), kg(42));
    }

    #[test]
    fn test_from_entries_rejects_broken_continuity() {
        let mut ledger = yarn(0);
        apply(&mut ledger, day(1), 10, 0).unwrap();
        apply(&mut ledger, day(2), 10, 0).unwrap();

        let mut rows: Vec<YarnEntry> = ledger.entries().cloned().collect();
        rows[1].opening_balance = kg(5);
        rows[1].total = kg(15);
        rows[1].balance = kg(15);

        assert!(DailyLedger::from_entries(LedgerKind::Yarn, kg(0), rows).is_err());
    }

    #[test]
    fn test_from_entries_rejects_duplicate_dates() {
        let rows = vec![YarnEntry::open(day(1), kg(0)), YarnEntry::open(day(1), kg(0))];
        assert!(DailyLedger::from_entries(LedgerKind::Yarn, kg(0), rows).is_err());
    }

    #[test]
    fn test_from_entries_rejects_first_opening_off_initial() {
        let mut ledger = yarn(100);
        apply(&mut ledger, day(1), 10, 0).unwrap();
        let rows: Vec<YarnEntry> = ledger.entries().cloned().collect();

        assert!(DailyLedger::from_entries(LedgerKind::Yarn, kg(100), rows.clone()).is_ok());
        let result = DailyLedger::from_entries(LedgerKind::Yarn, kg(5000), rows);
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[test]
    fn test_overflowing_movement_is_a_validation_error() {
        let mut ledger = yarn(0);
        let max = |e: &mut YarnEntry| e.add_movement(Decimal::MAX, Decimal::ZERO, Decimal::ZERO);
        let plan = ledger.plan(day(1), max).unwrap();
        ledger.commit(plan);

        let result = ledger.plan(day(1), max);
        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(ledger.current_balance(), Decimal::MAX);
    }
}
