//! Finished-goods books: a daily ledger paired with the location's Poka set
//!
//! Every operation that moves Poka checks everything it needs first, then
//! commits. A failure after the first commit step is reported as
//! `NonAtomicFailure` once the earlier steps have been undone.

use chrono::NaiveDate;
use shared::{
    DateRange, FinishedGoodsEntry, GodownEntry, LedgerKind, Location, LocationEntry, Measure,
    PokaInput, PokaItem, ProductionEntry, ProductionResult, ReconciliationReport, SaleResult,
    SoldPoka, TransferResult,
};
use uuid::Uuid;

use super::daily::DailyLedger;
use super::registry::PokaRegistry;
use super::snapshot::BookSnapshot;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct LocationBook<E: LocationEntry> {
    ledger: DailyLedger<E>,
    pokas: PokaRegistry,
    sold: Vec<SoldPoka>,
}

/// Biratnagar production site
pub type ProductionLedger = LocationBook<ProductionEntry>;

/// Birgunj godown
pub type GodownLedger = LocationBook<GodownEntry>;

fn sum_measure(items: &[PokaItem]) -> AppResult<Measure> {
    Ok(Measure::checked_sum(items.iter().map(PokaItem::measure))?)
}

impl<E: LocationEntry> LocationBook<E> {
    pub fn new(opening: Measure) -> Self {
        Self {
            ledger: DailyLedger::new(LedgerKind::from(E::LOCATION), opening),
            pokas: PokaRegistry::new(E::LOCATION),
            sold: Vec::new(),
        }
    }

    pub fn from_snapshot(opening: Measure, snapshot: BookSnapshot<E>) -> AppResult<Self> {
        let kind = LedgerKind::from(E::LOCATION);
        let ledger = DailyLedger::from_entries(kind, opening, snapshot.entries)?;
        let pokas = PokaRegistry::from_items(E::LOCATION, snapshot.active)?;

        if let Some(stray) = snapshot.sold.iter().find(|s| s.location != E::LOCATION) {
            return Err(AppError::Storage(format!(
                "Poka {} sold at {} is stored in the {} register",
                stray.item.id,
                stray.location,
                E::LOCATION
            )));
        }

        Ok(Self {
            ledger,
            pokas,
            sold: snapshot.sold,
        })
    }

    pub fn to_snapshot(&self) -> BookSnapshot<E> {
        BookSnapshot {
            entries: self.ledger.entries().cloned().collect(),
            active: self.pokas.items().to_vec(),
            sold: self.sold.clone(),
        }
    }

    pub fn location(&self) -> Location {
        E::LOCATION
    }

    pub fn ledger(&self) -> &DailyLedger<E> {
        &self.ledger
    }

    pub fn pokas(&self) -> &PokaRegistry {
        &self.pokas
    }

    /// Direct access to the active set; changes here bypass the ledger
    pub fn pokas_mut(&mut self) -> &mut PokaRegistry {
        &mut self.pokas
    }

    pub fn sold(&self) -> &[SoldPoka] {
        &self.sold
    }

    /// Sale register entries dated within `range`
    pub fn sales_in(&self, range: DateRange) -> Vec<SoldPoka> {
        self.sold
            .iter()
            .filter(|sale| range.contains(sale.sold_on))
            .cloned()
            .collect()
    }

    /// Latest ledger closing against the active Poka totals
    pub fn reconcile(&self) -> ReconciliationReport {
        ReconciliationReport::new(E::LOCATION, self.ledger.current_balance(), self.pokas.totals())
    }

    /// Sell the selected Poka out of this location
    pub fn record_sale(&mut self, date: NaiveDate, ids: &[Uuid]) -> AppResult<SaleResult>
    where
        E: Into<FinishedGoodsEntry>,
    {
        if ids.is_empty() {
            return Err(AppError::EmptySelection("sale".to_string()));
        }

        let items = self.pokas.select(ids)?;
        let total = sum_measure(&items)?;
        let plan = self.ledger.plan(date, |entry| entry.add_sales(total))?;

        self.pokas.remove_items(ids).map_err(|err| {
            AppError::NonAtomicFailure(format!("removing sold Poka at {}: {}", E::LOCATION, err))
        })?;
        let entry = self.ledger.commit(plan);
        self.sold.extend(items.iter().map(|item| SoldPoka {
            item: item.clone(),
            location: E::LOCATION,
            sold_on: date,
        }));

        Ok(SaleResult {
            location: E::LOCATION,
            date,
            items,
            total_meter: total.meter,
            total_kg: total.kg,
            entry: entry.into(),
        })
    }
}

impl ProductionLedger {
    /// Register a batch of new Poka and add their sums to the day's production
    pub fn record_production(
        &mut self,
        date: NaiveDate,
        inputs: &[PokaInput],
    ) -> AppResult<ProductionResult> {
        if inputs.is_empty() {
            return Err(AppError::EmptyBatch);
        }

        self.pokas.check_new(inputs)?;
        let items: Vec<PokaItem> = inputs.iter().map(PokaItem::from_input).collect();
        let total = sum_measure(&items)?;
        let plan = self.ledger.plan(date, |entry| entry.add_production(total))?;

        self.pokas.accept(items.clone()).map_err(|err| {
            AppError::NonAtomicFailure(format!("registering produced Poka: {}", err))
        })?;
        let entry = self.ledger.commit(plan);

        Ok(ProductionResult {
            date,
            items,
            total_meter: total.meter,
            total_kg: total.kg,
            entry,
        })
    }
}

/// Move the selected Poka from Biratnagar to Birgunj on `date`
///
/// Either both ledgers and both Poka sets change, or none of them do.
pub fn transfer(
    from: &mut ProductionLedger,
    to: &mut GodownLedger,
    date: NaiveDate,
    ids: &[Uuid],
) -> AppResult<TransferResult> {
    if ids.is_empty() {
        return Err(AppError::EmptySelection("transfer".to_string()));
    }

    let items = from.pokas.select(ids)?;
    to.pokas.ensure_can_accept(&items)?;
    let moved = sum_measure(&items)?;
    let from_plan = from.ledger.plan(date, |entry| entry.add_transfer(moved))?;
    let to_plan = to.ledger.plan(date, |entry| entry.add_received(moved))?;

    let before = from.pokas.items().to_vec();
    let removed = from.pokas.remove_items(ids).map_err(|err| {
        AppError::NonAtomicFailure(format!("removing Poka from Biratnagar: {}", err))
    })?;
    if let Err(err) = to.pokas.accept(removed) {
        from.pokas.restore(before);
        return Err(AppError::NonAtomicFailure(format!(
            "adding Poka to Birgunj: {}",
            err
        )));
    }

    let biratnagar_entry = from.ledger.commit(from_plan);
    let birgunj_entry = to.ledger.commit(to_plan);

    Ok(TransferResult {
        date,
        items,
        total_meter: moved.meter,
        total_kg: moved.kg,
        biratnagar_entry,
        birgunj_entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::DailyEntry;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn m(meter: i64, kg: i64) -> Measure {
        Measure::new(Decimal::from(meter), Decimal::from(kg))
    }

    fn input(no: &str, meter: i64, kg: i64) -> PokaInput {
        PokaInput::new(no, "SH-01", Decimal::from(meter), Decimal::from(kg))
    }

    fn produced(book: &mut ProductionLedger) -> Vec<Uuid> {
        let result = book
            .record_production(day(1), &[input("P1", 100, 22), input("P2", 150, 33)])
            .unwrap();
        result.items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn test_record_production_updates_ledger_and_set() {
        let mut book = ProductionLedger::new(Measure::ZERO);
        let result = book
            .record_production(day(1), &[input("P1", 100, 22), input("P2", 150, 33)])
            .unwrap();

        assert_eq!(result.total_meter, Decimal::from(250));
        assert_eq!(result.entry.production(), m(250, 55));
        assert_eq!(result.entry.closing(), m(250, 55));
        assert_eq!(book.pokas().len(), 2);
    }

    #[test]
    fn test_record_production_empty_batch() {
        let mut book = ProductionLedger::new(Measure::ZERO);
        assert!(matches!(book.record_production(day(1), &[]), Err(AppError::EmptyBatch)));
    }

    #[test]
    fn test_record_production_invalid_item_rejects_whole_batch() {
        let mut book = ProductionLedger::new(Measure::ZERO);
        let result = book.record_production(day(1), &[input("P1", 100, 22), input("P2", 0, 33)]);

        assert!(result.is_err());
        assert!(book.pokas().is_empty());
        assert!(book.ledger().is_empty());
    }

    #[test]
    fn test_transfer_moves_items_and_quantities() {
        let mut biratnagar = ProductionLedger::new(Measure::ZERO);
        let mut birgunj = GodownLedger::new(m(8000, 1800));
        let ids = produced(&mut biratnagar);

        let result = transfer(&mut biratnagar, &mut birgunj, day(2), &ids[..1]).unwrap();

        assert_eq!(result.biratnagar_entry.transfer(), m(100, 22));
        assert_eq!(result.biratnagar_entry.closing(), m(150, 33));
        assert_eq!(result.birgunj_entry.received(), m(100, 22));
        assert_eq!(result.birgunj_entry.closing(), m(8100, 1822));
        assert!(!biratnagar.pokas().contains(ids[0]));
        assert!(birgunj.pokas().contains(ids[0]));
    }

    #[test]
    fn test_transfer_empty_selection() {
        let mut biratnagar = ProductionLedger::new(Measure::ZERO);
        let mut birgunj = GodownLedger::new(Measure::ZERO);

        let result = transfer(&mut biratnagar, &mut birgunj, day(1), &[]);
        assert!(matches!(result, Err(AppError::EmptySelection(_))));
    }

    #[test]
    fn test_transfer_with_unknown_id_changes_nothing() {
        let mut biratnagar = ProductionLedger::new(Measure::ZERO);
        let mut birgunj = GodownLedger::new(Measure::ZERO);
        let mut ids = produced(&mut biratnagar);
        ids.push(Uuid::new_v4());

        let result = transfer(&mut biratnagar, &mut birgunj, day(2), &ids);

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(biratnagar.pokas().len(), 2);
        assert!(birgunj.pokas().is_empty());
        assert!(biratnagar.ledger().get(day(2)).is_none());
        assert!(birgunj.ledger().is_empty());
    }

    #[test]
    fn test_transfer_poka_no_collision_changes_nothing() {
        let mut biratnagar = ProductionLedger::new(Measure::ZERO);
        let mut birgunj = GodownLedger::new(Measure::ZERO);
        let ids = produced(&mut biratnagar);
        transfer(&mut biratnagar, &mut birgunj, day(2), &ids[..1]).unwrap();

        // A new P1 produced at Biratnagar cannot join the Birgunj P1
        let again = biratnagar.record_production(day(3), &[input("P1", 10, 2)]).unwrap();
        let result = transfer(&mut biratnagar, &mut birgunj, day(3), &[again.items[0].id]);

        assert!(matches!(result, Err(AppError::DuplicateEntry(_))));
        assert_eq!(birgunj.pokas().len(), 1);
        assert!(biratnagar.pokas().contains(again.items[0].id));
    }

    #[test]
    fn test_sale_removes_items_and_registers_them() {
        let mut biratnagar = ProductionLedger::new(Measure::ZERO);
        let ids = produced(&mut biratnagar);

        let result = biratnagar.record_sale(day(2), &ids[1..]).unwrap();

        assert_eq!(result.total_kg, Decimal::from(33));
        match result.entry {
            FinishedGoodsEntry::Biratnagar(entry) => assert_eq!(entry.sales(), m(150, 33)),
            other => panic!("unexpected entry {:?}", other),
        }
        assert_eq!(biratnagar.pokas().len(), 1);
        assert_eq!(biratnagar.sold().len(), 1);
        assert_eq!(biratnagar.sold()[0].sold_on, day(2));
    }

    #[test]
    fn test_sold_item_cannot_be_sold_again() {
        let mut biratnagar = ProductionLedger::new(Measure::ZERO);
        let ids = produced(&mut biratnagar);
        biratnagar.record_sale(day(2), &ids[..1]).unwrap();

        let again = biratnagar.record_sale(day(2), &ids[..1]);
        assert!(again.unwrap_err().is_not_found());
        assert_eq!(biratnagar.sold().len(), 1);
    }

    #[test]
    fn test_sale_empty_selection() {
        let mut birgunj = GodownLedger::new(Measure::ZERO);
        assert!(matches!(birgunj.record_sale(day(1), &[]), Err(AppError::EmptySelection(_))));
    }

    #[test]
    fn test_production_sum_overflow_is_rejected() {
        let mut book = ProductionLedger::new(Measure::ZERO);
        let huge = |no: &str| PokaInput::new(no, "SH-01", Decimal::MAX, Decimal::ONE);

        let result = book.record_production(day(1), &[huge("P1"), huge("P2")]);

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert!(book.pokas().is_empty());
        assert!(book.ledger().is_empty());
    }

    #[test]
    fn test_reconcile_with_opening_stock() {
        let mut biratnagar = ProductionLedger::new(Measure::ZERO);
        let mut birgunj = GodownLedger::new(m(8000, 1800));
        let ids = produced(&mut biratnagar);
        transfer(&mut biratnagar, &mut birgunj, day(2), &ids).unwrap();

        assert!(biratnagar.reconcile().is_balanced());
        let report = birgunj.reconcile();
        assert_eq!(report.difference, m(8000, 1800));
        assert_eq!(report.active.count, 2);
    }
}
