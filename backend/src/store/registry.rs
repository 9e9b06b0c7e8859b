//! Active Poka set of one finished-goods location

use std::collections::HashSet;

use shared::{
    summarize_by_shade, validate_poka_input, validate_positive_quantity, Location, PokaInput,
    PokaItem, PokaTotals, ShadeSummary,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct PokaRegistry {
    location: Location,
    items: Vec<PokaItem>,
}

impl PokaRegistry {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            items: Vec::new(),
        }
    }

    /// Rebuild a registry from stored items, rejecting repeated ids or Poka numbers
    pub fn from_items(location: Location, items: Vec<PokaItem>) -> AppResult<Self> {
        let mut registry = Self::new(location);
        for item in items {
            for value in [item.meter, item.kg] {
                validate_positive_quantity(value).map_err(|msg| {
                    AppError::Storage(format!("Poka {} in {} stock: {}", item.id, location, msg))
                })?;
            }
            if registry.contains(item.id) {
                return Err(AppError::Storage(format!(
                    "Poka {} appears twice in {} stock",
                    item.id, location
                )));
            }
            if registry.has_poka_no(&item.poka_no) {
                return Err(AppError::Storage(format!(
                    "Poka number {} appears twice in {} stock",
                    item.poka_no, location
                )));
            }
            registry.items.push(item);
        }
        Ok(registry)
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn items(&self) -> &[PokaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn has_poka_no(&self, poka_no: &str) -> bool {
        let poka_no = poka_no.trim();
        self.items.iter().any(|item| item.poka_no == poka_no)
    }

    /// Validate and register a single new Poka
    pub fn add_item(&mut self, input: &PokaInput) -> AppResult<PokaItem> {
        self.check_new(std::slice::from_ref(input))?;
        let item = PokaItem::from_input(input);
        self.items.push(item.clone());
        Ok(item)
    }

    /// Check a batch of new Poka against field rules and existing stock
    pub fn check_new(&self, inputs: &[PokaInput]) -> AppResult<()> {
        let mut seen = HashSet::new();
        for input in inputs {
            validate_poka_input(input).map_err(|(field, msg)| AppError::validation(field, msg))?;

            let poka_no = input.poka_no.trim();
            if self.has_poka_no(poka_no) || !seen.insert(poka_no) {
                return Err(AppError::DuplicateEntry(format!("poka_no {}", poka_no)));
            }
        }
        Ok(())
    }

    /// Look up the given ids, all of which must be active here
    ///
    /// Repeated ids are collapsed; the result follows first-seen order.
    pub fn select(&self, ids: &[Uuid]) -> AppResult<Vec<PokaItem>> {
        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        let mut missing = Vec::new();

        for id in ids {
            if !seen.insert(*id) {
                continue;
            }
            match self.items.iter().find(|item| item.id == *id) {
                Some(item) => selected.push(item.clone()),
                None => missing.push(*id),
            }
        }

        if !missing.is_empty() {
            return Err(AppError::PokaNotFound {
                location: self.location,
                ids: missing,
            });
        }
        Ok(selected)
    }

    /// Remove the given ids, all or nothing
    pub fn remove_items(&mut self, ids: &[Uuid]) -> AppResult<Vec<PokaItem>> {
        let selected = self.select(ids)?;
        let remove: HashSet<Uuid> = selected.iter().map(|item| item.id).collect();
        self.items.retain(|item| !remove.contains(&item.id));
        Ok(selected)
    }

    /// Check that incoming items can join this set without clashing
    pub fn ensure_can_accept(&self, items: &[PokaItem]) -> AppResult<()> {
        for item in items {
            if self.contains(item.id) {
                return Err(AppError::NonAtomicFailure(format!(
                    "Poka {} is already active at {}",
                    item.id, self.location
                )));
            }
            if self.has_poka_no(&item.poka_no) {
                return Err(AppError::DuplicateEntry(format!(
                    "poka_no {} at {}",
                    item.poka_no, self.location
                )));
            }
        }
        Ok(())
    }

    /// Add items that already passed `ensure_can_accept` or `check_new`
    pub fn accept(&mut self, items: Vec<PokaItem>) -> AppResult<()> {
        self.ensure_can_accept(&items)?;
        self.items.extend(items);
        Ok(())
    }

    /// Reset the set to a copy taken earlier in the same operation
    pub(crate) fn restore(&mut self, items: Vec<PokaItem>) {
        self.items = items;
    }

    pub fn totals(&self) -> PokaTotals {
        PokaTotals::from_items(&self.items)
    }

    pub fn shade_summary(&self) -> Vec<ShadeSummary> {
        summarize_by_shade(&self.items)
    }
}
