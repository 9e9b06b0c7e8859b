//! Poka (fabric bundle) models

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Location;
use crate::types::Measure;

/// An individually tracked bundle of finished fabric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PokaItem {
    pub id: Uuid,
    /// Lot code entered at production (e.g., "P-BT-001")
    pub poka_no: String,
    /// Dye-lot code
    pub shade_no: String,
    pub meter: Decimal,
    pub kg: Decimal,
}

impl PokaItem {
    /// Build a new item from validated input, assigning a fresh id
    pub fn from_input(input: &PokaInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            poka_no: input.poka_no.trim().to_string(),
            shade_no: input.shade_no.trim().to_string(),
            meter: input.meter,
            kg: input.kg,
        }
    }

    pub fn measure(&self) -> Measure {
        Measure::new(self.meter, self.kg)
    }
}

/// Operator input for one Poka at production time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokaInput {
    pub poka_no: String,
    pub shade_no: String,
    pub meter: Decimal,
    pub kg: Decimal,
}

impl PokaInput {
    pub fn new(
        poka_no: impl Into<String>,
        shade_no: impl Into<String>,
        meter: Decimal,
        kg: Decimal,
    ) -> Self {
        Self {
            poka_no: poka_no.into(),
            shade_no: shade_no.into(),
            meter,
            kg,
        }
    }
}

/// Where a Poka currently is
///
/// There is no in-transit state: transfers move items atomically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PokaState {
    ActiveAtBiratnagar,
    ActiveAtBirgunj,
    Sold,
}

impl PokaState {
    pub fn active_at(location: Location) -> Self {
        match location {
            Location::Biratnagar => PokaState::ActiveAtBiratnagar,
            Location::Birgunj => PokaState::ActiveAtBirgunj,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PokaState::Sold)
    }
}

/// Count and exact quantity sums over a set of Poka items
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PokaTotals {
    pub count: usize,
    pub total_meter: Decimal,
    pub total_kg: Decimal,
}

impl PokaTotals {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a PokaItem>) -> Self {
        items.into_iter().fold(PokaTotals::default(), |acc, item| PokaTotals {
            count: acc.count + 1,
            total_meter: acc.total_meter.saturating_add(item.meter),
            total_kg: acc.total_kg.saturating_add(item.kg),
        })
    }

    pub fn measure(&self) -> Measure {
        Measure::new(self.total_meter, self.total_kg)
    }
}

/// Totals for a single shade within a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShadeSummary {
    pub shade_no: String,
    pub count: usize,
    pub total_meter: Decimal,
    pub total_kg: Decimal,
}

/// Group items by shade, ordered by shade code
pub fn summarize_by_shade<'a>(items: impl IntoIterator<Item = &'a PokaItem>) -> Vec<ShadeSummary> {
    let mut groups: BTreeMap<&str, PokaTotals> = BTreeMap::new();
    for item in items {
        let entry = groups.entry(item.shade_no.as_str()).or_default();
        entry.count += 1;
        entry.total_meter = entry.total_meter.saturating_add(item.meter);
        entry.total_kg = entry.total_kg.saturating_add(item.kg);
    }

    groups
        .into_iter()
        .map(|(shade_no, totals)| ShadeSummary {
            shade_no: shade_no.to_string(),
            count: totals.count,
            total_meter: totals.total_meter,
            total_kg: totals.total_kg,
        })
        .collect()
}

/// A Poka that left stock through a sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoldPoka {
    pub item: PokaItem,
    pub location: Location,
    pub sold_on: NaiveDate,
}
