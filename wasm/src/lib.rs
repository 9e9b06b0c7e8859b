//! WebAssembly module for the Textile Stock Ledger
//!
//! Provides client-side computation for:
//! - Meter/kg estimation from the fabric ratio
//! - Yarn and grey fabric closing previews
//! - Offline Poka entry validation and batch totals

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Estimated fabric length for a mass
#[wasm_bindgen]
pub fn estimate_meters_from_kg(kg: f64, meters_per_kg: f64) -> f64 {
    to_f64(estimate_meters(to_decimal(kg), to_decimal(meters_per_kg)))
}

/// Estimated fabric mass for a length
#[wasm_bindgen]
pub fn estimate_kg_from_meters(meter: f64, meters_per_kg: f64) -> f64 {
    to_f64(estimate_kg(to_decimal(meter), to_decimal(meters_per_kg)))
}

/// Yarn closing balance: opening + purchase - consumption - wastage
///
/// NaN when the figures are too large to add up.
#[wasm_bindgen]
pub fn yarn_closing(opening: f64, purchase: f64, consumption: f64, wastage: f64) -> f64 {
    to_decimal(opening)
        .checked_add(to_decimal(purchase))
        .and_then(|total| total.checked_sub(to_decimal(consumption)))
        .and_then(|rest| rest.checked_sub(to_decimal(wastage)))
        .map_or(f64::NAN, to_f64)
}

/// Grey fabric closing balance: opening + receive - finished goods kg
#[wasm_bindgen]
pub fn grey_fabric_closing(opening: f64, receive: f64, finished_goods_kg: f64) -> f64 {
    to_decimal(opening)
        .checked_add(to_decimal(receive))
        .and_then(|total| total.checked_sub(to_decimal(finished_goods_kg)))
        .map_or(f64::NAN, to_f64)
}

/// Whole-meter finished goods figure shown on the grey fabric sheet
#[wasm_bindgen]
pub fn grey_finished_goods_meter(finished_goods_kg: f64, meters_per_kg: f64) -> f64 {
    to_decimal(finished_goods_kg)
        .checked_mul(to_decimal(meters_per_kg))
        .map_or(f64::NAN, |meter| {
            to_f64(meter.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        })
}

/// Validate one Poka row, returning "field: message" for the first problem
#[wasm_bindgen]
pub fn validate_poka_entry(poka_no: &str, shade_no: &str, meter: f64, kg: f64) -> Option<String> {
    let input = PokaInput::new(poka_no, shade_no, to_decimal(meter), to_decimal(kg));
    validate_poka_input(&input)
        .err()
        .map(|(field, message)| format!("{}: {}", field, message))
}

#[derive(Debug, Default, Serialize, PartialEq)]
struct BatchTotals {
    count: usize,
    total_meter: Decimal,
    total_kg: Decimal,
}

/// Count and sums of a JSON array of Poka rows, for the batch entry form
#[wasm_bindgen]
pub fn poka_batch_totals(items_json: &str) -> Result<String, JsValue> {
    let items: Vec<PokaInput> = serde_json::from_str(items_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid Poka JSON: {}", e)))?;

    let totals = batch_totals(&items);
    serde_json::to_string(&totals).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn batch_totals(items: &[PokaInput]) -> BatchTotals {
    items.iter().fold(BatchTotals::default(), |acc, item| BatchTotals {
        count: acc.count + 1,
        total_meter: acc.total_meter.saturating_add(item.meter),
        total_kg: acc.total_kg.saturating_add(item.kg),
    })
}
