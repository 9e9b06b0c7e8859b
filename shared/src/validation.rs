//! Validation utilities for the Textile Stock Ledger
//!
//! Entry forms on the dashboard silently ignore blank fields; the ledger
//! rejects them instead so nothing half-entered reaches a balance sheet.

use rust_decimal::Decimal;

use crate::models::PokaInput;

/// Longest Poka or shade code accepted
pub const MAX_CODE_LEN: usize = 32;

/// Largest single quantity (meters or kg) accepted in one entry: 10^12
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

// ============================================================================
// Poka Validations
// ============================================================================

/// Validate a Poka or shade code (non-empty, printable, bounded length)
pub fn validate_code(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if code.is_empty() {
        return Err("Code must not be empty");
    }
    if code.chars().count() > MAX_CODE_LEN {
        return Err("Code must be at most 32 characters");
    }
    if code.chars().any(|c| c.is_control()) {
        return Err("Code must not contain control characters");
    }
    Ok(())
}

/// Validate a Poka quantity (strictly positive)
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than 0");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity must be at most 1000000000000");
    }
    Ok(())
}

/// Validate a full Poka entry, returning the offending field on failure
pub fn validate_poka_input(input: &PokaInput) -> Result<(), (&'static str, &'static str)> {
    validate_code(&input.poka_no).map_err(|msg| ("poka_no", msg))?;
    validate_code(&input.shade_no).map_err(|msg| ("shade_no", msg))?;
    validate_positive_quantity(input.meter).map_err(|msg| ("meter", msg))?;
    validate_positive_quantity(input.kg).map_err(|msg| ("kg", msg))?;
    Ok(())
}

// ============================================================================
// Ledger Movement Validations
// ============================================================================

/// Validate a daily movement component (zero allowed, negative not)
pub fn validate_movement(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity must be at most 1000000000000");
    }
    Ok(())
}

/// Validate that a movement actually moves something
pub fn validate_not_all_zero(quantities: &[Decimal]) -> Result<(), &'static str> {
    if quantities.iter().all(|q| q.is_zero()) {
        return Err("At least one quantity must be greater than 0");
    }
    Ok(())
}

// ============================================================================
// Configuration Validations
// ============================================================================

/// Validate the meters-per-kg conversion ratio
pub fn validate_meters_per_kg(ratio: Decimal) -> Result<(), &'static str> {
    if ratio <= Decimal::ZERO {
        return Err("Meters per kg must be greater than 0");
    }
    Ok(())
}

/// Check if a kg balance has dropped below a low-stock threshold
pub fn is_low_stock(balance_kg: Decimal, threshold_kg: Decimal) -> bool {
    balance_kg < threshold_kg
}
