//! Common types used across the ledger

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A quantity sum left the range `Decimal` can represent
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Quantity out of range")]
pub struct QuantityOverflow;

/// `a + b`, or `QuantityOverflow` instead of a panic
pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, QuantityOverflow> {
    a.checked_add(b).ok_or(QuantityOverflow)
}

/// `a - b`, or `QuantityOverflow` instead of a panic
pub fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal, QuantityOverflow> {
    a.checked_sub(b).ok_or(QuantityOverflow)
}

/// A length/mass pair for finished fabric
///
/// Meter and kg are carried side by side and never derived from each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    pub meter: Decimal,
    pub kg: Decimal,
}

impl Measure {
    pub const ZERO: Measure = Measure {
        meter: Decimal::ZERO,
        kg: Decimal::ZERO,
    };

    pub fn new(meter: Decimal, kg: Decimal) -> Self {
        Self { meter, kg }
    }

    pub fn is_negative(&self) -> bool {
        self.meter < Decimal::ZERO || self.kg < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.meter.is_zero() && self.kg.is_zero()
    }

    pub fn checked_add(self, rhs: Measure) -> Result<Measure, QuantityOverflow> {
        Ok(Measure {
            meter: checked_add(self.meter, rhs.meter)?,
            kg: checked_add(self.kg, rhs.kg)?,
        })
    }

    pub fn checked_sub(self, rhs: Measure) -> Result<Measure, QuantityOverflow> {
        Ok(Measure {
            meter: checked_sub(self.meter, rhs.meter)?,
            kg: checked_sub(self.kg, rhs.kg)?,
        })
    }

    /// Sum of `measures`, failing instead of overflowing
    pub fn checked_sum<I>(measures: I) -> Result<Measure, QuantityOverflow>
    where
        I: IntoIterator<Item = Measure>,
    {
        measures
            .into_iter()
            .try_fold(Measure::ZERO, |acc, m| acc.checked_add(m))
    }
}

impl Add for Measure {
    type Output = Measure;

    fn add(self, rhs: Measure) -> Measure {
        Measure {
            meter: self.meter + rhs.meter,
            kg: self.kg + rhs.kg,
        }
    }
}

impl Sub for Measure {
    type Output = Measure;

    fn sub(self, rhs: Measure) -> Measure {
        Measure {
            meter: self.meter - rhs.meter,
            kg: self.kg - rhs.kg,
        }
    }
}

impl AddAssign for Measure {
    fn add_assign(&mut self, rhs: Measure) {
        self.meter += rhs.meter;
        self.kg += rhs.kg;
    }
}

impl Sum for Measure {
    fn sum<I: Iterator<Item = Measure>>(iter: I) -> Measure {
        iter.fold(Measure::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Measure> for Measure {
    fn sum<I: Iterator<Item = &'a Measure>>(iter: I) -> Measure {
        iter.copied().sum()
    }
}

/// Inclusive date range for ledger queries; open ends are unbounded
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }
}
