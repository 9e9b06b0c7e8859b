//! HTTP handlers for the Textile Stock Ledger API

mod dashboard;
mod health;
mod ledgers;
mod movements;
mod pokas;

pub use dashboard::*;
pub use health::*;
pub use ledgers::*;
pub use movements::*;
pub use pokas::*;

use shared::Location;

use crate::error::{AppError, AppResult};

/// Parse the `:location` path segment
pub(crate) fn parse_location(raw: &str) -> AppResult<Location> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Location {}", raw)))
}
