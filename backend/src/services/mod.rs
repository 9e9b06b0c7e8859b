//! Business logic services for the Textile Stock Ledger

pub mod dashboard;
pub mod grey_fabric;
pub mod ledger;
pub mod poka;
pub mod production;
pub mod sales;
pub mod transfer;
pub mod yarn;

pub use dashboard::DashboardService;
pub use grey_fabric::GreyFabricService;
pub use ledger::LedgerService;
pub use poka::PokaService;
pub use production::ProductionService;
pub use sales::SalesService;
pub use transfer::TransferService;
pub use yarn::YarnService;

use chrono::{Local, NaiveDate};

/// Business date for movements that do not name one
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
