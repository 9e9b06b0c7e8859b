//! Domain models for the Textile Stock Ledger

mod dashboard;
mod ledger;
mod location;
mod movement;
mod poka;

pub use dashboard::*;
pub use ledger::*;
pub use location::*;
pub use movement::*;
pub use poka::*;
