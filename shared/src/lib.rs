//! Shared types and models for the Textile Stock Ledger
//!
//! This crate contains the ledger entry shapes, Poka item types and
//! validation rules shared between the backend and the browser (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
