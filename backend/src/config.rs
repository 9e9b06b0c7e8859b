//! Configuration management for the Textile Stock Ledger
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TSL_ prefix

use std::path::PathBuf;

use config::{Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_meters_per_kg, validate_movement, Measure, DEFAULT_METERS_PER_KG};

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Ledger constants
    pub stock: StockConfig,

    /// Snapshot storage
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StockConfig {
    /// Meters of finished fabric per kg, used for estimates only
    pub meters_per_kg: Decimal,

    /// Ledgers whose latest kg balance falls below this raise an alert
    pub low_stock_threshold_kg: Decimal,

    /// Opening balance of the first-ever yarn entry
    pub yarn_opening_kg: Decimal,

    /// Opening balance of the first-ever grey fabric entry
    pub grey_fabric_opening_kg: Decimal,

    /// Opening balance of the first-ever Biratnagar entry
    pub biratnagar_opening: Measure,

    /// Opening balance of the first-ever Birgunj entry
    pub birgunj_opening: Measure,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON snapshot of all ledgers and Poka sets
    pub snapshot_path: PathBuf,

    /// Save after every successful mutation
    pub autosave: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        let environment = std::env::var("TSL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("stock.meters_per_kg", DEFAULT_METERS_PER_KG.to_string())?
            .set_default("stock.low_stock_threshold_kg", "500")?
            .set_default("stock.yarn_opening_kg", "0")?
            .set_default("stock.grey_fabric_opening_kg", "0")?
            .set_default("stock.biratnagar_opening.meter", "0")?
            .set_default("stock.biratnagar_opening.kg", "0")?
            .set_default("stock.birgunj_opening.meter", "0")?
            .set_default("stock.birgunj_opening.kg", "0")?
            .set_default("storage.snapshot_path", "data/stock.json")?
            .set_default("storage.autosave", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TSL_ prefix)
            .add_source(
                Environment::with_prefix("TSL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|built| built.try_deserialize::<Config>())?;

        config.stock.validate()?;
        Ok(config)
    }
}

impl StockConfig {
    /// Reject ratios and balances that would make the ledger meaningless
    pub fn validate(&self) -> AppResult<()> {
        validate_meters_per_kg(self.meters_per_kg)
            .map_err(|msg| AppError::Configuration(format!("stock.meters_per_kg: {}", msg)))?;

        let balances = [
            ("stock.low_stock_threshold_kg", self.low_stock_threshold_kg),
            ("stock.yarn_opening_kg", self.yarn_opening_kg),
            ("stock.grey_fabric_opening_kg", self.grey_fabric_opening_kg),
            ("stock.biratnagar_opening.meter", self.biratnagar_opening.meter),
            ("stock.biratnagar_opening.kg", self.biratnagar_opening.kg),
            ("stock.birgunj_opening.meter", self.birgunj_opening.meter),
            ("stock.birgunj_opening.kg", self.birgunj_opening.kg),
        ];
        for (key, value) in balances {
            validate_movement(value)
                .map_err(|msg| AppError::Configuration(format!("{}: {}", key, msg)))?;
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            meters_per_kg: DEFAULT_METERS_PER_KG,
            low_stock_threshold_kg: Decimal::from(500),
            yarn_opening_kg: Decimal::ZERO,
            grey_fabric_opening_kg: Decimal::ZERO,
            biratnagar_opening: Measure::ZERO,
            birgunj_opening: Measure::ZERO,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data/stock.json"),
            autosave: true,
        }
    }
}
