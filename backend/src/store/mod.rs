//! In-process stock store
//!
//! Each ledger sits behind its own lock. Operations that need several ledgers
//! take them in a fixed order (yarn, grey fabric, Biratnagar, Birgunj) so two
//! compound operations can never wait on each other.

mod book;
mod daily;
mod registry;
pub mod snapshot;

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use shared::{GreyFabricEntry, LedgerKind, YarnEntry};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub use book::{transfer, GodownLedger, LocationBook, ProductionLedger};
pub use daily::{DailyLedger, LedgerPlan};
pub use registry::PokaRegistry;
pub use snapshot::{BookSnapshot, Snapshot, SNAPSHOT_VERSION};

use crate::config::{StockConfig, StorageConfig};
use crate::error::{AppError, AppResult};

pub struct StockStore {
    settings: StockConfig,
    storage: Option<StorageConfig>,
    yarn: Mutex<DailyLedger<YarnEntry>>,
    grey_fabric: Mutex<DailyLedger<GreyFabricEntry>>,
    biratnagar: Mutex<ProductionLedger>,
    birgunj: Mutex<GodownLedger>,
    save_lock: Mutex<()>,
}

impl StockStore {
    /// Empty in-memory store; nothing is written to disk
    pub fn new(settings: StockConfig) -> Self {
        Self {
            yarn: Mutex::new(DailyLedger::new(LedgerKind::Yarn, settings.yarn_opening_kg)),
            grey_fabric: Mutex::new(DailyLedger::new(
                LedgerKind::GreyFabric,
                settings.grey_fabric_opening_kg,
            )),
            biratnagar: Mutex::new(ProductionLedger::new(settings.biratnagar_opening)),
            birgunj: Mutex::new(GodownLedger::new(settings.birgunj_opening)),
            save_lock: Mutex::new(()),
            storage: None,
            settings,
        }
    }

    /// Store backed by a snapshot file, loading it when present
    pub async fn open(settings: StockConfig, storage: StorageConfig) -> AppResult<Self> {
        let mut store = match snapshot::read(&storage.snapshot_path).await? {
            Some(snapshot) => {
                tracing::info!(
                    "Loaded snapshot {} saved at {}",
                    storage.snapshot_path.display(),
                    snapshot.saved_at
                );
                Self::from_snapshot(settings, snapshot)?
            }
            None => {
                tracing::info!(
                    "No snapshot at {}, starting with empty ledgers",
                    storage.snapshot_path.display()
                );
                Self::new(settings)
            }
        };
        store.storage = Some(storage);
        Ok(store)
    }

    /// Rebuild a store from a snapshot, rejecting anything that breaks a ledger invariant
    pub fn from_snapshot(settings: StockConfig, snapshot: Snapshot) -> AppResult<Self> {
        let yarn =
            DailyLedger::from_entries(LedgerKind::Yarn, settings.yarn_opening_kg, snapshot.yarn)?;
        let grey_fabric = DailyLedger::from_entries(
            LedgerKind::GreyFabric,
            settings.grey_fabric_opening_kg,
            snapshot.grey_fabric,
        )?;
        let biratnagar =
            ProductionLedger::from_snapshot(settings.biratnagar_opening, snapshot.biratnagar)?;
        let birgunj = GodownLedger::from_snapshot(settings.birgunj_opening, snapshot.birgunj)?;

        ensure_single_state(&biratnagar, &birgunj)?;

        Ok(Self {
            yarn: Mutex::new(yarn),
            grey_fabric: Mutex::new(grey_fabric),
            biratnagar: Mutex::new(biratnagar),
            birgunj: Mutex::new(birgunj),
            save_lock: Mutex::new(()),
            storage: None,
            settings,
        })
    }

    pub fn settings(&self) -> &StockConfig {
        &self.settings
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.storage.as_ref().map(|s| s.snapshot_path.as_path())
    }

    pub async fn yarn(&self) -> MutexGuard<'_, DailyLedger<YarnEntry>> {
        self.yarn.lock().await
    }

    pub async fn grey_fabric(&self) -> MutexGuard<'_, DailyLedger<GreyFabricEntry>> {
        self.grey_fabric.lock().await
    }

    pub async fn biratnagar(&self) -> MutexGuard<'_, ProductionLedger> {
        self.biratnagar.lock().await
    }

    pub async fn birgunj(&self) -> MutexGuard<'_, GodownLedger> {
        self.birgunj.lock().await
    }

    /// Consistent copy of every ledger, taken under all four locks
    pub async fn snapshot(&self) -> Snapshot {
        let yarn = self.yarn.lock().await;
        let grey_fabric = self.grey_fabric.lock().await;
        let biratnagar = self.biratnagar.lock().await;
        let birgunj = self.birgunj.lock().await;

        Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            yarn: yarn.entries().cloned().collect(),
            grey_fabric: grey_fabric.entries().cloned().collect(),
            biratnagar: biratnagar.to_snapshot(),
            birgunj: birgunj.to_snapshot(),
        }
    }

    /// Write the current state to the snapshot file, if the store has one
    pub async fn save(&self) -> AppResult<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };

        let _guard = self.save_lock.lock().await;
        let snapshot = self.snapshot().await;
        snapshot::write(&storage.snapshot_path, &snapshot).await?;
        tracing::debug!("Snapshot saved to {}", storage.snapshot_path.display());
        Ok(())
    }

    /// Save after a mutation when autosave is on
    ///
    /// The mutation has already happened in memory, so a failed save is logged
    /// rather than reported to the caller.
    pub async fn persist(&self) {
        if !self.storage.as_ref().is_some_and(|s| s.autosave) {
            return;
        }
        if let Err(e) = self.save().await {
            tracing::error!("Failed to save snapshot: {}", e);
        }
    }
}

/// Every Poka id is active at one location, or sold, never both
fn ensure_single_state(biratnagar: &ProductionLedger, birgunj: &GodownLedger) -> AppResult<()> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    let active = biratnagar
        .pokas()
        .items()
        .iter()
        .chain(birgunj.pokas().items());
    let sold = biratnagar
        .sold()
        .iter()
        .chain(birgunj.sold())
        .map(|sale| &sale.item);

    for item in active.chain(sold) {
        if !seen.insert(item.id) {
            return Err(AppError::Storage(format!(
                "Poka {} ({}) is recorded in more than one place",
                item.id, item.poka_no
            )));
        }
    }
    Ok(())
}
