//! Poka registry service: active sets, sale registers and reconciliation

use std::sync::Arc;

use shared::{
    DateRange, Location, PokaInput, PokaItem, PokaState, PokaTotals, ReconciliationReport,
    ShadeSummary, SoldPoka,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{PokaRegistry, StockStore};

/// Poka service for per-location item queries
#[derive(Clone)]
pub struct PokaService {
    store: Arc<StockStore>,
}

impl PokaService {
    pub fn new(store: Arc<StockStore>) -> Self {
        Self { store }
    }

    async fn read<T>(&self, location: Location, f: impl FnOnce(&PokaRegistry) -> T) -> T {
        match location {
            Location::Biratnagar => {
                let book = self.store.biratnagar().await;
                f(book.pokas())
            }
            Location::Birgunj => {
                let book = self.store.birgunj().await;
                f(book.pokas())
            }
        }
    }

    async fn write<T>(
        &self,
        location: Location,
        f: impl FnOnce(&mut PokaRegistry) -> AppResult<T>,
    ) -> AppResult<T> {
        match location {
            Location::Biratnagar => {
                let mut book = self.store.biratnagar().await;
                f(book.pokas_mut())
            }
            Location::Birgunj => {
                let mut book = self.store.birgunj().await;
                f(book.pokas_mut())
            }
        }
    }

    /// Register a Poka without a ledger movement (opening stock already on the books)
    pub async fn add_item(&self, location: Location, input: PokaInput) -> AppResult<PokaItem> {
        let result = self.write(location, |pokas| pokas.add_item(&input)).await;

        match &result {
            Ok(item) => {
                tracing::info!(
                    location = %location,
                    poka_no = %item.poka_no,
                    meter = %item.meter,
                    kg = %item.kg,
                    "Registered Poka"
                );
                self.store.persist().await;
            }
            Err(e) => tracing::warn!(location = %location, "Poka rejected: {}", e),
        }
        result
    }

    pub async fn totals(&self, location: Location) -> PokaTotals {
        self.read(location, PokaRegistry::totals).await
    }

    /// Active Poka at a location, in registration order
    pub async fn list_active(&self, location: Location) -> Vec<PokaItem> {
        self.read(location, |pokas| pokas.items().to_vec()).await
    }

    pub async fn shade_summary(&self, location: Location) -> Vec<ShadeSummary> {
        self.read(location, PokaRegistry::shade_summary).await
    }

    /// Sold Poka at a location, oldest sale first
    pub async fn list_sales(&self, location: Location, range: DateRange) -> Vec<SoldPoka> {
        match location {
            Location::Biratnagar => self.store.biratnagar().await.sales_in(range),
            Location::Birgunj => self.store.birgunj().await.sales_in(range),
        }
    }

    /// Where a Poka is now: active at one location, or sold
    pub async fn state_of(&self, id: Uuid) -> AppResult<PokaState> {
        let biratnagar = self.store.biratnagar().await;
        let birgunj = self.store.birgunj().await;

        if biratnagar.pokas().contains(id) {
            return Ok(PokaState::active_at(Location::Biratnagar));
        }
        if birgunj.pokas().contains(id) {
            return Ok(PokaState::active_at(Location::Birgunj));
        }
        if biratnagar.sold().iter().chain(birgunj.sold()).any(|sale| sale.item.id == id) {
            return Ok(PokaState::Sold);
        }
        Err(AppError::NotFound(format!("Poka {}", id)))
    }

    pub async fn reconcile(&self, location: Location) -> ReconciliationReport {
        match location {
            Location::Biratnagar => self.store.biratnagar().await.reconcile(),
            Location::Birgunj => self.store.birgunj().await.reconcile(),
        }
    }
}
