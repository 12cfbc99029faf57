//! Price history storage
//!
//! Trait + in-memory implementation. History is kept sorted ascending and
//! deduplicated by date on insert, so range reads are already normalized.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{PricePoint, PriceSeries, Symbol};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{MarketDataError, Result};

/// Storage contract for daily price history
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Insert (or merge) history for a symbol
    async fn insert(&self, symbol: Symbol, points: Vec<PricePoint>) -> Result<()>;

    /// History for a symbol restricted to `[start, end]`, ascending.
    ///
    /// Fails with [`MarketDataError::UnknownSymbol`] when no history at
    /// all is stored for the symbol; an empty range for a known symbol is
    /// a successful empty series.
    async fn get_range(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate)
        -> Result<PriceSeries>;

    /// Symbols with stored history
    async fn symbols(&self) -> Result<Vec<Symbol>>;
}

/// In-memory price store
#[derive(Debug, Default)]
pub struct InMemoryPriceStore {
    history: RwLock<HashMap<Symbol, Vec<PricePoint>>>,
}

impl InMemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceStore for InMemoryPriceStore {
    async fn insert(&self, symbol: Symbol, points: Vec<PricePoint>) -> Result<()> {
        let mut history = self.history.write().await;
        let stored = history.entry(symbol).or_default();
        stored.extend(points);
        stored.sort_by_key(|p| p.date);
        // later insert wins on a date collision
        stored.reverse();
        stored.dedup_by_key(|p| p.date);
        stored.reverse();
        Ok(())
    }

    async fn get_range(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let history = self.history.read().await;
        let stored = history
            .get(symbol)
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))?;
        let points = stored
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();
        Ok(PriceSeries::new(symbol.clone(), points))
    }

    async fn symbols(&self) -> Result<Vec<Symbol>> {
        Ok(self.history.read().await.keys().cloned().collect())
    }
}
