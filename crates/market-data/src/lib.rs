//! Market data for StockFlow
//!
//! The data-owning side of the pipeline: a [`PriceStore`] holds daily
//! OHLCV history per symbol, and [`MarketDataService`] answers
//! correlated fetch requests arriving on the bus with the filtered date
//! range.
//!
//! This crate never computes anything over the prices it serves; analysis
//! belongs to the requester side.

pub mod service;
pub mod store;

use thiserror::Error;

/// Errors that can occur during market data operations
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// No history stored for the symbol
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Store backend error
    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, MarketDataError>;

pub use service::MarketDataService;
pub use store::{InMemoryPriceStore, PriceStore};
