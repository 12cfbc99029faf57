//! Common types and utilities for StockFlow
//!
//! This crate provides shared types, messages, and error handling used
//! across all StockFlow crates.
//!
//! # Modules
//!
//! - [`error`] - Common error taxonomy
//! - [`types`] - Shared domain types (CorrelationId, Symbol, price series)
//! - [`messages`] - Wire messages exchanged over the bus

pub mod error;
pub mod messages;
pub mod types;

pub use error::{Error, Result};
pub use messages::{AnalysisRequest, BusMessage, DataFetchRequest, DataFetchResponse, FetchStatus};
pub use types::*;
