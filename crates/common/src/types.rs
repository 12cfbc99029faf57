//! Common types used across StockFlow
//!
//! This module provides the fundamental domain types threaded through
//! every message and cache key in the pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier linking an outbound request to its eventual asynchronous
/// response. Generated once per request, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// Create a new random CorrelationId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a CorrelationId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stock ticker symbol (e.g., "AAPL", "MSFT")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a new Symbol (normalized to uppercase)
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the symbol carries no characters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Kind of analysis a request asks for. Each kind has its own bus channel
/// so analysis services subscribe only to the work they implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Simple moving average over trailing closes
    Sma,
    /// Relative strength index
    Rsi,
    /// Price volatility over a window
    Volatility,
}

impl AnalysisType {
    /// Bus channel the complete request for this analysis type is published to
    pub fn channel(&self) -> &'static str {
        match self {
            AnalysisType::Sma => "stock_analysis_sma",
            AnalysisType::Rsi => "stock_analysis_rsi",
            AnalysisType::Volatility => "stock_analysis_volatility",
        }
    }

    /// Parse from the wire representation used in parameter maps
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sma" => Some(AnalysisType::Sma),
            "rsi" => Some(AnalysisType::Rsi),
            "volatility" => Some(AnalysisType::Volatility),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisType::Sma => write!(f, "sma"),
            AnalysisType::Rsi => write!(f, "rsi"),
            AnalysisType::Volatility => write!(f, "volatility"),
        }
    }
}

/// One daily OHLCV observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Ordered daily price history for one symbol.
///
/// Invariant once [`normalize`](Self::normalize) has run: ascending by
/// date, no duplicate dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series without touching point order
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Self {
        Self { symbol, points }
    }

    /// Create an empty series for a symbol
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sort ascending by date and drop duplicate dates (first occurrence
    /// wins). Callers hand a normalized series to the analysis engine.
    pub fn normalize(&mut self) {
        self.points.sort_by_key(|p| p.date);
        self.points.dedup_by_key(|p| p.date);
    }

    /// Index of the observation on exactly this date, if present
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.points.iter().position(|p| p.date == date)
    }
}

/// One computed output observation of a time-series analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Trading day, at start of day
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl SeriesPoint {
    /// Build a point for a trading day at 00:00
    pub fn at_start_of_day(date: NaiveDate, value: f64) -> Self {
        Self {
            timestamp: date.and_hms_opt(0, 0, 0).unwrap_or_default(),
            value,
        }
    }
}
