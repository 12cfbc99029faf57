//! Wire messages exchanged over the message bus
//!
//! All messages are immutable once published and carry the correlation id
//! of the request flow they belong to. Serialization is plain serde so the
//! wire format stays schema-free on the parameter map.

use crate::types::{AnalysisType, CorrelationId, PriceSeries, Symbol};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request to run one analysis for one symbol.
///
/// `parameters` carries analysis-specific knobs (`startDate`, `endDate`,
/// `period`) as strings; validity is analysis-type-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub correlation_id: CorrelationId,
    pub symbol: Symbol,
    pub analysis_type: AnalysisType,
    pub requested_at: DateTime<Utc>,
    pub parameters: HashMap<String, String>,
}

impl AnalysisRequest {
    pub fn new(
        correlation_id: CorrelationId,
        symbol: Symbol,
        analysis_type: AnalysisType,
        parameters: HashMap<String, String>,
    ) -> Self {
        Self {
            correlation_id,
            symbol,
            analysis_type,
            requested_at: Utc::now(),
            parameters,
        }
    }

    /// Look up a parameter by key
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// Request for a symbol's price history over a date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFetchRequest {
    pub correlation_id: CorrelationId,
    pub symbol: Symbol,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Outcome reported by the data-owning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchStatus {
    Success,
    /// Carries the responder's reason verbatim (e.g. "RATE_LIMITED")
    Failure(String),
}

impl FetchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchStatus::Success)
    }
}

/// Response to a [`DataFetchRequest`]. Exactly one is expected per fetch;
/// duplicates must be tolerated by the receiver (first resolve wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFetchResponse {
    pub correlation_id: CorrelationId,
    pub symbol: Symbol,
    /// Present (possibly empty) on success, empty on failure
    pub series: PriceSeries,
    pub status: FetchStatus,
}

impl DataFetchResponse {
    /// Build a success response carrying the fetched series
    pub fn success(correlation_id: CorrelationId, series: PriceSeries) -> Self {
        Self {
            correlation_id,
            symbol: series.symbol.clone(),
            series,
            status: FetchStatus::Success,
        }
    }

    /// Build a failure response with the reason surfaced verbatim
    pub fn failure(
        correlation_id: CorrelationId,
        symbol: Symbol,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id,
            symbol: symbol.clone(),
            series: PriceSeries::empty(symbol),
            status: FetchStatus::Failure(reason.into()),
        }
    }
}

/// Envelope for everything the bus can carry.
///
/// Channels are typed by convention: a subscriber matches the variants it
/// expects and logs anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusMessage {
    AnalysisRequest(AnalysisRequest),
    DataFetchRequest(DataFetchRequest),
    DataFetchResponse(DataFetchResponse),
}
