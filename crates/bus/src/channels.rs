//! Channel names used by the StockFlow pipeline
//!
//! Per-analysis-type channels come from
//! [`common::AnalysisType::channel`]; the names here are the fixed
//! coordination channels.

/// Price-history fetch requests, consumed by the data-owning service
pub const DATA_REQUESTS: &str = "stock_data_request";

/// Correlated fetch responses, consumed by the requester side
pub const DATA_RESPONSES: &str = "stock_data_responses";
