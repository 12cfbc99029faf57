//! Analysis result model
//!
//! One result is written per correlation id (last writer wins if a flow
//! is retried). The output is a tagged union so each shape carries only
//! the fields meaningful to it.

use chrono::{DateTime, Utc};
use common::{AnalysisType, CorrelationId, SeriesPoint, Symbol};
use serde::{Deserialize, Serialize};

/// Lifecycle state of one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    /// COMPLETED or FAILED; no transition occurs after reaching one
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AnalysisStatus::Processing)
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Processing => write!(f, "PROCESSING"),
            AnalysisStatus::Completed => write!(f, "COMPLETED"),
            AnalysisStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Computed payload of an analysis, tagged by shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AnalysisOutput {
    /// Single value (e.g. a volatility figure)
    Scalar {
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// One value per trading day
    Series { points: Vec<SeriesPoint> },
    /// Chart-ready points with labels
    Plot {
        points: Vec<SeriesPoint>,
        title: String,
        x_label: String,
        y_label: String,
    },
}

impl AnalysisOutput {
    /// Empty series output, used for the insufficient-data policy
    pub fn empty_series() -> Self {
        AnalysisOutput::Series { points: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnalysisOutput::Scalar { .. } => false,
            AnalysisOutput::Series { points } | AnalysisOutput::Plot { points, .. } => {
                points.is_empty()
            }
        }
    }
}

/// Terminal record of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub correlation_id: CorrelationId,
    pub symbol: Symbol,
    pub analysis_type: AnalysisType,
    pub status: AnalysisStatus,
    /// Present on COMPLETED; empty-series on insufficient data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<AnalysisOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub computed_at: DateTime<Utc>,
    /// Name of the producing service
    pub computed_by: String,
    pub computation_time_ms: u64,
}

impl AnalysisResult {
    /// Build a COMPLETED result
    pub fn completed(
        correlation_id: CorrelationId,
        symbol: Symbol,
        analysis_type: AnalysisType,
        output: AnalysisOutput,
        computed_by: impl Into<String>,
        computation_time_ms: u64,
    ) -> Self {
        Self {
            correlation_id,
            symbol,
            analysis_type,
            status: AnalysisStatus::Completed,
            output: Some(output),
            error_message: None,
            computed_at: Utc::now(),
            computed_by: computed_by.into(),
            computation_time_ms,
        }
    }

    /// Build a FAILED result carrying the error message
    pub fn failed(
        correlation_id: CorrelationId,
        symbol: Symbol,
        analysis_type: AnalysisType,
        error_message: impl Into<String>,
        computed_by: impl Into<String>,
        computation_time_ms: u64,
    ) -> Self {
        Self {
            correlation_id,
            symbol,
            analysis_type,
            status: AnalysisStatus::Failed,
            output: None,
            error_message: Some(error_message.into()),
            computed_at: Utc::now(),
            computed_by: computed_by.into(),
            computation_time_ms,
        }
    }
}
