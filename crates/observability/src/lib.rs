//! Observability infrastructure for StockFlow
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics
//! - Pipeline-specific metric helpers
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("stockflow", LogFormat::Pretty)?;
//!
//! // Optional Prometheus exporter
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, PipelineMetrics};
