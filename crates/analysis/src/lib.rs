//! Analysis pipeline for StockFlow
//!
//! This crate owns the requester side of the pipeline:
//!
//! - [`engine`] - pure windowed computations (simple moving average)
//! - [`result`] - the analysis result model (tagged output union)
//! - [`status`] - status/result recording with the COMPLETED-implies-result
//!   guarantee
//! - [`orchestrator`] - entry point that validates, records PROCESSING and
//!   publishes the request
//! - [`consumer`] - correlated consumer that fetches data over the bus,
//!   runs the engine and records the terminal result
//!
//! # Key Invariants
//!
//! - Exactly one status write and one publish per trigger; validation
//!   failures produce no side effects at all
//! - A status record transitions PROCESSING → COMPLETED/FAILED exactly
//!   once and never reverts
//! - No reader observes COMPLETED without the paired result
//! - A timed-out or failed fetch becomes a FAILED result; the consumer
//!   process never crashes on a request

pub mod consumer;
pub mod engine;
pub mod orchestrator;
pub mod result;
pub mod status;

pub use consumer::CorrelatedAnalysisConsumer;
pub use engine::{compute_sma, SmaParams};
pub use orchestrator::AnalysisOrchestrator;
pub use result::{AnalysisOutput, AnalysisResult, AnalysisStatus};
pub use status::AnalysisStatusService;
