//! Status and result recording
//!
//! Single choke point for the status+result pair. The cache offers no
//! cross-key transactions, so ordering carries the guarantee: the result
//! payload is written before the status flips to a terminal state, which
//! means no reader ever observes COMPLETED without the paired result
//! already readable. Terminal states are final: once COMPLETED or FAILED
//! is recorded, later writes for the same id are dropped.

use cache::ResultCache;
use common::{CorrelationId, Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::result::{AnalysisResult, AnalysisStatus};

const STATUS_PREFIX: &str = "status:";
const ANALYSIS_PREFIX: &str = "analysis:";

/// Default TTL for the PROCESSING pre-state
pub const DEFAULT_PROCESSING_TTL: Duration = Duration::from_secs(5 * 60);
/// Default TTL for terminal status and result payloads
pub const DEFAULT_TERMINAL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Writes and reads the status/result pair for analysis requests
pub struct AnalysisStatusService {
    cache: Arc<dyn ResultCache>,
    processing_ttl: Duration,
    terminal_ttl: Duration,
}

impl AnalysisStatusService {
    pub fn new(cache: Arc<dyn ResultCache>) -> Self {
        Self::with_ttls(cache, DEFAULT_PROCESSING_TTL, DEFAULT_TERMINAL_TTL)
    }

    pub fn with_ttls(
        cache: Arc<dyn ResultCache>,
        processing_ttl: Duration,
        terminal_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            processing_ttl,
            terminal_ttl,
        }
    }

    fn status_key(id: CorrelationId) -> String {
        format!("{STATUS_PREFIX}{id}")
    }

    fn analysis_key(id: CorrelationId) -> String {
        format!("{ANALYSIS_PREFIX}{id}")
    }

    /// Record the PROCESSING pre-state at request time
    pub async fn record_processing(&self, id: CorrelationId) -> Result<()> {
        if self.has_terminal_status(id).await? {
            warn!(correlation_id = %id, "dropping PROCESSING write for settled request");
            return Ok(());
        }
        self.write_status(id, AnalysisStatus::Processing, self.processing_ttl)
            .await?;
        info!(correlation_id = %id, "processing status recorded");
        Ok(())
    }

    /// Record a COMPLETED result. The result is readable before the
    /// status flips. A no-op when the id is already terminal.
    pub async fn record_completed(&self, result: &AnalysisResult) -> Result<()> {
        debug_assert_eq!(result.status, AnalysisStatus::Completed);
        if self.has_terminal_status(result.correlation_id).await? {
            warn!(
                correlation_id = %result.correlation_id,
                "dropping completed result for already-settled request"
            );
            return Ok(());
        }
        self.write_result(result).await?;
        self.write_status(
            result.correlation_id,
            AnalysisStatus::Completed,
            self.terminal_ttl,
        )
        .await?;
        info!(correlation_id = %result.correlation_id, "analysis result recorded");
        Ok(())
    }

    /// Record a FAILED result with its error message. A no-op when the
    /// id is already terminal.
    pub async fn record_failed(&self, result: &AnalysisResult) -> Result<()> {
        debug_assert_eq!(result.status, AnalysisStatus::Failed);
        if self.has_terminal_status(result.correlation_id).await? {
            warn!(
                correlation_id = %result.correlation_id,
                "dropping failed result for already-settled request"
            );
            return Ok(());
        }
        self.write_result(result).await?;
        self.write_status(
            result.correlation_id,
            AnalysisStatus::Failed,
            self.terminal_ttl,
        )
        .await?;
        error!(
            correlation_id = %result.correlation_id,
            error = result.error_message.as_deref().unwrap_or("unknown"),
            "failed analysis recorded"
        );
        Ok(())
    }

    /// Current status, `None` when unknown or expired
    pub async fn get_status(&self, id: CorrelationId) -> Result<Option<AnalysisStatus>> {
        let raw = self
            .cache
            .get(&Self::status_key(id))
            .await
            .map_err(|e| Error::internal(e.to_string()))?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// The completed result, `None` while PROCESSING, on FAILED, or when
    /// unknown. Callers distinguish those through [`get_status`](Self::get_status).
    pub async fn get_result(&self, id: CorrelationId) -> Result<Option<AnalysisResult>> {
        match self.get_status(id).await? {
            Some(AnalysisStatus::Completed) => {
                let raw = self
                    .cache
                    .get(&Self::analysis_key(id))
                    .await
                    .map_err(|e| Error::internal(e.to_string()))?;
                match raw {
                    Some(json) => Ok(Some(serde_json::from_str(&json)?)),
                    // status outlived the result payload; treat as gone
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    async fn has_terminal_status(&self, id: CorrelationId) -> Result<bool> {
        Ok(matches!(
            self.get_status(id).await?,
            Some(status) if status.is_terminal()
        ))
    }

    async fn write_status(
        &self,
        id: CorrelationId,
        status: AnalysisStatus,
        ttl: Duration,
    ) -> Result<()> {
        let json = serde_json::to_string(&status)?;
        self.cache
            .set(&Self::status_key(id), json, ttl)
            .await
            .map_err(|e| Error::internal(e.to_string()))
    }

    async fn write_result(&self, result: &AnalysisResult) -> Result<()> {
        let json = serde_json::to_string(result)?;
        self.cache
            .set(&Self::analysis_key(result.correlation_id), json, self.terminal_ttl)
            .await
            .map_err(|e| Error::internal(e.to_string()))
    }
}
