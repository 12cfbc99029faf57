//! Analysis trigger entry point
//!
//! Validation happens before any side effect, so a rejected request
//! leaves no trace. An accepted request produces exactly one status
//! write and one publish, in that order, and the correlation id is
//! returned to the caller as the polling handle.

use bus::MessageBus;
use common::{AnalysisRequest, AnalysisType, BusMessage, CorrelationId, Error, Result, Symbol};
use observability::PipelineMetrics;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::engine::SmaParams;
use crate::status::AnalysisStatusService;

/// Accepts analysis requests and hands them to the pipeline
pub struct AnalysisOrchestrator {
    bus: Arc<dyn MessageBus>,
    status: Arc<AnalysisStatusService>,
    metrics: PipelineMetrics,
}

impl AnalysisOrchestrator {
    pub fn new(bus: Arc<dyn MessageBus>, status: Arc<AnalysisStatusService>) -> Self {
        Self {
            bus,
            status,
            metrics: PipelineMetrics::new("orchestrator"),
        }
    }

    /// Trigger one analysis.
    ///
    /// On success the request is PROCESSING and published to the
    /// channel owned by `analysis_type`; the returned correlation id is
    /// the handle for status polling. On [`Error::InvalidRequest`]
    /// nothing was recorded or published.
    pub async fn trigger_analysis(
        &self,
        symbol: Symbol,
        analysis_type: AnalysisType,
        parameters: HashMap<String, String>,
    ) -> Result<CorrelationId> {
        validate(&symbol, analysis_type, &parameters)?;

        let id = CorrelationId::new();
        self.status.record_processing(id).await?;

        let request = AnalysisRequest::new(id, symbol.clone(), analysis_type, parameters);
        self.bus
            .publish(analysis_type.channel(), BusMessage::AnalysisRequest(request))
            .await
            .map_err(|e| Error::internal(e.to_string()))?;

        self.metrics.record_triggered();
        info!(
            correlation_id = %id,
            symbol = %symbol,
            %analysis_type,
            "analysis triggered"
        );
        Ok(id)
    }
}

fn validate(
    symbol: &Symbol,
    analysis_type: AnalysisType,
    parameters: &HashMap<String, String>,
) -> Result<()> {
    if symbol.as_str().is_empty() {
        return Err(Error::invalid_request("symbol must not be empty"));
    }
    match analysis_type {
        AnalysisType::Sma => {
            SmaParams::from_parameters(parameters)?;
        }
        // no consumer serves these channels yet; rejecting up front beats
        // parking the request in PROCESSING until its TTL expires
        AnalysisType::Rsi | AnalysisType::Volatility => {
            return Err(Error::invalid_request(format!(
                "analysis type '{analysis_type}' is not available"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::AnalysisStatus;
    use assert_matches::assert_matches;
    use bus::InMemoryBus;
    use cache::InMemoryCache;

    fn sma_parameters() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("startDate".to_string(), "2024-01-08".to_string());
        map.insert("endDate".to_string(), "2024-01-12".to_string());
        map.insert("period".to_string(), "5".to_string());
        map
    }

    fn fixture() -> (Arc<InMemoryBus>, Arc<AnalysisStatusService>, AnalysisOrchestrator) {
        let bus = Arc::new(InMemoryBus::new());
        let status = Arc::new(AnalysisStatusService::new(Arc::new(InMemoryCache::new())));
        let orchestrator =
            AnalysisOrchestrator::new(bus.clone() as Arc<dyn MessageBus>, status.clone());
        (bus, status, orchestrator)
    }

    #[tokio::test]
    async fn test_trigger_records_processing_and_publishes() {
        let (bus, status, orchestrator) = fixture();
        let mut rx = bus.subscribe(AnalysisType::Sma.channel());

        let id = orchestrator
            .trigger_analysis(Symbol::new("ABC"), AnalysisType::Sma, sma_parameters())
            .await
            .unwrap();

        assert_eq!(
            status.get_status(id).await.unwrap(),
            Some(AnalysisStatus::Processing)
        );
        let msg = rx.recv().await.unwrap();
        assert_matches!(
            msg,
            BusMessage::AnalysisRequest(req) if req.correlation_id == id
                && req.symbol == Symbol::new("ABC")
        );
        // exactly one publish
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalid_request_has_no_side_effects() {
        let (bus, _status, orchestrator) = fixture();
        let mut rx = bus.subscribe(AnalysisType::Sma.channel());

        let mut bad = sma_parameters();
        bad.insert("period".to_string(), "0".to_string());
        let err = orchestrator
            .trigger_analysis(Symbol::new("ABC"), AnalysisType::Sma, bad)
            .await
            .unwrap_err();

        assert_matches!(err, Error::InvalidRequest(_));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unserved_analysis_type_rejected() {
        let (bus, _status, orchestrator) = fixture();
        let mut rx = bus.subscribe(AnalysisType::Rsi.channel());

        let err = orchestrator
            .trigger_analysis(Symbol::new("ABC"), AnalysisType::Rsi, HashMap::new())
            .await
            .unwrap_err();

        assert_matches!(err, Error::InvalidRequest(_));
        // nothing was parked in PROCESSING and nothing was published
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let (_bus, _status, orchestrator) = fixture();
        let err = orchestrator
            .trigger_analysis(Symbol::new(""), AnalysisType::Sma, sma_parameters())
            .await
            .unwrap_err();
        assert_matches!(err, Error::InvalidRequest(_));
    }

    #[tokio::test]
    async fn test_distinct_ids_per_trigger() {
        let (_bus, _status, orchestrator) = fixture();
        let a = orchestrator
            .trigger_analysis(Symbol::new("ABC"), AnalysisType::Sma, sma_parameters())
            .await
            .unwrap();
        let b = orchestrator
            .trigger_analysis(Symbol::new("ABC"), AnalysisType::Sma, sma_parameters())
            .await
            .unwrap();
        assert_ne!(a, b);
    }
}
