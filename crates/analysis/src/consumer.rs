//! Correlated analysis consumer
//!
//! Subscribes to the SMA request channel, fetches the price history it
//! needs over the bus and records a terminal result for every request it
//! sees. A fetch that times out or fails upstream becomes a FAILED
//! result with the reason; the consumer itself never dies on a bad
//! request.

use bus::{channels, MessageBus};
use common::{AnalysisRequest, AnalysisType, BusMessage, DataFetchRequest, Error, PriceSeries, Result, SeriesPoint};
use correlator::RequestCorrelator;
use observability::PipelineMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::engine::{compute_sma, SmaParams};
use crate::result::{AnalysisOutput, AnalysisResult};
use crate::status::AnalysisStatusService;

/// Deadline for one correlated data fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// SMA worker driven by bus messages
pub struct CorrelatedAnalysisConsumer {
    bus: Arc<dyn MessageBus>,
    correlator: RequestCorrelator<PriceSeries>,
    status: Arc<AnalysisStatusService>,
    fetch_timeout: Duration,
    metrics: PipelineMetrics,
}

impl CorrelatedAnalysisConsumer {
    pub fn new(bus: Arc<dyn MessageBus>, status: Arc<AnalysisStatusService>) -> Self {
        Self::with_timeout(bus, status, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(
        bus: Arc<dyn MessageBus>,
        status: Arc<AnalysisStatusService>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            bus,
            correlator: RequestCorrelator::new(),
            status,
            fetch_timeout,
            metrics: PipelineMetrics::new("sma-analysis"),
        }
    }

    /// Serve until the bus closes. Responses are routed to their pending
    /// slot on a dedicated task; each request runs on its own task so a
    /// slow fetch never blocks the next request.
    pub async fn run(self: Arc<Self>) {
        let mut responses = self.bus.subscribe(channels::DATA_RESPONSES);
        let mut requests = self.bus.subscribe(AnalysisType::Sma.channel());
        info!(
            channel = AnalysisType::Sma.channel(),
            timeout = ?self.fetch_timeout,
            "analysis consumer listening"
        );

        let correlator = self.correlator.clone();
        tokio::spawn(async move {
            while let Some(message) = responses.recv().await {
                match message {
                    BusMessage::DataFetchResponse(response) => {
                        let outcome = match response.status {
                            common::FetchStatus::Success => Ok(response.series),
                            common::FetchStatus::Failure(reason) => Err(reason),
                        };
                        correlator.resolve(response.correlation_id, outcome);
                    }
                    other => {
                        warn!(?other, "unexpected message on data-response channel");
                    }
                }
            }
        });

        while let Some(message) = requests.recv().await {
            match message {
                BusMessage::AnalysisRequest(request) => {
                    let consumer = Arc::clone(&self);
                    tokio::spawn(async move {
                        consumer.handle_request(request).await;
                    });
                }
                other => {
                    warn!(?other, "unexpected message on analysis channel");
                }
            }
        }
        info!("analysis consumer stopped");
    }

    /// Run one request to a terminal status
    pub async fn handle_request(&self, request: AnalysisRequest) {
        let started = Instant::now();
        info!(
            correlation_id = %request.correlation_id,
            symbol = %request.symbol,
            "analysis request received"
        );

        match self.process(&request).await {
            Ok(points) => {
                let elapsed = started.elapsed();
                let result = AnalysisResult::completed(
                    request.correlation_id,
                    request.symbol,
                    request.analysis_type,
                    AnalysisOutput::Series { points },
                    self.metrics.service_name(),
                    elapsed.as_millis() as u64,
                );
                if let Err(e) = self.status.record_completed(&result).await {
                    error!(correlation_id = %result.correlation_id, error = %e, "failed to record result");
                }
                self.metrics.record_completed(elapsed);
            }
            // A slot already pending for the id means this delivery is a
            // duplicate of a request still in flight; the handling that
            // owns the slot records the terminal result.
            Err(Error::DuplicateCorrelationId(_)) => {
                warn!(
                    correlation_id = %request.correlation_id,
                    "dropping duplicate delivery of in-flight request"
                );
            }
            Err(e) => {
                if matches!(e, Error::Timeout(_)) {
                    self.metrics.record_fetch_timeout();
                }
                let elapsed = started.elapsed();
                let result = AnalysisResult::failed(
                    request.correlation_id,
                    request.symbol,
                    request.analysis_type,
                    e.to_string(),
                    self.metrics.service_name(),
                    elapsed.as_millis() as u64,
                );
                if let Err(e) = self.status.record_failed(&result).await {
                    error!(correlation_id = %result.correlation_id, error = %e, "failed to record failure");
                }
                self.metrics.record_failed(elapsed);
            }
        }
    }

    async fn process(&self, request: &AnalysisRequest) -> Result<Vec<SeriesPoint>> {
        let params = SmaParams::from_parameters(&request.parameters)?;
        let pending = self.correlator.issue(request.correlation_id)?;

        let fetch = DataFetchRequest {
            correlation_id: request.correlation_id,
            symbol: request.symbol.clone(),
            start_date: params.padded_fetch_start(),
            end_date: params.end_date,
        };
        if let Err(e) = self
            .bus
            .publish(channels::DATA_REQUESTS, BusMessage::DataFetchRequest(fetch))
            .await
        {
            // nothing went out, so no response can ever resolve the slot
            self.correlator.cancel(pending);
            return Err(Error::internal(e.to_string()));
        }

        let mut series = self.correlator.wait(pending, self.fetch_timeout).await?;
        series.normalize();
        compute_sma(&series, &params)
    }
}
