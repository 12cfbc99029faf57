//! Data-fetch responder
//!
//! Consumes `stock_data_request` messages and publishes a correlated
//! response with the requested price range. An unknown symbol produces no
//! response at all — the requester's timeout owns that failure mode, the
//! same way a missing upstream would on a real deployment.

use bus::{channels, MessageBus};
use common::{BusMessage, DataFetchRequest, DataFetchResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::store::PriceStore;
use crate::MarketDataError;

/// Bus-facing market data service
pub struct MarketDataService {
    store: Arc<dyn PriceStore>,
    bus: Arc<dyn MessageBus>,
}

impl MarketDataService {
    pub fn new(store: Arc<dyn PriceStore>, bus: Arc<dyn MessageBus>) -> Self {
        Self { store, bus }
    }

    /// Subscribe to the data-request channel and serve until the bus
    /// closes. Each request is answered in arrival order; lookups are
    /// read-only so there is nothing to contend on.
    pub async fn run(self: Arc<Self>) {
        let mut requests = self.bus.subscribe(channels::DATA_REQUESTS);
        info!(channel = channels::DATA_REQUESTS, "market data service listening");

        while let Some(message) = requests.recv().await {
            match message {
                BusMessage::DataFetchRequest(request) => {
                    self.handle_request(request).await;
                }
                other => {
                    warn!(?other, "unexpected message on data-request channel");
                }
            }
        }
        info!("market data service stopped");
    }

    async fn handle_request(&self, request: DataFetchRequest) {
        info!(
            correlation_id = %request.correlation_id,
            symbol = %request.symbol,
            start = %request.start_date,
            end = %request.end_date,
            "data fetch request received"
        );

        let series = match self
            .store
            .get_range(&request.symbol, request.start_date, request.end_date)
            .await
        {
            Ok(series) => series,
            Err(MarketDataError::UnknownSymbol(symbol)) => {
                warn!(symbol, "no stored history; request will time out upstream");
                return;
            }
            Err(e) => {
                error!(correlation_id = %request.correlation_id, error = %e, "store lookup failed");
                let response = DataFetchResponse::failure(
                    request.correlation_id,
                    request.symbol,
                    e.to_string(),
                );
                self.publish_response(response).await;
                return;
            }
        };

        info!(
            correlation_id = %request.correlation_id,
            points = series.len(),
            "publishing fetch response"
        );
        let response = DataFetchResponse::success(request.correlation_id, series);
        self.publish_response(response).await;
    }

    async fn publish_response(&self, response: DataFetchResponse) {
        if let Err(e) = self
            .bus
            .publish(channels::DATA_RESPONSES, BusMessage::DataFetchResponse(response))
            .await
        {
            error!(error = %e, "failed to publish fetch response");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryPriceStore;
    use bus::InMemoryBus;
    use common::{CorrelationId, FetchStatus, PricePoint, Symbol};

    fn point(date: &str, close: f64) -> PricePoint {
        PricePoint {
            date: date.parse().unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    async fn start_service(store: InMemoryPriceStore, bus: InMemoryBus) {
        let service = Arc::new(MarketDataService::new(Arc::new(store), Arc::new(bus)));
        tokio::spawn(service.run());
        // let the subscription land before tests publish
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn test_known_symbol_gets_success_response() {
        let store = InMemoryPriceStore::new();
        store
            .insert(
                Symbol::new("ABC"),
                vec![point("2024-01-08", 100.0), point("2024-01-09", 101.0)],
            )
            .await
            .unwrap();
        let bus = InMemoryBus::new();
        let mut responses = bus.subscribe(channels::DATA_RESPONSES);
        start_service(store, bus.clone()).await;

        let id = CorrelationId::new();
        bus.publish(
            channels::DATA_REQUESTS,
            BusMessage::DataFetchRequest(DataFetchRequest {
                correlation_id: id,
                symbol: Symbol::new("ABC"),
                start_date: "2024-01-08".parse().unwrap(),
                end_date: "2024-01-09".parse().unwrap(),
            }),
        )
        .await
        .unwrap();

        let BusMessage::DataFetchResponse(response) = responses.recv().await.unwrap() else {
            panic!("expected fetch response");
        };
        assert_eq!(response.correlation_id, id);
        assert_eq!(response.status, FetchStatus::Success);
        assert_eq!(response.series.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_symbol_publishes_nothing() {
        let bus = InMemoryBus::new();
        let mut responses = bus.subscribe(channels::DATA_RESPONSES);
        start_service(InMemoryPriceStore::new(), bus.clone()).await;

        bus.publish(
            channels::DATA_REQUESTS,
            BusMessage::DataFetchRequest(DataFetchRequest {
                correlation_id: CorrelationId::new(),
                symbol: Symbol::new("NONE"),
                start_date: "2024-01-01".parse().unwrap(),
                end_date: "2024-01-31".parse().unwrap(),
            }),
        )
        .await
        .unwrap();

        tokio::task::yield_now().await;
        assert!(responses.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_range_is_success_with_empty_series() {
        let store = InMemoryPriceStore::new();
        store
            .insert(Symbol::new("ABC"), vec![point("2023-12-01", 90.0)])
            .await
            .unwrap();
        let bus = InMemoryBus::new();
        let mut responses = bus.subscribe(channels::DATA_RESPONSES);
        start_service(store, bus.clone()).await;

        bus.publish(
            channels::DATA_REQUESTS,
            BusMessage::DataFetchRequest(DataFetchRequest {
                correlation_id: CorrelationId::new(),
                symbol: Symbol::new("ABC"),
                start_date: "2024-06-01".parse().unwrap(),
                end_date: "2024-06-30".parse().unwrap(),
            }),
        )
        .await
        .unwrap();

        let BusMessage::DataFetchResponse(response) = responses.recv().await.unwrap() else {
            panic!("expected fetch response");
        };
        assert_eq!(response.status, FetchStatus::Success);
        assert!(response.series.is_empty());
    }
}
