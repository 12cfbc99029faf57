//! Message bus abstraction for StockFlow
//!
//! Services communicate only by publishing typed messages to named
//! channels. Publishing is fire-and-forget: no delivery acknowledgement
//! is returned to the caller, delivery may duplicate, and ordering across
//! channels is not guaranteed. Consumers must be idempotent per
//! correlation id wherever they mutate state.
//!
//! The [`MessageBus`] trait is the seam; [`InMemoryBus`] is the in-process
//! implementation used by the monolith deployment and by tests.

pub mod channels;
pub mod memory;

use async_trait::async_trait;
use common::BusMessage;
use tokio::sync::mpsc;

/// Errors that can occur on the bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error("Bus error: {0}")]
    Other(String),
}

pub type BusResult<T> = Result<T, BusError>;

/// Fire-and-forget publish / subscribe over named channels.
///
/// Implementations route each published message to every current
/// subscriber of the channel. A publish to a channel with no subscribers
/// is not an error; the message is simply dropped.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a message to a channel. Returns once the message is handed
    /// to the transport; there is no delivery acknowledgement.
    async fn publish(&self, channel: &str, message: BusMessage) -> BusResult<()>;

    /// Subscribe to a channel. Every message published to the channel
    /// after this call is delivered to the returned receiver.
    fn subscribe(&self, channel: &str) -> mpsc::UnboundedReceiver<BusMessage>;
}

pub use memory::InMemoryBus;
