//! In-process message bus
//!
//! Fan-out routing over unbounded tokio channels: each subscriber of a
//! channel holds its own receiver and gets its own clone of every
//! published message. Subscribers that dropped their receiver are pruned
//! on the next publish.

use async_trait::async_trait;
use common::BusMessage;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::{BusResult, MessageBus};

/// In-process bus for the monolith deployment and tests.
///
/// Cheap to clone; clones share the same channel table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBus {
    inner: Arc<BusInner>,
}

#[derive(Debug, Default)]
struct BusInner {
    subscribers: DashMap<String, Vec<(u64, mpsc::UnboundedSender<BusMessage>)>>,
    next_sub_id: AtomicU64,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscribers on a channel (test/diagnostic helper)
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.inner
            .subscribers
            .get(channel)
            .map(|subs| subs.iter().filter(|(_, tx)| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, channel: &str, message: BusMessage) -> BusResult<()> {
        let Some(mut subs) = self.inner.subscribers.get_mut(channel) else {
            debug!(channel, "publish to channel with no subscribers; dropped");
            return Ok(());
        };

        subs.retain(|(id, tx)| {
            if tx.send(message.clone()).is_err() {
                debug!(channel, subscriber = id, "pruning dropped subscriber");
                false
            } else {
                true
            }
        });

        trace!(channel, subscribers = subs.len(), "message published");
        Ok(())
    }

    fn subscribe(&self, channel: &str) -> mpsc::UnboundedReceiver<BusMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_sub_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .entry(channel.to_string())
            .or_default()
            .push((id, tx));
        debug!(channel, subscriber = id, "subscriber registered");
        rx
    }
}
