//! Request/response correlation for StockFlow
//!
//! A [`RequestCorrelator`] pairs an outbound request with its eventual
//! inbound response across service boundaries. The publishing call
//! returns immediately; the waiting call suspends on a per-id oneshot
//! channel until the response handler resolves the slot or the deadline
//! passes.
//!
//! Guarantees:
//! - at most one pending slot per correlation id,
//! - exactly one winning resolution per id (later resolves are no-ops),
//! - a timed-out wait releases its slot, so a straggling response is
//!   ignored instead of resolving a stale slot,
//! - per-id atomicity only; independent requests never contend on a lock.
//!
//! The correlator never retries. Retry policy belongs to the caller.

use common::{CorrelationId, Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Outcome delivered to a waiting slot: the payload, or the responder's
/// failure reason verbatim.
type Resolution<T> = std::result::Result<T, String>;

/// A registered slot awaiting its correlated response.
///
/// Obtained from [`RequestCorrelator::issue`] and consumed by
/// [`RequestCorrelator::wait`].
#[derive(Debug)]
pub struct Pending<T> {
    id: CorrelationId,
    rx: oneshot::Receiver<Resolution<T>>,
}

impl<T> Pending<T> {
    /// Correlation id this slot is keyed by
    pub fn id(&self) -> CorrelationId {
        self.id
    }
}

/// Concurrency-safe table of pending slots keyed by correlation id.
///
/// Cheap to clone; clones share the same table. Entry lifecycle is
/// create-on-issue, destroy-on-resolve-or-timeout.
#[derive(Debug)]
pub struct RequestCorrelator<T> {
    pending: Arc<DashMap<CorrelationId, oneshot::Sender<Resolution<T>>>>,
}

impl<T> Clone for RequestCorrelator<T> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T: Send + 'static> Default for RequestCorrelator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> RequestCorrelator<T> {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Register a slot for a correlation id.
    ///
    /// Fails with [`Error::DuplicateCorrelationId`] if a slot is already
    /// pending for the id. Ids are generated fresh per request, so a
    /// collision means the same request was delivered twice; callers
    /// treat it as a signal to drop the redundant delivery.
    pub fn issue(&self, id: CorrelationId) -> Result<Pending<T>> {
        let (tx, rx) = oneshot::channel();
        match self.pending.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(Error::DuplicateCorrelationId(id.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(tx);
                debug!(correlation_id = %id, "pending slot issued");
                Ok(Pending { id, rx })
            }
        }
    }

    /// Discard a slot without resolving it, releasing the id for a fresh
    /// attempt. Used when the request behind the slot never made it out.
    pub fn cancel(&self, pending: Pending<T>) {
        self.pending.remove(&pending.id);
        debug!(correlation_id = %pending.id, "pending slot cancelled");
    }

    /// Fulfil the slot for a correlation id. First call wins; resolving an
    /// already-resolved, expired, or unknown id is logged and dropped.
    pub fn resolve(&self, id: CorrelationId, outcome: Resolution<T>) {
        match self.pending.remove(&id) {
            Some((_, tx)) => {
                if tx.send(outcome).is_err() {
                    // Waiter gave up between removal and send; no-op.
                    debug!(correlation_id = %id, "resolution arrived after waiter left");
                }
            }
            None => {
                warn!(correlation_id = %id, "dropping resolution for unknown or settled slot");
            }
        }
    }

    /// Suspend until the slot resolves or the timeout elapses.
    ///
    /// On timeout the slot is removed and the call fails with
    /// [`Error::Timeout`]; an upstream failure surfaces as
    /// [`Error::UpstreamFailure`] with the responder's reason verbatim.
    /// Whichever of resolve and timeout happens first wins; the loser is
    /// a no-op.
    pub async fn wait(&self, pending: Pending<T>, timeout: Duration) -> Result<T> {
        let Pending { id, rx } = pending;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Ok(payload))) => Ok(payload),
            Ok(Ok(Err(reason))) => Err(Error::UpstreamFailure(reason)),
            Ok(Err(_closed)) => {
                // Sender dropped without resolving; treat like expiry.
                self.pending.remove(&id);
                Err(Error::internal(format!(
                    "pending slot for {id} closed without resolution"
                )))
            }
            Err(_elapsed) => {
                self.pending.remove(&id);
                debug!(correlation_id = %id, ?timeout, "pending slot expired");
                Err(Error::Timeout(timeout))
            }
        }
    }

    /// Number of slots currently pending
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let correlator: RequestCorrelator<u32> = RequestCorrelator::new();
        let id = CorrelationId::new();
        let pending = correlator.issue(id).unwrap();

        correlator.resolve(id, Ok(7));

        let value = correlator
            .wait(pending, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(correlator.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_issue_rejected() {
        let correlator: RequestCorrelator<u32> = RequestCorrelator::new();
        let id = CorrelationId::new();
        let _pending = correlator.issue(id).unwrap();

        assert_matches!(correlator.issue(id), Err(Error::DuplicateCorrelationId(_)));
    }

    #[tokio::test]
    async fn test_cancel_releases_slot() {
        let correlator: RequestCorrelator<u32> = RequestCorrelator::new();
        let id = CorrelationId::new();
        let pending = correlator.issue(id).unwrap();

        correlator.cancel(pending);
        assert_eq!(correlator.pending_count(), 0);

        // the id is free for a fresh attempt
        let pending = correlator.issue(id).unwrap();
        assert_eq!(pending.id(), id);
    }

    #[tokio::test]
    async fn test_second_resolve_is_noop() {
        let correlator: RequestCorrelator<u32> = RequestCorrelator::new();
        let id = CorrelationId::new();
        let pending = correlator.issue(id).unwrap();

        correlator.resolve(id, Ok(1));
        correlator.resolve(id, Ok(2));

        let value = correlator
            .wait(pending, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_and_releases_slot() {
        let correlator: RequestCorrelator<u32> = RequestCorrelator::new();
        let id = CorrelationId::new();
        let pending = correlator.issue(id).unwrap();

        let result = correlator.wait(pending, Duration::from_secs(30)).await;

        assert_matches!(result, Err(Error::Timeout(_)));
        assert_eq!(correlator.pending_count(), 0);

        // A straggling response must not resurrect the outcome.
        correlator.resolve(id, Ok(9));
        assert_eq!(correlator.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_surfaces_reason_verbatim() {
        let correlator: RequestCorrelator<u32> = RequestCorrelator::new();
        let id = CorrelationId::new();
        let pending = correlator.issue(id).unwrap();

        correlator.resolve(id, Err("RATE_LIMITED".to_string()));

        let err = correlator
            .wait(pending, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_matches!(err, Error::UpstreamFailure(reason) if reason == "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_independent_ids_do_not_interfere() {
        let correlator: RequestCorrelator<u32> = RequestCorrelator::new();
        let id_a = CorrelationId::new();
        let id_b = CorrelationId::new();
        let pending_a = correlator.issue(id_a).unwrap();
        let pending_b = correlator.issue(id_b).unwrap();

        correlator.resolve(id_b, Ok(2));
        correlator.resolve(id_a, Ok(1));

        let (a, b) = tokio::join!(
            correlator.wait(pending_a, Duration::from_secs(1)),
            correlator.wait(pending_b, Duration::from_secs(1)),
        );
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_concurrent_waiters() {
        let correlator: RequestCorrelator<usize> = RequestCorrelator::new();
        let mut handles = Vec::new();
        let mut ids = Vec::new();

        for i in 0..50 {
            let id = CorrelationId::new();
            let pending = correlator.issue(id).unwrap();
            ids.push((id, i));
            let correlator = correlator.clone();
            handles.push(tokio::spawn(async move {
                correlator.wait(pending, Duration::from_secs(5)).await
            }));
        }

        for (id, i) in &ids {
            correlator.resolve(*id, Ok(*i));
        }

        for (handle, (_, i)) in handles.into_iter().zip(ids.iter()) {
            assert_eq!(handle.await.unwrap().unwrap(), *i);
        }
        assert_eq!(correlator.pending_count(), 0);
    }
}
