//! Mock host for testing.
//!
//! Allows queueing inbound messages and capturing sent requests, with the
//! time each one left so request spacing can be checked.

use super::{Host, HostError};
use async_trait::async_trait;
use pitlane_state_types::{Event, HostMessage, StateRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

/// A request captured by [`MockHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentRequest {
    /// What was requested.
    pub request: StateRequest,
    /// When it was sent (tokio clock, so paused-time tests see virtual time).
    pub at: Instant,
}

/// Mock host for testing.
///
/// Clones share state, so a test can keep one handle while the client owns
/// another.
#[derive(Debug, Default)]
pub struct MockHost {
    inner: Arc<Mutex<MockHostInner>>,
}

#[derive(Debug, Default)]
struct MockHostInner {
    receive_queue: VecDeque<HostMessage>,
    sent: Vec<SentRequest>,
    position_updates: Option<bool>,
    fail_next_send: Option<String>,
    fail_next_recv: Option<String>,
}

impl MockHost {
    /// Create a new mock host with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, MockHostInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a message to be returned by a later `recv()` call.
    pub fn queue_message(&self, message: HostMessage) {
        self.inner().receive_queue.push_back(message);
    }

    /// Queue an event to be returned by a later `recv()` call.
    pub fn queue_event(&self, event: Event) {
        self.queue_message(HostMessage::Event(event));
    }

    /// Number of messages not yet received.
    pub fn pending(&self) -> usize {
        self.inner().receive_queue.len()
    }

    /// Get every request that was sent, in order.
    pub fn sent(&self) -> Vec<SentRequest> {
        self.inner().sent.clone()
    }

    /// Get the requests that were sent, without timestamps.
    pub fn sent_requests(&self) -> Vec<StateRequest> {
        self.inner().sent.iter().map(|s| s.request).collect()
    }

    /// The last position update setting the client asked for, if any.
    pub fn position_updates(&self) -> Option<bool> {
        self.inner().position_updates
    }

    /// Cause the next send() to fail with the given error.
    pub fn fail_next_send(&self, error: &str) {
        self.inner().fail_next_send = Some(error.to_string());
    }

    /// Cause the next recv() to fail with the given error.
    pub fn fail_next_recv(&self, error: &str) {
        self.inner().fail_next_recv = Some(error.to_string());
    }

    /// Clear all state (queue, captured requests, forced failures).
    pub fn reset(&self) {
        *self.inner() = MockHostInner::default();
    }
}

impl Clone for MockHost {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Host for MockHost {
    async fn recv(&self) -> Result<HostMessage, HostError> {
        let mut inner = self.inner();

        if let Some(error) = inner.fail_next_recv.take() {
            return Err(HostError::ReceiveFailed(error));
        }

        inner.receive_queue.pop_front().ok_or(HostError::Closed)
    }

    async fn send(&self, request: StateRequest) -> Result<(), HostError> {
        let mut inner = self.inner();

        if let Some(error) = inner.fail_next_send.take() {
            return Err(HostError::SendFailed(error));
        }

        inner.sent.push(SentRequest {
            request,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn request_position_updates(&self, enabled: bool) -> Result<(), HostError> {
        self.inner().position_updates = Some(enabled);
        Ok(())
    }
}
