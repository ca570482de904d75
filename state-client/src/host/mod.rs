//! Host abstraction for the state client.
//!
//! The host is whatever delivers simulator events and accepts state
//! requests: a live socket, a capture file being replayed, or a mock.
//!
//! # Design
//!
//! The trait is async and message-oriented:
//! - `recv()` yields the next [`HostMessage`] (link up, link lost, event)
//! - `send()` transmits a [`StateRequest`]
//! - `request_position_updates()` turns the position batch stream on or off
//!
//! Decoding the simulator's binary protocol is the host's concern; the
//! client only ever sees typed messages.

mod mock;

pub use mock::{MockHost, SentRequest};

use async_trait::async_trait;
use pitlane_state_types::{HostMessage, StateRequest};
use thiserror::Error;

/// Host errors.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host has no more messages and will not produce any.
    #[error("host closed")]
    Closed,

    /// Not connected to the simulator.
    #[error("not connected")]
    NotConnected,

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Source of host messages and sink for state requests.
#[async_trait]
pub trait Host: Send + Sync {
    /// Receive the next message.
    ///
    /// Waits until a message is available. Returns [`HostError::Closed`]
    /// once the host is exhausted.
    async fn recv(&self) -> Result<HostMessage, HostError>;

    /// Ask the simulator to re-send a slice of its state.
    async fn send(&self, request: StateRequest) -> Result<(), HostError>;

    /// Enable or disable position batches for this link.
    ///
    /// Called by the client each time the link comes up.
    async fn request_position_updates(&self, enabled: bool) -> Result<(), HostError>;
}
