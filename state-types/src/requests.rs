//! Outbound state requests.
//!
//! The engine only ever asks the host to resend state. Each request is
//! fire-and-forget: the answer arrives later as ordinary [`Event`]s.
//!
//! [`Event`]: crate::Event

use serde::{Deserialize, Serialize};

/// A request for the host to resend part of its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateRequest {
    /// Full session state (answered with a session update).
    SessionState,
    /// Every live connection (answered with one connection-established each).
    Connections,
    /// Every participant in the race (answered with one participant-join each).
    Participants,
    /// Autocross layout (answered with axis info).
    Layout,
}

impl StateRequest {
    /// Short name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            StateRequest::SessionState => "session_state",
            StateRequest::Connections => "connections",
            StateRequest::Participants => "participants",
            StateRequest::Layout => "layout",
        }
    }
}
