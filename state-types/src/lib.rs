//! # state-types
//!
//! Shared types for the Pitlane session state engine.
//!
//! This crate provides the vocabulary used across all Pitlane crates:
//! - [`Ucid`], [`Plid`] - Connection and participant ids
//! - [`Event`] - Inbound simulator events and their payloads
//! - [`HostMessage`] - Lifecycle signals and events as delivered by the host
//! - [`StateRequest`] - Outbound resync requests
//! - [`Notification`] - Derived change notifications
//! - [`Desync`] - Reasons the replica was judged out of sync

#![warn(missing_docs)]
#![warn(clippy::all)]

mod envelope;
mod error;
mod events;
mod ids;
mod notifications;
mod requests;

pub use envelope::HostMessage;
pub use error::Desync;
pub use events::{
    AxisInfo, CarTelemetry, ConnectionClosed, ConnectionRenamed, Event, GridReorder, LapTiming,
    MultiplayerStart, NewConnection, NewParticipant, ParticipantLeave, PitStopFinish,
    PitStopStart, PositionBatch, RaceFinish, RaceProgress, RaceResult, RaceStart, SessionState,
    SplitTiming, Takeover, TelePit, VersionInfo,
};
pub use ids::{Plid, Ucid};
pub use notifications::Notification;
pub use requests::StateRequest;
