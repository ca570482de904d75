//! # state-core
//!
//! Pure session state reconciliation for Pitlane (no I/O, instant tests).
//!
//! This crate rebuilds a replica of a racing simulator session (connections,
//! participants, race and track status) from the host's stream of delta
//! events, without any network access, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! Everything here is **pure**: input goes in, output comes out.
//! - [`handlers::apply`] maps `(store, event)` to notifications
//! - [`Engine`] maps host messages to [`Action`]s
//! - [`ResyncGate`] takes the current time as an argument
//!
//! The actual I/O (receiving events, sending requests, publishing
//! notifications) is performed by `state-client`, which interprets the
//! actions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod handlers;
pub mod records;
pub mod resync;
pub mod store;

pub use engine::{Action, Engine, Phase};
pub use records::{BestLap, Connection, Participant, PitStop, ProductInfo, Session, Telemetry};
pub use resync::{ResyncGate, DEFAULT_RESYNC_COOLDOWN, RESYNC_REQUESTS};
pub use store::{LinkFault, Store};
