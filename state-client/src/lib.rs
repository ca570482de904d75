//! # state-client
//!
//! Async driver for the Pitlane session state engine.
//!
//! This is the library applications use to keep a live replica of a
//! racing simulator session and react to its changes.
//!
//! ## Features
//!
//! - **Host Abstraction**: Pluggable event source and request sink (live, replay, mock)
//! - **Notification Bus**: Broadcast fan-out to any number of subscribers
//! - **Spaced Resync**: Recovery requests go out one at a time
//! - **Pure State Machine**: Uses state-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use pitlane_state_client::{ClientConfig, StateClient};
//!
//! let config = ClientConfig::from_file(Path::new("pitlane.toml"))?;
//! let client = StateClient::new(config, host);
//! let mut notifications = client.subscribe();
//! client.run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bus;
pub mod client;
pub mod config;
pub mod host;

pub use bus::NotificationBus;
pub use client::{ClientError, StateClient};
pub use config::{ClientConfig, ConfigError};
pub use host::{Host, HostError, MockHost, SentRequest};
