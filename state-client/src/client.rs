//! StateClient - the async driver for the session replica.
//!
//! # Architecture
//!
//! StateClient feeds host messages into the pure engine (from state-core)
//! and interprets the resulting actions: notifications go out on the
//! [`NotificationBus`], state requests go to the [`Host`].
//!
//! ```text
//! Host ──recv──▶ StateClient ──▶ Engine (pure)
//!  ▲                 │
//!  └──── send ◀──────┴──▶ NotificationBus ──▶ subscribers
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pitlane_state_client::{ClientConfig, MockHost, StateClient};
//!
//! let client = StateClient::new(ClientConfig::default(), MockHost::new());
//! let mut notifications = client.subscribe();
//! client.run().await?;
//! ```

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;

use pitlane_state_core::{Action, Engine, Store};
use pitlane_state_types::{HostMessage, Notification, StateRequest};

use crate::bus::NotificationBus;
use crate::config::ClientConfig;
use crate::host::{Host, HostError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Host error.
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

/// The session state client.
///
/// Owns the engine and drives it from a [`Host`].
pub struct StateClient<H: Host> {
    config: ClientConfig,
    host: H,
    engine: Arc<Mutex<Engine>>,
    bus: NotificationBus,
}

impl<H: Host> StateClient<H> {
    /// Create a new client. The replica stays inaccessible until the host
    /// reports the link is up.
    pub fn new(config: ClientConfig, host: H) -> Self {
        let engine = Engine::with_cooldown(config.cooldown());
        let bus = NotificationBus::new(config.notification_capacity);
        Self {
            config,
            host,
            engine: Arc::new(Mutex::new(engine)),
            bus,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Subscribe to notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.bus.subscribe()
    }

    /// Check if the replica is live.
    pub async fn is_ready(&self) -> bool {
        self.engine.lock().await.is_ready()
    }

    /// Read the replica. Returns `None` while not ready.
    pub async fn with_store<R>(&self, f: impl FnOnce(&Store) -> R) -> Option<R> {
        let engine = self.engine.lock().await;
        engine.store().map(f)
    }

    /// Receive and process one host message.
    ///
    /// Returns `Ok(false)` once the host is closed.
    pub async fn step(&self) -> Result<bool, ClientError> {
        match self.host.recv().await {
            Ok(message) => {
                self.handle(message).await;
                Ok(true)
            }
            Err(HostError::Closed) => {
                tracing::info!("Host closed");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Process host messages until the host is closed.
    pub async fn run(&self) -> Result<(), ClientError> {
        while self.step().await? {}
        Ok(())
    }

    /// Process one message without receiving it from the host.
    ///
    /// Notifications are published before any resync request goes out, so
    /// subscribers never wait on request spacing. When the link comes up the
    /// host is told whether to stream position batches.
    pub async fn handle(&self, message: HostMessage) {
        // Release the engine before doing any I/O.
        let actions = {
            let mut engine = self.engine.lock().await;
            engine.on_message(&message, Instant::now().into_std())
        };
        let link_up = actions.contains(&Action::Notify(Notification::Ready));

        let mut requests = Vec::new();
        for action in actions {
            match action {
                Action::Notify(notification) => self.bus.emit(notification),
                Action::Send(request) => requests.push(request),
            }
        }

        if link_up {
            self.configure_host().await;
        }
        if !requests.is_empty() {
            self.send_spaced(&requests).await;
        }
    }

    async fn configure_host(&self) {
        let enabled = self.config.request_position_updates;
        match self.host.request_position_updates(enabled).await {
            Ok(()) => tracing::debug!("Position updates {}", if enabled { "on" } else { "off" }),
            Err(e) => tracing::warn!("Failed to configure position updates: {}", e),
        }
    }

    /// Send a resync batch one request at a time.
    ///
    /// A failed send is logged and the rest of the batch still goes out.
    async fn send_spaced(&self, requests: &[StateRequest]) {
        let spacing = self.config.spacing();

        for (i, &request) in requests.iter().enumerate() {
            if i > 0 && !spacing.is_zero() {
                tokio::time::sleep(spacing).await;
            }
            match self.host.send(request).await {
                Ok(()) => tracing::debug!("Requested {}", request.name()),
                Err(e) => tracing::warn!("Failed to request {}: {}", request.name(), e),
            }
        }
    }
}
