//! Lifecycle controller for the session replica.
//!
//! The engine is a pure state machine: it takes host messages as input and
//! produces a list of actions (notifications to publish, requests to send).
//! The actual I/O is performed by the client, not by this module.
//!
//! ```text
//! Disconnected ──Ready──▶ Ready ──Lost──▶ Disconnected
//!      ▲  │                 │
//!      └──┘ Lost            └── Event ─▶ handlers ─▶ notifications
//!                                          │
//!                                     OutOfSync ─▶ ResyncGate ─▶ requests
//! ```

use std::time::{Duration, Instant};

use pitlane_state_types::{Event, HostMessage, Notification, StateRequest};

use crate::handlers;
use crate::resync::{ResyncGate, RESYNC_REQUESTS};
use crate::store::Store;

/// Whether the handlers are wired to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No host link. Events are dropped and the store is inaccessible.
    #[default]
    Disconnected,
    /// Handlers are wired and the store is accessible.
    Ready,
}

/// Instructions produced by the engine for the client to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Publish a notification to consumers.
    Notify(Notification),
    /// Send a state request to the host.
    Send(StateRequest),
}

/// Session replica plus its lifecycle and resync policy.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    phase: Phase,
    store: Store,
    gate: ResyncGate,
}

impl Engine {
    /// Create a disconnected engine with the default resync cool-down.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a disconnected engine with a custom resync cool-down.
    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            gate: ResyncGate::new(cooldown),
            ..Self::default()
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check if the handlers are wired.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// The replica, while ready.
    pub fn store(&self) -> Option<&Store> {
        self.is_ready().then_some(&self.store)
    }

    /// The resync gate (for inspection).
    pub fn gate(&self) -> &ResyncGate {
        &self.gate
    }

    /// Process one host message and return the actions to execute.
    pub fn on_message(&mut self, message: &HostMessage, now: Instant) -> Vec<Action> {
        match message {
            HostMessage::Ready => self.ready(),
            HostMessage::Lost => self.lost(),
            HostMessage::Event(event) => self.on_event(event, now),
        }
    }

    /// Host link is up: start from an empty replica and wire the handlers.
    ///
    /// The resync gate is re-armed so the first desync on the new link
    /// always requests state. Calling this while already ready does nothing.
    pub fn ready(&mut self) -> Vec<Action> {
        if self.is_ready() {
            return vec![];
        }
        self.store.reset();
        self.gate.reset();
        self.phase = Phase::Ready;
        tracing::info!("Session state ready");
        vec![Action::Notify(Notification::Ready)]
    }

    /// Host link is gone: clear the replica and unwire the handlers.
    ///
    /// The store is always reset; `NotReady` is only published on the
    /// transition out of `Ready`.
    pub fn lost(&mut self) -> Vec<Action> {
        self.store.reset();
        self.gate.reset();
        if !self.is_ready() {
            return vec![];
        }
        self.phase = Phase::Disconnected;
        tracing::info!("Session state not ready");
        vec![Action::Notify(Notification::NotReady)]
    }

    /// Apply one event. Dropped when the handlers are not wired.
    pub fn on_event(&mut self, event: &Event, now: Instant) -> Vec<Action> {
        if !self.is_ready() {
            tracing::trace!("Dropping {} while not ready", event.name());
            return vec![];
        }
        let notifications = handlers::apply(&mut self.store, event);
        self.interpret(notifications, now)
    }

    /// Turn handler output into actions, running the resync gate on every
    /// out-of-sync notification.
    fn interpret(&mut self, notifications: Vec<Notification>, now: Instant) -> Vec<Action> {
        let mut actions = Vec::with_capacity(notifications.len());

        for notification in notifications {
            let desynced = matches!(notification, Notification::OutOfSync(_));
            actions.push(Action::Notify(notification));

            if !desynced {
                continue;
            }
            if self.gate.should_resync(now) {
                tracing::debug!("Out of sync, requesting current state");
                actions.extend(RESYNC_REQUESTS.iter().copied().map(Action::Send));
            } else {
                tracing::debug!(
                    "Out of sync, ignoring: within {:?} of last resync",
                    self.gate.cooldown()
                );
            }
        }

        actions
    }
}
