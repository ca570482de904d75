//! Desync detection and resync requests.
//!
//! Desync conditions cascade: one missing participant tends to produce
//! further misses in the same batch and the next few events. The gate
//! collapses any such burst into a single resync cycle by refusing every
//! trigger within a fixed cool-down of the last accepted one.

use std::time::{Duration, Instant};

use pitlane_state_types::StateRequest;

/// Minimum spacing between two resync cycles.
pub const DEFAULT_RESYNC_COOLDOWN: Duration = Duration::from_secs(10);

/// Requests issued by one resync cycle, in sending order.
pub const RESYNC_REQUESTS: [StateRequest; 4] = [
    StateRequest::SessionState,
    StateRequest::Connections,
    StateRequest::Participants,
    StateRequest::Layout,
];

/// Cool-down rate limiter for resync cycles.
///
/// Time is passed in by the caller so the gate stays pure and tests can
/// drive it with synthetic instants.
#[derive(Debug, Clone)]
pub struct ResyncGate {
    cooldown: Duration,
    last: Option<Instant>,
}

impl ResyncGate {
    /// Create a gate with the given cool-down.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// The configured cool-down.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// When the last resync cycle was accepted, if ever.
    pub fn last_resync(&self) -> Option<Instant> {
        self.last
    }

    /// Decide whether a resync may run now.
    ///
    /// Returns false, without side effects, when `now` falls within the
    /// cool-down of the last accepted resync. Otherwise records `now` and
    /// returns true.
    pub fn should_resync(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) <= self.cooldown {
                return false;
            }
        }
        self.last = Some(now);
        true
    }

    /// Forget the last resync so the next trigger passes immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for ResyncGate {
    fn default() -> Self {
        Self::new(DEFAULT_RESYNC_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trigger_passes() {
        let mut gate = ResyncGate::default();
        assert!(gate.should_resync(Instant::now()));
    }

    #[test]
    fn triggers_within_cooldown_are_dropped() {
        let mut gate = ResyncGate::default();
        let t0 = Instant::now();
        assert!(gate.should_resync(t0));
        assert!(!gate.should_resync(t0));
        assert!(!gate.should_resync(t0 + Duration::from_secs(3)));
        assert!(!gate.should_resync(t0 + DEFAULT_RESYNC_COOLDOWN));
        assert_eq!(gate.last_resync(), Some(t0));
    }

    #[test]
    fn trigger_after_cooldown_passes_and_rearms() {
        let mut gate = ResyncGate::default();
        let t0 = Instant::now();
        gate.should_resync(t0);

        let t1 = t0 + DEFAULT_RESYNC_COOLDOWN + Duration::from_millis(1);
        assert!(gate.should_resync(t1));
        assert!(!gate.should_resync(t1 + Duration::from_secs(5)));
    }

    #[test]
    fn accepted_cycles_are_never_closer_than_cooldown() {
        let mut gate = ResyncGate::default();
        let t0 = Instant::now();
        let mut accepted = Vec::new();

        // A trigger every 700ms for two minutes.
        for step in 0..170u64 {
            let now = t0 + Duration::from_millis(step * 700);
            if gate.should_resync(now) {
                accepted.push(now);
            }
        }

        assert!(accepted.len() > 1);
        for pair in accepted.windows(2) {
            assert!(pair[1] - pair[0] > DEFAULT_RESYNC_COOLDOWN);
        }
    }

    #[test]
    fn reset_rearms_immediately() {
        let mut gate = ResyncGate::default();
        let t0 = Instant::now();
        gate.should_resync(t0);
        gate.reset();
        assert_eq!(gate.last_resync(), None);
        assert!(gate.should_resync(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn custom_cooldown() {
        let mut gate = ResyncGate::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(gate.should_resync(t0));
        assert!(gate.should_resync(t0 + Duration::from_millis(1001)));
        assert_eq!(gate.cooldown(), Duration::from_secs(1));
    }

    #[test]
    fn resync_batch_is_four_distinct_requests() {
        let distinct: std::collections::HashSet<_> = RESYNC_REQUESTS.iter().collect();
        assert_eq!(distinct.len(), 4);
        assert_eq!(RESYNC_REQUESTS[0], StateRequest::SessionState);
    }
}
