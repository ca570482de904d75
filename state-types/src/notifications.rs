//! Derived notifications published to downstream consumers.

use serde::{Deserialize, Serialize};

use crate::{Desync, Plid, Ucid};

/// A change in the replica that consumers may react to.
///
/// Notifications carry ids only. Consumers look the record up in the
/// store when they need its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notification", content = "data", rename_all = "snake_case")]
pub enum Notification {
    /// A connection was added.
    ConnectionNew(Ucid),
    /// A connection is about to be removed; it is still in the store.
    ConnectionLeaving(Ucid),
    /// A connection was removed.
    ConnectionLeft(Ucid),
    /// A connection changed its display name or plate.
    ConnectionRenamed(Ucid),
    /// A participant was added.
    ParticipantNew(Plid),
    /// One or more participants changed.
    ParticipantUpdated(Vec<Plid>),
    /// A participant is about to be removed; it is still in the store.
    ParticipantLeaving(Plid),
    /// A participant was removed.
    ParticipantLeft(Plid),
    /// A participant changed owner.
    ParticipantSwapped(Plid),
    /// The track changed.
    TrackChanged,
    /// The weather changed.
    WeatherChanged,
    /// The wind changed.
    WindChanged,
    /// The autocross layout changed.
    LayoutChanged,
    /// A new session-wide best lap was set.
    BestLapChanged,
    /// Joined a multiplayer server.
    ServerJoined,
    /// Left the multiplayer server.
    ServerLeft,
    /// Race-scoped fields were cleared for a restart.
    RaceReset,
    /// A race started.
    RaceStarted,
    /// The replica diverged from the host.
    OutOfSync(Desync),
    /// The engine is wired and the store is accessible.
    Ready,
    /// The engine was unwired and the store cleared.
    NotReady,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_json_shape() {
        let n = Notification::ParticipantUpdated(vec![Plid::new(1), Plid::new(4)]);
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"notification":"participant_updated","data":[1,4]}"#);

        let json = serde_json::to_string(&Notification::RaceStarted).unwrap();
        assert_eq!(json, r#"{"notification":"race_started"}"#);
    }

    #[test]
    fn out_of_sync_carries_reason() {
        let n = Notification::OutOfSync(Desync::UnknownParticipant { plid: Plid::new(9) });
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(
            json,
            r#"{"notification":"out_of_sync","data":{"reason":"unknown_participant","plid":9}}"#
        );
    }
}
