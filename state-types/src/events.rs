//! Inbound events delivered by the host.
//!
//! Each variant of [`Event`] is the decoded form of one simulator packet.
//! Payload fields are named after what they mean rather than after the
//! packet layout; the binary encoding is owned by the host.
//!
//! Every payload struct is `#[serde(default)]` so hand-written captures may
//! omit fields they do not care about.

use serde::{Deserialize, Serialize};

use crate::{Plid, Ucid};

/// All inbound events the engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Host product and protocol version (sent on every new host link).
    VersionInfo(VersionInfo),
    /// Keepalive ping. Carries no state.
    Keepalive,
    /// Joined or started a multiplayer server.
    MultiplayerStart(MultiplayerStart),
    /// Left the multiplayer server.
    MultiplayerStop,
    /// Periodic or on-change session state.
    SessionUpdate(SessionState),
    /// A race (or qualifying session) was restarted.
    RaceReset(RaceStart),
    /// Autocross layout information.
    AxisInfo(AxisInfo),
    /// The autocross layout was cleared.
    AxisCleared,
    /// A connection joined the server.
    ConnectionEstablished(NewConnection),
    /// A connection left the server.
    ConnectionClosed(ConnectionClosed),
    /// A connection changed its display name or plate.
    ConnectionRenamed(ConnectionRenamed),
    /// A participant joined the race or left the pits.
    ParticipantJoin(NewParticipant),
    /// A participant started a pit stop.
    PitStopStart(PitStopStart),
    /// A participant finished a pit stop.
    PitStopFinish(PitStopFinish),
    /// A participant teleported to the pit garage.
    TelePit(TelePit),
    /// A participant left the race.
    ParticipantLeave(ParticipantLeave),
    /// A participant was handed from one connection to another.
    Takeover(Takeover),
    /// A participant crossed the finish line (not yet the confirmed result).
    FinishProvisional(RaceFinish),
    /// Confirmed final result for a participant.
    FinishFinal(RaceResult),
    /// A participant completed a lap.
    LapComplete(LapTiming),
    /// A participant crossed a split.
    SplitComplete(SplitTiming),
    /// Multi-car position and telemetry update.
    PositionBatch(PositionBatch),
    /// Starting grid order.
    GridReorder(GridReorder),
}

impl Event {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::VersionInfo(_) => "version_info",
            Event::Keepalive => "keepalive",
            Event::MultiplayerStart(_) => "multiplayer_start",
            Event::MultiplayerStop => "multiplayer_stop",
            Event::SessionUpdate(_) => "session_update",
            Event::RaceReset(_) => "race_reset",
            Event::AxisInfo(_) => "axis_info",
            Event::AxisCleared => "axis_cleared",
            Event::ConnectionEstablished(_) => "connection_established",
            Event::ConnectionClosed(_) => "connection_closed",
            Event::ConnectionRenamed(_) => "connection_renamed",
            Event::ParticipantJoin(_) => "participant_join",
            Event::PitStopStart(_) => "pit_stop_start",
            Event::PitStopFinish(_) => "pit_stop_finish",
            Event::TelePit(_) => "tele_pit",
            Event::ParticipantLeave(_) => "participant_leave",
            Event::Takeover(_) => "takeover",
            Event::FinishProvisional(_) => "finish_provisional",
            Event::FinishFinal(_) => "finish_final",
            Event::LapComplete(_) => "lap_complete",
            Event::SplitComplete(_) => "split_complete",
            Event::PositionBatch(_) => "position_batch",
            Event::GridReorder(_) => "grid_reorder",
        }
    }
}

/// Race status reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceProgress {
    /// No race in progress.
    #[default]
    None,
    /// A race is running.
    Race,
    /// A qualifying session is running.
    Qualifying,
}

/// Host product and protocol version.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionInfo {
    /// Simulator version string.
    pub version: String,
    /// Product name (demo, S1, S2, ...).
    pub product: String,
    /// Protocol version.
    pub protocol: u8,
}

/// Multiplayer session joined or started.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplayerStart {
    /// True when this simulator instance is the host.
    pub host: bool,
    /// Server name.
    pub host_name: String,
}

/// Session state snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Replay speed multiplier.
    pub replay_speed: f32,
    /// Host state flags.
    pub flags: u16,
    /// Active in-game camera.
    pub in_game_cam: u8,
    /// Participant currently being viewed (zero for none).
    pub view_plid: Plid,
    /// Number of participants in the race.
    pub num_players: u8,
    /// Number of connections, host included.
    pub num_connections: u8,
    /// Number of participants that have finished or qualified.
    pub num_finished: u8,
    /// Race status.
    pub race_progress: RaceProgress,
    /// Qualifying length in minutes.
    pub qualifying_minutes: u8,
    /// Race length in laps.
    pub race_laps: u8,
    /// Short track name.
    pub track: String,
    /// Weather code.
    pub weather: u8,
    /// Wind code (none, weak, strong).
    pub wind: u8,
}

/// Race start parameters sent on restart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceStart {
    /// Race length in laps.
    pub race_laps: u8,
    /// Qualifying length in minutes.
    pub qualifying_minutes: u8,
    /// Number of participants in the race.
    pub num_players: u8,
    /// Lap timing mode.
    pub timing: u8,
    /// Short track name.
    pub track: String,
    /// Weather code.
    pub weather: u8,
    /// Wind code.
    pub wind: u8,
    /// Race flags.
    pub flags: u16,
    /// Total nodes in the path.
    pub num_nodes: u16,
    /// Node index of the finish line.
    pub finish_node: u16,
    /// Node indices of the split lines.
    pub split_nodes: [u16; 3],
}

/// Autocross layout information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisInfo {
    /// Autocross start position.
    pub axis_start: u8,
    /// Number of checkpoints.
    pub checkpoints: u8,
    /// Number of objects.
    pub objects: u16,
    /// Layout name.
    pub layout_name: String,
}

/// New connection on the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewConnection {
    /// Id of the new connection.
    pub ucid: Ucid,
    /// Whether the connection logged in as admin.
    pub admin: bool,
    /// Account name.
    pub user_name: String,
    /// Display name.
    pub player_name: String,
    /// Connection flags.
    pub flags: u8,
}

/// Connection left the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionClosed {
    /// Id of the departing connection.
    pub ucid: Ucid,
    /// Leave reason code.
    pub reason: u8,
}

/// Connection renamed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionRenamed {
    /// Id of the renamed connection.
    pub ucid: Ucid,
    /// New display name.
    pub player_name: String,
    /// New number plate.
    pub plate: String,
}

/// Participant joined the race (or returned from the garage).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewParticipant {
    /// Participant id.
    pub plid: Plid,
    /// Owning connection.
    pub ucid: Ucid,
    /// Player type bits (AI, female, remote).
    pub player_type: u8,
    /// Player flags.
    pub flags: u16,
    /// Display name.
    pub player_name: String,
    /// Number plate.
    pub plate: String,
    /// Car short name.
    pub car_name: String,
    /// Skin name.
    pub skin_name: String,
    /// Tyre compounds, rear left first.
    pub tyres: [u8; 4],
    /// Added mass handicap (kg).
    pub handicap_mass: u8,
    /// Intake restriction handicap.
    pub handicap_restriction: u8,
    /// Driver model.
    pub model: u8,
    /// Passenger bits.
    pub passengers: u8,
    /// Setup flags.
    pub setup_flags: u8,
    /// Number of participants in the race after this join.
    pub num_players: u8,
}

/// Pit stop started.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitStopStart {
    /// Participant id.
    pub plid: Plid,
    /// Laps completed.
    pub laps_done: u16,
    /// Player flags.
    pub flags: u16,
    /// Number of pit stops including this one.
    pub stop_count: u8,
    /// Current penalty code.
    pub penalty: u8,
    /// Tyre compounds being fitted.
    pub tyres: [u8; 4],
    /// Pit work bits.
    pub work: u32,
}

/// Pit stop finished.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitStopFinish {
    /// Participant id.
    pub plid: Plid,
    /// Time spent stationary (ms).
    pub duration: u32,
}

/// Participant teleported to the garage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelePit {
    /// Participant id.
    pub plid: Plid,
}

/// Participant left the race.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantLeave {
    /// Participant id.
    pub plid: Plid,
}

/// Participant handed over between connections (driver swap).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Takeover {
    /// Participant id.
    pub plid: Plid,
    /// Connection giving up the participant.
    pub old_ucid: Ucid,
    /// Connection taking over the participant.
    pub new_ucid: Ucid,
}

/// Provisional finish.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceFinish {
    /// Participant id.
    pub plid: Plid,
    /// Race time (ms).
    pub total_time: u32,
    /// Best lap (ms).
    pub best_lap_time: u32,
    /// Number of pit stops.
    pub stop_count: u8,
    /// Confirmation flags.
    pub confirm: u8,
    /// Laps completed.
    pub laps_done: u16,
    /// Player flags.
    pub flags: u16,
}

/// Confirmed final result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceResult {
    /// Participant id.
    pub plid: Plid,
    /// Race time (ms).
    pub total_time: u32,
    /// Best lap (ms).
    pub best_lap_time: u32,
    /// Number of pit stops.
    pub stop_count: u8,
    /// Confirmation flags.
    pub confirm: u8,
    /// Laps completed.
    pub laps_done: u16,
    /// Player flags.
    pub flags: u16,
    /// Finishing position (zero based).
    pub result_num: u8,
    /// Total number of results.
    pub num_results: u8,
    /// Penalty time added (seconds).
    pub penalty_seconds: u16,
}

/// Lap completed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LapTiming {
    /// Participant id.
    pub plid: Plid,
    /// Lap time (ms).
    pub lap_time: u32,
    /// Total elapsed time (ms).
    pub elapsed_time: u32,
    /// Laps completed.
    pub laps_done: u16,
    /// Player flags.
    pub flags: u16,
    /// Current penalty code.
    pub penalty: u8,
    /// Number of pit stops.
    pub stop_count: u8,
}

/// Split crossed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitTiming {
    /// Participant id.
    pub plid: Plid,
    /// Split time (ms).
    pub split_time: u32,
    /// Total elapsed time (ms).
    pub elapsed_time: u32,
    /// Split index (1 to 3).
    pub split: u8,
    /// Current penalty code.
    pub penalty: u8,
    /// Number of pit stops.
    pub stop_count: u8,
}

/// Position and telemetry for one car.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarTelemetry {
    /// Participant id.
    pub plid: Plid,
    /// Current path node.
    pub node: u16,
    /// Current lap.
    pub lap: u16,
    /// Current race position (1 based, zero when unknown).
    pub position: u8,
    /// Info bits (yellow flag, blue flag, lag).
    pub info: u8,
    /// World X (1/65536 m).
    pub x: i32,
    /// World Y (1/65536 m).
    pub y: i32,
    /// World Z (1/65536 m).
    pub z: i32,
    /// Speed (32768 = 100 m/s).
    pub speed: u16,
    /// Direction of motion.
    pub direction: u16,
    /// Direction of forward axis.
    pub heading: u16,
    /// Signed rate of rotation.
    pub angular_velocity: i16,
}

/// Multi-car position update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionBatch {
    /// One entry per car in this batch.
    pub cars: Vec<CarTelemetry>,
}

/// Starting grid order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridReorder {
    /// Number of participants in the race.
    pub num_players: u8,
    /// Participant ids in grid order. Trailing zeros mark unused slots.
    pub order: Vec<Plid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_json_uses_kind_tag() {
        let event = Event::TelePit(TelePit { plid: Plid::new(4) });
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"tele_pit","plid":4}"#);
    }

    #[test]
    fn missing_payload_fields_default() {
        let event: Event =
            serde_json::from_str(r#"{"kind":"participant_join","plid":7,"ucid":3}"#).unwrap();
        match event {
            Event::ParticipantJoin(join) => {
                assert_eq!(join.plid, Plid::new(7));
                assert_eq!(join.ucid, Ucid::new(3));
                assert!(join.player_name.is_empty());
                assert_eq!(join.tyres, [0; 4]);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn unit_events_parse() {
        let event: Event = serde_json::from_str(r#"{"kind":"multiplayer_stop"}"#).unwrap();
        assert_eq!(event, Event::MultiplayerStop);
        assert_eq!(event.name(), "multiplayer_stop");
    }

    #[test]
    fn race_progress_is_snake_case() {
        let state: SessionState =
            serde_json::from_str(r#"{"race_progress":"qualifying","track":"BL1"}"#).unwrap();
        assert_eq!(state.race_progress, RaceProgress::Qualifying);
        assert_eq!(state.track, "BL1");
    }
}
