//! Replica records.
//!
//! Plain data for connections, participants and the session singletons.
//! Field copies from events are explicit per event kind: every `apply_*`
//! method names exactly the fields that event carries, and nothing else is
//! touched.

use pitlane_state_types::{
    AxisInfo, CarTelemetry, ConnectionRenamed, LapTiming, NewConnection, NewParticipant,
    PitStopStart, Plid, RaceFinish, RaceProgress, RaceResult, RaceStart, SessionState,
    SplitTiming, Ucid, VersionInfo,
};

/// A network connection attached to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Connection id.
    pub ucid: Ucid,
    /// Logged in as admin.
    pub admin: bool,
    /// Account name.
    pub user_name: String,
    /// Display name.
    pub player_name: String,
    /// Number plate, set by renames.
    pub plate: String,
    /// Connection flags.
    pub flags: u8,
    /// Participant currently driven by this connection.
    pub plid: Option<Plid>,
}

impl Connection {
    /// Build a connection from a connection-established event.
    pub fn from_event(event: &NewConnection) -> Self {
        Self {
            ucid: event.ucid,
            admin: event.admin,
            user_name: event.user_name.clone(),
            player_name: event.player_name.clone(),
            plate: String::new(),
            flags: event.flags,
            plid: None,
        }
    }

    /// Copy the fields carried by a rename.
    pub fn apply_rename(&mut self, event: &ConnectionRenamed) {
        self.player_name = event.player_name.clone();
        self.plate = event.plate.clone();
    }
}

/// One completed pit stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitStop {
    /// Laps done when the stop finished.
    pub lap: u16,
    /// Stationary time (ms).
    pub duration: u32,
}

/// Latest position and motion of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Telemetry {
    /// Current path node.
    pub node: u16,
    /// Current lap.
    pub lap: u16,
    /// Race position (zero when unknown).
    pub position: u8,
    /// Info bits.
    pub info: u8,
    /// World X.
    pub x: i32,
    /// World Y.
    pub y: i32,
    /// World Z.
    pub z: i32,
    /// Speed.
    pub speed: u16,
    /// Direction of motion.
    pub direction: u16,
    /// Direction of forward axis.
    pub heading: u16,
    /// Rate of rotation.
    pub angular_velocity: i16,
}

impl Telemetry {
    fn apply(&mut self, car: &CarTelemetry) {
        self.node = car.node;
        self.lap = car.lap;
        self.position = car.position;
        self.info = car.info;
        self.x = car.x;
        self.y = car.y;
        self.z = car.z;
        self.speed = car.speed;
        self.direction = car.direction;
        self.heading = car.heading;
        self.angular_velocity = car.angular_velocity;
    }
}

/// A car in the current race.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Participant {
    /// Participant id.
    pub plid: Plid,
    /// Owning connection.
    pub ucid: Ucid,
    /// Player type bits.
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
    /// Tyre compounds.
    pub tyres: [u8; 4],
    /// Mass handicap.
    pub handicap_mass: u8,
    /// Intake restriction handicap.
    pub handicap_restriction: u8,
    /// Driver model.
    pub model: u8,
    /// Passenger bits.
    pub passengers: u8,
    /// Setup flags.
    pub setup_flags: u8,

    /// Teleported to the garage and not yet rejoined.
    pub telepitting: bool,
    /// Stationary in a pit stop.
    pub in_pit_stop: bool,
    /// Work bits of the current or last pit stop.
    pub pit_work: u32,

    /// Position and motion.
    pub telemetry: Telemetry,

    /// Race time (ms).
    pub total_time: u32,
    /// Best lap this race (ms, zero when unset).
    pub best_lap_time: u32,
    /// Last lap (ms).
    pub last_lap_time: u32,
    /// Total elapsed time at the last lap or split (ms).
    pub elapsed_time: u32,
    /// Last split time (ms).
    pub split_time: u32,
    /// Last split index.
    pub split: u8,
    /// Number of pit stops.
    pub stop_count: u8,
    /// Laps completed.
    pub laps_done: u16,
    /// Finish confirmation flags.
    pub confirm: u8,
    /// Final position (zero based).
    pub result_num: u8,
    /// Penalty time added (seconds).
    pub penalty_seconds: u16,
    /// Current penalty code.
    pub penalty: u8,
    /// Completed pit stops, oldest first.
    pub pit_stops: Vec<PitStop>,

    /// Grid position, captured once per race.
    pub starting_position: Option<u8>,
    /// Crossed the finish line.
    pub finished: bool,
    /// The finish is the confirmed result.
    pub final_result: bool,
}

impl Participant {
    /// Build a participant from its first join.
    pub fn from_join(event: &NewParticipant) -> Self {
        let mut participant = Self {
            plid: event.plid,
            ..Self::default()
        };
        participant.apply_join(event);
        participant
    }

    /// Copy the identity and setup fields carried by a join.
    ///
    /// Race-scoped fields (timing, pit history, grid slot) are kept, so a
    /// rejoin after a garage visit does not lose progress.
    pub fn apply_join(&mut self, event: &NewParticipant) {
        self.ucid = event.ucid;
        self.player_type = event.player_type;
        self.flags = event.flags;
        self.player_name = event.player_name.clone();
        self.plate = event.plate.clone();
        self.car_name = event.car_name.clone();
        self.skin_name = event.skin_name.clone();
        self.tyres = event.tyres;
        self.handicap_mass = event.handicap_mass;
        self.handicap_restriction = event.handicap_restriction;
        self.model = event.model;
        self.passengers = event.passengers;
        self.setup_flags = event.setup_flags;
    }

    /// Enter a pit stop.
    pub fn start_pit_stop(&mut self, event: &PitStopStart) {
        self.in_pit_stop = true;
        self.tyres = event.tyres;
        self.stop_count = event.stop_count;
        self.laps_done = event.laps_done;
        self.flags = event.flags;
        self.penalty = event.penalty;
        self.pit_work = event.work;
    }

    /// Leave a pit stop and record it in the history.
    pub fn finish_pit_stop(&mut self, duration: u32) {
        self.in_pit_stop = false;
        self.pit_stops.push(PitStop {
            lap: self.laps_done,
            duration,
        });
    }

    /// Teleport to the garage. The grid slot is recaptured on return.
    pub fn tele_pit(&mut self) {
        self.telepitting = true;
        self.starting_position = None;
    }

    /// Record a provisional finish.
    pub fn apply_finish(&mut self, event: &RaceFinish) {
        self.total_time = event.total_time;
        self.best_lap_time = event.best_lap_time;
        self.stop_count = event.stop_count;
        self.confirm = event.confirm;
        self.laps_done = event.laps_done;
        self.flags = event.flags;
        self.finished = true;
        self.final_result = false;
    }

    /// Record the confirmed result.
    pub fn apply_result(&mut self, event: &RaceResult) {
        self.total_time = event.total_time;
        self.best_lap_time = event.best_lap_time;
        self.stop_count = event.stop_count;
        self.confirm = event.confirm;
        self.laps_done = event.laps_done;
        self.flags = event.flags;
        self.result_num = event.result_num;
        self.penalty_seconds = event.penalty_seconds;
        self.finished = true;
        self.final_result = true;
    }

    /// Copy lap timing fields. Best-lap bookkeeping is separate.
    pub fn apply_lap(&mut self, event: &LapTiming) {
        self.last_lap_time = event.lap_time;
        self.elapsed_time = event.elapsed_time;
        self.laps_done = event.laps_done;
        self.flags = event.flags;
        self.penalty = event.penalty;
        self.stop_count = event.stop_count;
    }

    /// Copy split timing fields.
    pub fn apply_split(&mut self, event: &SplitTiming) {
        self.split_time = event.split_time;
        self.elapsed_time = event.elapsed_time;
        self.split = event.split;
        self.penalty = event.penalty;
        self.stop_count = event.stop_count;
    }

    /// Fold a positive lap time into the personal best.
    pub fn record_lap_time(&mut self, lap_time: u32) {
        if lap_time == 0 {
            return;
        }
        if self.best_lap_time == 0 || lap_time < self.best_lap_time {
            self.best_lap_time = lap_time;
        }
    }

    /// Copy position and motion. Captures the grid slot if still unset.
    pub fn apply_telemetry(&mut self, car: &CarTelemetry) {
        self.telemetry.apply(car);
        if self.starting_position.is_none() && car.position > 0 {
            self.starting_position = Some(car.position);
        }
    }

    /// Zero every race-scoped field for a restart.
    pub fn reset_race(&mut self) {
        self.total_time = 0;
        self.best_lap_time = 0;
        self.last_lap_time = 0;
        self.elapsed_time = 0;
        self.split_time = 0;
        self.split = 0;
        self.stop_count = 0;
        self.laps_done = 0;
        self.confirm = 0;
        self.result_num = 0;
        self.penalty_seconds = 0;
        self.penalty = 0;
        self.pit_stops.clear();
        self.pit_work = 0;
        self.starting_position = None;
        self.finished = false;
        self.final_result = false;
    }
}

/// Host product metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductInfo {
    /// Simulator version.
    pub version: String,
    /// Product name.
    pub product: String,
    /// Protocol version.
    pub protocol: u8,
}

/// Server, track and race status.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Host product metadata.
    pub product: ProductInfo,
    /// This instance hosts the server.
    pub host: bool,
    /// Server name (empty when not in multiplayer).
    pub host_name: String,

    /// Replay speed multiplier.
    pub replay_speed: f32,
    /// Host state flags.
    pub flags: u16,
    /// Active in-game camera.
    pub in_game_cam: u8,
    /// Participant being viewed.
    pub view_plid: Option<Plid>,

    /// Race status.
    pub progress: RaceProgress,
    /// Qualifying length in minutes.
    pub qualifying_minutes: u8,
    /// Race length in laps.
    pub race_laps: u8,
    /// Short track name (empty until known).
    pub track: String,
    /// Weather code (unset until known).
    pub weather: Option<u8>,
    /// Wind code (unset until known).
    pub wind: Option<u8>,

    /// Participants in the race.
    pub num_players: u8,
    /// Connections, host included.
    pub num_connections: u8,
    /// Participants finished.
    pub num_finished: u8,
    /// Confirmed results so far.
    pub num_results: u8,

    /// Lap timing mode from the last race start.
    pub timing: u8,
    /// Race flags from the last race start.
    pub race_flags: u16,
    /// Path node count.
    pub num_nodes: u16,
    /// Finish line node.
    pub finish_node: u16,
    /// Split line nodes.
    pub split_nodes: [u16; 3],

    /// Autocross start position.
    pub axis_start: u8,
    /// Autocross checkpoints.
    pub checkpoints: u8,
    /// Autocross objects.
    pub objects: u16,
    /// Autocross layout name (empty when none).
    pub layout_name: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            product: ProductInfo::default(),
            host: false,
            host_name: String::new(),
            replay_speed: 1.0,
            flags: 0,
            in_game_cam: 0,
            view_plid: None,
            progress: RaceProgress::None,
            qualifying_minutes: 0,
            race_laps: 0,
            track: String::new(),
            weather: None,
            wind: None,
            num_players: 0,
            num_connections: 0,
            num_finished: 0,
            num_results: 0,
            timing: 0,
            race_flags: 0,
            num_nodes: 0,
            finish_node: 0,
            split_nodes: [0; 3],
            axis_start: 0,
            checkpoints: 0,
            objects: 0,
            layout_name: String::new(),
        }
    }
}

impl Session {
    /// Copy product metadata.
    pub fn apply_version(&mut self, event: &VersionInfo) {
        self.product = ProductInfo {
            version: event.version.clone(),
            product: event.product.clone(),
            protocol: event.protocol,
        };
    }

    /// Copy a session state snapshot.
    pub fn apply_state(&mut self, event: &SessionState) {
        self.replay_speed = event.replay_speed;
        self.flags = event.flags;
        self.in_game_cam = event.in_game_cam;
        self.view_plid = event.view_plid.non_zero();
        self.num_players = event.num_players;
        self.num_connections = event.num_connections;
        self.num_finished = event.num_finished;
        self.progress = event.race_progress;
        self.qualifying_minutes = event.qualifying_minutes;
        self.race_laps = event.race_laps;
        self.track = event.track.clone();
        self.weather = Some(event.weather);
        self.wind = Some(event.wind);
    }

    /// Copy race start parameters.
    pub fn apply_race_start(&mut self, event: &RaceStart) {
        self.race_laps = event.race_laps;
        self.qualifying_minutes = event.qualifying_minutes;
        self.num_players = event.num_players;
        self.num_results = 0;
        self.timing = event.timing;
        self.track = event.track.clone();
        self.weather = Some(event.weather);
        self.wind = Some(event.wind);
        self.race_flags = event.flags;
        self.num_nodes = event.num_nodes;
        self.finish_node = event.finish_node;
        self.split_nodes = event.split_nodes;
    }

    /// Copy autocross layout information.
    pub fn apply_axis(&mut self, event: &AxisInfo) {
        self.axis_start = event.axis_start;
        self.checkpoints = event.checkpoints;
        self.objects = event.objects;
        self.layout_name = event.layout_name.clone();
    }

    /// Forget the autocross layout.
    pub fn clear_axis(&mut self) {
        self.axis_start = 0;
        self.checkpoints = 0;
        self.objects = 0;
        self.layout_name.clear();
    }
}

/// Fastest lap of the current race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestLap {
    /// Who set it.
    pub plid: Plid,
    /// Lap time (ms).
    pub time: u32,
}
