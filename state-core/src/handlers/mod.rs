//! Event handlers.
//!
//! Each handler applies one event kind to the [`Store`] and pushes the
//! notifications it derives. Dispatch is a single `match` over [`Event`]:
//! the compiler checks every event kind has exactly one handler.
//!
//! A handler that finds a dangling reference returns a [`Desync`]. The
//! dispatcher turns it into [`Notification::OutOfSync`] after whatever the
//! handler already emitted. Handlers that must keep going past a bad entry
//! (position batches, grid reorders) push the notification themselves.

mod connection;
mod participant;
mod session;
mod timing;

use pitlane_state_types::{Desync, Event, Notification};

use crate::store::Store;

/// Result of a single handler.
pub(crate) type HandlerResult = Result<(), Desync>;

/// Apply one event to the store and return the derived notifications.
pub fn apply(store: &mut Store, event: &Event) -> Vec<Notification> {
    let mut out = Vec::new();

    let result = match event {
        Event::VersionInfo(ev) => session::version_info(store, ev, &mut out),
        Event::Keepalive => Ok(()),
        Event::MultiplayerStart(ev) => session::multiplayer_start(store, ev, &mut out),
        Event::MultiplayerStop => session::multiplayer_stop(store, &mut out),
        Event::SessionUpdate(ev) => session::session_update(store, ev, &mut out),
        Event::RaceReset(ev) => session::race_reset(store, ev, &mut out),
        Event::AxisInfo(ev) => session::axis_info(store, ev, &mut out),
        Event::AxisCleared => session::axis_cleared(store, &mut out),

        Event::ConnectionEstablished(ev) => connection::established(store, ev, &mut out),
        Event::ConnectionClosed(ev) => connection::closed(store, ev, &mut out),
        Event::ConnectionRenamed(ev) => connection::renamed(store, ev, &mut out),

        Event::ParticipantJoin(ev) => participant::join(store, ev, &mut out),
        Event::PitStopStart(ev) => participant::pit_stop_start(store, ev, &mut out),
        Event::PitStopFinish(ev) => participant::pit_stop_finish(store, ev, &mut out),
        Event::TelePit(ev) => participant::tele_pit(store, ev, &mut out),
        Event::ParticipantLeave(ev) => participant::leave(store, ev, &mut out),
        Event::Takeover(ev) => participant::takeover(store, ev, &mut out),

        Event::FinishProvisional(ev) => timing::finish(store, ev, &mut out),
        Event::FinishFinal(ev) => timing::result(store, ev, &mut out),
        Event::LapComplete(ev) => timing::lap(store, ev, &mut out),
        Event::SplitComplete(ev) => timing::split(store, ev, &mut out),
        Event::PositionBatch(ev) => timing::positions(store, ev, &mut out),
        Event::GridReorder(ev) => timing::grid_reorder(store, ev, &mut out),
    };

    if let Err(reason) = result {
        tracing::debug!("{} left the replica out of sync: {}", event.name(), reason);
        out.push(Notification::OutOfSync(reason));
    }

    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Event builders shared by handler tests.

    use pitlane_state_types::{Event, NewConnection, NewParticipant, Plid, Ucid};

    use crate::store::Store;

    pub fn connect(ucid: u8) -> Event {
        Event::ConnectionEstablished(NewConnection {
            ucid: Ucid::new(ucid),
            user_name: format!("user{ucid}"),
            player_name: format!("Player {ucid}"),
            ..NewConnection::default()
        })
    }

    pub fn join(plid: u8, ucid: u8) -> Event {
        Event::ParticipantJoin(NewParticipant {
            plid: Plid::new(plid),
            ucid: Ucid::new(ucid),
            player_name: format!("Player {ucid}"),
            car_name: "FBM".into(),
            ..NewParticipant::default()
        })
    }

    /// A store with connection `ucid` driving participant `plid` for each pair.
    pub fn store_with(pairs: &[(u8, u8)]) -> Store {
        let mut store = Store::new();
        for &(ucid, plid) in pairs {
            super::apply(&mut store, &connect(ucid));
            super::apply(&mut store, &join(plid, ucid));
        }
        store
    }
}
