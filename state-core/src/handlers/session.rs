//! Server, track and race status handlers.

use pitlane_state_types::{
    AxisInfo, Desync, MultiplayerStart, Notification, RaceStart, SessionState, VersionInfo,
};

use super::HandlerResult;
use crate::store::Store;

/// A new host link always starts from a stale replica.
pub(crate) fn version_info(
    store: &mut Store,
    ev: &VersionInfo,
    _out: &mut Vec<Notification>,
) -> HandlerResult {
    store.session_mut().apply_version(ev);
    tracing::info!("Host is {} {} (protocol {})", ev.product, ev.version, ev.protocol);
    Err(Desync::HostLinked)
}

pub(crate) fn multiplayer_start(
    store: &mut Store,
    ev: &MultiplayerStart,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let session = store.session_mut();
    session.host = ev.host;
    session.host_name = ev.host_name.clone();

    tracing::info!("Joined server {:?} (host: {})", ev.host_name, ev.host);
    out.push(Notification::OutOfSync(Desync::HostLinked));
    out.push(Notification::ServerJoined);
    Ok(())
}

pub(crate) fn multiplayer_stop(store: &mut Store, out: &mut Vec<Notification>) -> HandlerResult {
    let session = store.session_mut();
    session.host = false;
    session.host_name.clear();

    tracing::info!("Left server");
    out.push(Notification::ServerLeft);
    Ok(())
}

pub(crate) fn session_update(
    store: &mut Store,
    ev: &SessionState,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let session = store.session_mut();
    let (track, weather, wind) = (session.track.clone(), session.weather, session.wind);

    session.apply_state(ev);

    if session.track != track {
        out.push(Notification::TrackChanged);
    }
    if session.weather != weather {
        out.push(Notification::WeatherChanged);
    }
    if session.wind != wind {
        out.push(Notification::WindChanged);
    }
    Ok(())
}

pub(crate) fn race_reset(
    store: &mut Store,
    ev: &RaceStart,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let track = store.session().track.clone();

    store.session_mut().apply_race_start(ev);
    store.clear_best_lap();
    for participant in store.participants_mut() {
        participant.reset_race();
    }

    if store.session().track != track {
        out.push(Notification::TrackChanged);
    }
    out.push(Notification::RaceReset);
    out.push(Notification::RaceStarted);
    Ok(())
}

pub(crate) fn axis_info(
    store: &mut Store,
    ev: &AxisInfo,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let session = store.session_mut();
    let layout = session.layout_name.clone();

    session.apply_axis(ev);

    if session.layout_name != layout {
        out.push(Notification::LayoutChanged);
    }
    Ok(())
}

pub(crate) fn axis_cleared(store: &mut Store, out: &mut Vec<Notification>) -> HandlerResult {
    let session = store.session_mut();
    let had_layout = !session.layout_name.is_empty();

    session.clear_axis();

    if had_layout {
        out.push(Notification::LayoutChanged);
    }
    Ok(())
}
