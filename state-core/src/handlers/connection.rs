//! Connection lifecycle handlers.

use pitlane_state_types::{ConnectionClosed, ConnectionRenamed, NewConnection, Notification};

use super::HandlerResult;
use crate::records::Connection;
use crate::store::Store;

pub(crate) fn established(
    store: &mut Store,
    ev: &NewConnection,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    if store.insert_connection(Connection::from_event(ev)).is_some() {
        tracing::debug!("Connection {} replaced an existing record", ev.ucid);
    }
    out.push(Notification::ConnectionNew(ev.ucid));
    Ok(())
}

/// Unknown connections are ignored: there is nothing left to remove.
pub(crate) fn closed(
    store: &mut Store,
    ev: &ConnectionClosed,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let Some(linked) = store.connection(ev.ucid).map(|c| c.plid) else {
        return Ok(());
    };

    out.push(Notification::ConnectionLeaving(ev.ucid));

    // Only cascade when the participant is still ours.
    if let Some(plid) = linked {
        if store.participant(plid).is_some_and(|p| p.ucid == ev.ucid) {
            store.remove_participant(plid);
        }
    }
    store.remove_connection(ev.ucid);

    out.push(Notification::ConnectionLeft(ev.ucid));
    Ok(())
}

pub(crate) fn renamed(
    store: &mut Store,
    ev: &ConnectionRenamed,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let Some(connection) = store.connection_mut(ev.ucid) else {
        return Ok(());
    };
    connection.apply_rename(ev);
    out.push(Notification::ConnectionRenamed(ev.ucid));
    Ok(())
}
