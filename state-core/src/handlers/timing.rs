//! Timing, result and position handlers.

use pitlane_state_types::{
    Desync, GridReorder, LapTiming, Notification, PositionBatch, RaceFinish, RaceResult,
    SplitTiming,
};

use super::HandlerResult;
use crate::store::Store;

pub(crate) fn finish(
    store: &mut Store,
    ev: &RaceFinish,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let Some(participant) = store.participant_mut(ev.plid) else {
        return Ok(());
    };
    participant.apply_finish(ev);
    out.push(Notification::ParticipantUpdated(vec![ev.plid]));
    Ok(())
}

pub(crate) fn result(
    store: &mut Store,
    ev: &RaceResult,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    store.session_mut().num_results = ev.num_results;
    let Some(participant) = store.participant_mut(ev.plid) else {
        return Ok(());
    };
    participant.apply_result(ev);
    out.push(Notification::ParticipantUpdated(vec![ev.plid]));
    Ok(())
}

pub(crate) fn lap(
    store: &mut Store,
    ev: &LapTiming,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let participant = store
        .participant_mut(ev.plid)
        .ok_or(Desync::UnknownParticipant { plid: ev.plid })?;

    participant.apply_lap(ev);
    if ev.lap_time > 0 {
        participant.record_lap_time(ev.lap_time);
        if store.offer_best_lap(ev.plid, ev.lap_time) {
            tracing::debug!("New best lap {}ms by participant {}", ev.lap_time, ev.plid);
            out.push(Notification::BestLapChanged);
        }
    }

    out.push(Notification::ParticipantUpdated(vec![ev.plid]));
    Ok(())
}

pub(crate) fn split(
    store: &mut Store,
    ev: &SplitTiming,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let participant = store
        .participant_mut(ev.plid)
        .ok_or(Desync::UnknownParticipant { plid: ev.plid })?;

    participant.apply_split(ev);
    out.push(Notification::ParticipantUpdated(vec![ev.plid]));
    Ok(())
}

/// Unknown cars are reported one by one; the rest of the batch still applies.
pub(crate) fn positions(
    store: &mut Store,
    ev: &PositionBatch,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let mut updated = Vec::with_capacity(ev.cars.len());

    for car in &ev.cars {
        match store.participant_mut(car.plid) {
            Some(participant) => {
                participant.apply_telemetry(car);
                updated.push(car.plid);
            }
            None => {
                tracing::debug!("Position update for unknown participant {}", car.plid);
                out.push(Notification::OutOfSync(Desync::UnknownParticipant {
                    plid: car.plid,
                }));
            }
        }
    }

    if !updated.is_empty() {
        out.push(Notification::ParticipantUpdated(updated));
    }
    Ok(())
}

/// The order list ends at the first zero id.
pub(crate) fn grid_reorder(
    store: &mut Store,
    ev: &GridReorder,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    store.session_mut().num_players = ev.num_players;

    for (index, &plid) in ev.order.iter().enumerate() {
        if plid.is_none() {
            break;
        }
        match store.participant_mut(plid) {
            Some(participant) => {
                participant.starting_position = Some(u8::try_from(index + 1).unwrap_or(u8::MAX));
            }
            None => {
                tracing::debug!("Grid slot {} names unknown participant {}", index + 1, plid);
                out.push(Notification::OutOfSync(Desync::UnknownParticipant { plid }));
            }
        }
    }
    Ok(())
}
