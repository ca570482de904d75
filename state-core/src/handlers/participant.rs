//! Participant lifecycle handlers: joins, pits, leaves and takeovers.

use pitlane_state_types::{
    Desync, NewParticipant, Notification, ParticipantLeave, PitStopFinish, PitStopStart,
    Takeover, TelePit,
};

use super::HandlerResult;
use crate::records::Participant;
use crate::store::Store;

/// First sighting creates the participant; later joins are returns from
/// the garage and patch the existing record.
pub(crate) fn join(
    store: &mut Store,
    ev: &NewParticipant,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    if ev.plid.is_none() {
        tracing::trace!("Ignoring join without a participant id");
        return Ok(());
    }

    let previous_owner = match store.participant_mut(ev.plid) {
        Some(participant) => {
            let owner = participant.ucid;
            participant.apply_join(ev);
            participant.telepitting = false;
            Some(owner)
        }
        None => {
            store.insert_participant(Participant::from_join(ev));
            None
        }
    };

    // The host is authoritative on ownership; never leave the old owner
    // pointing at a car it no longer drives.
    if let Some(owner) = previous_owner.filter(|&owner| owner != ev.ucid) {
        if store.connection(owner).and_then(|c| c.plid) == Some(ev.plid) {
            store.unlink(owner);
        }
    }
    store.session_mut().num_players = ev.num_players;
    if !store.link(ev.ucid, ev.plid) {
        tracing::debug!("Participant {} joined for unknown connection {}", ev.plid, ev.ucid);
    }

    out.push(match previous_owner {
        None => Notification::ParticipantNew(ev.plid),
        Some(_) => Notification::ParticipantUpdated(vec![ev.plid]),
    });
    Ok(())
}

pub(crate) fn pit_stop_start(
    store: &mut Store,
    ev: &PitStopStart,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let Some(participant) = store.participant_mut(ev.plid) else {
        return Ok(());
    };
    participant.start_pit_stop(ev);
    out.push(Notification::ParticipantUpdated(vec![ev.plid]));
    Ok(())
}

pub(crate) fn pit_stop_finish(
    store: &mut Store,
    ev: &PitStopFinish,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let Some(participant) = store.participant_mut(ev.plid) else {
        return Ok(());
    };
    participant.finish_pit_stop(ev.duration);
    out.push(Notification::ParticipantUpdated(vec![ev.plid]));
    Ok(())
}

pub(crate) fn tele_pit(
    store: &mut Store,
    ev: &TelePit,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let Some(participant) = store.participant_mut(ev.plid) else {
        return Ok(());
    };
    participant.tele_pit();
    out.push(Notification::ParticipantUpdated(vec![ev.plid]));
    Ok(())
}

pub(crate) fn leave(
    store: &mut Store,
    ev: &ParticipantLeave,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let owner = store
        .participant(ev.plid)
        .map(|p| p.ucid)
        .ok_or(Desync::UnknownParticipant { plid: ev.plid })?;

    out.push(Notification::ParticipantLeaving(ev.plid));

    store.remove_participant(ev.plid);
    store.unlink(owner);

    out.push(Notification::ParticipantLeft(ev.plid));
    Ok(())
}

/// Hand a participant to another connection.
///
/// All checks happen before any mutation, so a rejected takeover leaves
/// the store exactly as it was.
pub(crate) fn takeover(
    store: &mut Store,
    ev: &Takeover,
    out: &mut Vec<Notification>,
) -> HandlerResult {
    let checked = match store.participant(ev.plid) {
        None => Err(Desync::UnknownParticipant { plid: ev.plid }),
        Some(p) if p.ucid != ev.old_ucid => Err(Desync::OwnerMismatch {
            plid: ev.plid,
            owner: p.ucid,
            declared: ev.old_ucid,
        }),
        Some(_) if store.connection(ev.new_ucid).is_none() => {
            Err(Desync::UnknownConnection { ucid: ev.new_ucid })
        }
        Some(_) => Ok(()),
    };
    if let Err(reason) = checked {
        tracing::error!("Rejected takeover of participant {}: {}", ev.plid, reason);
        return Err(reason);
    }

    if let Some(participant) = store.participant_mut(ev.plid) {
        participant.ucid = ev.new_ucid;
    }
    // Unlink first: old and new owner may be the same connection.
    store.unlink(ev.old_ucid);
    store.link(ev.new_ucid, ev.plid);

    out.push(Notification::ParticipantSwapped(ev.plid));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::{apply, fixtures};
    use crate::records::PitStop;
    use crate::store::Store;
    use pitlane_state_types::{
        Desync, Event, NewParticipant, Notification, ParticipantLeave, PitStopFinish,
        PitStopStart, Plid, Takeover, TelePit, Ucid,
    };

    fn takeover(plid: u8, old: u8, new: u8) -> Event {
        Event::Takeover(Takeover {
            plid: Plid::new(plid),
            old_ucid: Ucid::new(old),
            new_ucid: Ucid::new(new),
        })
    }

    fn leave(plid: u8) -> Event {
        Event::ParticipantLeave(ParticipantLeave {
            plid: Plid::new(plid),
        })
    }

    #[test]
    fn join_links_both_directions() {
        let mut store = Store::new();
        apply(&mut store, &fixtures::connect(3));
        let out = apply(
            &mut store,
            &Event::ParticipantJoin(NewParticipant {
                plid: Plid::new(7),
                ucid: Ucid::new(3),
                num_players: 4,
                ..NewParticipant::default()
            }),
        );

        assert_eq!(out, vec![Notification::ParticipantNew(Plid::new(7))]);
        assert_eq!(store.session().num_players, 4);
        assert_eq!(
            store.connection_by_participant(Plid::new(7)).map(|c| c.ucid),
            Some(Ucid::new(3))
        );
        assert_eq!(
            store.participant_by_connection(Ucid::new(3)).map(|p| p.plid),
            Some(Plid::new(7))
        );
    }

    #[test]
    fn join_for_unknown_connection_still_creates_participant() {
        let mut store = Store::new();
        let out = apply(&mut store, &fixtures::join(7, 3));
        assert_eq!(out, vec![Notification::ParticipantNew(Plid::new(7))]);
        assert!(store.participant(Plid::new(7)).is_some());
        assert!(store.connection_by_participant(Plid::new(7)).is_none());
    }

    #[test]
    fn rejoin_updates_in_place_and_clears_telepit() {
        let mut store = fixtures::store_with(&[(3, 7)]);
        apply(&mut store, &Event::TelePit(TelePit { plid: Plid::new(7) }));
        assert!(store.participant(Plid::new(7)).unwrap().telepitting);

        let out = apply(&mut store, &fixtures::join(7, 3));
        assert_eq!(out, vec![Notification::ParticipantUpdated(vec![Plid::new(7)])]);
        assert!(!store.participant(Plid::new(7)).unwrap().telepitting);
        assert_eq!(store.participant_count(), 1);
    }

    #[test]
    fn rejoin_under_new_owner_keeps_links_consistent() {
        let mut store = fixtures::store_with(&[(3, 7)]);
        apply(&mut store, &fixtures::connect(4));
        apply(&mut store, &fixtures::join(7, 4));

        assert_eq!(store.connection(Ucid::new(3)).unwrap().plid, None);
        assert_eq!(store.connection(Ucid::new(4)).unwrap().plid, Some(Plid::new(7)));
        assert!(store.verify_links().is_empty());
    }

    #[test]
    fn pit_events_ignore_unknown_participants() {
        let mut store = Store::new();
        let start = Event::PitStopStart(PitStopStart {
            plid: Plid::new(1),
            ..PitStopStart::default()
        });
        let finish = Event::PitStopFinish(PitStopFinish {
            plid: Plid::new(1),
            duration: 1,
        });
        assert!(apply(&mut store, &start).is_empty());
        assert!(apply(&mut store, &finish).is_empty());
        assert!(apply(&mut store, &Event::TelePit(TelePit { plid: Plid::new(1) })).is_empty());
    }

    #[test]
    fn pit_stop_cycle() {
        let mut store = fixtures::store_with(&[(1, 2)]);
        let out = apply(
            &mut store,
            &Event::PitStopStart(PitStopStart {
                plid: Plid::new(2),
                laps_done: 9,
                stop_count: 1,
                flags: 0x40,
                penalty: 3,
                tyres: [1, 1, 2, 2],
                work: 0x0110,
            }),
        );
        assert_eq!(out, vec![Notification::ParticipantUpdated(vec![Plid::new(2)])]);
        let p = store.participant(Plid::new(2)).unwrap();
        assert!(p.in_pit_stop);
        assert_eq!((p.flags, p.penalty, p.pit_work), (0x40, 3, 0x0110));

        apply(
            &mut store,
            &Event::PitStopFinish(PitStopFinish {
                plid: Plid::new(2),
                duration: 21_000,
            }),
        );
        let p = store.participant(Plid::new(2)).unwrap();
        assert!(!p.in_pit_stop);
        assert_eq!(p.tyres, [1, 1, 2, 2]);
        assert_eq!(
            p.pit_stops,
            vec![PitStop {
                lap: 9,
                duration: 21_000
            }]
        );
    }

    #[test]
    fn leave_unknown_participant_is_out_of_sync() {
        let mut store = Store::new();
        assert_eq!(
            apply(&mut store, &leave(4)),
            vec![Notification::OutOfSync(Desync::UnknownParticipant {
                plid: Plid::new(4)
            })]
        );
    }

    #[test]
    fn leave_removes_participant_and_clears_link() {
        let mut store = fixtures::store_with(&[(3, 7)]);
        let out = apply(&mut store, &leave(7));

        assert_eq!(
            out,
            vec![
                Notification::ParticipantLeaving(Plid::new(7)),
                Notification::ParticipantLeft(Plid::new(7))
            ]
        );
        assert!(store.participant(Plid::new(7)).is_none());
        assert_eq!(store.connection(Ucid::new(3)).unwrap().plid, None);
        assert!(store.verify_links().is_empty());
    }

    #[test]
    fn takeover_moves_ownership() {
        let mut store = fixtures::store_with(&[(3, 7)]);
        apply(&mut store, &fixtures::connect(5));

        let out = apply(&mut store, &takeover(7, 3, 5));

        assert_eq!(out, vec![Notification::ParticipantSwapped(Plid::new(7))]);
        assert_eq!(
            store.participant_by_connection(Ucid::new(5)).map(|p| p.plid),
            Some(Plid::new(7))
        );
        assert!(store.participant_by_connection(Ucid::new(3)).is_none());
        assert!(store.verify_links().is_empty());
    }

    #[test]
    fn takeover_to_same_connection_keeps_link() {
        let mut store = fixtures::store_with(&[(3, 7)]);

        let out = apply(&mut store, &takeover(7, 3, 3));

        assert_eq!(out, vec![Notification::ParticipantSwapped(Plid::new(7))]);
        assert_eq!(
            store.participant_by_connection(Ucid::new(3)).map(|p| p.plid),
            Some(Plid::new(7))
        );
        assert!(store.verify_links().is_empty());
    }

    #[test]
    fn takeover_with_wrong_owner_is_rejected_without_mutation() {
        let mut store = fixtures::store_with(&[(5, 7)]);
        apply(&mut store, &fixtures::connect(3));
        apply(&mut store, &fixtures::connect(9));
        let before = format!("{:?}", store.participant(Plid::new(7)));

        let out = apply(&mut store, &takeover(7, 3, 9));

        assert_eq!(
            out,
            vec![Notification::OutOfSync(Desync::OwnerMismatch {
                plid: Plid::new(7),
                owner: Ucid::new(5),
                declared: Ucid::new(3),
            })]
        );
        assert_eq!(format!("{:?}", store.participant(Plid::new(7))), before);
        assert!(store.participant_by_connection(Ucid::new(3)).is_none());
        assert!(store.participant_by_connection(Ucid::new(9)).is_none());
        assert_eq!(
            store.participant_by_connection(Ucid::new(5)).map(|p| p.plid),
            Some(Plid::new(7))
        );
    }

    #[test]
    fn takeover_of_unknown_participant_is_out_of_sync() {
        let mut store = Store::new();
        apply(&mut store, &fixtures::connect(3));
        assert_eq!(
            apply(&mut store, &takeover(7, 3, 3)),
            vec![Notification::OutOfSync(Desync::UnknownParticipant {
                plid: Plid::new(7)
            })]
        );
    }

    #[test]
    fn takeover_to_unknown_connection_is_rejected() {
        let mut store = fixtures::store_with(&[(3, 7)]);
        let out = apply(&mut store, &takeover(7, 3, 12));
        assert_eq!(
            out,
            vec![Notification::OutOfSync(Desync::UnknownConnection {
                ucid: Ucid::new(12)
            })]
        );
        assert_eq!(
            store.participant(Plid::new(7)).map(|p| p.ucid),
            Some(Ucid::new(3))
        );
    }
}
