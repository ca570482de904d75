//! Reconciliation store for the session replica.
//!
//! The store owns every record and offers lookup and mutation primitives.
//! Lookups never fail: an absent or zero id yields `None`, and the caller
//! decides whether that means the replica is out of sync.
//!
//! The store never repairs a broken link on its own. [`Store::verify_links`]
//! reports every violation of the connection ↔ participant invariant so
//! callers and tests can see them.

use std::collections::HashMap;

use pitlane_state_types::{Plid, Ucid};

use crate::records::{BestLap, Connection, Participant, Session};

/// A broken connection ↔ participant link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFault {
    /// A connection points at a participant that does not exist.
    MissingParticipant {
        /// Connection holding the link.
        ucid: Ucid,
        /// Participant it points at.
        plid: Plid,
    },
    /// A connection points at a participant owned by someone else.
    ForeignParticipant {
        /// Connection holding the link.
        ucid: Ucid,
        /// Participant it points at.
        plid: Plid,
        /// Owner recorded on the participant.
        owner: Ucid,
    },
    /// A participant's owner does not exist.
    MissingOwner {
        /// Orphaned participant.
        plid: Plid,
        /// Owner recorded on the participant.
        ucid: Ucid,
    },
}

/// In-memory replica of the session.
#[derive(Debug, Clone, Default)]
pub struct Store {
    connections: HashMap<Ucid, Connection>,
    participants: HashMap<Plid, Participant>,
    session: Session,
    best_lap: Option<BestLap>,
}

impl Store {
    /// Create an empty store with default session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record and restore session defaults.
    pub fn reset(&mut self) {
        self.connections.clear();
        self.participants.clear();
        self.session = Session::default();
        self.best_lap = None;
    }

    /// Look up a connection.
    pub fn connection(&self, ucid: Ucid) -> Option<&Connection> {
        if ucid.is_none() {
            return None;
        }
        self.connections.get(&ucid)
    }

    /// Look up a connection for mutation.
    pub fn connection_mut(&mut self, ucid: Ucid) -> Option<&mut Connection> {
        if ucid.is_none() {
            return None;
        }
        self.connections.get_mut(&ucid)
    }

    /// Look up a participant.
    pub fn participant(&self, plid: Plid) -> Option<&Participant> {
        if plid.is_none() {
            return None;
        }
        self.participants.get(&plid)
    }

    /// Look up a participant for mutation.
    pub fn participant_mut(&mut self, plid: Plid) -> Option<&mut Participant> {
        if plid.is_none() {
            return None;
        }
        self.participants.get_mut(&plid)
    }

    /// The participant currently driven by a connection.
    pub fn participant_by_connection(&self, ucid: Ucid) -> Option<&Participant> {
        let plid = self.connection(ucid)?.plid?;
        self.participant(plid)
    }

    /// The connection that owns a participant.
    pub fn connection_by_participant(&self, plid: Plid) -> Option<&Connection> {
        let ucid = self.participant(plid)?.ucid;
        self.connection(ucid)
    }

    /// Insert or replace a connection. Returns the previous record.
    pub fn insert_connection(&mut self, connection: Connection) -> Option<Connection> {
        self.connections.insert(connection.ucid, connection)
    }

    /// Remove a connection. Its participant, if any, is left alone.
    pub fn remove_connection(&mut self, ucid: Ucid) -> Option<Connection> {
        self.connections.remove(&ucid)
    }

    /// Insert or replace a participant. Returns the previous record.
    pub fn insert_participant(&mut self, participant: Participant) -> Option<Participant> {
        self.participants.insert(participant.plid, participant)
    }

    /// Remove a participant. Its owner's link is left alone.
    pub fn remove_participant(&mut self, plid: Plid) -> Option<Participant> {
        self.participants.remove(&plid)
    }

    /// Point a connection at a participant, if the connection exists.
    ///
    /// Returns false when the connection is unknown.
    pub fn link(&mut self, ucid: Ucid, plid: Plid) -> bool {
        match self.connection_mut(ucid) {
            Some(connection) => {
                connection.plid = plid.non_zero();
                true
            }
            None => false,
        }
    }

    /// Clear a connection's participant link, if the connection exists.
    pub fn unlink(&mut self, ucid: Ucid) {
        if let Some(connection) = self.connection_mut(ucid) {
            connection.plid = None;
        }
    }

    /// Iterate connections in no particular order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Iterate participants in no particular order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// Iterate participants mutably in no particular order.
    pub fn participants_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.participants.values_mut()
    }

    /// Number of known connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of known participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Session singleton.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session singleton for mutation.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Fastest lap of the current race, if any.
    pub fn best_lap(&self) -> Option<&BestLap> {
        self.best_lap.as_ref()
    }

    /// Offer a lap time for the session best.
    ///
    /// Returns true when it was accepted (no best yet, or strictly faster).
    pub fn offer_best_lap(&mut self, plid: Plid, time: u32) -> bool {
        if time == 0 {
            return false;
        }
        let improved = match self.best_lap {
            Some(best) => time < best.time,
            None => true,
        };
        if improved {
            self.best_lap = Some(BestLap { plid, time });
        }
        improved
    }

    /// Forget the session best.
    pub fn clear_best_lap(&mut self) {
        self.best_lap = None;
    }

    /// Report every broken connection ↔ participant link.
    ///
    /// Results are sorted so they are stable across runs.
    pub fn verify_links(&self) -> Vec<LinkFault> {
        let mut faults = Vec::new();

        for connection in self.connections.values() {
            let Some(plid) = connection.plid else {
                continue;
            };
            match self.participants.get(&plid) {
                None => faults.push(LinkFault::MissingParticipant {
                    ucid: connection.ucid,
                    plid,
                }),
                Some(p) if p.ucid != connection.ucid => {
                    faults.push(LinkFault::ForeignParticipant {
                        ucid: connection.ucid,
                        plid,
                        owner: p.ucid,
                    })
                }
                Some(_) => {}
            }
        }

        for participant in self.participants.values() {
            if !self.connections.contains_key(&participant.ucid) {
                faults.push(LinkFault::MissingOwner {
                    plid: participant.plid,
                    ucid: participant.ucid,
                });
            }
        }

        faults.sort_by_key(|fault| match *fault {
            LinkFault::MissingParticipant { ucid, plid } => (0, ucid.get(), plid.get()),
            LinkFault::ForeignParticipant { ucid, plid, .. } => (1, ucid.get(), plid.get()),
            LinkFault::MissingOwner { plid, ucid } => (2, ucid.get(), plid.get()),
        });
        faults
    }
}
