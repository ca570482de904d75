//! Desync reasons.
//!
//! A [`Desync`] is never a hard failure. It tells the engine that the
//! replica can no longer be trusted and a resync should be requested.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Plid, Ucid};

/// Why the replica was judged out of sync with the host.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Desync {
    /// An event referenced a participant the replica does not know.
    #[error("unknown participant {plid}")]
    UnknownParticipant {
        /// The dangling participant id.
        plid: Plid,
    },

    /// An event referenced a connection the replica does not know.
    #[error("unknown connection {ucid}")]
    UnknownConnection {
        /// The dangling connection id.
        ucid: Ucid,
    },

    /// A takeover declared a previous owner that does not match the replica.
    #[error("participant {plid} is owned by {owner}, takeover declared {declared}")]
    OwnerMismatch {
        /// Participant being handed over.
        plid: Plid,
        /// Owner recorded in the replica.
        owner: Ucid,
        /// Owner declared by the takeover event.
        declared: Ucid,
    },

    /// The host link was (re)established, so the replica is presumed stale.
    #[error("host link established")]
    HostLinked,
}
