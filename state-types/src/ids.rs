//! Identity types for connections and participants.
//!
//! Both ids are small integers assigned by the simulator host. Zero is the
//! wire convention for "no id", so lookups treat a zero id as absent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique connection id (`UCID`) assigned by the host.
///
/// Ids are unique among live connections but are reused once a connection
/// closes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ucid(u8);

impl Ucid {
    /// Wrap a raw id as received on the wire.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// True for the zero "no connection" sentinel.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// `None` for the zero sentinel, `Some(self)` otherwise.
    pub fn non_zero(self) -> Option<Self> {
        (!self.is_none()).then_some(self)
    }
}

impl fmt::Display for Ucid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Ucid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ucid({})", self.0)
    }
}

/// Unique participant id (`PLID`) assigned by the host.
///
/// A participant is a car on track. Ids are not reused within a race.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plid(u8);

impl Plid {
    /// Wrap a raw id as received on the wire.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// True for the zero "no participant" sentinel.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// `None` for the zero sentinel, `Some(self)` otherwise.
    pub fn non_zero(self) -> Option<Self> {
        (!self.is_none()).then_some(self)
    }
}

impl fmt::Display for Plid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Plid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plid({})", self.0)
    }
}
