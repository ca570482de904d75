//! What the host hands to the engine.

use serde::{Deserialize, Serialize};

use crate::Event;

/// One inbound message from the host: a lifecycle signal or an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMessage {
    /// The host link is up and state may be synchronized.
    Ready,
    /// The host link was lost.
    Lost,
    /// A decoded simulator event.
    Event(Event),
}

impl From<Event> for HostMessage {
    fn from(event: Event) -> Self {
        HostMessage::Event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Plid, TelePit};

    #[test]
    fn lifecycle_signals_are_bare_strings() {
        assert_eq!(serde_json::to_string(&HostMessage::Ready).unwrap(), r#""ready""#);
        let lost: HostMessage = serde_json::from_str(r#""lost""#).unwrap();
        assert_eq!(lost, HostMessage::Lost);
    }

    #[test]
    fn events_nest_under_event_key() {
        let line = r#"{"event":{"kind":"tele_pit","plid":2}}"#;
        let msg: HostMessage = serde_json::from_str(line).unwrap();
        assert_eq!(
            msg,
            HostMessage::Event(Event::TelePit(TelePit { plid: Plid::new(2) }))
        );
    }
}
