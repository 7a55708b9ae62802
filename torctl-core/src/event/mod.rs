//! Typed asynchronous events.
//!
//! A 650 reply's first token names the event; [`Event::decode`] dispatches on
//! that name to a per-event parser. Names outside [`EventKind`] are reported
//! as [`EventError::Unsupported`]; the daemon knows more events than this
//! client decodes, and adding one means adding a variant, a name constant and
//! a match arm.

mod bandwidth;
mod circuit;
mod liveness;
mod orconn;
mod status;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::EventError;
use crate::reply::Reply;
use crate::tokenizer::{read_until_separator, SPACE};

pub use bandwidth::BandwidthEvent;
pub use circuit::{CircuitEvent, CircuitId, CircuitStatus};
pub use liveness::NetworkLiveness;
pub use orconn::{OrConnEvent, OrConnStatus};
pub use status::{Severity, StatusEvent, StatusKind};

pub const CIRC: &str = "CIRC";
pub const ORCONN: &str = "ORCONN";
pub const NETWORK_LIVENESS: &str = "NETWORK_LIVENESS";
pub const STATUS_GENERAL: &str = "STATUS_GENERAL";
pub const STATUS_CLIENT: &str = "STATUS_CLIENT";
pub const STATUS_SERVER: &str = "STATUS_SERVER";
pub const BW: &str = "BW";

/// A decoded asynchronous event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Circuit(CircuitEvent),
    OrConnection(OrConnEvent),
    NetworkLiveness { liveness: NetworkLiveness },
    Status(StatusEvent),
    Bandwidth(BandwidthEvent),
}

impl Event {
    /// Decode a 650 reply.
    pub fn decode(reply: &Reply) -> Result<Self, EventError> {
        if !reply.is_event() {
            return Err(EventError::NotAnEvent {
                status: reply.status().as_u16(),
                raw: reply.to_string(),
            });
        }

        let (name, body) = read_until_separator(reply.first_line(), SPACE);
        let malformed = |event: &'static str| {
            move |reason: String| EventError::Malformed {
                event,
                reason,
                raw: reply.to_string(),
            }
        };

        match name {
            CIRC => CircuitEvent::parse(body)
                .map(Event::Circuit)
                .map_err(malformed(CIRC)),
            ORCONN => OrConnEvent::parse(body)
                .map(Event::OrConnection)
                .map_err(malformed(ORCONN)),
            NETWORK_LIVENESS => NetworkLiveness::parse(body)
                .map(|liveness| Event::NetworkLiveness { liveness })
                .map_err(malformed(NETWORK_LIVENESS)),
            STATUS_GENERAL => StatusEvent::parse(StatusKind::General, body)
                .map(Event::Status)
                .map_err(malformed(STATUS_GENERAL)),
            STATUS_CLIENT => StatusEvent::parse(StatusKind::Client, body)
                .map(Event::Status)
                .map_err(malformed(STATUS_CLIENT)),
            STATUS_SERVER => StatusEvent::parse(StatusKind::Server, body)
                .map(Event::Status)
                .map_err(malformed(STATUS_SERVER)),
            BW => BandwidthEvent::parse(body)
                .map(Event::Bandwidth)
                .map_err(malformed(BW)),
            other => Err(EventError::Unsupported {
                name: other.to_string(),
                raw: reply.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Circuit(_) => EventKind::Circ,
            Event::OrConnection(_) => EventKind::OrConn,
            Event::NetworkLiveness { .. } => EventKind::NetworkLiveness,
            Event::Status(status) => match status.kind {
                StatusKind::General => EventKind::StatusGeneral,
                StatusKind::Client => EventKind::StatusClient,
                StatusKind::Server => EventKind::StatusServer,
            },
            Event::Bandwidth(_) => EventKind::Bw,
        }
    }
}

/// Event names this client can subscribe to and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Circ,
    OrConn,
    NetworkLiveness,
    StatusGeneral,
    StatusClient,
    StatusServer,
    Bw,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Circ,
        EventKind::OrConn,
        EventKind::NetworkLiveness,
        EventKind::StatusGeneral,
        EventKind::StatusClient,
        EventKind::StatusServer,
        EventKind::Bw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Circ => CIRC,
            EventKind::OrConn => ORCONN,
            EventKind::NetworkLiveness => NETWORK_LIVENESS,
            EventKind::StatusGeneral => STATUS_GENERAL,
            EventKind::StatusClient => STATUS_CLIENT,
            EventKind::StatusServer => STATUS_SERVER,
            EventKind::Bw => BW,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == upper)
            .ok_or_else(|| {
                let known: Vec<&str> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown event '{s}'; expected one of: {}", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> Result<Event, EventError> {
        Event::decode(&Reply::parse(text).expect("reply"))
    }

    #[test]
    fn decodes_network_liveness() {
        let decoded = event("650 NETWORK_LIVENESS UP\r\n").unwrap();
        assert_eq!(
            decoded,
            Event::NetworkLiveness {
                liveness: NetworkLiveness::Up
            }
        );
        assert_eq!(decoded.kind(), EventKind::NetworkLiveness);
    }

    #[test]
    fn unknown_name_is_unsupported() {
        let err = event("650 HS_DESC REQUESTED abc NO_AUTH\r\n").unwrap_err();
        assert!(
            matches!(&err, EventError::Unsupported { name, .. } if name == "HS_DESC"),
            "got: {err}"
        );
        assert!(err.to_string().contains("650 HS_DESC REQUESTED"));
    }

    #[test]
    fn non_event_reply_is_rejected() {
        let err = event("250 OK\r\n").unwrap_err();
        assert!(matches!(err, EventError::NotAnEvent { status: 250, .. }));
    }

    #[test]
    fn malformed_body_names_the_event() {
        let err = event("650 BW lots none\r\n").unwrap_err();
        assert!(matches!(err, EventError::Malformed { event: BW, .. }), "got: {err}");
    }

    #[test]
    fn event_kind_parses_case_insensitively() {
        assert_eq!("circ".parse::<EventKind>(), Ok(EventKind::Circ));
        assert_eq!(
            "network_liveness".parse::<EventKind>(),
            Ok(EventKind::NetworkLiveness)
        );
        assert!("STREAM".parse::<EventKind>().is_err());
    }
}
