use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::tokenizer::KeywordArgs;

/// Daemon-assigned circuit identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CircuitId(pub String);

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CircuitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitStatus {
    Launched,
    Built,
    GuardWait,
    Extended,
    Failed,
    Closed,
    Unknown(String),
}

impl CircuitStatus {
    fn parse(s: &str) -> Self {
        match s {
            "LAUNCHED" => Self::Launched,
            "BUILT" => Self::Built,
            "GUARD_WAIT" => Self::GuardWait,
            "EXTENDED" => Self::Extended,
            "FAILED" => Self::Failed,
            "CLOSED" => Self::Closed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// `650 CIRC <id> <status> [<path>] [KEY=VALUE ...]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitEvent {
    pub id: CircuitId,
    pub status: CircuitStatus,
    /// Relays as sent, e.g. `$FINGERPRINT~nickname`.
    pub path: Vec<String>,
    pub build_flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl CircuitEvent {
    pub(crate) fn parse(body: &str) -> Result<Self, String> {
        let mut args = KeywordArgs::parse(body);
        let id = args
            .positional(0)
            .ok_or_else(|| "missing circuit id".to_string())?;
        let status = args
            .positional(1)
            .ok_or_else(|| "missing circuit status".to_string())?;
        let id = CircuitId::from(id);
        let status = CircuitStatus::parse(status);
        let path = args
            .positional(2)
            .map(|path| path.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        let build_flags = args
            .take("BUILD_FLAGS")
            .map(|flags| flags.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        let time_created = args
            .take("TIME_CREATED")
            .map(|raw| {
                NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .map_err(|err| format!("bad TIME_CREATED {raw:?}: {err}"))
            })
            .transpose()?;

        Ok(Self {
            id,
            status,
            path,
            build_flags,
            purpose: args.take("PURPOSE"),
            hs_state: args.take("HS_STATE"),
            reason: args.take("REASON"),
            remote_reason: args.take("REMOTE_REASON"),
            time_created,
            extra: args.keywords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_built_circuit_with_path_and_keywords() {
        let event = CircuitEvent::parse(
            "7 BUILT $AAAA~alpha,$BBBB~beta BUILD_FLAGS=NEED_CAPACITY,NEED_UPTIME \
             PURPOSE=GENERAL TIME_CREATED=2024-05-01T12:30:45.123456 SOCKS_USERNAME=\"x\"",
        )
        .unwrap();
        assert_eq!(event.id, CircuitId::from("7"));
        assert_eq!(event.status, CircuitStatus::Built);
        assert_eq!(event.path, vec!["$AAAA~alpha", "$BBBB~beta"]);
        assert_eq!(event.build_flags, vec!["NEED_CAPACITY", "NEED_UPTIME"]);
        assert_eq!(event.purpose.as_deref(), Some("GENERAL"));
        let created = event.time_created.expect("time created");
        assert_eq!(created.to_string(), "2024-05-01 12:30:45.123456");
        assert_eq!(event.extra.get("SOCKS_USERNAME").map(String::as_str), Some("x"));
    }

    #[test]
    fn launched_circuit_without_path() {
        let event = CircuitEvent::parse("12 LAUNCHED PURPOSE=HS_CLIENT_REND").unwrap();
        assert!(event.path.is_empty());
        assert_eq!(event.status, CircuitStatus::Launched);
    }

    #[test]
    fn unknown_status_is_kept() {
        let event = CircuitEvent::parse("3 REBUILDING").unwrap();
        assert_eq!(event.status, CircuitStatus::Unknown("REBUILDING".into()));
    }

    #[test]
    fn missing_status_is_an_error() {
        assert!(CircuitEvent::parse("3").is_err());
        assert!(CircuitEvent::parse("3 CLOSED TIME_CREATED=yesterday").is_err());
    }
}
