use std::collections::BTreeMap;

use serde::Serialize;

use crate::tokenizer::KeywordArgs;

/// Which of the three status event streams produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    General,
    Client,
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Notice,
    Warn,
    Err,
    Unknown(String),
}

impl Severity {
    fn parse(s: &str) -> Self {
        match s {
            "NOTICE" => Self::Notice,
            "WARN" => Self::Warn,
            "ERR" => Self::Err,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// `650 STATUS_{GENERAL,CLIENT,SERVER} <severity> <action> [KEY=VALUE ...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    pub kind: StatusKind,
    pub severity: Severity,
    /// e.g. `BOOTSTRAP`, `CIRCUIT_ESTABLISHED`, `CLOCK_SKEW`.
    pub action: String,
    pub arguments: BTreeMap<String, String>,
}

impl StatusEvent {
    pub(crate) fn parse(kind: StatusKind, body: &str) -> Result<Self, String> {
        let args = KeywordArgs::parse(body);
        let severity = args
            .positional(0)
            .map(Severity::parse)
            .ok_or_else(|| "missing severity".to_string())?;
        let action = args
            .positional(1)
            .ok_or_else(|| "missing action".to_string())?
            .to_string();
        Ok(Self {
            kind,
            severity,
            action,
            arguments: args.keywords,
        })
    }

    /// Bootstrap percentage for `BOOTSTRAP` actions.
    pub fn bootstrap_progress(&self) -> Option<u8> {
        if self.action != "BOOTSTRAP" {
            return None;
        }
        self.arguments.get("PROGRESS")?.parse().ok()
    }
}
