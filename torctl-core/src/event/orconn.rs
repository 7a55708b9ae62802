use serde::Serialize;

use crate::tokenizer::KeywordArgs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrConnStatus {
    New,
    Launched,
    Connected,
    Failed,
    Closed,
    Unknown(String),
}

impl OrConnStatus {
    fn parse(s: &str) -> Self {
        match s {
            "NEW" => Self::New,
            "LAUNCHED" => Self::Launched,
            "CONNECTED" => Self::Connected,
            "FAILED" => Self::Failed,
            "CLOSED" => Self::Closed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// `650 ORCONN <target> <status> [REASON=] [NCIRCS=] [ID=]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrConnEvent {
    /// Relay as `$FINGERPRINT~nickname` or `address:port`.
    pub target: String,
    pub status: OrConnStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl OrConnEvent {
    pub(crate) fn parse(body: &str) -> Result<Self, String> {
        let mut args = KeywordArgs::parse(body);
        let target = args
            .positional(0)
            .ok_or_else(|| "missing connection target".to_string())?
            .to_string();
        let status = args
            .positional(1)
            .map(OrConnStatus::parse)
            .ok_or_else(|| "missing connection status".to_string())?;
        let circuit_count = args
            .take("NCIRCS")
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|err| format!("bad NCIRCS {raw:?}: {err}"))
            })
            .transpose()?;

        Ok(Self {
            target,
            status,
            reason: args.take("REASON"),
            circuit_count,
            id: args.take("ID"),
        })
    }
}
