use serde::Serialize;

/// `650 NETWORK_LIVENESS UP|DOWN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkLiveness {
    Up,
    Down,
}

impl NetworkLiveness {
    pub(crate) fn parse(body: &str) -> Result<Self, String> {
        match body.trim() {
            "UP" => Ok(Self::Up),
            "DOWN" => Ok(Self::Down),
            other => Err(format!("expected UP or DOWN, got {other:?}")),
        }
    }

    pub fn is_up(self) -> bool {
        self == Self::Up
    }
}
