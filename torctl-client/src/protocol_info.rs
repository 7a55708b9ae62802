//! PROTOCOLINFO: what the daemon supports before authentication.

use std::path::PathBuf;

use serde::Serialize;

use torctl_core::tokenizer::{read_until_separator, KeywordArgs, SPACE};
use torctl_core::Reply;

use crate::connection::ControlConnection;
use crate::error::ControlError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolInfo {
    pub protocol_version: Option<u32>,
    pub auth_methods: Vec<String>,
    pub cookie_file: Option<PathBuf>,
    pub tor_version: Option<String>,
}

impl ProtocolInfo {
    /// Parse a successful PROTOCOLINFO reply:
    ///
    /// ```text
    /// 250-PROTOCOLINFO 1
    /// 250-AUTH METHODS=COOKIE,SAFECOOKIE COOKIEFILE="/run/tor/control.authcookie"
    /// 250-VERSION Tor="0.4.8.12"
    /// 250 OK
    /// ```
    ///
    /// Unknown line keywords are ignored.
    pub fn parse(reply: &Reply) -> Result<Self, ControlError> {
        if !reply.is_success() {
            return Err(ControlError::CommandFailed {
                status: reply.status(),
                reply: reply.to_string(),
            });
        }

        let mut info = Self::default();
        for line in reply.lines() {
            let (keyword, rest) = read_until_separator(line, SPACE);
            match keyword {
                "PROTOCOLINFO" => {
                    let version = rest.trim().parse().map_err(|_| {
                        ControlError::Protocol(format!("bad PROTOCOLINFO version in {reply}"))
                    })?;
                    info.protocol_version = Some(version);
                }
                "AUTH" => {
                    let args = KeywordArgs::parse(rest);
                    if let Some(methods) = args.get("METHODS") {
                        info.auth_methods = methods
                            .split(',')
                            .filter(|m| !m.is_empty())
                            .map(str::to_string)
                            .collect();
                    }
                    info.cookie_file = args.get("COOKIEFILE").map(PathBuf::from);
                }
                "VERSION" => {
                    info.tor_version = KeywordArgs::parse(rest).get("Tor").map(str::to_string);
                }
                _ => {}
            }
        }
        Ok(info)
    }

    pub fn supports(&self, method: &str) -> bool {
        self.auth_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
    }
}

impl ControlConnection {
    /// `PROTOCOLINFO 1`. The daemon answers this once before authentication.
    pub async fn protocol_info(&self) -> Result<ProtocolInfo, ControlError> {
        let reply = self.send_command("PROTOCOLINFO 1").await?;
        ProtocolInfo::parse(&reply)
    }
}
