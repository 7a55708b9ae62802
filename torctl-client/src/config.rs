//! Where to connect and how to authenticate.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ControlError;

pub const DEFAULT_CONTROL_ADDR: &str = "127.0.0.1:9051";
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Overrides the control endpoint (`host:port` or `unix:/path`).
pub const CONTROL_ENV: &str = "TORCTL_CONTROL";
/// Overrides the cookie file path.
pub const COOKIE_FILE_ENV: &str = "TORCTL_COOKIE_FILE";

/// System locations the daemon commonly writes its cookie to.
pub const SYSTEM_COOKIE_FILES: &[&str] = &[
    "/run/tor/control.authcookie",
    "/var/run/tor/control.authcookie",
    "/var/lib/tor/control_auth_cookie",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEndpoint {
    Tcp(String),
    Unix(PathBuf),
}

impl ControlEndpoint {
    pub fn parse(text: &str) -> Result<Self, ControlError> {
        let text = text.trim();
        if let Some(path) = text.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(ControlError::InvalidEndpoint(text.to_string()));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        match text.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                Ok(Self::Tcp(text.to_string()))
            }
            _ => Err(ControlError::InvalidEndpoint(text.to_string())),
        }
    }
}

impl Default for ControlEndpoint {
    fn default() -> Self {
        Self::Tcp(DEFAULT_CONTROL_ADDR.to_string())
    }
}

impl fmt::Display for ControlEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => f.write_str(addr),
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: ControlEndpoint,
    /// Explicit cookie file; otherwise discovered (see [`Self::resolve_cookie_file`]).
    pub cookie_file: Option<PathBuf>,
    /// Per-subscriber event buffer before lagging.
    pub event_capacity: usize,
    /// Check SERVERHASH during SAFECOOKIE authentication. Off by default.
    pub verify_server_hash: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: ControlEndpoint::default(),
            cookie_file: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            verify_server_hash: false,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TORCTL_CONTROL` / `TORCTL_COOKIE_FILE`.
    pub fn from_env() -> Result<Self, ControlError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControlError> {
        let mut config = Self::default();
        if let Some(endpoint) = lookup(CONTROL_ENV).filter(|v| !v.trim().is_empty()) {
            config.endpoint = ControlEndpoint::parse(&endpoint)?;
        }
        if let Some(cookie) = lookup(COOKIE_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            config.cookie_file = Some(PathBuf::from(cookie));
        }
        Ok(config)
    }

    /// Pick the cookie file: explicit setting, then the path the daemon
    /// reported in PROTOCOLINFO, then the first existing well-known location.
    pub fn resolve_cookie_file(&self, reported: Option<&Path>) -> Option<PathBuf> {
        self.resolve_cookie_file_among(reported, &default_cookie_files())
    }

    pub fn resolve_cookie_file_among(
        &self,
        reported: Option<&Path>,
        candidates: &[PathBuf],
    ) -> Option<PathBuf> {
        if let Some(explicit) = &self.cookie_file {
            return Some(explicit.clone());
        }
        if let Some(reported) = reported {
            if reported.exists() {
                return Some(reported.to_path_buf());
            }
            tracing::debug!(path = %reported.display(), "reported cookie file not readable here");
        }
        candidates.iter().find(|path| path.exists()).cloned()
    }
}

/// System cookie locations followed by `~/.tor/control_auth_cookie`.
pub fn default_cookie_files() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = SYSTEM_COOKIE_FILES.iter().map(PathBuf::from).collect();
    if let Some(home) = dirs::home_dir() {
        files.push(home.join(".tor").join("control_auth_cookie"));
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn endpoint_parsing() {
        assert_eq!(
            ControlEndpoint::parse("127.0.0.1:9151").unwrap(),
            ControlEndpoint::Tcp("127.0.0.1:9151".into())
        );
        assert_eq!(
            ControlEndpoint::parse("unix:/run/tor/control").unwrap(),
            ControlEndpoint::Unix(PathBuf::from("/run/tor/control"))
        );
        assert_eq!(
            ControlEndpoint::parse("[::1]:9051").unwrap().to_string(),
            "[::1]:9051"
        );
        for bad in ["", "localhost", "unix:", ":9051", "host:port"] {
            assert!(ControlEndpoint::parse(bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn env_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            (CONTROL_ENV, "unix:/tmp/tor.sock"),
            (COOKIE_FILE_ENV, "/tmp/cookie"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.endpoint.to_string(), "unix:/tmp/tor.sock");
        assert_eq!(config.cookie_file, Some(PathBuf::from("/tmp/cookie")));
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);

        let empty = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(empty.endpoint, ControlEndpoint::default());
        assert!(ClientConfig::from_lookup(|_| Some("nonsense".into())).is_err());
    }

    #[test]
    fn cookie_resolution_order() {
        let dir = TempDir::new().expect("tempdir");
        let reported = dir.path().join("reported");
        let fallback = dir.path().join("fallback");
        std::fs::write(&fallback, [0u8; 32]).expect("write fallback");

        let config = ClientConfig::default();
        let candidates = vec![dir.path().join("missing"), fallback.clone()];

        // Reported path missing on disk: fall through to candidates.
        assert_eq!(
            config.resolve_cookie_file_among(Some(&reported), &candidates),
            Some(fallback.clone())
        );

        std::fs::write(&reported, [0u8; 32]).expect("write reported");
        assert_eq!(
            config.resolve_cookie_file_among(Some(&reported), &candidates),
            Some(reported.clone())
        );

        let explicit = ClientConfig {
            cookie_file: Some(PathBuf::from("/explicit")),
            ..ClientConfig::default()
        };
        assert_eq!(
            explicit.resolve_cookie_file_among(Some(&reported), &candidates),
            Some(PathBuf::from("/explicit"))
        );

        assert_eq!(config.resolve_cookie_file_among(None, &[]), None);
    }
}
