//! SAFECOOKIE challenge-response authentication.
//!
//! The controller proves it can read the daemon's cookie without sending it:
//!
//! 1. `AUTHCHALLENGE SAFECOOKIE <client nonce>` with 32 random bytes as hex
//! 2. the daemon answers `AUTHCHALLENGE SERVERHASH=<hex> SERVERNONCE=<hex>`
//! 3. `AUTHENTICATE <hex HMAC-SHA256(key, cookie ‖ client nonce ‖ server nonce)>`
//!
//! The HMAC message is the cookie string followed by the two nonces exactly
//! as they appeared on the wire (hex text). SERVERHASH is only checked when
//! [`SafeCookie::verify_server_hash`] is enabled.

use std::path::Path;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use torctl_core::codec::{from_hex, is_hex, to_hex};
use torctl_core::tokenizer::{read_until_separator, SPACE};

use crate::config::ClientConfig;
use crate::connection::{ConnectionState, ControlConnection};
use crate::error::{auth_err, ControlError};

type HmacSha256 = Hmac<Sha256>;

/// HMAC key for the controller's proof.
pub const CONTROLLER_TO_SERVER_KEY: &[u8] =
    b"Tor safe cookie authentication controller-to-server hash";
/// HMAC key for the daemon's SERVERHASH.
pub const SERVER_TO_CONTROLLER_KEY: &[u8] =
    b"Tor safe cookie authentication server-to-controller hash";

pub const SAFECOOKIE: &str = "SAFECOOKIE";
pub const NONCE_LEN: usize = 32;
pub const COOKIE_LEN: usize = 32;
/// Hex length of a nonce or an HMAC-SHA256 digest.
const HEX_FIELD_LEN: usize = 64;

/// The daemon's answer to AUTHCHALLENGE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub server_hash: String,
    pub server_nonce: String,
}

impl AuthChallenge {
    /// Accepts exactly `AUTHCHALLENGE SERVERHASH=<64 hex> SERVERNONCE=<64 hex>`.
    pub fn parse(line: &str) -> Option<Self> {
        let (keyword, rest) = read_until_separator(line, SPACE);
        if keyword != "AUTHCHALLENGE" {
            return None;
        }
        let (hash_field, nonce_field) = read_until_separator(rest, SPACE);
        let server_hash = hash_field.strip_prefix("SERVERHASH=")?;
        let server_nonce = nonce_field.strip_prefix("SERVERNONCE=")?;
        if !is_hex_field(server_hash) || !is_hex_field(server_nonce) {
            return None;
        }
        Some(Self {
            server_hash: server_hash.to_string(),
            server_nonce: server_nonce.to_string(),
        })
    }
}

fn is_hex_field(text: &str) -> bool {
    text.len() == HEX_FIELD_LEN && is_hex(text)
}

/// Credentials for one SAFECOOKIE handshake.
#[derive(Clone)]
pub struct SafeCookie {
    cookie: String,
    verify_server_hash: bool,
}

impl std::fmt::Debug for SafeCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeCookie")
            .field("cookie", &"<redacted>")
            .field("verify_server_hash", &self.verify_server_hash)
            .finish()
    }
}

impl SafeCookie {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
            verify_server_hash: false,
        }
    }

    /// Read the daemon's 32-byte cookie file; the cookie string is its hex.
    pub async fn from_file(path: &Path) -> Result<Self, ControlError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ControlError::Cookie {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.len() != COOKIE_LEN {
            return Err(ControlError::InvalidCookie {
                path: path.to_path_buf(),
                len: bytes.len(),
            });
        }
        Ok(Self::new(to_hex(bytes)))
    }

    pub fn verify_server_hash(mut self, verify: bool) -> Self {
        self.verify_server_hash = verify;
        self
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Run the handshake with a fresh random client nonce.
    pub async fn authenticate(&self, connection: &ControlConnection) -> Result<(), ControlError> {
        let nonce: [u8; NONCE_LEN] = rand::random();
        self.authenticate_with_nonce(connection, &to_hex(nonce)).await
    }

    /// Run the handshake with a caller-chosen client nonce (hex).
    pub async fn authenticate_with_nonce(
        &self,
        connection: &ControlConnection,
        client_nonce: &str,
    ) -> Result<(), ControlError> {
        connection.set_state(ConnectionState::Authenticating);
        let result = self.handshake(connection, client_nonce).await;
        connection.set_state(match result {
            Ok(()) => ConnectionState::Ready,
            Err(_) => ConnectionState::Connected,
        });
        result
    }

    async fn handshake(
        &self,
        connection: &ControlConnection,
        client_nonce: &str,
    ) -> Result<(), ControlError> {
        let reply = connection
            .send_command(&format!("AUTHCHALLENGE {SAFECOOKIE} {client_nonce}"))
            .await?;
        if !reply.is_success() {
            return Err(auth_err("AUTHCHALLENGE rejected", &reply));
        }
        if reply.lines().len() != 1 {
            return Err(auth_err(
                "AUTHCHALLENGE reply must be a single line",
                &reply,
            ));
        }
        let challenge = AuthChallenge::parse(reply.first_line())
            .ok_or_else(|| auth_err("malformed AUTHCHALLENGE reply", &reply))?;

        if self.verify_server_hash
            && !server_hash_matches(
                &self.cookie,
                client_nonce,
                &challenge.server_nonce,
                &challenge.server_hash,
            )?
        {
            return Err(auth_err("SERVERHASH does not match the cookie", &reply));
        }

        let proof = client_proof(&self.cookie, client_nonce, &challenge.server_nonce)?;
        let reply = connection
            .send_command(&format!("AUTHENTICATE {proof}"))
            .await?;
        if !reply.is_success() {
            return Err(auth_err("AUTHENTICATE rejected", &reply));
        }

        tracing::info!("authenticated with {SAFECOOKIE}");
        Ok(())
    }
}

/// Hex HMAC the controller sends with AUTHENTICATE.
pub fn client_proof(
    cookie: &str,
    client_nonce: &str,
    server_nonce: &str,
) -> Result<String, ControlError> {
    let mac = keyed_mac(CONTROLLER_TO_SERVER_KEY, cookie, client_nonce, server_nonce)?;
    Ok(to_hex(mac.finalize().into_bytes()))
}

/// Hex HMAC the daemon is expected to send as SERVERHASH.
pub fn server_proof(
    cookie: &str,
    client_nonce: &str,
    server_nonce: &str,
) -> Result<String, ControlError> {
    let mac = keyed_mac(SERVER_TO_CONTROLLER_KEY, cookie, client_nonce, server_nonce)?;
    Ok(to_hex(mac.finalize().into_bytes()))
}

/// Constant-time comparison of a claimed SERVERHASH.
pub fn server_hash_matches(
    cookie: &str,
    client_nonce: &str,
    server_nonce: &str,
    claimed: &str,
) -> Result<bool, ControlError> {
    let Ok(claimed) = from_hex(claimed) else {
        return Ok(false);
    };
    let mac = keyed_mac(SERVER_TO_CONTROLLER_KEY, cookie, client_nonce, server_nonce)?;
    Ok(mac.verify_slice(&claimed).is_ok())
}

fn keyed_mac(
    key: &[u8],
    cookie: &str,
    client_nonce: &str,
    server_nonce: &str,
) -> Result<HmacSha256, ControlError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| ControlError::Protocol(format!("HMAC key rejected: {err}")))?;
    mac.update(cookie.as_bytes());
    mac.update(client_nonce.as_bytes());
    mac.update(server_nonce.as_bytes());
    Ok(mac)
}

/// Connect, discover the cookie via PROTOCOLINFO, and authenticate.
pub async fn connect_authenticated(
    config: &ClientConfig,
) -> Result<ControlConnection, ControlError> {
    let connection = ControlConnection::connect(config).await?;
    let info = connection.protocol_info().await?;
    if !info.supports(SAFECOOKIE) {
        tracing::warn!(methods = ?info.auth_methods, "daemon does not advertise SAFECOOKIE");
    }
    let cookie_file = config
        .resolve_cookie_file(info.cookie_file.as_deref())
        .ok_or(ControlError::CookieNotFound)?;
    tracing::debug!(path = %cookie_file.display(), "using cookie file");

    SafeCookie::from_file(&cookie_file)
        .await?
        .verify_server_hash(config.verify_server_hash)
        .authenticate(&connection)
        .await?;
    Ok(connection)
}
