use std::path::PathBuf;

use thiserror::Error;

use torctl_core::{ReplyParseError, StatusCode};

/// Error surface for connections, commands and authentication.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("I/O error during {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection is gone; every pending and future command sees this.
    #[error("control connection closed: {reason}")]
    ConnectionClosed { reason: String },

    #[error("malformed reply: {0}")]
    ReplyParse(#[from] ReplyParseError),

    #[error("authentication failed: {message} (reply: {reply})")]
    Authentication { message: String, reply: String },

    #[error("command failed with status {status}: {reply}")]
    CommandFailed { status: StatusCode, reply: String },

    #[error("cannot read cookie file {path}: {source}")]
    Cookie {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cookie file {path} holds {len} bytes, expected 32")]
    InvalidCookie { path: PathBuf, len: usize },

    #[error("no cookie file found; pass one explicitly")]
    CookieNotFound,

    #[error("invalid control endpoint {0:?}; expected host:port or unix:/path")]
    InvalidEndpoint(String),

    /// The caller stopped waiting. The command may still have been sent.
    #[error("command cancelled while awaiting its reply")]
    Cancelled,

    #[error("control protocol error: {0}")]
    Protocol(String),
}

pub(crate) fn io_err(context: impl Into<String>, source: std::io::Error) -> ControlError {
    ControlError::Io {
        context: context.into(),
        source,
    }
}

pub(crate) fn auth_err(message: impl Into<String>, reply: impl ToString) -> ControlError {
    ControlError::Authentication {
        message: message.into(),
        reply: reply.to_string(),
    }
}
