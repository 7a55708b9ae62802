//! Error types for torctl-core.

use thiserror::Error;

/// Malformed control-protocol framing.
///
/// Any of these leaves the stream in an unknown position, so the connection
/// that produced it cannot continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyParseError {
    /// Line shorter than the 3-digit code plus marker.
    #[error("reply line too short: {line:?}")]
    LineTooShort { line: String },

    /// First three characters are not all ASCII digits.
    #[error("reply line does not start with a 3-digit status code: {line:?}")]
    InvalidStatusCode { line: String },

    /// Fourth character is not one of `' '`, `'-'`, `'+'`.
    #[error("unknown reply marker {marker:?} in line {line:?}")]
    InvalidMarker { marker: char, line: String },

    /// A later line of the same reply carried a different status code.
    #[error("status code changed from {expected} to {found} within one reply: {line:?}")]
    StatusMismatch {
        expected: u16,
        found: u16,
        line: String,
    },

    /// The stream ended before the final line of a reply.
    #[error("stream ended inside a reply after {received} line(s)")]
    UnexpectedEof { received: usize },

    /// A line was not valid UTF-8; the protocol is ASCII.
    #[error("reply line is not valid UTF-8: {line:?}")]
    InvalidUtf8 { line: String },

    /// A line exceeded the reader's length limit without a newline.
    #[error("reply line longer than {limit} bytes")]
    LineTooLong { limit: usize },

    /// The stream ended inside a `+` data block.
    #[error("stream ended inside a data block after {received} line(s)")]
    UnterminatedDataBlock { received: usize },
}

/// Failure to decode an asynchronous event.
///
/// Localized to one event; the connection keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The reply was not a 650 notification.
    #[error("reply with status {status} is not an asynchronous event: {raw}")]
    NotAnEvent { status: u16, raw: String },

    /// The event name is outside the set this client decodes.
    #[error("unsupported event {name}: {raw}")]
    Unsupported { name: String, raw: String },

    /// The event name is known but its body did not parse.
    #[error("malformed {event} event ({reason}): {raw}")]
    Malformed {
        event: &'static str,
        reason: String,
        raw: String,
    },

    /// A slow subscriber missed events.
    #[error("event stream lagged; {skipped} event(s) dropped")]
    Lagged { skipped: u64 },
}

/// Invalid hexadecimal input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid hex string: {0}")]
pub struct HexError(#[from] pub hex::FromHexError);
