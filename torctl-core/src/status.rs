//! Reply status codes.

use std::fmt;

use serde::{Serialize, Serializer};

/// The 3-digit code that prefixes every reply line.
///
/// Codes this client treats specially get their own variant; anything else
/// the daemon sends is kept as [`StatusCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    OperationUnnecessary,
    ResourceExhausted,
    SyntaxError,
    UnrecognizedCommand,
    UnimplementedCommand,
    ArgumentSyntaxError,
    UnrecognizedArgument,
    AuthenticationRequired,
    BadAuthentication,
    UnspecifiedError,
    InternalError,
    UnrecognizedEntity,
    InvalidConfigValue,
    InvalidDescriptor,
    UnmanagedEntity,
    AsyncEventNotify,
    Other(u16),
}

impl StatusCode {
    pub fn from_u16(code: u16) -> Self {
        match code {
            250 => Self::Ok,
            251 => Self::OperationUnnecessary,
            451 => Self::ResourceExhausted,
            500 => Self::SyntaxError,
            510 => Self::UnrecognizedCommand,
            511 => Self::UnimplementedCommand,
            512 => Self::ArgumentSyntaxError,
            513 => Self::UnrecognizedArgument,
            514 => Self::AuthenticationRequired,
            515 => Self::BadAuthentication,
            550 => Self::UnspecifiedError,
            551 => Self::InternalError,
            552 => Self::UnrecognizedEntity,
            553 => Self::InvalidConfigValue,
            554 => Self::InvalidDescriptor,
            555 => Self::UnmanagedEntity,
            650 => Self::AsyncEventNotify,
            other => Self::Other(other),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 250,
            Self::OperationUnnecessary => 251,
            Self::ResourceExhausted => 451,
            Self::SyntaxError => 500,
            Self::UnrecognizedCommand => 510,
            Self::UnimplementedCommand => 511,
            Self::ArgumentSyntaxError => 512,
            Self::UnrecognizedArgument => 513,
            Self::AuthenticationRequired => 514,
            Self::BadAuthentication => 515,
            Self::UnspecifiedError => 550,
            Self::InternalError => 551,
            Self::UnrecognizedEntity => 552,
            Self::InvalidConfigValue => 553,
            Self::InvalidDescriptor => 554,
            Self::UnmanagedEntity => 555,
            Self::AsyncEventNotify => 650,
            Self::Other(code) => code,
        }
    }

    /// 2xx: the command was accepted.
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    pub fn is_event(self) -> bool {
        self == Self::AsyncEventNotify
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.as_u16())
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}
