//! torctl core — wire-level pieces of the Tor control protocol.
//!
//! Nothing in this crate performs I/O:
//! - [`codec`] — hex encoding for nonces, hashes and cookies
//! - [`tokenizer`] — reply-line prefixes, leading tokens, argument lists
//! - [`reply`] — [`Reply`] and the line-fed [`ReplyAssembler`]
//! - [`status`] — [`StatusCode`]
//! - [`event`] — typed asynchronous [`Event`]s
//! - [`error`] — [`ReplyParseError`], [`EventError`], [`HexError`]

pub mod codec;
pub mod error;
pub mod event;
pub mod reply;
pub mod status;
pub mod tokenizer;

pub use error::{EventError, HexError, ReplyParseError};
pub use event::{
    BandwidthEvent, CircuitEvent, CircuitId, CircuitStatus, Event, EventKind, NetworkLiveness,
    OrConnEvent, OrConnStatus, Severity, StatusEvent, StatusKind,
};
pub use reply::{Reply, ReplyAssembler};
pub use status::StatusCode;
