//! torctl client — async Tor control-port connection.
//!
//! - [`ControlConnection`] owns the socket and demultiplexes replies and events
//! - [`SafeCookie`] performs SAFECOOKIE authentication against a connection
//! - [`EventStream`] delivers decoded events to any number of subscribers
//! - [`ClientConfig`] resolves the endpoint and cookie file
//!
//! ```no_run
//! # async fn demo() -> Result<(), torctl_client::ControlError> {
//! use torctl_client::{connect_authenticated, ClientConfig};
//! use torctl_core::EventKind;
//!
//! let connection = connect_authenticated(&ClientConfig::from_env()?).await?;
//! let mut events = connection.events();
//! connection.set_events(&[EventKind::Circ, EventKind::NetworkLiveness]).await?;
//! while let Some(event) = events.next().await {
//!     println!("{event:?}");
//! }
//! # Ok(()) }
//! ```

pub mod auth;
mod commands;
pub mod config;
mod connection;
mod error;
mod events;
pub mod protocol_info;
pub mod reader;

pub use auth::{connect_authenticated, AuthChallenge, SafeCookie};
pub use config::{ClientConfig, ControlEndpoint};
pub use connection::{ConnectionState, ControlConnection};
pub use error::ControlError;
pub use events::EventStream;
pub use protocol_info::ProtocolInfo;
pub use tokio_util::sync::CancellationToken;
