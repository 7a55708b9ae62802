//! The connection engine.
//!
//! One socket, two background tasks:
//! - the read loop assembles replies and routes them: 650 notifications go to
//!   the event broadcast, everything else completes the oldest pending command;
//! - the write loop takes queued commands, registers each one's reply slot,
//!   then writes it, so a caller that stops waiting can never leave half a
//!   command on the wire.
//!
//! Commands take turns: a caller holds the turn lock from enqueueing until
//! its reply arrives, so at most one command is outstanding. Slots live in a
//! FIFO; a caller that gives up early leaves its slot behind, and the reply
//! it would have received is consumed and discarded when it arrives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use torctl_core::{Event, EventError, Reply};

use crate::config::{ClientConfig, ControlEndpoint, DEFAULT_EVENT_CAPACITY};
use crate::error::{io_err, ControlError};
use crate::events::EventStream;
use crate::reader::ReplyReader;

type ReplySlot = oneshot::Sender<Result<Reply, ControlError>>;
pub(crate) type EventItem = Result<Event, EventError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Authenticating,
    Ready,
    Closed,
}

struct CommandJob {
    line: String,
    respond_to: ReplySlot,
}

/// A live control-port connection.
///
/// Must be created inside a tokio runtime; dropping it stops both background
/// tasks and fails any pending command.
pub struct ControlConnection {
    commands: mpsc::Sender<CommandJob>,
    turn: tokio::sync::Mutex<()>,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl ControlConnection {
    /// Open the configured endpoint and start the connection tasks.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ControlError> {
        let context = format!("connect to {}", config.endpoint);
        let connection = match &config.endpoint {
            ControlEndpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr)
                    .await
                    .map_err(|e| io_err(&context, e))?;
                Self::with_event_capacity(stream, config.event_capacity)
            }
            #[cfg(unix)]
            ControlEndpoint::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(|e| io_err(&context, e))?;
                Self::with_event_capacity(stream, config.event_capacity)
            }
            #[cfg(not(unix))]
            ControlEndpoint::Unix(_) => {
                return Err(ControlError::InvalidEndpoint(config.endpoint.to_string()))
            }
        };
        tracing::debug!(endpoint = %config.endpoint, "control connection established");
        Ok(connection)
    }

    /// Wrap an already-connected stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::with_event_capacity(stream, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_event_capacity<S>(stream: S, event_capacity: usize) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let (events_tx, _) = broadcast::channel(event_capacity.max(1));
        let shared = Arc::new(Shared::new(events_tx));
        let shutdown = CancellationToken::new();
        let (commands_tx, commands_rx) = mpsc::channel::<CommandJob>(1);

        let reader_handle = {
            let shared = shared.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                read_loop(ReplyReader::new(BufReader::new(read_half)), &shared, &shutdown).await;
            })
        };

        let writer_handle = {
            let shared = shared.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                write_loop(write_half, commands_rx, &shared, &shutdown).await;
            })
        };

        Self {
            commands: commands_tx,
            turn: tokio::sync::Mutex::new(()),
            shared,
            shutdown,
            tasks: vec![reader_handle, writer_handle],
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ConnectionState::Closed
    }

    /// A new subscriber to decoded events.
    ///
    /// Only events arriving after this call are delivered. Once the
    /// connection has closed the returned stream is already finished.
    pub fn events(&self) -> EventStream {
        let inner = self.shared.lock();
        let receiver = match &inner.events {
            Some(sender) => sender.subscribe(),
            None => broadcast::channel::<EventItem>(1).1,
        };
        EventStream::new(receiver)
    }

    /// Send one command and wait for its reply.
    ///
    /// A trailing CRLF is added when missing. Replies with an error status
    /// are returned as `Ok`; see [`Self::expect_success`]. Dropping the
    /// returned future stops the wait but not the command.
    pub async fn send_command(&self, command: &str) -> Result<Reply, ControlError> {
        let _turn = self.turn.lock().await;

        let (respond_to, reply) = oneshot::channel();
        let job = CommandJob {
            line: terminate_line(command),
            respond_to,
        };
        if self.commands.send(job).await.is_err() {
            return Err(self.shared.closed_error());
        }

        match reply.await {
            Ok(result) => result,
            Err(_) => Err(self.shared.closed_error()),
        }
    }

    /// [`Self::send_command`] that gives up when `cancel` fires.
    pub async fn send_command_with_cancel(
        &self,
        command: &str,
        cancel: &CancellationToken,
    ) -> Result<Reply, ControlError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ControlError::Cancelled),
            result = self.send_command(command) => result,
        }
    }

    /// Send a command and treat any non-2xx status as an error.
    pub async fn expect_success(&self, command: &str) -> Result<Reply, ControlError> {
        let reply = self.send_command(command).await?;
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(ControlError::CommandFailed {
                status: reply.status(),
                reply: reply.to_string(),
            })
        }
    }

    /// Close the connection and wait for the background tasks to finish.
    pub async fn close(mut self) {
        self.shared.close("connection closed by client");
        self.shutdown.cancel();
        for task in std::mem::take(&mut self.tasks) {
            let _ = task.await;
        }
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        let mut inner = self.shared.lock();
        if inner.state != ConnectionState::Closed {
            inner.state = state;
        }
    }
}

impl Drop for ControlConnection {
    fn drop(&mut self) {
        self.shared.close("connection dropped");
        self.shutdown.cancel();
    }
}

// ---------------------------------------------------------------------------
// Shared bookkeeping
// ---------------------------------------------------------------------------

struct Inner {
    state: ConnectionState,
    pending: VecDeque<ReplySlot>,
    close_reason: Option<String>,
    /// Dropped on close so that subscribers see end-of-stream.
    events: Option<broadcast::Sender<EventItem>>,
}

struct Shared {
    inner: Mutex<Inner>,
}

impl Shared {
    fn new(events: broadcast::Sender<EventItem>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ConnectionState::Connected,
                pending: VecDeque::new(),
                close_reason: None,
                events: Some(events),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn closed_error(&self) -> ControlError {
        let reason = self
            .lock()
            .close_reason
            .clone()
            .unwrap_or_else(|| "connection closed".to_string());
        ControlError::ConnectionClosed { reason }
    }

    /// Queue a reply slot; fails the slot immediately if already closed.
    fn register(&self, slot: ReplySlot) -> bool {
        let mut inner = self.lock();
        if let Some(reason) = &inner.close_reason {
            let reason = reason.clone();
            drop(inner);
            let _ = slot.send(Err(ControlError::ConnectionClosed { reason }));
            return false;
        }
        inner.pending.push_back(slot);
        true
    }

    fn dispatch(&self, reply: Reply) {
        if reply.is_event() {
            let decoded = Event::decode(&reply);
            match &decoded {
                Ok(event) => tracing::debug!(kind = %event.kind(), "event received"),
                Err(EventError::Unsupported { name, .. }) => {
                    tracing::debug!(name = %name, "event not decoded by this client")
                }
                Err(err) => tracing::warn!(error = %err, "undecodable event"),
            }
            if let Some(sender) = &self.lock().events {
                // No subscribers is fine.
                let _ = sender.send(decoded);
            }
            return;
        }

        tracing::debug!(status = %reply.status(), lines = reply.lines().len(), "reply received");
        let slot = self.lock().pending.pop_front();
        match slot {
            Some(slot) => {
                if slot.send(Ok(reply)).is_err() {
                    tracing::debug!("discarded reply for an abandoned command");
                }
            }
            None => tracing::warn!(reply = %reply, "reply with no pending command dropped"),
        }
    }

    /// Transition to `Closed` and fail every pending slot. Idempotent.
    fn close(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let pending = {
            let mut inner = self.lock();
            if inner.close_reason.is_some() {
                return;
            }
            inner.state = ConnectionState::Closed;
            inner.close_reason = Some(reason.clone());
            inner.events = None;
            std::mem::take(&mut inner.pending)
        };
        tracing::info!(reason = %reason, pending = pending.len(), "control connection closed");
        for slot in pending {
            let _ = slot.send(Err(ControlError::ConnectionClosed {
                reason: reason.clone(),
            }));
        }
    }
}

// ---------------------------------------------------------------------------
// Background tasks
// ---------------------------------------------------------------------------

async fn read_loop<R>(
    mut reader: ReplyReader<R>,
    shared: &Shared,
    shutdown: &CancellationToken,
) where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let reason = loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => break "connection closed by client".to_string(),
            next = reader.next_reply() => next,
        };
        match next {
            Ok(Some(reply)) => shared.dispatch(reply),
            Ok(None) => break "daemon closed the connection".to_string(),
            Err(err) => {
                tracing::error!(error = %err, "control connection read failed");
                break err.to_string();
            }
        }
    };
    shared.close(reason);
    shutdown.cancel();
}

async fn write_loop<W>(
    mut writer: W,
    mut commands: mpsc::Receiver<CommandJob>,
    shared: &Shared,
    shutdown: &CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let job = tokio::select! {
            _ = shutdown.cancelled() => break,
            job = commands.recv() => job,
        };
        let Some(job) = job else { break };

        if !shared.register(job.respond_to) {
            continue;
        }
        tracing::debug!(command = %redact(&job.line), "sending command");
        if let Err(err) = write_line(&mut writer, &job.line).await {
            let err = io_err("control socket write", err);
            tracing::error!(error = %err, "control connection write failed");
            shared.close(err.to_string());
            shutdown.cancel();
            break;
        }
    }
    let _ = writer.shutdown().await;
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

fn terminate_line(command: &str) -> String {
    if command.ends_with("\r\n") {
        command.to_string()
    } else {
        format!("{}\r\n", command.strip_suffix('\n').unwrap_or(command))
    }
}

/// Command text for logs, without AUTHENTICATE credentials.
fn redact(line: &str) -> &str {
    let line = line.trim_end();
    match line.split_once(' ') {
        Some(("AUTHENTICATE", _)) => "AUTHENTICATE <redacted>",
        _ => line,
    }
}
