use tokio::sync::broadcast::{self, error::RecvError};

use torctl_core::{Event, EventError};

use crate::connection::EventItem;

/// Decoded events from one connection, in the order the daemon sent them.
///
/// Each subscriber has its own buffer. A subscriber that falls behind gets
/// one [`EventError::Lagged`] item and then continues with newer events.
pub struct EventStream {
    receiver: broadcast::Receiver<EventItem>,
}

impl EventStream {
    pub(crate) fn new(receiver: broadcast::Receiver<EventItem>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the connection has closed.
    pub async fn next(&mut self) -> Option<Result<Event, EventError>> {
        match self.receiver.recv().await {
            Ok(item) => Some(item),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event subscriber lagged");
                Some(Err(EventError::Lagged { skipped }))
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Next successfully decoded event, skipping decode failures.
    pub async fn next_event(&mut self) -> Option<Event> {
        loop {
            match self.next().await? {
                Ok(event) => return Some(event),
                Err(err) => tracing::debug!(error = %err, "skipping undecoded event"),
            }
        }
    }
}
