//! Async adaptor feeding socket lines into the reply assembler.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use torctl_core::{Reply, ReplyAssembler, ReplyParseError};

use crate::error::{io_err, ControlError};

/// Longest line accepted from the daemon, newline included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Reads complete replies from a buffered byte stream.
pub struct ReplyReader<R> {
    reader: R,
    assembler: ReplyAssembler,
    buf: Vec<u8>,
    max_line_len: usize,
}

impl<R: AsyncBufRead + Unpin> ReplyReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_line_len(reader, MAX_LINE_LEN)
    }

    pub fn with_max_line_len(reader: R, max_line_len: usize) -> Self {
        Self {
            reader,
            assembler: ReplyAssembler::new(),
            buf: Vec::with_capacity(256),
            max_line_len: max_line_len.max(1),
        }
    }

    /// Next complete reply, or `None` on a clean end of stream between
    /// replies. End of stream inside a reply is a parse error.
    pub async fn next_reply(&mut self) -> Result<Option<Reply>, ControlError> {
        loop {
            self.buf.clear();
            let read = (&mut self.reader)
                .take(self.max_line_len as u64)
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(|e| io_err("control socket read", e))?;
            if read == 0 {
                self.assembler.finish()?;
                return Ok(None);
            }
            if read == self.max_line_len && !self.buf.ends_with(b"\n") {
                return Err(ReplyParseError::LineTooLong {
                    limit: self.max_line_len,
                }
                .into());
            }

            let line = std::str::from_utf8(&self.buf).map_err(|_| ReplyParseError::InvalidUtf8 {
                line: String::from_utf8_lossy(&self.buf).into_owned(),
            })?;
            tracing::trace!(line = %line.trim_end(), "control line received");
            if let Some(reply) = self.assembler.push_line(line)? {
                return Ok(Some(reply));
            }
        }
    }
}
