//! Reply values and the line-fed assembler that builds them.

use std::fmt;

use serde::Serialize;

use crate::error::ReplyParseError;
use crate::status::StatusCode;
use crate::tokenizer::{parse_line_prefix, Marker};

/// One complete logical reply: a status code and its response lines.
///
/// Lines carry no status prefix or marker. Lines of a `+` data block appear
/// verbatim, without the terminating `.`. There is always at least one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    status: StatusCode,
    lines: Vec<String>,
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_event(&self) -> bool {
        self.status.is_event()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Assemble the first reply contained in `text`.
    ///
    /// Anything after the first complete reply is ignored.
    pub fn parse(text: &str) -> Result<Self, ReplyParseError> {
        let mut assembler = ReplyAssembler::new();
        for line in text.lines() {
            if let Some(reply) = assembler.push_line(line)? {
                return Ok(reply);
            }
        }
        assembler.finish()?;
        Err(ReplyParseError::UnexpectedEof { received: 0 })
    }
}

/// Renders the reply in wire shape (`250-a`, `250 OK`) for diagnostics.
impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.lines.len().saturating_sub(1);
        for (index, line) in self.lines.iter().enumerate() {
            if index == last {
                write!(f, "{} {line}", self.status)?;
            } else {
                writeln!(f, "{}-{line}", self.status)?;
            }
        }
        Ok(())
    }
}

/// Builds [`Reply`] values from raw protocol lines, one line at a time.
///
/// Feed lines with [`push_line`](Self::push_line); a reply is returned once
/// its final (`' '`-marked) line arrives. At end of stream call
/// [`finish`](Self::finish) to detect a truncated reply.
#[derive(Debug, Default)]
pub struct ReplyAssembler {
    status: Option<StatusCode>,
    lines: Vec<String>,
    in_data_block: bool,
}

impl ReplyAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one raw line (trailing CRLF or LF optional).
    pub fn push_line(&mut self, raw: &str) -> Result<Option<Reply>, ReplyParseError> {
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);

        if self.in_data_block {
            if line == "." {
                self.in_data_block = false;
            } else {
                self.lines.push(line.to_string());
            }
            return Ok(None);
        }

        let (status, marker, rest) = match parse_line_prefix(line) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.reset();
                return Err(err);
            }
        };

        match self.status {
            Some(expected) if expected != status => {
                self.reset();
                return Err(ReplyParseError::StatusMismatch {
                    expected: expected.as_u16(),
                    found: status.as_u16(),
                    line: line.to_string(),
                });
            }
            Some(_) => {}
            None => self.status = Some(status),
        }
        self.lines.push(rest.to_string());

        match marker {
            Marker::Final => {
                let lines = std::mem::take(&mut self.lines);
                self.status = None;
                Ok(Some(Reply { status, lines }))
            }
            Marker::Continuation => Ok(None),
            Marker::DataBlock => {
                self.in_data_block = true;
                Ok(None)
            }
        }
    }

    /// True between replies.
    pub fn is_idle(&self) -> bool {
        self.status.is_none() && !self.in_data_block
    }

    /// Signal end of stream. Fails if a reply was left incomplete.
    pub fn finish(&mut self) -> Result<(), ReplyParseError> {
        let received = self.lines.len();
        let result = if self.in_data_block {
            Err(ReplyParseError::UnterminatedDataBlock { received })
        } else if self.status.is_some() {
            Err(ReplyParseError::UnexpectedEof { received })
        } else {
            Ok(())
        };
        self.reset();
        result
    }

    fn reset(&mut self) {
        self.status = None;
        self.lines.clear();
        self.in_data_block = false;
    }
}
