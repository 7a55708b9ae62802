//! In-memory fake daemon for connection tests.

#![allow(dead_code)]

use std::time::Duration;

use tokio::io::{
    duplex, split, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf,
    WriteHalf,
};

use torctl_client::ControlConnection;

/// The daemon side of a duplex pipe.
pub struct FakeDaemon {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl FakeDaemon {
    /// Next command line sent by the client, without CRLF.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines
            .next_line()
            .await
            .expect("daemon read")
            .map(|line| line.trim_end_matches('\r').to_string())
    }

    /// Next command line, failing the test if the client sent nothing.
    pub async fn expect_line(&mut self) -> String {
        self.next_line().await.expect("client closed the pipe")
    }

    /// True if the client sends a line within `wait`.
    pub async fn sends_within(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.lines.next_line())
            .await
            .is_ok()
    }

    pub async fn send(&mut self, raw: &str) {
        self.writer
            .write_all(raw.as_bytes())
            .await
            .expect("daemon write");
        self.writer.flush().await.expect("daemon flush");
    }
}

pub fn connect_pair() -> (ControlConnection, FakeDaemon) {
    let (client, daemon) = duplex(64 * 1024);
    let (read_half, writer) = split(daemon);
    let connection = ControlConnection::new(client);
    (
        connection,
        FakeDaemon {
            lines: BufReader::new(read_half).lines(),
            writer,
        },
    )
}
