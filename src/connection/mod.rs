/// Transport abstraction for the line protocol.
///
/// The client logic only talks to [`LineStream`] and [`LineSink`]; the TCP
/// implementation lives in [`tcp`], and [`channel`] provides an in-process
/// transport for tests and embedding without involving networking.
pub mod channel;
pub mod tcp;

use anyhow::Result;
use async_trait::async_trait;

/// Sends protocol lines to the peer.
#[async_trait]
pub trait LineSink: Send {
    async fn write_line(&mut self, line: &str) -> Result<()>;

    async fn flush(&mut self) -> Result<()>;
}

/// Receives protocol lines from the peer.
#[async_trait]
pub trait LineStream: Send {
    /// The next line, or `None` when the connection is closed.
    async fn next_line(&mut self) -> Result<Option<String>>;
}
