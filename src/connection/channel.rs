//! In-process implementation of the line transport over tokio channels.
//!
//! Lets a scripted peer drive the client without a network connection, which
//! is what the client state machine tests use.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::connection::{LineSink, LineStream};

/// Sends lines into an unbounded channel.
pub struct ChannelLineSink {
    sender: UnboundedSender<String>,
}

impl ChannelLineSink {
    pub fn new(sender: UnboundedSender<String>) -> Self {
        ChannelLineSink { sender }
    }
}

#[async_trait]
impl LineSink for ChannelLineSink {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.sender
            .send(line.to_string())
            .map_err(|_| anyhow!("peer closed the line channel"))
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Receives lines from an unbounded channel.
pub struct ChannelLineStream {
    receiver: UnboundedReceiver<String>,
}

impl ChannelLineStream {
    pub fn new(receiver: UnboundedReceiver<String>) -> Self {
        ChannelLineStream { receiver }
    }
}

#[async_trait]
impl LineStream for ChannelLineStream {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.receiver.recv().await)
    }
}
