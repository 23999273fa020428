//! TCP implementation of the line transport.

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::connection::{LineSink, LineStream};

/// Buffered writer half of a TCP connection.
pub struct TcpLineSink {
    writer: BufWriter<OwnedWriteHalf>,
}

#[async_trait]
impl LineSink for TcpLineSink {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Line-buffered reader half of a TCP connection.
pub struct TcpLineStream {
    lines: Lines<BufReader<OwnedReadHalf>>,
}

#[async_trait]
impl LineStream for TcpLineStream {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}

/// Splits a connected socket into the two transport halves.
pub fn split(stream: TcpStream) -> (TcpLineStream, TcpLineSink) {
    let (read_half, write_half) = stream.into_split();
    let stream = TcpLineStream {
        lines: BufReader::new(read_half).lines(),
    };
    let sink = TcpLineSink {
        writer: BufWriter::new(write_half),
    };
    (stream, sink)
}
