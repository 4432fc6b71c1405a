//! Test chat client.
//!
//! A line-oriented client that can send commands, raw payload bytes,
//! and assert on received lines. Replies carry ANSI color codes, so
//! assertions use substring matching.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default receive timeout.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server and consume the greeting line.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        };

        let greeting = client.recv_line().await?;
        anyhow::ensure!(
            greeting.contains("enter a username"),
            "unexpected greeting: {greeting}"
        );
        Ok(client)
    }

    /// Register a username (the first line of the connection).
    pub async fn register(&mut self, name: &str) -> anyhow::Result<()> {
        self.send_line(name).await?;
        let reply = self.recv_line().await?;
        anyhow::ensure!(
            reply.contains(&format!("you are now known as {name}")),
            "registration failed: {reply}"
        );
        Ok(())
    }

    /// Send one line.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send raw bytes (payload mode), without a terminator.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line, terminator stripped.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(n > 0, "connection closed");
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Receive lines until one contains `needle`; returns that line.
    pub async fn recv_until_contains(&mut self, needle: &str) -> anyhow::Result<String> {
        loop {
            let line = self.recv_line().await?;
            if line.contains(needle) {
                return Ok(line);
            }
        }
    }

    /// Receive exactly `n` raw bytes (a forwarded payload).
    pub async fn recv_bytes(&mut self, n: usize) -> anyhow::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        timeout(RECV_TIMEOUT, self.reader.read_exact(&mut buf)).await??;
        Ok(buf)
    }

    /// Assert that nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        let mut line = String::new();
        match timeout(dur, self.reader.read_line(&mut line)).await {
            Err(_) => Ok(()), // timed out: silence, as expected
            Ok(Ok(0)) => anyhow::bail!("connection closed while expecting silence"),
            Ok(Ok(_)) => anyhow::bail!("unexpected line: {line:?}"),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Wait until the server closes this connection.
    pub async fn expect_eof(&mut self) -> anyhow::Result<()> {
        loop {
            let mut line = String::new();
            let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
            if n == 0 {
                return Ok(());
            }
        }
    }
}
