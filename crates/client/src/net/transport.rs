use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;

use officeverse::LineFramer;

use super::config::ClientConfig;

const READ_CHUNK: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Line(String),
    Closed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransportStats {
    pub lines_sent: u64,
    pub lines_received: u64,
}

/// Newline-delimited message transport over TCP.
///
/// Reading and writing run on tokio tasks. Inbound lines queue up until the owner drains
/// them; sends are fire-and-forget.
pub struct LineTransport {
    peer: SocketAddr,
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<TransportEvent>,
    stats: TransportStats,
    closed: bool,
}

impl LineTransport {
    pub async fn connect(addr: impl ToSocketAddrs, config: &ClientConfig) -> io::Result<Self> {
        let stream = tokio::time::timeout(config.connect_timeout(), TcpStream::connect(addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connection timed out"))??;
        Self::from_stream(stream, config.max_line_len)
    }

    pub fn from_stream(stream: TcpStream, max_line_len: usize) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        let (read_half, write_half) = stream.into_split();

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(read_lines(
            read_half,
            LineFramer::new(max_line_len),
            inbound_tx,
        ));
        tokio::spawn(write_lines(write_half, outbound_rx));

        log::info!("Connected to {}", peer);

        Ok(Self {
            peer,
            outbound: outbound_tx,
            inbound: inbound_rx,
            stats: TransportStats::default(),
            closed: false,
        })
    }

    pub fn send(&mut self, line: String) {
        if self.closed {
            return;
        }
        if self.outbound.send(line).is_ok() {
            self.stats.lines_sent += 1;
        }
    }

    /// Everything received since the last call, in arrival order.
    pub fn drain(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.inbound.try_recv() {
            match &event {
                TransportEvent::Line(_) => self.stats.lines_received += 1,
                TransportEvent::Closed => self.closed = true,
            }
            events.push(event);
        }
        events
    }

    pub async fn recv(&mut self) -> Option<TransportEvent> {
        let event = self.inbound.recv().await;
        match &event {
            Some(TransportEvent::Line(_)) => self.stats.lines_received += 1,
            Some(TransportEvent::Closed) | None => self.closed = true,
        }
        event
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn stats(&self) -> TransportStats {
        self.stats
    }
}

async fn read_lines(
    mut read_half: OwnedReadHalf,
    mut framer: LineFramer,
    inbound: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = match read_half.read(&mut chunk).await {
            Ok(0) => {
                log::info!("Server closed the connection");
                break;
            }
            Ok(read) => read,
            Err(e) => {
                log::warn!("Read failed: {}", e);
                break;
            }
        };

        framer.extend(&chunk[..read]);
        while let Some(line) = framer.next_line() {
            match line {
                Ok(line) => {
                    if inbound.send(TransportEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => log::debug!("Skipping inbound line: {}", e),
            }
        }
    }
    let _ = inbound.send(TransportEvent::Closed);
}

async fn write_lines(mut write_half: OwnedWriteHalf, mut outbound: mpsc::UnboundedReceiver<String>) {
    while let Some(mut line) = outbound.recv().await {
        line.push('\n');
        if let Err(e) = write_half.write_all(line.as_bytes()).await {
            log::warn!("Write failed: {}", e);
            break;
        }
    }
    let _ = write_half.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    /// Accepts one client, reads one line from it, then writes `reply` and hangs up.
    async fn serve_once(reply: &'static [u8]) -> (SocketAddr, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();
            let received = lines.next_line().await.unwrap().unwrap();
            write_half.write_all(reply).await.unwrap();
            received
        });
        (addr, server)
    }

    #[tokio::test]
    async fn lines_flow_both_ways() {
        let (addr, server) = serve_once(b"PlayerLeft:42\nBroadcast:1:2:3\n").await;

        let mut transport = LineTransport::connect(addr, &ClientConfig::default())
            .await
            .unwrap();
        transport.send("Broadcast:7:1:2:Ava:0:owlet:idle:0".to_string());

        assert_eq!(
            transport.recv().await,
            Some(TransportEvent::Line("PlayerLeft:42".to_string()))
        );
        assert_eq!(
            transport.recv().await,
            Some(TransportEvent::Line("Broadcast:1:2:3".to_string()))
        );
        assert_eq!(transport.recv().await, Some(TransportEvent::Closed));
        assert!(transport.is_closed());

        assert_eq!(
            server.await.unwrap(),
            "Broadcast:7:1:2:Ava:0:owlet:idle:0"
        );
        assert_eq!(transport.stats().lines_sent, 1);
        assert_eq!(transport.stats().lines_received, 2);
    }

    #[tokio::test]
    async fn undecodable_line_does_not_end_the_session() {
        let (addr, server) =
            serve_once(b"Broadcast:1:2:3:\xff\xfe:0:owlet:idle:0\nPlayerLeft:42\n").await;

        let mut transport = LineTransport::connect(addr, &ClientConfig::default())
            .await
            .unwrap();
        transport.send("PlayerLeft:7".to_string());

        assert_eq!(
            transport.recv().await,
            Some(TransportEvent::Line("PlayerLeft:42".to_string()))
        );
        assert_eq!(transport.recv().await, Some(TransportEvent::Closed));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn overlong_line_is_skipped() {
        let (addr, server) = serve_once(
            b"Broadcast:1:2:3:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa:0:owlet:idle:0\nPlayerLeft:42\n",
        )
        .await;

        let config = ClientConfig {
            max_line_len: 32,
            ..ClientConfig::default()
        };
        let mut transport = LineTransport::connect(addr, &config).await.unwrap();
        transport.send("PlayerLeft:7".to_string());

        assert_eq!(
            transport.recv().await,
            Some(TransportEvent::Line("PlayerLeft:42".to_string()))
        );
        assert_eq!(transport.recv().await, Some(TransportEvent::Closed));
        server.await.unwrap();
    }
}
