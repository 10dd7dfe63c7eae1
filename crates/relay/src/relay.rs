use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::broadcast;

use officeverse::{LineFramer, NetworkMessage};
use officeverse::net::encode_departure;

use crate::config::RelayConfig;

const READ_CHUNK: usize = 4096;

#[derive(Debug, Clone)]
struct Frame {
    from: u32,
    line: Arc<str>,
}

#[derive(Debug, Default)]
pub struct RelayStats {
    pub connections: AtomicUsize,
    pub lines_relayed: AtomicU64,
    pub lines_dropped: AtomicU64,
}

/// Fans every line a client sends out to all other clients. Clients filter rooms themselves.
pub struct Relay {
    listener: TcpListener,
    config: RelayConfig,
    hub: broadcast::Sender<Frame>,
    stats: Arc<RelayStats>,
    next_connection_id: u32,
}

impl Relay {
    pub async fn bind(addr: impl ToSocketAddrs, config: RelayConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let (hub, _) = broadcast::channel(config.channel_capacity.max(1));

        Ok(Self {
            listener,
            config,
            hub,
            stats: Arc::new(RelayStats::default()),
            next_connection_id: 0,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn stats(&self) -> Arc<RelayStats> {
        Arc::clone(&self.stats)
    }

    pub async fn run(mut self) -> io::Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;

            if self.stats.connections.load(Ordering::SeqCst) >= self.config.max_clients {
                log::warn!("Connection denied to {}: relay full", addr);
                continue;
            }

            let online = self.stats.connections.fetch_add(1, Ordering::SeqCst) + 1;
            self.next_connection_id = self.next_connection_id.wrapping_add(1);
            log::info!(
                "Client {} connected from {} ({} online)",
                self.next_connection_id,
                addr,
                online
            );

            // Subscribed before the task starts so no line published after accept is missed.
            let frames = self.hub.subscribe();
            let connection = Connection {
                id: self.next_connection_id,
                addr,
                hub: self.hub.clone(),
                stats: Arc::clone(&self.stats),
                max_line_len: self.config.max_line_len,
            };
            tokio::spawn(connection.serve(stream, frames));
        }
    }
}

struct Connection {
    id: u32,
    addr: SocketAddr,
    hub: broadcast::Sender<Frame>,
    stats: Arc<RelayStats>,
    max_line_len: usize,
}

impl Connection {
    async fn serve(self, stream: TcpStream, frames: broadcast::Receiver<Frame>) {
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("Could not set nodelay for {}: {}", self.addr, e);
        }
        let (mut read_half, write_half) = stream.into_split();

        let writer = tokio::spawn(forward_frames(self.id, write_half, frames));

        let mut framer = LineFramer::new(self.max_line_len);
        let mut chunk = [0u8; READ_CHUNK];
        let mut last_player_id = None;

        loop {
            let read = match read_half.read(&mut chunk).await {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) => {
                    log::debug!("Read from client {} failed: {}", self.id, e);
                    break;
                }
            };

            framer.extend(&chunk[..read]);
            while let Some(line) = framer.next_line() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        self.stats.lines_dropped.fetch_add(1, Ordering::Relaxed);
                        log::warn!("Dropping line from client {}: {}", self.id, e);
                        continue;
                    }
                };

                if let Ok(NetworkMessage::Broadcast(broadcast)) = NetworkMessage::decode(&line) {
                    if last_player_id != Some(broadcast.id) {
                        log::debug!("Client {} is player {}", self.id, broadcast.id);
                    }
                    last_player_id = Some(broadcast.id);
                }

                self.publish(line.into());
            }
        }

        if let Some(player_id) = last_player_id {
            log::info!("Player {} left", player_id);
            self.publish(encode_departure(player_id).into());
        }

        writer.abort();
        let count = self.stats.connections.fetch_sub(1, Ordering::SeqCst) - 1;
        log::info!("Client {} disconnected ({} online)", self.id, count);
    }

    fn publish(&self, line: Arc<str>) {
        // Sending only fails when nobody else is listening.
        let _ = self.hub.send(Frame {
            from: self.id,
            line,
        });
        self.stats.lines_relayed.fetch_add(1, Ordering::Relaxed);
    }
}

async fn forward_frames(
    connection_id: u32,
    mut write_half: OwnedWriteHalf,
    mut frames: broadcast::Receiver<Frame>,
) {
    loop {
        let frame = match frames.recv().await {
            Ok(frame) => frame,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("Client {} lagged, skipped {} lines", connection_id, skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if frame.from == connection_id {
            continue;
        }

        let mut bytes = Vec::with_capacity(frame.line.len() + 1);
        bytes.extend_from_slice(frame.line.as_bytes());
        bytes.push(b'\n');
        if let Err(e) = write_half.write_all(&bytes).await {
            log::debug!("Write to client {} failed: {}", connection_id, e);
            break;
        }
    }
}
