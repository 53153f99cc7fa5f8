//! TCP side of the collector: acceptor, per-connection handler and the
//! new-data watcher.
//!
//! Every accepted connection gets its own task and its own [`StreamFramer`].
//! The store, roster and counters are shared through `Arc`. Their locks are
//! synchronous and are never held across an `.await`.

use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CollectorError;
use crate::framer::{StreamFramer, DEFAULT_ACCUMULATOR_BYTES, DEFAULT_READ_CHUNK_BYTES};
use crate::ingest_stats::IngestStats;
use crate::log_store::{LogStore, DEFAULT_MAX_LOGS};
use crate::record::current_timestamp;
use crate::roster::{ClientRoster, DEFAULT_MAX_CLIENTS};

pub const DEFAULT_COLLECTOR_PORT: u16 = 8080;
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Sizing of the collector's buffers and bounded components.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub max_logs: usize,
    pub max_clients: usize,
    pub read_chunk_bytes: usize,
    pub accumulator_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            max_logs: DEFAULT_MAX_LOGS,
            max_clients: DEFAULT_MAX_CLIENTS,
            read_chunk_bytes: DEFAULT_READ_CHUNK_BYTES,
            accumulator_bytes: DEFAULT_ACCUMULATOR_BYTES,
        }
    }
}

/// Shared state of a running collector. Cloning is cheap.
#[derive(Clone)]
pub struct Collector {
    pub store: Arc<LogStore>,
    pub roster: Arc<ClientRoster>,
    pub stats: Arc<IngestStats>,
    options: ServerOptions,
}

/// Binds the collector's TCP listener.
pub async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, CollectorError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| CollectorError::Bind { addr, source })
}

/// Line sent to every client right after it connects.
pub fn welcome_message(server_port: u16) -> String {
    let mut line = json!({
        "connection_status": "connected",
        "message": "Connected to log collector",
        "server_port": server_port,
        "timestamp": current_timestamp(),
    })
    .to_string();
    line.push('\n');
    line
}

impl Collector {
    pub fn new(options: ServerOptions) -> Self {
        Self {
            store: Arc::new(LogStore::new(options.max_logs)),
            roster: Arc::new(ClientRoster::new(options.max_clients)),
            stats: Arc::new(IngestStats::new()),
            options,
        }
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Accepts connections until `cancel` fires, spawning one handler task
    /// per connection.
    ///
    /// Accept errors are logged and the loop keeps going. Handlers already
    /// running are left to finish on their own.
    pub async fn run_acceptor(
        &self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), CollectorError> {
        let server_port = listener.local_addr()?.port();
        info!(
            "Collector accepting connections on port {} (max {} listed clients)",
            server_port, self.options.max_clients
        );

        loop {
            let accepted = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Collector acceptor stopping");
                    break;
                }
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    self.stats.record_connection();
                    let collector = self.clone();
                    tokio::spawn(async move {
                        collector
                            .handle_connection(stream, peer.to_string(), server_port)
                            .await;
                    });
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                }
            }
        }
        Ok(())
    }

    /// Serves one client until it disconnects or a read fails.
    ///
    /// The client is listed in the roster while connected, unless the roster
    /// is full; it is served either way.
    pub async fn handle_connection<S>(
        &self,
        mut stream: S,
        client_address: String,
        server_port: u16,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let listed = self.roster.add(&client_address);
        if listed {
            info!(client = %client_address, "Client connected");
        } else {
            warn!(
                client = %client_address,
                capacity = self.roster.capacity(),
                "Client roster full, serving connection without listing it"
            );
        }

        if let Err(e) = stream.write_all(welcome_message(server_port).as_bytes()).await {
            warn!(client = %client_address, "Failed to send welcome message: {}", e);
        }

        let mut framer = StreamFramer::new(self.options.accumulator_bytes);
        let mut chunk = vec![0u8; self.options.read_chunk_bytes.max(1)];

        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => {
                    info!(client = %client_address, "Client disconnected");
                    break;
                }
                Ok(n) => {
                    let stored =
                        framer.ingest(&chunk[..n], &client_address, &self.store, &self.stats);
                    if stored > 0 {
                        debug!(client = %client_address, stored, "Records stored");
                    }
                }
                Err(e) => {
                    warn!(client = %client_address, "Read failed, closing connection: {}", e);
                    break;
                }
            }
        }

        if listed {
            self.roster.remove(&client_address);
        }
    }
}

/// Polls the store every `interval` and calls `on_change` with the number
/// of records appended since the previous poll, whenever it is non-zero.
///
/// Uses the monotonic append counter, so a full store still signals new data.
pub async fn watch_for_new_records<F>(
    store: &LogStore,
    interval: Duration,
    cancel: CancellationToken,
    mut on_change: F,
) where
    F: FnMut(u64),
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = store.total_appended();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let total = store.total_appended();
                if total != last_seen {
                    on_change(total - last_seen);
                    last_seen = total;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_message_shape() {
        let line = welcome_message(8080);
        assert!(line.ends_with('\n'));
        assert!(line.starts_with(
            r#"{"connection_status":"connected","message":"Connected to log collector","server_port":8080,"timestamp":""#
        ));
    }

    #[tokio::test]
    async fn test_handle_connection_over_duplex() {
        let collector = Collector::new(ServerOptions {
            max_logs: 10,
            ..ServerOptions::default()
        });
        let (mut client, server) = tokio::io::duplex(1024);

        let handler = {
            let collector = collector.clone();
            tokio::spawn(async move {
                collector
                    .handle_connection(server, "10.1.1.1:7000".to_string(), 8080)
                    .await;
            })
        };

        client.write_all(br#"{"pid":1,"na"#).await.unwrap();
        client.write_all(br#"me":"split"}{"type":"PONG"}"#).await.unwrap();
        drop(client);
        handler.await.unwrap();

        let records = collector.store.snapshot(|_| true);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "split");
        assert_eq!(records[0].client_address, "10.1.1.1:7000");
        assert!(collector.roster.is_empty());
        assert_eq!(collector.stats.snapshot().control_messages, 1);
    }

    #[tokio::test]
    async fn test_connection_served_when_roster_full() {
        let collector = Collector::new(ServerOptions {
            max_clients: 1,
            ..ServerOptions::default()
        });
        collector.roster.add("already:1");

        let (mut client, server) = tokio::io::duplex(1024);
        let handler = {
            let collector = collector.clone();
            tokio::spawn(async move {
                collector
                    .handle_connection(server, "late:2".to_string(), 8080)
                    .await;
            })
        };
        client.write_all(br#"{"pid":2}"#).await.unwrap();
        drop(client);
        handler.await.unwrap();

        assert_eq!(collector.store.len(), 1);
        assert_eq!(collector.roster.list(), vec!["already:1"]);
    }

    #[tokio::test]
    async fn test_watcher_reports_new_records_and_stops() {
        let store = Arc::new(LogStore::new(2));
        let cancel = CancellationToken::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let watcher = {
            let store = Arc::clone(&store);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                watch_for_new_records(&store, Duration::from_millis(10), cancel, |n| {
                    let _ = tx.send(n);
                })
                .await;
            })
        };

        // Let the watcher take its baseline first
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Store is already full after two; the third must still be reported
        for pid in 1..=3 {
            let json = format!(r#"{{"pid":{pid}}}"#);
            store.append(crate::record::parse_record(&json, "a:1").unwrap());
        }

        let mut seen = 0;
        while seen < 3 {
            seen += tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("watcher signal")
                .expect("channel open");
        }
        assert_eq!(seen, 3);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), watcher)
            .await
            .expect("watcher stops")
            .unwrap();
    }
}
