//! Universe discovery receiver.
//!
//! [`DiscoveryReceiver::bind`] opens a UDP socket, joins the discovery
//! multicast group and spawns one tokio task that owns the socket. The task
//! waits on three things at once: a shutdown signal, the earliest source
//! deadline and the next datagram. Everything it observes is pushed to an
//! unbounded channel as [`ReceiverEvent`]s, in order.
//!
//! Source state lives in a [`SourceTable`] behind a mutex so callers can
//! take a snapshot while the task runs.

mod error;
mod event;
mod source;
mod table;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

pub use error::ReceiverError;
pub use event::ReceiverEvent;
pub use source::{Source, SourceKey};
pub use table::{SOURCE_TIMEOUT, SourceTable};

use crate::config::ReceiverConfig;
use crate::protocols::discovery::layout::DISCOVERY_UNIVERSE;

/// Largest IPv4 UDP payload.
const MAX_DATAGRAM_LEN: usize = 65_507;

pub type EventReceiver = mpsc::UnboundedReceiver<ReceiverEvent>;

#[derive(Debug)]
pub struct DiscoveryReceiver {
    local_addr: SocketAddr,
    table: Arc<Mutex<SourceTable>>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscoveryReceiver {
    /// Bind, join the discovery group and start receiving.
    ///
    /// A failed bind is returned. A failed multicast join is reported as the
    /// first [`ReceiverEvent::TransportError`] and the receiver keeps running,
    /// since unicast and loopback traffic still arrive.
    pub async fn bind(config: ReceiverConfig) -> Result<(Self, EventReceiver), ReceiverError> {
        let socket = transport::bind_socket(&config)?;
        let local_addr = socket.local_addr().map_err(ReceiverError::Socket)?;
        info!(%local_addr, reuse_addr = config.reuse_addr, "discovery receiver bound");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        match transport::join_universe(&socket, DISCOVERY_UNIVERSE, config.interface) {
            Ok(group) => info!(%group, "joined universe discovery group"),
            Err(err) => {
                warn!(error = %err, "multicast join failed");
                let _ = events_tx.send(ReceiverEvent::TransportError(err));
            }
        }

        let table = Arc::new(Mutex::new(SourceTable::default()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(socket, Arc::clone(&table), events_tx, shutdown_rx));

        let receiver = Self {
            local_addr,
            table,
            shutdown: Mutex::new(Some(shutdown_tx)),
            task: Mutex::new(Some(task)),
        };
        Ok((receiver, events_rx))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Currently live sources, ordered by CID then address.
    pub fn sources(&self) -> Vec<Source> {
        self.table.lock().snapshot()
    }

    /// Stop the task and release the socket. Safe to call more than once.
    pub async fn close(&self) {
        let shutdown = self.shutdown.lock().take();
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                warn!(error = %err, "receiver task ended abnormally");
            }
            info!(local_addr = %self.local_addr, "discovery receiver closed");
        }
    }
}

impl Drop for DiscoveryReceiver {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run(
    socket: UdpSocket,
    table: Arc<Mutex<SourceTable>>,
    events: mpsc::UnboundedSender<ReceiverEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
    loop {
        let deadline = table.lock().next_deadline();
        let emitted = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = wait_for(deadline) => table.lock().expire(Instant::now()),
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, from)) => {
                    debug!(len, %from, "datagram received");
                    table
                        .lock()
                        .ingest(&buf[..len], from, Instant::now(), SystemTime::now())
                }
                Err(err) => {
                    warn!(error = %err, "receive failed");
                    vec![ReceiverEvent::TransportError(ReceiverError::Receive(err))]
                }
            },
        };
        for event in emitted {
            // The table keeps updating even when nobody listens.
            let _ = events.send(event);
        }
    }
    debug!("receiver task stopped");
}
