use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

/// Local networking failures, kept apart from malformed peer data.
#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("failed to configure UDP socket: {0}")]
    Socket(#[source] io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to join multicast group {group} on {interface}: {source}")]
    JoinMulticast {
        group: Ipv4Addr,
        interface: Ipv4Addr,
        #[source]
        source: io::Error,
    },
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),
    #[error("send to {dest} failed: {source}")]
    Send {
        dest: SocketAddr,
        #[source]
        source: io::Error,
    },
}
