use std::net::{Ipv4Addr, SocketAddr, UdpSocket as StdUdpSocket};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use super::error::ReceiverError;
use crate::config::ReceiverConfig;

/// Multicast group carrying `universe`: `239.255.<hi>.<lo>`.
pub fn multicast_group(universe: u16) -> Ipv4Addr {
    let [hi, lo] = universe.to_be_bytes();
    Ipv4Addr::new(239, 255, hi, lo)
}

fn udp_socket() -> Result<Socket, ReceiverError> {
    Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).map_err(ReceiverError::Socket)
}

fn into_tokio(socket: Socket) -> Result<UdpSocket, ReceiverError> {
    socket.set_nonblocking(true).map_err(ReceiverError::Socket)?;
    let socket: StdUdpSocket = socket.into();
    UdpSocket::from_std(socket).map_err(ReceiverError::Socket)
}

/// Listening socket on `0.0.0.0:<port>`. Must run inside a tokio runtime.
pub fn bind_socket(config: &ReceiverConfig) -> Result<UdpSocket, ReceiverError> {
    let socket = udp_socket()?;
    // Must precede bind to take effect.
    if config.reuse_addr {
        socket
            .set_reuse_address(true)
            .map_err(ReceiverError::Socket)?;
    }
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    socket
        .bind(&addr.into())
        .map_err(|source| ReceiverError::Bind { addr, source })?;
    into_tokio(socket)
}

/// Ephemeral sending socket, routed through `interface` when given.
pub fn bind_sender(interface: Option<Ipv4Addr>) -> Result<UdpSocket, ReceiverError> {
    let socket = udp_socket()?;
    if let Some(interface) = interface {
        socket
            .set_multicast_if_v4(&interface)
            .map_err(ReceiverError::Socket)?;
    }
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
    socket
        .bind(&addr.into())
        .map_err(|source| ReceiverError::Bind { addr, source })?;
    into_tokio(socket)
}

/// Join the multicast group for `universe`. Returns the joined group.
pub fn join_universe(
    socket: &UdpSocket,
    universe: u16,
    interface: Option<Ipv4Addr>,
) -> Result<Ipv4Addr, ReceiverError> {
    let group = multicast_group(universe);
    let interface = interface.unwrap_or(Ipv4Addr::UNSPECIFIED);
    socket
        .join_multicast_v4(group, interface)
        .map_err(|source| ReceiverError::JoinMulticast {
            group,
            interface,
            source,
        })?;
    Ok(group)
}

pub async fn send_datagram(
    socket: &UdpSocket,
    datagram: &[u8],
    dest: SocketAddr,
) -> Result<(), ReceiverError> {
    socket
        .send_to(datagram, dest)
        .await
        .map(|_| ())
        .map_err(|source| ReceiverError::Send { dest, source })
}
