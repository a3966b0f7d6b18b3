use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use e131_core::receiver::transport::{bind_sender, send_datagram};
use e131_core::{
    Cid, DataOptions, DataPacket, DiscoveryOptions, DiscoveryPacket, DiscoveryReceiver,
    EventReceiver, Packet, Payload, ReceiverConfig, ReceiverEvent, SOURCE_TIMEOUT,
};
use tokio::time::{Instant, timeout};

const CID: Cid = Cid([0x42; 16]);

async fn start() -> (DiscoveryReceiver, EventReceiver, SocketAddr) {
    let (receiver, events) = DiscoveryReceiver::bind(ReceiverConfig {
        port: 0,
        ..ReceiverConfig::default()
    })
    .await
    .unwrap();
    let dest = SocketAddr::from((Ipv4Addr::LOCALHOST, receiver.local_addr().port()));
    (receiver, events, dest)
}

/// Next event that is not a multicast join failure; sandboxes often lack a
/// multicast route.
async fn next_event(events: &mut EventReceiver) -> ReceiverEvent {
    loop {
        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for receiver event")
            .expect("event channel closed");
        if !matches!(event, ReceiverEvent::TransportError(_)) {
            return event;
        }
    }
}

fn discovery(universes: &[u16]) -> Vec<u8> {
    DiscoveryPacket::new(DiscoveryOptions {
        universes: universes.iter().zip(1u32..).map(|(u, k)| (k, *u)).collect(),
        source_name: Some("loopback desk".to_string()),
        cid: Some(CID),
        ..DiscoveryOptions::default()
    })
    .unwrap()
    .to_bytes()
}

#[tokio::test]
async fn discovery_datagram_detects_source() {
    let (receiver, mut events, dest) = start().await;
    let sender = bind_sender(None).unwrap();
    send_datagram(&sender, &discovery(&[1, 100]), dest).await.unwrap();

    match next_event(&mut events).await {
        ReceiverEvent::SourceDetected(source) => {
            assert_eq!(source.cid, CID);
            assert_eq!(source.source_name, "loopback desk");
            assert_eq!(source.universes(), vec![1, 100]);
        }
        other => panic!("expected SourceDetected, got {other:?}"),
    }
    match next_event(&mut events).await {
        ReceiverEvent::Packet(Packet::Discovery(packet)) => {
            assert_eq!(packet.list(), Payload::from([(1, 1), (2, 100)]));
            assert!(packet.source_address().is_some());
        }
        other => panic!("expected discovery packet, got {other:?}"),
    }
    assert_eq!(receiver.sources().len(), 1);

    receiver.close().await;
    receiver.close().await;
}

#[tokio::test]
async fn data_and_garbage_are_reported_without_sources() {
    let (receiver, mut events, dest) = start().await;
    let sender = bind_sender(None).unwrap();

    let data = DataPacket::new(DataOptions {
        universe: 7,
        payload: Payload::from([(1, 100)]),
        ..DataOptions::default()
    });
    send_datagram(&sender, &data.to_bytes(), dest).await.unwrap();
    match next_event(&mut events).await {
        ReceiverEvent::Packet(Packet::Data(packet)) => {
            assert_eq!(packet.universe(), 7);
            assert_eq!(packet.slots()[0], 255);
        }
        other => panic!("expected data packet, got {other:?}"),
    }

    send_datagram(&sender, b"not sacn", dest).await.unwrap();
    assert!(matches!(
        next_event(&mut events).await,
        ReceiverEvent::PacketCorrupted { .. }
    ));
    assert!(receiver.sources().is_empty());

    receiver.close().await;
}

/// Like `next_event` but without a timer, so a paused clock only advances
/// to the receiver's own deadlines.
async fn next_event_paused(events: &mut EventReceiver) -> ReceiverEvent {
    loop {
        let event = events.recv().await.expect("event channel closed");
        if !matches!(event, ReceiverEvent::TransportError(_)) {
            return event;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn silent_source_is_evicted_by_receiver_task() {
    let (receiver, mut events, dest) = start().await;
    let sender = bind_sender(None).unwrap();
    send_datagram(&sender, &discovery(&[3]), dest).await.unwrap();

    assert!(matches!(
        next_event_paused(&mut events).await,
        ReceiverEvent::SourceDetected(_)
    ));
    assert!(matches!(
        next_event_paused(&mut events).await,
        ReceiverEvent::Packet(_)
    ));
    let heard = Instant::now();
    assert_eq!(receiver.sources().len(), 1);

    match next_event_paused(&mut events).await {
        ReceiverEvent::SourceTimeout(source) => {
            assert_eq!(source.cid, CID);
            assert_eq!(source.universes(), vec![3]);
        }
        other => panic!("expected SourceTimeout, got {other:?}"),
    }
    assert!(heard.elapsed() >= SOURCE_TIMEOUT - Duration::from_millis(1));
    assert!(receiver.sources().is_empty());

    receiver.close().await;
}
