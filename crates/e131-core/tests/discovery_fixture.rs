use std::net::{IpAddr, Ipv4Addr};

use e131_core::{
    Cid, DiscoveryOptions, DiscoveryPacket, Packet, PacketValidationError, Payload,
    UniverseList, parse_packet,
};

const EOS_CID: [u8; 16] = [
    0x6c, 0x80, 0x9c, 0x90, 0x6e, 0x77, 0x40, 0x19, 0xa9, 0x37, 0xda, 0xc2, 0xe8, 0x56, 0x42,
    0x52,
];

/// Discovery datagram as sent by an "Eos Family Console": one page listing
/// universes 1 and 100.
fn eos_discovery(list: &[u8]) -> Vec<u8> {
    let disc_len = 8 + list.len() as u16;
    let frame_len = 74 + disc_len;
    let root_len = 22 + frame_len;

    let mut bytes = Vec::new();
    bytes.extend([0x00, 0x10, 0x00, 0x00]);
    bytes.extend(b"ASC-E1.17\0\0\0");
    bytes.extend((0x7000 | root_len).to_be_bytes());
    bytes.extend([0x00, 0x00, 0x00, 0x08]);
    bytes.extend(EOS_CID);
    bytes.extend((0x7000 | frame_len).to_be_bytes());
    bytes.extend([0x00, 0x00, 0x00, 0x02]);
    let mut name = [0u8; 64];
    name[..18].copy_from_slice(b"Eos Family Console");
    bytes.extend(name);
    bytes.extend([0x00; 4]);
    bytes.extend((0x7000 | disc_len).to_be_bytes());
    bytes.extend([0x00, 0x00, 0x00, 0x01]);
    bytes.extend([0x00, 0x00]);
    bytes.extend(list);
    bytes
}

fn eos_options(universes: Payload) -> DiscoveryOptions {
    DiscoveryOptions {
        universes,
        page: 0,
        last_page: 0,
        source_name: Some("Eos Family Console".to_string()),
        cid: Some(Cid(EOS_CID)),
    }
}

#[test]
fn fixture_has_expected_shape() {
    let bytes = eos_discovery(&[0, 1, 0, 100]);
    assert_eq!(bytes.len(), 124);
    assert_eq!(&bytes[16..18], &[0x70, 0x6c]);
    assert_eq!(&bytes[38..40], &[0x70, 0x56]);
    assert_eq!(&bytes[112..114], &[0x70, 0x0c]);
}

#[test]
fn parses_eos_fixture() {
    let address = IpAddr::V4(Ipv4Addr::new(169, 254, 7, 72));
    let packet = DiscoveryPacket::parse(&eos_discovery(&[0, 1, 0, 100]), Some(address)).unwrap();

    assert_eq!(packet.page(), 0);
    assert_eq!(packet.last_page(), 0);
    assert_eq!(packet.source_name(), "Eos Family Console");
    assert_eq!(packet.source_address(), Some(address));
    assert_eq!(packet.cid(), Cid(EOS_CID));
    assert_eq!(packet.list(), Payload::from([(1, 1), (2, 100)]));
    assert_eq!(packet.list_bytes(), Some(&[0u8, 1, 0, 100][..]));
}

#[test]
fn received_fixture_serializes_to_same_bytes() {
    let bytes = eos_discovery(&[0, 1, 0, 100]);
    let packet = DiscoveryPacket::parse(&bytes, None).unwrap();
    assert_eq!(packet.to_bytes(), bytes);
}

#[test]
fn latin1_source_name_survives_round_trip() {
    let mut bytes = eos_discovery(&[0, 1, 0, 100]);
    // "Eos Family Console" with the 'o' replaced by Latin-1 'ó'.
    bytes[45] = 0xf3;
    let packet = DiscoveryPacket::parse(&bytes, None).unwrap();
    assert_eq!(packet.source_name(), "E\u{fffd}s Family Console");
    assert_eq!(packet.to_bytes(), bytes);
}

#[test]
fn constructed_packet_matches_fixture() {
    let packet = DiscoveryPacket::new(eos_options(Payload::from([(1, 1), (2, 100)]))).unwrap();
    assert_eq!(packet.to_bytes(), eos_discovery(&[0, 1, 0, 100]));
    // Only received packets carry raw list bytes.
    assert_eq!(packet.list_bytes(), None);
    assert!(matches!(packet.universe_list(), UniverseList::Entries(_)));
}

#[test]
fn empty_list_fixture() {
    let bytes = eos_discovery(&[]);
    assert_eq!(bytes.len(), 120);
    assert_eq!(&bytes[16..18], &[0x70, 0x68]);
    assert_eq!(&bytes[38..40], &[0x70, 0x52]);
    assert_eq!(&bytes[112..114], &[0x70, 0x08]);

    let parsed = DiscoveryPacket::parse(&bytes, None).unwrap();
    assert!(parsed.list().is_empty());
    assert_eq!(parsed.list_bytes(), Some(&[][..]));

    let built = DiscoveryPacket::new(eos_options(Payload::new())).unwrap();
    assert_eq!(built.to_bytes(), bytes);
}

#[test]
fn construct_then_parse_recovers_options() {
    let universes = Payload::from([(1, 5), (2, 6), (3, 64214)]);
    let built = DiscoveryPacket::new(DiscoveryOptions {
        page: 2,
        last_page: 3,
        ..eos_options(universes.clone())
    })
    .unwrap();

    let parsed = match parse_packet(&built.to_bytes(), None).unwrap() {
        Packet::Discovery(packet) => packet,
        other => panic!("expected discovery packet, got {other:?}"),
    };
    assert_eq!(parsed.page(), 2);
    assert_eq!(parsed.last_page(), 3);
    assert_eq!(parsed.source_name(), "Eos Family Console");
    assert_eq!(parsed.cid(), Cid(EOS_CID));
    // Received lists are keyed by absolute position across pages.
    assert_eq!(parsed.universes(), vec![5, 6, 64214]);
    assert_eq!(parsed.list().keys().next(), Some(&(2 * 512 + 1)));
}

#[test]
fn flipped_root_vector_is_rejected() {
    let mut bytes = eos_discovery(&[0, 1, 0, 100]);
    bytes[21] = 0x09;
    assert_eq!(
        parse_packet(&bytes, None),
        Err(PacketValidationError::InvalidRootVector { value: 9 })
    );
}
