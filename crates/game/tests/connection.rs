use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::thread;
use std::time::Duration;

use cellwars::input::{ActionSignal, InputIntent};
use cellwars::net::{DEFAULT_NAME, PacketHeader};
use cellwars::{
    ConnectionState, EventKind, GameEvent, NetworkEndpoint, Packet, PacketType, PlayerState,
    Snapshot,
};
use glam::Vec2;

static PORT_COUNTER: AtomicU16 = AtomicU16::new(41000);

fn next_port() -> u16 {
    PORT_COUNTER.fetch_add(10, Ordering::SeqCst)
}

fn wait_for_packet(
    endpoint: &mut NetworkEndpoint,
    timeout_ms: u64,
) -> Option<Vec<(Packet, SocketAddr)>> {
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        let received = endpoint.receive().unwrap();
        if !received.is_empty() {
            return Some(received);
        }
        thread::sleep(Duration::from_millis(1));
    }
    None
}

fn pair() -> (NetworkEndpoint, NetworkEndpoint, SocketAddr) {
    let port = next_port();
    let server_addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
    let client_addr: SocketAddr = format!("127.0.0.1:{}", port + 1).parse().unwrap();

    let server = NetworkEndpoint::bind(server_addr).unwrap();
    let mut client = NetworkEndpoint::bind(client_addr).unwrap();
    client.set_remote(server_addr);
    (server, client, client_addr)
}

#[test]
fn test_join_and_welcome() {
    let (mut server, mut client, client_addr) = pair();

    client.set_state(ConnectionState::Joining);
    client.send_payload(PacketType::join("  ")).unwrap();

    let received = wait_for_packet(&mut server, 200).expect("No packet received");
    assert_eq!(received.len(), 1);

    let (packet, from_addr) = &received[0];
    assert_eq!(*from_addr, client_addr);
    match &packet.payload {
        PacketType::Join { name } => {
            assert_eq!(name, DEFAULT_NAME);
            let welcome = server.create_packet(PacketType::Welcome { player_id: 7 });
            server.send_to(&welcome, *from_addr).unwrap();
        }
        _ => panic!("Expected Join"),
    }

    let received = wait_for_packet(&mut client, 200).expect("No packet received");
    match &received[0].0.payload {
        PacketType::Welcome { player_id } => {
            assert_eq!(*player_id, 7);
            client.set_state(ConnectionState::Connected);
        }
        _ => panic!("Expected Welcome"),
    }

    assert_eq!(client.state(), ConnectionState::Connected);
    assert_eq!(client.stats().packets_sent, 1);
    assert_eq!(client.stats().packets_received, 1);
}

#[test]
fn test_snapshot_delivery() {
    let (mut server, mut client, client_addr) = pair();

    let mut snapshot =
        Snapshot::new(12).with_player(PlayerState::new(3, "Ana", Vec2::new(40.0, 80.0)));
    snapshot
        .events
        .push(GameEvent::at(EventKind::EnemyHit, Vec2::new(1.0, 2.0)));

    let packet = server.create_packet(PacketType::Snapshot(snapshot.clone()));
    server.send_to(&packet, client_addr).unwrap();

    let received = wait_for_packet(&mut client, 200).expect("No packet received");
    match &received[0].0.payload {
        PacketType::Snapshot(s) => assert_eq!(*s, snapshot),
        _ => panic!("Expected Snapshot"),
    }
}

#[test]
fn test_intent_and_action_stream() {
    let (mut server, mut client, _) = pair();

    let intent = InputIntent {
        dx: 1.0,
        dy: -0.5,
        aim: 0.25,
        fire: true,
        skill: false,
        build: false,
    };
    client.send_payload(PacketType::Intent(intent)).unwrap();
    client
        .send_payload(PacketType::Action(ActionSignal::Fire { aim: 0.25 }))
        .unwrap();
    client.send_payload(PacketType::Leave).unwrap();

    let mut payloads = Vec::new();
    let start = std::time::Instant::now();
    while payloads.len() < 3 && start.elapsed() < Duration::from_millis(500) {
        if let Some(received) = wait_for_packet(&mut server, 50) {
            payloads.extend(received.into_iter().map(|(p, _)| p));
        }
    }
    assert_eq!(payloads.len(), 3);

    let sequences: Vec<u32> = payloads.iter().map(|p| p.header.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);

    match &payloads[0].payload {
        PacketType::Intent(i) => assert_eq!(*i, intent),
        _ => panic!("Expected Intent"),
    }
    match &payloads[1].payload {
        PacketType::Action(ActionSignal::Fire { aim }) => assert_eq!(*aim, 0.25),
        _ => panic!("Expected Fire action"),
    }
    assert!(matches!(payloads[2].payload, PacketType::Leave));
}

#[test]
fn test_duplicates_and_garbage_are_dropped() {
    let (mut server, mut client, _) = pair();
    let server_addr = client.remote_addr().unwrap();

    let packet = client.create_packet(PacketType::Leave);
    client.send(&packet).unwrap();
    client.send(&packet).unwrap();

    let raw = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    raw.send_to(&[0xFF; 32], server_addr).unwrap();
    raw.send_to(&[1, 2, 3], server_addr).unwrap();

    thread::sleep(Duration::from_millis(50));
    let received = server.receive().unwrap();

    assert_eq!(received.len(), 1);
    assert_eq!(server.stats().packets_dropped, 2);
}

#[test]
fn test_acks_flow_back() {
    let (mut server, mut client, client_addr) = pair();

    client.send_payload(PacketType::join("Bo")).unwrap();
    wait_for_packet(&mut server, 200).expect("No packet received");

    let reply = server.create_packet(PacketType::Welcome { player_id: 1 });
    assert_eq!(reply.header.ack, 0);
    server.send_to(&reply, client_addr).unwrap();

    wait_for_packet(&mut client, 200).expect("No packet received");
    assert_eq!(client.stats().packet_loss_percent, 0.0);
}

#[test]
fn test_foreign_header_is_rejected() {
    let (mut server, mut client, _) = pair();

    let mut header = PacketHeader::new(0, 0, 0);
    header.magic = 0xDEAD_BEEF;
    client
        .send(&Packet::new(header, PacketType::Leave))
        .unwrap();

    thread::sleep(Duration::from_millis(50));
    assert!(server.receive().unwrap().is_empty());
    assert_eq!(server.stats().packets_dropped, 1);
}

#[test]
fn test_stray_peer_does_not_shadow_server_sequences() {
    let (mut server, mut client, client_addr) = pair();

    let stray_addr: SocketAddr = format!("127.0.0.1:{}", next_port()).parse().unwrap();
    let mut stray = NetworkEndpoint::bind(stray_addr).unwrap();
    let noise = stray.create_packet(PacketType::Welcome { player_id: 99 });
    assert_eq!(noise.header.sequence, 0);
    stray.send_to(&noise, client_addr).unwrap();

    thread::sleep(Duration::from_millis(50));
    assert!(client.receive().unwrap().is_empty());
    assert_eq!(client.stats().packets_dropped, 1);

    let welcome = server.create_packet(PacketType::Welcome { player_id: 7 });
    assert_eq!(welcome.header.sequence, 0);
    server.send_to(&welcome, client_addr).unwrap();

    let received = wait_for_packet(&mut client, 200).expect("Welcome was not delivered");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].1, server.local_addr());
    assert!(matches!(
        received[0].0.payload,
        PacketType::Welcome { player_id: 7 }
    ));
    assert_eq!(client.stats().packets_received, 1);
}
