use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use super::protocol::{MAX_PACKET_SIZE, Packet, PacketHeader, PacketType};
use super::tracking::{AckTracker, ReceiveTracker};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_PENDING_ACKS: usize = 256;
/// Anything shorter cannot hold a header.
const MIN_PACKET_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Joining,
    Connected,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_dropped: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub rtt_ms: f32,
    pub rtt_variance: f32,
    pub packet_loss_percent: f32,
}

/// Non-blocking UDP socket speaking the sequenced packet format.
pub struct NetworkEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    remote_addr: Option<SocketAddr>,
    state: ConnectionState,
    send_sequence: u32,
    ack_tracker: AckTracker,
    receive_tracker: ReceiveTracker,
    stats: NetworkStats,
    recv_buffer: Vec<u8>,
    timeout: Duration,
    last_receive_time: Instant,
}

impl NetworkEndpoint {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;

        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            remote_addr: None,
            state: ConnectionState::Disconnected,
            send_sequence: 0,
            ack_tracker: AckTracker::new(MAX_PENDING_ACKS),
            receive_tracker: ReceiveTracker::new(),
            stats: NetworkStats::default(),
            recv_buffer: vec![0u8; MAX_PACKET_SIZE],
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            last_receive_time: Instant::now(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    pub fn set_remote(&mut self, addr: SocketAddr) {
        self.remote_addr = Some(addr);
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    pub fn send_to(&mut self, packet: &Packet, addr: SocketAddr) -> io::Result<usize> {
        let data = packet.serialize().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )
        })?;

        let bytes = self.socket.send_to(&data, addr)?;

        self.ack_tracker
            .track_packet(packet.header.sequence, Instant::now());

        self.stats.packets_sent += 1;
        self.stats.bytes_sent += bytes as u64;

        Ok(bytes)
    }

    pub fn send(&mut self, packet: &Packet) -> io::Result<usize> {
        let addr = self
            .remote_addr
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "No remote address set"))?;
        self.send_to(packet, addr)
    }

    /// Wraps `payload` with the next sequence number and current ack data, then sends it.
    pub fn send_payload(&mut self, payload: PacketType) -> io::Result<usize> {
        let packet = self.create_packet(payload);
        self.send(&packet)
    }

    pub fn create_packet(&mut self, payload: PacketType) -> Packet {
        let sequence = self.send_sequence;
        self.send_sequence = self.send_sequence.wrapping_add(1);

        let (ack, ack_bitfield) = self.receive_tracker.ack_data();
        let header = PacketHeader::new(sequence, ack, ack_bitfield);

        Packet::new(header, payload)
    }

    /// Drains the socket. Malformed, foreign and duplicate datagrams are dropped,
    /// as is anything from a peer other than the remote once one is set.
    pub fn receive(&mut self) -> io::Result<Vec<(Packet, SocketAddr)>> {
        let mut packets = Vec::new();

        loop {
            match self.socket.recv_from(&mut self.recv_buffer) {
                Ok((size, addr)) => {
                    if self.remote_addr.is_some_and(|remote| remote != addr) {
                        log::debug!("Dropping packet from unknown peer {}", addr);
                        self.stats.packets_dropped += 1;
                        continue;
                    }

                    if size < MIN_PACKET_SIZE {
                        self.stats.packets_dropped += 1;
                        continue;
                    }

                    let packet = match Packet::deserialize(&self.recv_buffer[..size]) {
                        Ok(packet) if packet.header.is_valid() => packet,
                        Ok(_) => {
                            log::debug!("Dropping packet with foreign header from {}", addr);
                            self.stats.packets_dropped += 1;
                            continue;
                        }
                        Err(e) => {
                            log::debug!("Dropping malformed packet from {}: {}", addr, e);
                            self.stats.packets_dropped += 1;
                            continue;
                        }
                    };

                    if !self.receive_tracker.record_received(packet.header.sequence) {
                        continue;
                    }

                    let now = Instant::now();
                    self.ack_tracker
                        .process_ack(packet.header.ack, packet.header.ack_bitfield, now);

                    self.stats.packets_received += 1;
                    self.stats.bytes_received += size as u64;
                    self.stats.rtt_ms = self.ack_tracker.srtt();
                    self.stats.rtt_variance = self.ack_tracker.rtt_var();
                    self.stats.packet_loss_percent = self.ack_tracker.loss_percent();

                    self.last_receive_time = now;
                    packets.push((packet, addr));
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        Ok(packets)
    }

    pub fn is_timed_out(&self) -> bool {
        self.last_receive_time.elapsed() > self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.send_sequence = 0;
        self.ack_tracker = AckTracker::new(MAX_PENDING_ACKS);
        self.receive_tracker = ReceiveTracker::new();
        self.stats = NetworkStats::default();
        self.last_receive_time = Instant::now();
    }
}
