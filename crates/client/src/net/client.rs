use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use cellwars::input::{ActionSignal, InputIntent};
use cellwars::net::player_name;
use cellwars::session::Outbound;
use cellwars::{ConnectionState, GameEvent, NetworkEndpoint, NetworkStats, PacketType, Snapshot};

use super::config::ClientConfig;

/// Server traffic the game loop needs to see, in arrival order.
#[derive(Debug)]
pub enum Inbound {
    Initialize { player_id: u32 },
    Snapshot { snapshot: Snapshot, arrival: Instant },
    Event(GameEvent),
    Denied(String),
    Lost,
}

pub struct NetworkClient {
    endpoint: NetworkEndpoint,
    config: ClientConfig,
    name: String,
    player_id: Option<u32>,
    join_started: Option<Instant>,
    last_join_sent: Option<Instant>,
    inbound: VecDeque<Inbound>,
}

impl NetworkClient {
    pub fn new(config: ClientConfig) -> io::Result<Self> {
        let mut endpoint = NetworkEndpoint::bind("0.0.0.0:0")?;
        endpoint.set_timeout(Duration::from_secs(config.connection_timeout_secs));

        Ok(Self {
            endpoint,
            config,
            name: String::new(),
            player_id: None,
            join_started: None,
            last_join_sent: None,
            inbound: VecDeque::new(),
        })
    }

    pub fn connect(&mut self, server_addr: SocketAddr, name: &str) -> io::Result<()> {
        self.name = player_name(name);
        log::info!("Joining {} as {}", server_addr, self.name);

        self.endpoint.set_remote(server_addr);
        self.endpoint.set_state(ConnectionState::Joining);

        let now = Instant::now();
        self.join_started = Some(now);
        self.send_join(now)
    }

    pub fn disconnect(&mut self) -> io::Result<()> {
        if self.endpoint.state() != ConnectionState::Disconnected {
            if let Err(e) = self.endpoint.send_payload(PacketType::Leave) {
                log::debug!("Leave send failed: {}", e);
            }
        }
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.endpoint.reset();
        self.player_id = None;
        self.join_started = None;
        self.last_join_sent = None;
    }

    fn send_join(&mut self, now: Instant) -> io::Result<()> {
        self.last_join_sent = Some(now);
        self.endpoint
            .send_payload(PacketType::Join {
                name: self.name.clone(),
            })
            .map(|_| ())
    }

    /// Drains the socket and runs join and liveness timers.
    pub fn update(&mut self) -> io::Result<()> {
        self.process_network()?;

        let now = Instant::now();
        match self.endpoint.state() {
            ConnectionState::Joining => {
                let timeout = Duration::from_secs(self.config.join_timeout_secs);
                if self
                    .join_started
                    .is_some_and(|start| now.duration_since(start) > timeout)
                {
                    log::warn!("Join timed out");
                    self.reset();
                    self.inbound.push_back(Inbound::Lost);
                    return Ok(());
                }

                let retry = Duration::from_millis(self.config.join_retry_ms);
                if self
                    .last_join_sent
                    .is_none_or(|sent| now.duration_since(sent) >= retry)
                {
                    log::debug!("Resending join");
                    self.send_join(now)?;
                }
            }
            ConnectionState::Connected => {
                if self.endpoint.is_timed_out() {
                    log::warn!("Server connection lost");
                    self.reset();
                    self.inbound.push_back(Inbound::Lost);
                }
            }
            ConnectionState::Disconnected => {}
        }

        Ok(())
    }

    fn process_network(&mut self) -> io::Result<()> {
        let packets = self.endpoint.receive()?;

        for (packet, _) in packets {
            self.handle_payload(packet.payload);
        }

        Ok(())
    }

    fn handle_payload(&mut self, payload: PacketType) {
        match payload {
            PacketType::Welcome { player_id } => {
                if self.player_id.is_none() {
                    log::info!("Joined as player {}", player_id);
                    self.player_id = Some(player_id);
                    self.endpoint.set_state(ConnectionState::Connected);
                }
                self.inbound.push_back(Inbound::Initialize { player_id });
            }
            PacketType::Denied { reason } => {
                log::warn!("Join denied: {}", reason);
                self.reset();
                self.inbound.push_back(Inbound::Denied(reason));
            }
            PacketType::Snapshot(snapshot) => {
                self.inbound.push_back(Inbound::Snapshot {
                    snapshot,
                    arrival: Instant::now(),
                });
            }
            PacketType::Event(event) => {
                self.inbound.push_back(Inbound::Event(event));
            }
            other => {
                log::debug!("Unexpected payload from server: {:?}", other);
            }
        }
    }

    pub fn drain_inbound(&mut self) -> impl Iterator<Item = Inbound> + '_ {
        self.inbound.drain(..)
    }

    pub fn state(&self) -> ConnectionState {
        self.endpoint.state()
    }

    pub fn is_connected(&self) -> bool {
        self.endpoint.state() == ConnectionState::Connected
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &NetworkStats {
        self.endpoint.stats()
    }
}

impl Outbound for NetworkClient {
    fn send_intent(&mut self, intent: &InputIntent) {
        if !self.is_connected() {
            return;
        }
        if let Err(e) = self.endpoint.send_payload(PacketType::Intent(*intent)) {
            log::debug!("Intent send failed: {}", e);
        }
    }

    fn send_action(&mut self, action: ActionSignal) {
        if !self.is_connected() {
            return;
        }
        if let Err(e) = self.endpoint.send_payload(PacketType::Action(action)) {
            log::debug!("Action send failed: {}", e);
        }
    }
}

impl Drop for NetworkClient {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            log::debug!("Disconnect on drop failed: {}", e);
        }
    }
}
