use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::event::GameEvent;
use crate::input::{ActionSignal, InputIntent};
use crate::snapshot::Snapshot;

/// Largest datagram either side will emit or accept. Full snapshots can be large.
pub const MAX_PACKET_SIZE: usize = 65_000;
pub const PROTOCOL_VERSION: u32 = 1;
/// "CELL"
pub const PROTOCOL_MAGIC: u32 = 0x4345_4C4C;
pub const DEFAULT_PORT: u16 = 27015;

pub const MAX_NAME_LEN: usize = 10;
pub const DEFAULT_NAME: &str = "Cell";

const SEQUENCE_WRAP_THRESHOLD: u32 = u32::MAX / 2;

/// Trims and truncates a display name. Blank names fall back to [`DEFAULT_NAME`].
pub fn player_name(raw: &str) -> String {
    let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
    pub sequence: u32,
    pub ack: u32,
    pub ack_bitfield: u32,
}

impl PacketHeader {
    pub fn new(sequence: u32, ack: u32, ack_bitfield: u32) -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
            sequence,
            ack,
            ack_bitfield,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

#[inline]
pub fn sequence_greater_than(s1: u32, s2: u32) -> bool {
    ((s1 > s2) && (s1 - s2 <= SEQUENCE_WRAP_THRESHOLD))
        || ((s1 < s2) && (s2 - s1 > SEQUENCE_WRAP_THRESHOLD))
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum PacketType {
    // client -> server
    Join { name: String },
    Intent(InputIntent),
    Action(ActionSignal),
    Leave,

    // server -> client
    Welcome { player_id: u32 },
    Denied { reason: String },
    Snapshot(Snapshot),
    /// Event broadcast outside a snapshot.
    Event(GameEvent),
}

impl PacketType {
    pub fn join(name: &str) -> Self {
        Self::Join {
            name: player_name(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: PacketType,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
    #[error("packet of {0} bytes exceeds {MAX_PACKET_SIZE}")]
    TooLarge(usize),
}

impl Packet {
    pub fn new(header: PacketHeader, payload: PacketType) -> Self {
        Self { header, payload }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        let bytes = rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)?;
        if bytes.len() > MAX_PACKET_SIZE {
            return Err(PacketError::TooLarge(bytes.len()));
        }
        Ok(bytes)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        // datagram buffers carry no alignment guarantee
        let mut aligned = AlignedVec::<16>::with_capacity(data.len());
        aligned.extend_from_slice(data);
        rkyv::from_bytes::<Self, rancor::Error>(&aligned).map_err(PacketError::Deserialize)
    }

    pub fn access_archived(data: &[u8]) -> Result<&ArchivedPacket, PacketError> {
        rkyv::access::<ArchivedPacket, rancor::Error>(data).map_err(PacketError::Deserialize)
    }
}
