mod endpoint;
mod protocol;
mod tracking;

pub use endpoint::{ConnectionState, NetworkEndpoint, NetworkStats};
pub use protocol::{
    ArchivedPacket, DEFAULT_NAME, DEFAULT_PORT, MAX_NAME_LEN, MAX_PACKET_SIZE, PROTOCOL_MAGIC,
    PROTOCOL_VERSION, Packet, PacketError, PacketHeader, PacketType, player_name,
    sequence_greater_than,
};
pub use tracking::{AckTracker, PendingPacket, ReceiveTracker};
