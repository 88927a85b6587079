pub mod config;
pub mod effects;
pub mod event;
pub mod hud;
pub mod input;
pub mod interp;
pub mod net;
pub mod render;
pub mod session;
pub mod snapshot;

pub use config::{ConfigError, ParticleConfig, SessionConfig};
pub use effects::{EffectTable, EventEffect, Particle, ParticleSystem, SoundKey};
pub use event::{EventKind, GameEvent};
pub use hud::{HudView, LeaderboardEntry};
pub use input::{ActionSignal, Control, InputIntent, InputSampler};
pub use interp::{EntityInterpolator, InterpolatedFrame, InterpolationClock};
pub use net::{
    ConnectionState, DEFAULT_PORT, NetworkEndpoint, NetworkStats, Packet, PacketError,
    PacketHeader, PacketType,
};
pub use render::{Canvas, Color, DrawCommand, FrameContext, RecordingCanvas, Renderer, Shape};
pub use session::{FrameReport, LoopState, Outbound, OutboundLog, Session};
pub use snapshot::{
    BulletState, EnemyState, PlayerState, Snapshot, SnapshotBuffer, TimedSnapshot, WallState,
};
