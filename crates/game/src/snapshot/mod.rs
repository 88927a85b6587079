mod buffer;
mod state;

pub use buffer::{SnapshotBuffer, TimedSnapshot};
pub use state::{
    BulletKind, BulletOwner, BulletState, EnemyKind, EnemyState, ItemKind, ItemState,
    PlayerState, SkillObjectState, Snapshot, WallState, WeaponKind,
};
