use glam::Vec2;
use rkyv::{Archive, Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum EventKind {
    CharacterHit,
    BossComing,
    BossHit,
    BossShot,
    EnemyHit,
    EnemyShot,
    SkillSlime,
    PowerUp,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        Self::CharacterHit,
        Self::BossComing,
        Self::BossHit,
        Self::BossShot,
        Self::EnemyHit,
        Self::EnemyShot,
        Self::SkillSlime,
        Self::PowerUp,
    ];

    pub fn involves_boss(&self) -> bool {
        matches!(self, Self::BossComing | Self::BossHit | Self::BossShot)
    }
}

/// Transient trigger broadcast by the server. Carries no gameplay truth.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct GameEvent {
    pub kind: EventKind,
    pub position: Option<[f32; 2]>,
}

impl GameEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    pub fn at(kind: EventKind, position: Vec2) -> Self {
        Self {
            kind,
            position: Some(position.to_array()),
        }
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
            .map(Vec2::from)
            .filter(|p| p.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_position_is_ignored() {
        let event = GameEvent {
            kind: EventKind::EnemyHit,
            position: Some([f32::NAN, 3.0]),
        };
        assert!(event.position().is_none());

        let event = GameEvent::at(EventKind::EnemyHit, Vec2::new(1.0, 2.0));
        assert_eq!(event.position(), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn boss_events() {
        assert!(EventKind::BossHit.involves_boss());
        assert!(!EventKind::EnemyHit.involves_boss());
    }
}
