use std::collections::HashMap;

use glam::Vec2;

use crate::event::{EventKind, GameEvent};
use crate::render::Color;
use crate::snapshot::Snapshot;

/// Symbolic sound names handed to the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKey {
    PlayerHit,
    PlayerShot,
    BossComing,
    BossHit,
    BossShot,
    EnemyHit,
    EnemyShot,
    Skill,
    PowerUp,
    Music,
}

impl SoundKey {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayerHit => "p_hit",
            Self::PlayerShot => "p_shot",
            Self::BossComing => "boss_come",
            Self::BossHit => "boss_hit",
            Self::BossShot => "boss_shot",
            Self::EnemyHit => "e_hit",
            Self::EnemyShot => "e_shot",
            Self::Skill => "skill",
            Self::PowerUp => "powerup",
            Self::Music => "bgm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub color: Color,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventEffect {
    pub burst: Option<Burst>,
    pub sound: Option<SoundKey>,
}

impl EventEffect {
    pub fn sound(sound: SoundKey) -> Self {
        Self {
            burst: None,
            sound: Some(sound),
        }
    }

    pub fn with_burst(mut self, color: Color, count: usize) -> Self {
        self.burst = Some(Burst { color, count });
        self
    }
}

/// Event tag to visual/audio response. Consulted once per incoming event.
#[derive(Debug, Clone)]
pub struct EffectTable {
    entries: HashMap<EventKind, EventEffect>,
}

impl Default for EffectTable {
    fn default() -> Self {
        let entries = EventKind::ALL
            .into_iter()
            .map(|kind| (kind, Self::standard(kind)))
            .collect();
        Self { entries }
    }
}

impl EffectTable {
    fn standard(kind: EventKind) -> EventEffect {
        match kind {
            EventKind::CharacterHit => {
                EventEffect::sound(SoundKey::PlayerHit).with_burst(Color::from_hex(0x50fa7b), 6)
            }
            EventKind::BossComing => EventEffect::sound(SoundKey::BossComing),
            EventKind::BossHit => {
                EventEffect::sound(SoundKey::BossHit).with_burst(Color::from_hex(0xbd93f9), 16)
            }
            EventKind::BossShot => EventEffect::sound(SoundKey::BossShot),
            EventKind::EnemyHit => {
                EventEffect::sound(SoundKey::EnemyHit).with_burst(Color::from_hex(0xff5555), 8)
            }
            EventKind::EnemyShot => EventEffect::sound(SoundKey::EnemyShot),
            EventKind::SkillSlime => EventEffect::sound(SoundKey::Skill),
            EventKind::PowerUp => EventEffect::sound(SoundKey::PowerUp),
        }
    }

    pub fn get(&self, kind: EventKind) -> EventEffect {
        self.entries.get(&kind).copied().unwrap_or_default()
    }

    /// Where a burst for `event` should spawn. Boss events without a position fall
    /// back to the boss's center in `latest`.
    pub fn origin(event: &GameEvent, latest: Option<&Snapshot>) -> Option<Vec2> {
        event.position().or_else(|| {
            if event.kind.involves_boss() {
                latest.and_then(Snapshot::boss).map(|boss| boss.center())
            } else {
                None
            }
        })
    }
}
