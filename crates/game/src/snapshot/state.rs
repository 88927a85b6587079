use std::collections::BTreeMap;

use glam::Vec2;
use rkyv::{Archive, Deserialize, Serialize};

use crate::event::GameEvent;

fn finite2(v: [f32; 2]) -> bool {
    v[0].is_finite() && v[1].is_finite()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum WeaponKind {
    #[default]
    Default,
    Spread,
    Ricochet,
    Arc,
}

impl WeaponKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Default => "🔥",
            Self::Spread => "🔱",
            Self::Ricochet => "⚡",
            Self::Arc => "🌙",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct PlayerState {
    pub id: u32,
    /// Top-left corner of the player's bounding square.
    pub position: [f32; 2],
    pub hp: f32,
    pub max_hp: f32,
    /// Skill charge level, 0..=3.
    pub charge: u8,
    pub hit_accumulated: u32,
    pub name: String,
    pub score: u32,
    pub skin: u8,
    pub invulnerable: bool,
    pub weapon: WeaponKind,
    pub build_cooldown: Option<f32>,
}

impl PlayerState {
    pub const SIZE: f32 = 30.0;

    pub fn new(id: u32, name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id,
            position: position.to_array(),
            hp: 100.0,
            max_hp: 100.0,
            charge: 0,
            hit_accumulated: 0,
            name: name.into(),
            score: 0,
            skin: 1,
            invulnerable: false,
            weapon: WeaponKind::Default,
            build_cooldown: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }

    pub fn is_finite(&self) -> bool {
        finite2(self.position) && self.hp.is_finite() && self.max_hp.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum EnemyKind {
    /// Normal virus, carrying its cosmetic variant.
    Virus(u8),
    Boss,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct EnemyState {
    pub id: u32,
    pub kind: EnemyKind,
    pub position: [f32; 2],
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
}

impl EnemyState {
    pub const BOSS_SIZE: f32 = 200.0;
    pub const BOSS_HP: f32 = 500.0;

    pub fn virus(id: u32, variant: u8, position: Vec2) -> Self {
        Self {
            id,
            kind: EnemyKind::Virus(variant),
            position: position.to_array(),
            size: 30.0,
            hp: 3.0,
            max_hp: 3.0,
        }
    }

    pub fn boss(id: u32, position: Vec2) -> Self {
        Self {
            id,
            kind: EnemyKind::Boss,
            position: position.to_array(),
            size: Self::BOSS_SIZE,
            hp: Self::BOSS_HP,
            max_hp: Self::BOSS_HP,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }

    pub fn center(&self) -> Vec2 {
        self.position() + Vec2::splat(self.size * 0.5)
    }

    pub fn is_finite(&self) -> bool {
        finite2(self.position)
            && self.size.is_finite()
            && self.hp.is_finite()
            && self.max_hp.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum BulletOwner {
    Player(u32),
    Enemy,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum BulletKind {
    #[default]
    Normal,
    /// Rendered as a spinning note glyph.
    Arc,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct BulletState {
    /// Center of the bullet.
    pub position: [f32; 2],
    pub radius: Option<f32>,
    pub owner: BulletOwner,
    /// Explicit 0xRRGGBB override.
    pub color: Option<u32>,
    pub kind: BulletKind,
}

impl BulletState {
    pub const DEFAULT_RADIUS: f32 = 4.0;

    pub fn new(position: Vec2, owner: BulletOwner) -> Self {
        Self {
            position: position.to_array(),
            radius: None,
            owner,
            color: None,
            kind: BulletKind::Normal,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }

    pub fn radius(&self) -> f32 {
        self.radius
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(Self::DEFAULT_RADIUS)
    }

    pub fn is_finite(&self) -> bool {
        finite2(self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum ItemKind {
    Spread,
    Ricochet,
    Arc,
    Heal,
    Other,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct ItemState {
    pub position: [f32; 2],
    pub kind: ItemKind,
}

impl ItemState {
    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WallState {
    /// Center of the wall.
    pub position: [f32; 2],
    /// Orientation in radians.
    pub angle: f32,
    pub width: f32,
    pub length: f32,
    pub hp: f32,
    pub max_hp: f32,
}

impl WallState {
    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }

    pub fn is_finite(&self) -> bool {
        finite2(self.position)
            && self.angle.is_finite()
            && self.width.is_finite()
            && self.length.is_finite()
            && self.hp.is_finite()
            && self.max_hp.is_finite()
    }
}

/// Lingering area left behind by a player's skill.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct SkillObjectState {
    pub position: [f32; 2],
    pub skin: u8,
}

impl SkillObjectState {
    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }
}

/// One authoritative world broadcast. Never mutated after ingestion.
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Snapshot {
    pub tick: u32,
    pub players: BTreeMap<u32, PlayerState>,
    pub enemies: Vec<EnemyState>,
    pub bullets: Vec<BulletState>,
    pub items: Vec<ItemState>,
    pub walls: Vec<WallState>,
    pub skill_objects: Vec<SkillObjectState>,
    pub warning: bool,
    pub events: Vec<GameEvent>,
}

impl Snapshot {
    pub fn new(tick: u32) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    pub fn with_player(mut self, player: PlayerState) -> Self {
        self.players.insert(player.id, player);
        self
    }

    pub fn with_enemy(mut self, enemy: EnemyState) -> Self {
        self.enemies.push(enemy);
        self
    }

    pub fn boss(&self) -> Option<&EnemyState> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    pub fn entity_count(&self) -> usize {
        self.players.len()
            + self.enemies.len()
            + self.bullets.len()
            + self.items.len()
            + self.walls.len()
            + self.skill_objects.len()
    }

    /// Drops every entity that carries non-finite numbers. Returns how many were removed.
    pub fn sanitize(&mut self) -> usize {
        let before = self.entity_count();

        self.players.retain(|id, p| p.is_finite() && p.id == *id);
        self.enemies.retain(EnemyState::is_finite);
        self.bullets.retain(BulletState::is_finite);
        self.items.retain(|i| finite2(i.position));
        self.walls.retain(WallState::is_finite);
        self.skill_objects.retain(|s| finite2(s.position));

        before - self.entity_count()
    }
}
