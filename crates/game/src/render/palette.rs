use super::canvas::Color;
use crate::snapshot::{BulletOwner, ItemKind};

pub const BACKGROUND: Color = Color::from_hex(0x0d0412);
pub const GRID: Color = Color::rgba(0.74, 0.58, 0.98, 0.08);
pub const WALL: Color = Color::from_hex(0xffb86c);
pub const HEALTH: Color = Color::from_hex(0x50fa7b);
pub const ENEMY_BAR: Color = Color::from_hex(0xff5555);
pub const BOSS_BAR: Color = Color::from_hex(0xbd93f9);
pub const BOSS_BODY: Color = Color::from_hex(0xff79c6);
pub const LOCAL_NAME: Color = Color::from_hex(0xf1fa8c);
pub const ARC_NOTE: Color = Color::from_hex(0xff00ff);
pub const WARNING_TEXT: Color = Color::from_hex(0xff5555);
pub const SCAN_LINE: Color = Color::rgba(1.0, 50.0 / 255.0, 50.0 / 255.0, 0.5);

pub fn cell(skin: u8) -> Color {
    match skin {
        2 => Color::from_hex(0x8be9fd),
        3 => Color::from_hex(0xff5555),
        _ => Color::from_hex(0x50fa7b),
    }
}

pub fn virus(variant: u8) -> Color {
    match variant {
        2 => Color::from_hex(0xff79c6),
        3 => Color::from_hex(0xf1fa8c),
        _ => Color::from_hex(0xbd93f9),
    }
}

pub fn item(kind: ItemKind) -> Color {
    match kind {
        ItemKind::Spread => Color::from_hex(0xffff00),
        ItemKind::Ricochet => Color::from_hex(0x00ffff),
        ItemKind::Arc => Color::from_hex(0xff00ff),
        ItemKind::Heal => Color::from_hex(0x50fa7b),
        ItemKind::Other => Color::WHITE,
    }
}

pub fn bullet(owner: BulletOwner, local_player: Option<u32>) -> Color {
    match owner {
        BulletOwner::Boss => Color::from_hex(0xbd93f9),
        BulletOwner::Enemy => Color::from_hex(0xff5555),
        BulletOwner::Player(id) if Some(id) == local_player => Color::from_hex(0xf1fa8c),
        BulletOwner::Player(_) => Color::from_hex(0x8be9fd),
    }
}

pub fn darken(color: Color, factor: f32) -> Color {
    Color::rgba(color.r * factor, color.g * factor, color.b * factor, color.a)
}
