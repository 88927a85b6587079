mod canvas;
pub mod palette;

pub use canvas::{Canvas, Color, DrawCommand, RecordingCanvas, Shape, TextAlign, TextCommand};

use std::f32::consts::TAU;

use glam::Vec2;

use crate::effects::ParticleSystem;
use crate::interp::{InterpolatedFrame, RenderEnemy, RenderPlayer};
use crate::snapshot::{
    BulletKind, BulletState, EnemyKind, ItemState, PlayerState, SkillObjectState, WallState,
};

pub const GRID_SPACING: f32 = 40.0;
const GRID_SCROLL_PER_MS: f64 = 0.02;
const PLAYER_BAR_WIDTH: f32 = 30.0;
const PLAYER_BAR_HEIGHT: f32 = 4.0;
const WALL_BAR_WIDTH: f32 = 30.0;
const WALL_BAR_HEIGHT: f32 = 4.0;
const ENEMY_BAR_HEIGHT: f32 = 3.0;
const BOSS_BAR_HEIGHT: f32 = 8.0;
const ITEM_OFFSET: f32 = 10.0;
const ITEM_GLOW_RADIUS: f32 = 12.0;
const ITEM_CORE_RADIUS: f32 = 5.0;
const SKILL_OBJECT_ALPHA: f32 = 0.6;
const INVULNERABLE_ALPHA: f32 = 0.5;
const VIRUS_SPIKES: usize = 8;

/// `hp / max_hp` clamped to `[0, 1]`. Non-finite input or a non-positive maximum yields 0.
pub fn health_ratio(hp: f32, max_hp: f32) -> f32 {
    if !hp.is_finite() || !max_hp.is_finite() || max_hp <= 0.0 {
        return 0.0;
    }
    (hp / max_hp).clamp(0.0, 1.0)
}

/// Whole lives left when `max_hp` is split into `lives` equal segments.
pub fn remaining_lives(hp: f32, max_hp: f32, lives: u32) -> u32 {
    if lives == 0 || !hp.is_finite() || !max_hp.is_finite() || max_hp <= 0.0 || hp <= 0.0 {
        return 0;
    }
    let per_life = max_hp / lives as f32;
    ((hp / per_life).ceil() as u32).min(lives)
}

/// Fill ratio of the current life segment.
pub fn life_segment_ratio(hp: f32, max_hp: f32, lives: u32) -> f32 {
    if lives == 0 || !max_hp.is_finite() || max_hp <= 0.0 {
        return 0.0;
    }
    let per_life = max_hp / lives as f32;
    let mut current = hp % per_life;
    if current == 0.0 && hp > 0.0 {
        current = per_life;
    }
    health_ratio(current, per_life)
}

/// Per-frame inputs that are not part of the world state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameContext {
    pub time_ms: f64,
    pub local_player: Option<u32>,
}

/// Issues one full frame of draw commands. Holds no world state and never mutates any.
#[derive(Debug, Clone)]
pub struct Renderer {
    player_lives: u32,
}

impl Renderer {
    pub fn new(player_lives: u32) -> Self {
        Self { player_lives }
    }

    pub fn render(
        &self,
        canvas: &mut dyn Canvas,
        frame: &InterpolatedFrame<'_>,
        particles: &ParticleSystem,
        ctx: &FrameContext,
    ) {
        let snapshot = frame.snapshot;

        self.draw_background(canvas, ctx.time_ms);

        for wall in &snapshot.walls {
            self.draw_wall(canvas, wall);
        }
        for item in &snapshot.items {
            self.draw_item(canvas, item);
        }
        for object in &snapshot.skill_objects {
            self.draw_skill_object(canvas, object);
        }
        for enemy in &frame.enemies {
            self.draw_enemy(canvas, enemy);
        }
        for player in &frame.players {
            self.draw_player(canvas, player, ctx.local_player);
        }
        for bullet in &snapshot.bullets {
            self.draw_bullet(canvas, bullet, ctx);
        }

        particles.render(canvas);

        if snapshot.warning {
            self.draw_warning(canvas, ctx.time_ms);
        }
    }

    /// Background with a grid scrolling at a rate tied to wall-clock time only.
    pub fn draw_background(&self, canvas: &mut dyn Canvas, time_ms: f64) {
        let size = canvas.size();
        canvas.draw(DrawCommand::Clear(palette::BACKGROUND));

        let offset = grid_offset(time_ms);

        let mut x = 0.0;
        while x <= size.x {
            let line = Shape::Line {
                from: Vec2::new(x, 0.0),
                to: Vec2::new(x, size.y),
            };
            canvas.stroke(line, palette::GRID, 1.0);
            x += GRID_SPACING;
        }

        let mut y = offset - GRID_SPACING;
        while y <= size.y {
            if y >= 0.0 {
                let line = Shape::Line {
                    from: Vec2::new(0.0, y),
                    to: Vec2::new(size.x, y),
                };
                canvas.stroke(line, palette::GRID, 1.0);
            }
            y += GRID_SPACING;
        }
    }

    fn draw_wall(&self, canvas: &mut dyn Canvas, wall: &WallState) {
        if !wall.is_finite() {
            return;
        }
        let center = wall.position();
        let body = Shape::OrientedRect {
            center,
            half_extents: Vec2::new(wall.length, wall.width) * 0.5,
            angle: wall.angle,
        };
        canvas.fill(body, palette::WALL);
        canvas.stroke(body, Color::WHITE, 2.0);

        let bar = center - Vec2::splat(15.0);
        canvas.fill(
            Shape::rect(bar.x, bar.y, WALL_BAR_WIDTH, WALL_BAR_HEIGHT),
            Color::RED,
        );
        let ratio = health_ratio(wall.hp, wall.max_hp);
        canvas.fill(
            Shape::rect(bar.x, bar.y, WALL_BAR_WIDTH * ratio, WALL_BAR_HEIGHT),
            palette::HEALTH,
        );
    }

    fn draw_item(&self, canvas: &mut dyn Canvas, item: &ItemState) {
        let center = item.position() + Vec2::splat(ITEM_OFFSET);
        if !center.is_finite() {
            return;
        }
        let color = palette::item(item.kind);
        canvas.fill(Shape::circle(center, ITEM_GLOW_RADIUS), color.with_alpha(0.35));
        canvas.fill(Shape::circle(center, ITEM_GLOW_RADIUS * 0.75), color);
        canvas.fill(Shape::circle(center, ITEM_CORE_RADIUS), Color::WHITE);
    }

    fn draw_skill_object(&self, canvas: &mut dyn Canvas, object: &SkillObjectState) {
        let position = object.position();
        if !position.is_finite() {
            return;
        }
        draw_cell(
            canvas,
            position,
            PlayerState::SIZE,
            palette::cell(object.skin),
            SKILL_OBJECT_ALPHA,
        );
    }

    fn draw_enemy(&self, canvas: &mut dyn Canvas, enemy: &RenderEnemy<'_>) {
        let state = enemy.state;
        let position = enemy.position;
        if !position.is_finite() || !(state.size > 0.0) {
            return;
        }
        let ratio = health_ratio(state.hp, state.max_hp);

        match state.kind {
            EnemyKind::Boss => {
                draw_boss(canvas, position, state.size);
                canvas.fill(
                    Shape::rect(
                        position.x,
                        position.y - 10.0,
                        state.size * ratio,
                        BOSS_BAR_HEIGHT,
                    ),
                    palette::BOSS_BAR,
                );
            }
            EnemyKind::Virus(variant) => {
                draw_virus(canvas, position, state.size, palette::virus(variant));
                canvas.fill(
                    Shape::rect(
                        position.x,
                        position.y - 6.0,
                        state.size * ratio,
                        ENEMY_BAR_HEIGHT,
                    ),
                    palette::ENEMY_BAR,
                );
            }
        }
    }

    fn draw_player(
        &self,
        canvas: &mut dyn Canvas,
        player: &RenderPlayer<'_>,
        local_player: Option<u32>,
    ) {
        let state = player.state;
        let position = player.position;
        if !position.is_finite() {
            return;
        }

        let alpha = if state.invulnerable {
            INVULNERABLE_ALPHA
        } else {
            1.0
        };
        draw_cell(
            canvas,
            position,
            PlayerState::SIZE,
            palette::cell(state.skin),
            alpha,
        );

        let lives = remaining_lives(state.hp, state.max_hp, self.player_lives);
        let name_color = if local_player == Some(state.id) {
            palette::LOCAL_NAME
        } else {
            Color::WHITE
        };
        canvas.text(
            TextCommand::new(
                format!("{} ♥x{}", state.name, lives),
                Vec2::new(position.x, position.y - 15.0),
                12.0,
                name_color,
            )
            .aligned(TextAlign::Left),
        );

        let ratio = life_segment_ratio(state.hp, state.max_hp, self.player_lives);
        canvas.fill(
            Shape::rect(
                position.x,
                position.y - 10.0,
                PLAYER_BAR_WIDTH * ratio,
                PLAYER_BAR_HEIGHT,
            ),
            palette::HEALTH,
        );
        canvas.stroke(
            Shape::rect(
                position.x,
                position.y - 10.0,
                PLAYER_BAR_WIDTH,
                PLAYER_BAR_HEIGHT,
            ),
            Color::WHITE,
            1.0,
        );
    }

    fn draw_bullet(&self, canvas: &mut dyn Canvas, bullet: &BulletState, ctx: &FrameContext) {
        let position = bullet.position();
        if !position.is_finite() {
            return;
        }

        match bullet.kind {
            BulletKind::Arc => {
                let rotation = (ctx.time_ms * 0.008) % TAU as f64;
                canvas.text(
                    TextCommand::new("♪", position, 30.0, palette::ARC_NOTE)
                        .rotated(rotation as f32),
                );
            }
            BulletKind::Normal => {
                let color = bullet
                    .color
                    .map(Color::from_hex)
                    .unwrap_or_else(|| palette::bullet(bullet.owner, ctx.local_player));
                canvas.fill(Shape::circle(position, bullet.radius()), color);
            }
        }
    }

    /// Pulsing red wash with scan lines and a blinking banner. Phases follow wall-clock time.
    pub fn draw_warning(&self, canvas: &mut dyn Canvas, time_ms: f64) {
        let size = canvas.size();

        let alpha = 0.2 + 0.15 * (time_ms * 0.01).sin();
        canvas.fill(
            Shape::rect(0.0, 0.0, size.x, size.y),
            Color::RED.with_alpha(alpha as f32),
        );

        let scan = if size.y > 0.0 {
            ((time_ms * 0.2) % size.y as f64) as f32
        } else {
            0.0
        };
        for y in [scan, size.y - scan] {
            canvas.stroke(
                Shape::Line {
                    from: Vec2::new(0.0, y),
                    to: Vec2::new(size.x, y),
                },
                palette::SCAN_LINE,
                2.0,
            );
        }

        if banner_visible(time_ms) {
            let center = size * 0.5;
            canvas.text(
                TextCommand::new(
                    "⚠ WARNING ⚠",
                    center - Vec2::new(0.0, 20.0),
                    40.0,
                    palette::WARNING_TEXT,
                )
                .bold(),
            );
            canvas.text(
                TextCommand::new(
                    "BOSS APPROACHING",
                    center + Vec2::new(0.0, 20.0),
                    20.0,
                    Color::WHITE,
                )
                .bold(),
            );
        }
    }
}

pub fn grid_offset(time_ms: f64) -> f32 {
    (time_ms * GRID_SCROLL_PER_MS).rem_euclid(GRID_SPACING as f64) as f32
}

fn banner_visible(time_ms: f64) -> bool {
    (time_ms / 250.0).floor().rem_euclid(2.0) == 0.0
}

/// Round cell with a nucleus, filling the square anchored at `top_left`.
fn draw_cell(canvas: &mut dyn Canvas, top_left: Vec2, size: f32, color: Color, alpha: f32) {
    let radius = size * 0.5;
    let center = top_left + Vec2::splat(radius);
    canvas.fill(Shape::circle(center, radius), color.with_alpha(alpha));
    canvas.fill(
        Shape::circle(center, radius * 0.4),
        palette::darken(color, 0.55).with_alpha(alpha),
    );
}

fn draw_virus(canvas: &mut dyn Canvas, top_left: Vec2, size: f32, color: Color) {
    let radius = size * 0.5;
    let center = top_left + Vec2::splat(radius);
    for i in 0..VIRUS_SPIKES {
        let dir = Vec2::from_angle(i as f32 * TAU / VIRUS_SPIKES as f32);
        canvas.stroke(
            Shape::Line {
                from: center + dir * radius * 0.6,
                to: center + dir * radius,
            },
            color,
            2.0,
        );
    }
    canvas.fill(Shape::circle(center, radius * 0.7), color);
    canvas.fill(
        Shape::circle(center, radius * 0.3),
        palette::darken(color, 0.5),
    );
}

fn draw_boss(canvas: &mut dyn Canvas, top_left: Vec2, size: f32) {
    let radius = size * 0.5;
    let center = top_left + Vec2::splat(radius);
    canvas.fill(Shape::circle(center, radius), palette::BOSS_BODY);
    canvas.stroke(Shape::circle(center, radius), palette::BOSS_BAR, 4.0);
    canvas.fill(
        Shape::circle(center, radius * 0.35),
        palette::darken(palette::BOSS_BODY, 0.4),
    );
    for dx in [-0.4, 0.0, 0.4] {
        canvas.fill(
            Shape::circle(center + Vec2::new(dx * radius, -radius * 0.85), radius * 0.12),
            palette::LOCAL_NAME,
        );
    }
}
