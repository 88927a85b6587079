use std::collections::HashMap;

use glam::Vec2;

use crate::snapshot::{EnemyState, PlayerState, Snapshot};

/// Linear blend from `prev` to `curr`, never leaving the box the two points span.
pub fn blend(prev: Vec2, curr: Vec2, alpha: f32) -> Vec2 {
    if alpha.is_nan() || alpha >= 1.0 {
        return curr;
    }
    if alpha <= 0.0 {
        return prev;
    }
    let raw = prev + (curr - prev) * alpha;
    raw.max(prev.min(curr)).min(prev.max(curr))
}

#[derive(Debug, Clone, Copy)]
pub struct RenderPlayer<'a> {
    pub state: &'a PlayerState,
    pub position: Vec2,
}

impl RenderPlayer<'_> {
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(PlayerState::SIZE * 0.5)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderEnemy<'a> {
    pub state: &'a EnemyState,
    pub position: Vec2,
}

/// Render positions for one frame. Bullets, items, walls and skill objects are read
/// straight from `snapshot` at their literal positions.
#[derive(Debug, Clone)]
pub struct InterpolatedFrame<'a> {
    pub snapshot: &'a Snapshot,
    pub players: Vec<RenderPlayer<'a>>,
    pub enemies: Vec<RenderEnemy<'a>>,
    pub blended: bool,
}

impl<'a> InterpolatedFrame<'a> {
    pub fn player(&self, id: u32) -> Option<&RenderPlayer<'a>> {
        self.players.iter().find(|p| p.state.id == id)
    }
}

#[derive(Debug, Default)]
pub struct EntityInterpolator;

impl EntityInterpolator {
    /// Players and enemies are matched by id and blended. Newcomers and everything
    /// else render at the current snapshot's position. Without a previous snapshot
    /// the output is the current snapshot verbatim.
    pub fn interpolate<'a>(
        previous: Option<&Snapshot>,
        current: &'a Snapshot,
        alpha: f32,
    ) -> InterpolatedFrame<'a> {
        let Some(previous) = previous else {
            return Self::verbatim(current);
        };

        let players = current
            .players
            .values()
            .map(|state| {
                let position = match previous.players.get(&state.id) {
                    Some(prev) => blend(prev.position(), state.position(), alpha),
                    None => state.position(),
                };
                RenderPlayer { state, position }
            })
            .collect();

        let prev_enemies: HashMap<u32, Vec2> = previous
            .enemies
            .iter()
            .map(|e| (e.id, e.position()))
            .collect();

        let enemies = current
            .enemies
            .iter()
            .map(|state| {
                let position = match prev_enemies.get(&state.id) {
                    Some(&prev) => blend(prev, state.position(), alpha),
                    None => state.position(),
                };
                RenderEnemy { state, position }
            })
            .collect();

        InterpolatedFrame {
            snapshot: current,
            players,
            enemies,
            blended: true,
        }
    }

    pub fn verbatim(current: &Snapshot) -> InterpolatedFrame<'_> {
        InterpolatedFrame {
            snapshot: current,
            players: current
                .players
                .values()
                .map(|state| RenderPlayer {
                    state,
                    position: state.position(),
                })
                .collect(),
            enemies: current
                .enemies
                .iter()
                .map(|state| RenderEnemy {
                    state,
                    position: state.position(),
                })
                .collect(),
            blended: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(id: u32, x: f32, y: f32) -> PlayerState {
        PlayerState::new(id, "p", Vec2::new(x, y))
    }

    #[test]
    fn blend_halfway() {
        let result = blend(Vec2::ZERO, Vec2::new(100.0, 0.0), 0.5);
        assert_eq!(result, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn blend_endpoints_are_exact() {
        let prev = Vec2::new(0.1, 7.3);
        let curr = Vec2::new(0.3, -2.9);
        assert_eq!(blend(prev, curr, 0.0), prev);
        assert_eq!(blend(prev, curr, 1.0), curr);
        assert_eq!(blend(prev, curr, 4.0), curr);
        assert_eq!(blend(prev, curr, -1.0), prev);
    }

    #[test]
    fn blend_stays_within_bounds() {
        let pairs = [
            (Vec2::new(0.1, 0.7), Vec2::new(0.3, 0.2)),
            (Vec2::new(-512.25, 33.0), Vec2::new(799.5, 33.0)),
            (Vec2::new(1.0e6, -1.0e-3), Vec2::new(-1.0e6, 1.0e-3)),
        ];
        for (prev, curr) in pairs {
            for step in 0..=64 {
                let alpha = step as f32 / 64.0;
                let result = blend(prev, curr, alpha);
                assert!(result.cmpge(prev.min(curr)).all(), "{result} below range");
                assert!(result.cmple(prev.max(curr)).all(), "{result} above range");
            }
        }
    }

    #[test]
    fn matched_players_are_blended() {
        let previous = Snapshot::new(1).with_player(player_at(1, 0.0, 0.0));
        let current = Snapshot::new(2).with_player(player_at(1, 100.0, 40.0));

        let frame = EntityInterpolator::interpolate(Some(&previous), &current, 0.25);
        assert!(frame.blended);
        assert_eq!(frame.player(1).unwrap().position, Vec2::new(25.0, 10.0));
    }

    #[test]
    fn newcomers_snap_to_current() {
        let previous = Snapshot::new(1)
            .with_player(player_at(1, 0.0, 0.0))
            .with_enemy(EnemyState::virus(10, 1, Vec2::ZERO));
        let current = Snapshot::new(2)
            .with_player(player_at(1, 10.0, 0.0))
            .with_player(player_at(2, 333.0, 444.0))
            .with_enemy(EnemyState::virus(10, 1, Vec2::new(20.0, 0.0)))
            .with_enemy(EnemyState::virus(11, 2, Vec2::new(55.5, 66.5)));

        let frame = EntityInterpolator::interpolate(Some(&previous), &current, 0.5);
        assert_eq!(frame.player(2).unwrap().position, Vec2::new(333.0, 444.0));

        let enemy = |id| frame.enemies.iter().find(|e| e.state.id == id).unwrap().position;
        assert_eq!(enemy(10), Vec2::new(10.0, 0.0));
        assert_eq!(enemy(11), Vec2::new(55.5, 66.5));
    }

    #[test]
    fn departed_entities_are_not_rendered() {
        let previous = Snapshot::new(1)
            .with_player(player_at(1, 0.0, 0.0))
            .with_player(player_at(2, 0.0, 0.0));
        let current = Snapshot::new(2).with_player(player_at(1, 4.0, 0.0));

        let frame = EntityInterpolator::interpolate(Some(&previous), &current, 0.5);
        assert_eq!(frame.players.len(), 1);
        assert!(frame.player(2).is_none());
    }

    #[test]
    fn cold_start_is_identity() {
        let current = Snapshot::new(1)
            .with_player(player_at(3, 12.5, 99.0))
            .with_enemy(EnemyState::boss(4, Vec2::new(300.0, 10.0)));

        for alpha in [0.0, 0.3, 1.0] {
            let frame = EntityInterpolator::interpolate(None, &current, alpha);
            assert!(!frame.blended);
            assert_eq!(frame.player(3).unwrap().position, Vec2::new(12.5, 99.0));
            assert_eq!(frame.enemies[0].position, Vec2::new(300.0, 10.0));
        }
    }
}
