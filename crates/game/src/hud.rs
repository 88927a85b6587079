use crate::snapshot::{PlayerState, Snapshot};

pub const LEADERBOARD_SIZE: usize = 3;
pub const MAX_CHARGE: u8 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub id: u32,
    pub name: String,
    pub score: u32,
}

/// Read model for widgets drawn outside the world canvas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HudView {
    pub score: u32,
    pub charge: u8,
    /// Progress toward the next charge level, `[0, 1]`.
    pub charge_progress: f32,
    pub weapon_icon: &'static str,
    pub skill_ready: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl HudView {
    pub fn build(snapshot: &Snapshot, local_player: Option<u32>, hits_per_charge: u32) -> Self {
        let mut hud = Self {
            leaderboard: leaderboard(snapshot),
            ..Default::default()
        };

        if let Some(player) = local_player.and_then(|id| snapshot.players.get(&id)) {
            hud.apply_player(player, hits_per_charge);
        }
        hud
    }

    fn apply_player(&mut self, player: &PlayerState, hits_per_charge: u32) {
        self.score = player.score;
        self.charge = player.charge.min(MAX_CHARGE);
        self.charge_progress = if self.charge >= MAX_CHARGE || hits_per_charge == 0 {
            0.0
        } else {
            (player.hit_accumulated as f32 / hits_per_charge as f32).clamp(0.0, 1.0)
        };
        self.weapon_icon = player.weapon.icon();
        self.skill_ready = self.charge >= 1;
    }
}

fn leaderboard(snapshot: &Snapshot) -> Vec<LeaderboardEntry> {
    let mut players: Vec<&PlayerState> = snapshot.players.values().collect();
    players.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    players
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(|p| LeaderboardEntry {
            id: p.id,
            name: p.name.clone(),
            score: p.score,
        })
        .collect()
}
