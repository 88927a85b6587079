use cellwars::HudView;
use cellwars::hud::MAX_CHARGE;

/// Left column: score, charge meter, weapon and skill state.
pub fn status_lines(hud: &HudView) -> Vec<String> {
    let filled = hud.charge.min(MAX_CHARGE) as usize;
    let meter = format!(
        "{}{}",
        "■".repeat(filled),
        "□".repeat(MAX_CHARGE as usize - filled)
    );
    let charge = if hud.charge >= MAX_CHARGE {
        format!("Charge: {meter} MAX")
    } else {
        format!("Charge: {meter} {:.0}%", hud.charge_progress * 100.0)
    };

    vec![
        format!("Score: {}", hud.score),
        charge,
        format!("Weapon: {}", hud.weapon_icon),
        format!(
            "Skill [Q]: {}",
            if hud.skill_ready { "READY" } else { "charging" }
        ),
    ]
}

pub fn leaderboard_lines(hud: &HudView) -> Vec<String> {
    hud.leaderboard
        .iter()
        .enumerate()
        .map(|(rank, entry)| format!("{}. {:<10} {:>6}", rank + 1, entry.name, entry.score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellwars::LeaderboardEntry;

    #[test]
    fn status_shows_partial_charge() {
        let hud = HudView {
            score: 42,
            charge: 1,
            charge_progress: 0.45,
            weapon_icon: "⚡",
            skill_ready: true,
            leaderboard: Vec::new(),
        };
        assert_eq!(
            status_lines(&hud),
            vec![
                "Score: 42".to_string(),
                "Charge: ■□□ 45%".to_string(),
                "Weapon: ⚡".to_string(),
                "Skill [Q]: READY".to_string(),
            ]
        );
    }

    #[test]
    fn full_charge_reads_max() {
        let hud = HudView {
            charge: MAX_CHARGE,
            ..Default::default()
        };
        assert_eq!(status_lines(&hud)[1], "Charge: ■■■ MAX");
        assert_eq!(status_lines(&hud)[3], "Skill [Q]: charging");
    }

    #[test]
    fn leaderboard_is_ranked() {
        let hud = HudView {
            leaderboard: vec![
                LeaderboardEntry {
                    id: 2,
                    name: "Zed".into(),
                    score: 90,
                },
                LeaderboardEntry {
                    id: 1,
                    name: "Amy".into(),
                    score: 10,
                },
            ],
            ..Default::default()
        };
        let lines = leaderboard_lines(&hud);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1. Zed"));
        assert!(lines[1].ends_with("10"));
    }
}
