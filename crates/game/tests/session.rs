use std::time::{Duration, Instant};

use cellwars::render::{TextAlign, palette};
use cellwars::{
    Color, Control, EnemyState, EntityInterpolator, EventKind, GameEvent, LoopState,
    OutboundLog, ParticleSystem, PlayerState, RecordingCanvas, Session, SessionConfig, Shape,
    Snapshot,
};
use glam::Vec2;

fn session() -> Session {
    let config = SessionConfig::default();
    let particles = ParticleSystem::seeded(config.particles.clone(), 11);
    Session::with_particles(config, particles)
}

fn at(id: u32, x: f32, y: f32) -> Snapshot {
    Snapshot::new(0).with_player(PlayerState::new(id, "Ana", Vec2::new(x, y)))
}

fn label_position(canvas: &RecordingCanvas, name: &str) -> Option<Vec2> {
    canvas
        .texts()
        .find(|t| t.text.starts_with(name) && t.align == TextAlign::Left)
        .map(|t| t.position)
}

#[test]
fn halfway_between_ticks_renders_halfway() {
    let mut s = session();
    s.initialize(1);

    let t0 = Instant::now();
    s.ingest_snapshot(at(1, 0.0, 0.0), t0);
    s.ingest_snapshot(at(1, 100.0, 0.0), t0 + Duration::from_millis(50));

    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    let mut out = OutboundLog::default();
    let report = s.frame(t0 + Duration::from_millis(75), &mut canvas, &mut out);

    let alpha = report.alpha.unwrap();
    assert!((alpha - 0.5).abs() < 1e-6);
    let label = label_position(&canvas, "Ana").unwrap();
    assert!((label.x - 50.0).abs() < 1e-3);
    assert!((label.y + 15.0).abs() < 1e-3);
}

#[test]
fn late_frames_settle_on_current() {
    let mut s = session();
    s.initialize(1);

    let t0 = Instant::now();
    s.ingest_snapshot(at(1, 0.0, 0.0), t0);
    s.ingest_snapshot(at(1, 100.0, 0.0), t0);

    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    let report = s.frame(
        t0 + Duration::from_secs(2),
        &mut canvas,
        &mut OutboundLog::default(),
    );

    assert_eq!(report.alpha, Some(1.0));
    assert_eq!(label_position(&canvas, "Ana"), Some(Vec2::new(100.0, -15.0)));
}

#[test]
fn first_snapshot_renders_verbatim() {
    let mut s = session();
    s.initialize(1);
    s.ingest_snapshot(at(1, 30.0, 40.0), Instant::now());

    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    let report = s.frame(Instant::now(), &mut canvas, &mut OutboundLog::default());

    assert_eq!(report.alpha, None);
    assert_eq!(label_position(&canvas, "Ana"), Some(Vec2::new(30.0, 25.0)));
}

#[test]
fn identical_snapshots_interpolate_to_themselves() {
    let snapshot = at(1, 12.0, 34.0).with_enemy(EnemyState::virus(2, 0, Vec2::new(5.0, 6.0)));

    for alpha in [0.0, 0.3, 0.99, 1.0] {
        let frame = EntityInterpolator::interpolate(Some(&snapshot), &snapshot, alpha);
        assert_eq!(frame.players[0].position, Vec2::new(12.0, 34.0));
        assert_eq!(frame.enemies[0].position, Vec2::new(5.0, 6.0));
    }
}

#[test]
fn newcomers_appear_at_current_position() {
    let previous = at(1, 0.0, 0.0);
    let current = at(1, 10.0, 0.0).with_player(PlayerState::new(2, "Bo", Vec2::new(70.0, 80.0)));

    let frame = EntityInterpolator::interpolate(Some(&previous), &current, 0.5);
    assert_eq!(frame.player(2).unwrap().position, Vec2::new(70.0, 80.0));
    assert_eq!(frame.player(1).unwrap().position, Vec2::new(5.0, 0.0));
}

#[test]
fn boss_bar_tracks_health() {
    let mut s = session();
    s.initialize(1);

    let mut boss = EnemyState::boss(9, Vec2::new(100.0, 100.0));
    boss.hp = 250.0;
    s.ingest_snapshot(Snapshot::new(1).with_enemy(boss), Instant::now());

    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    s.frame(Instant::now(), &mut canvas, &mut OutboundLog::default());

    let bars = canvas.fills_with(palette::BOSS_BAR);
    assert_eq!(bars.len(), 1);
    match bars[0] {
        Shape::Rect { min, size } => {
            assert_eq!(min, Vec2::new(100.0, 90.0));
            assert_eq!(size.x, 100.0);
        }
        other => panic!("Expected Rect, got {other:?}"),
    }
}

#[test]
fn overhealed_player_bar_is_clamped() {
    let mut s = session();
    s.initialize(1);

    let mut player = PlayerState::new(1, "Ana", Vec2::ZERO);
    player.hp = 120.0;
    s.ingest_snapshot(Snapshot::new(1).with_player(player), Instant::now());

    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    s.frame(Instant::now(), &mut canvas, &mut OutboundLog::default());

    // Skin 1 bodies share the health green, so only rects are bars.
    let bars: Vec<Vec2> = canvas
        .fills_with(palette::HEALTH)
        .into_iter()
        .filter_map(|shape| match shape {
            Shape::Rect { size, .. } => Some(size),
            _ => None,
        })
        .collect();
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].x, 30.0);
}

#[test]
fn particle_burst_fades_out() {
    let mut s = session();
    s.initialize(1);

    let color = Color::from_hex(0x123456);
    s.particles_mut().spawn_effect(Vec2::new(200.0, 200.0), color, 5);

    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    let mut out = OutboundLog::default();
    let now = Instant::now();

    s.frame(now, &mut canvas, &mut out);
    assert_eq!(canvas.fills_with(color).len(), 5);

    for _ in 1..20 {
        canvas.clear();
        s.frame(now, &mut canvas, &mut out);
    }
    assert!(s.particles().is_empty());

    canvas.clear();
    s.frame(now, &mut canvas, &mut out);
    let faded = canvas.fills().filter(|(_, c)| c.r == color.r && c.g == color.g).count();
    assert_eq!(faded, 0);
}

#[test]
fn idle_session_draws_nothing() {
    let mut s = session();
    s.ingest_snapshot(at(1, 0.0, 0.0), Instant::now());

    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    let mut out = OutboundLog::default();
    for _ in 0..5 {
        s.frame(Instant::now(), &mut canvas, &mut out);
    }

    assert_eq!(s.state(), LoopState::Idle);
    assert!(canvas.commands.is_empty());
    assert!(out.intents.is_empty());
}

#[test]
fn intent_follows_held_keys_every_frame() {
    let mut s = session();
    s.initialize(1);
    s.ingest_snapshot(at(1, 0.0, 0.0), Instant::now());

    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    let mut out = OutboundLog::default();
    let now = Instant::now();

    s.frame(now, &mut canvas, &mut out);
    s.control(Control::Left, true, now, &mut out);
    s.frame(now, &mut canvas, &mut out);
    s.control(Control::Left, false, now, &mut out);
    s.frame(now, &mut canvas, &mut out);

    let dx: Vec<f32> = out.intents.iter().map(|i| i.dx).collect();
    assert_eq!(dx, vec![0.0, -1.0, 0.0]);
    assert!(out.actions.is_empty());
}

#[test]
fn boss_warning_and_events() {
    let mut s = session();
    s.initialize(1);
    s.drain_sounds();

    let mut snapshot = Snapshot::new(1);
    snapshot.warning = true;
    snapshot.events.push(GameEvent::new(EventKind::BossComing));
    snapshot
        .events
        .push(GameEvent::at(EventKind::CharacterHit, Vec2::new(4.0, 4.0)));
    s.ingest_snapshot(snapshot, Instant::now());

    let sounds: Vec<&str> = s.drain_sounds().iter().map(|k| k.name()).collect();
    assert_eq!(sounds, vec!["boss_come", "p_hit"]);
    assert_eq!(s.particles().len(), 6);
}
