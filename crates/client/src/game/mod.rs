mod input;

use std::time::Instant;

use cellwars::session::Outbound;
use cellwars::{Canvas, FrameReport, LoopState, NetworkStats, Session, SessionConfig};
use glam::Vec2;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

pub use input::{forwards_repeat, key_control, mouse_control};

use crate::audio::AudioSink;
use crate::debug::DebugStats;
use crate::hud;
use crate::net::Inbound;
use crate::render::{Letterbox, ScreenText};

const HUD_TEXT_SIZE: f32 = 16.0;
const DEBUG_TEXT_SIZE: f32 = 13.0;
const LINE_SPACING: f32 = 1.4;
const MARGIN: f32 = 10.0;
const LEADERBOARD_WIDTH: f32 = 190.0;

const HUD_COLOR: [u8; 4] = [248, 248, 242, 255];
const STATUS_COLOR: [u8; 4] = [255, 85, 85, 255];
const DEBUG_COLOR: [u8; 4] = [139, 233, 253, 255];

/// Client-side wrapper around the session: inbound dispatch, window input and overlay text.
pub struct GameState {
    pub session: Session,
    pub stats: DebugStats,
    pub show_debug: bool,
    audio: AudioSink,
    status: Option<String>,
    last_frame: Option<Instant>,
}

impl GameState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: Session::new(config),
            stats: DebugStats::new(),
            show_debug: true,
            audio: AudioSink::default(),
            status: None,
            last_frame: None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn apply(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Initialize { player_id } => {
                if self.session.initialize(player_id) {
                    self.status = None;
                }
            }
            Inbound::Snapshot { snapshot, arrival } => {
                self.stats.record_snapshot(arrival);
                self.session.ingest_snapshot(snapshot, arrival);
            }
            Inbound::Event(event) => self.session.handle_event(&event),
            Inbound::Denied(reason) => {
                self.status = Some(format!("Join denied: {reason}"));
            }
            Inbound::Lost => {
                self.status = Some("Connection lost".to_string());
            }
        }
    }

    pub fn key(
        &mut self,
        code: KeyCode,
        pressed: bool,
        repeat: bool,
        now: Instant,
        outbound: &mut dyn Outbound,
    ) {
        if let Some(control) = key_control(code) {
            if repeat && !forwards_repeat(control) {
                return;
            }
            self.session.control(control, pressed, now, outbound);
        }
    }

    pub fn mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
        now: Instant,
        outbound: &mut dyn Outbound,
    ) {
        if let Some(control) = mouse_control(button) {
            self.session.control(control, pressed, now, outbound);
        }
    }

    pub fn cursor_moved(&mut self, screen: Vec2, letterbox: &Letterbox) {
        self.session.set_pointer(Some(letterbox.to_world(screen)));
    }

    pub fn cursor_left(&mut self) {
        self.session.set_pointer(None);
    }

    /// Lets go of every held control, as if all keys were released.
    pub fn release_all(&mut self, outbound: &mut dyn Outbound) {
        self.session.release_all(outbound);
    }

    pub fn frame(
        &mut self,
        now: Instant,
        canvas: &mut dyn Canvas,
        outbound: &mut dyn Outbound,
    ) -> FrameReport {
        if let Some(last) = self.last_frame {
            self.stats
                .record_frame(now.saturating_duration_since(last).as_secs_f32());
        }
        self.last_frame = Some(now);

        let report = self.session.frame(now, canvas, outbound);
        self.audio.play(self.session.drain_sounds());
        report
    }

    /// HUD, status and debug text for a window of `window` pixels.
    pub fn overlay(&self, window: Vec2, network: Option<&NetworkStats>) -> Vec<ScreenText> {
        let mut texts = Vec::new();
        let line = HUD_TEXT_SIZE * LINE_SPACING;

        if self.session.state() == LoopState::Idle {
            let status = self.status.as_deref().unwrap_or("Waiting for server...");
            texts.push(screen_text(
                status,
                Vec2::new(MARGIN, MARGIN),
                HUD_TEXT_SIZE,
                STATUS_COLOR,
            ));
        } else {
            let view = self.session.hud();
            for (i, text) in hud::status_lines(&view).into_iter().enumerate() {
                let position = Vec2::new(MARGIN, MARGIN + i as f32 * line);
                texts.push(screen_text(text, position, HUD_TEXT_SIZE, HUD_COLOR));
            }

            let left = (window.x - LEADERBOARD_WIDTH - MARGIN).max(MARGIN);
            for (i, text) in hud::leaderboard_lines(&view).into_iter().enumerate() {
                let position = Vec2::new(left, MARGIN + i as f32 * line);
                texts.push(screen_text(text, position, HUD_TEXT_SIZE, HUD_COLOR));
            }

            if let Some(status) = &self.status {
                let position = Vec2::new(MARGIN, MARGIN + 5.0 * line);
                texts.push(screen_text(
                    status.as_str(),
                    position,
                    HUD_TEXT_SIZE,
                    STATUS_COLOR,
                ));
            }
        }

        if self.show_debug {
            let lines = self.stats.lines(network);
            let debug_line = DEBUG_TEXT_SIZE * LINE_SPACING;
            let top = window.y - MARGIN - lines.len() as f32 * debug_line;
            for (i, text) in lines.into_iter().enumerate() {
                let position = Vec2::new(MARGIN, top + i as f32 * debug_line);
                texts.push(screen_text(text, position, DEBUG_TEXT_SIZE, DEBUG_COLOR));
            }
        }

        texts
    }
}

fn screen_text(text: impl Into<String>, position: Vec2, size: f32, color: [u8; 4]) -> ScreenText {
    ScreenText {
        text: text.into(),
        position,
        size,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellwars::input::ActionSignal;
    use cellwars::{OutboundLog, PlayerState, RecordingCanvas, Snapshot};

    const WINDOW: Vec2 = Vec2::new(800.0, 600.0);

    fn running_game() -> GameState {
        let mut game = GameState::new(SessionConfig::default());
        game.apply(Inbound::Initialize { player_id: 1 });
        game
    }

    #[test]
    fn idle_overlay_shows_waiting_status() {
        let mut game = GameState::new(SessionConfig::default());
        game.show_debug = false;

        let texts = game.overlay(WINDOW, None);
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "Waiting for server...");

        game.apply(Inbound::Denied("full".into()));
        assert_eq!(game.overlay(WINDOW, None)[0].text, "Join denied: full");
    }

    #[test]
    fn initialize_clears_status_and_starts_session() {
        let mut game = GameState::new(SessionConfig::default());
        game.apply(Inbound::Lost);
        assert_eq!(game.status(), Some("Connection lost"));

        game.apply(Inbound::Initialize { player_id: 3 });
        assert_eq!(game.status(), None);
        assert_eq!(game.session.local_player(), Some(3));
    }

    #[test]
    fn lost_connection_keeps_rendering() {
        let mut game = running_game();
        let now = Instant::now();
        let snapshot = Snapshot::new(1).with_player(PlayerState::new(1, "Zed", Vec2::ZERO));
        game.apply(Inbound::Snapshot {
            snapshot,
            arrival: now,
        });
        game.apply(Inbound::Lost);

        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut out = OutboundLog::default();
        let report = game.frame(now, &mut canvas, &mut out);

        assert!(report.drawn);
        assert!(!canvas.commands.is_empty());
        assert!(
            game.overlay(WINDOW, None)
                .iter()
                .any(|t| t.text == "Connection lost")
        );
    }

    #[test]
    fn skill_key_repeat_is_ignored() {
        let mut game = running_game();
        let mut out = OutboundLog::default();
        let now = Instant::now();

        game.key(KeyCode::KeyQ, true, false, now, &mut out);
        game.key(KeyCode::KeyQ, true, true, now, &mut out);
        assert_eq!(out.actions.len(), 1);
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut game = running_game();
        let mut out = OutboundLog::default();
        let now = Instant::now();

        game.key(KeyCode::KeyW, true, false, now, &mut out);
        game.key(KeyCode::KeyB, true, false, now, &mut out);
        game.release_all(&mut out);

        assert!(matches!(
            out.actions.as_slice(),
            [ActionSignal::BuildStart, ActionSignal::BuildStop]
        ));

        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let report = game.frame(now, &mut canvas, &mut out);
        let intent = report.intent.unwrap();
        assert_eq!(intent.movement(), Vec2::ZERO);
        assert!(!intent.build);
    }

    #[test]
    fn debug_lines_sit_at_the_bottom() {
        let game = running_game();
        let texts = game.overlay(WINDOW, None);
        let debug: Vec<&ScreenText> = texts.iter().filter(|t| t.color == DEBUG_COLOR).collect();

        assert_eq!(debug.len(), 2);
        assert!(debug[1].position.y < WINDOW.y);
        assert!(debug[0].position.y > WINDOW.y / 2.0);
    }
}
