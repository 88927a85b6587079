use std::time::Instant;

use glam::Vec2;

use crate::config::SessionConfig;
use crate::effects::{EffectTable, ParticleSystem, SoundKey};
use crate::event::GameEvent;
use crate::hud::HudView;
use crate::input::{ActionSignal, Control, InputIntent, InputSampler};
use crate::interp::{EntityInterpolator, InterpolationClock};
use crate::render::{Canvas, FrameContext, Renderer};
use crate::snapshot::{Snapshot, SnapshotBuffer};

/// Sink for everything the client sends. Sends are fire-and-forget.
pub trait Outbound {
    fn send_intent(&mut self, intent: &InputIntent);
    fn send_action(&mut self, action: ActionSignal);
}

/// Outbound sink that keeps what it was given.
#[derive(Debug, Default, Clone)]
pub struct OutboundLog {
    pub intents: Vec<InputIntent>,
    pub actions: Vec<ActionSignal>,
}

impl Outbound for OutboundLog {
    fn send_intent(&mut self, intent: &InputIntent) {
        self.intents.push(*intent);
    }

    fn send_action(&mut self, action: ActionSignal) {
        self.actions.push(action);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running { local_player: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    pub drawn: bool,
    /// `None` when there was nothing to blend from.
    pub alpha: Option<f32>,
    pub intent: Option<InputIntent>,
}

/// Owns every piece of client presentation state and drives one frame at a time.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    state: LoopState,
    buffer: SnapshotBuffer,
    clock: InterpolationClock,
    particles: ParticleSystem,
    effects: EffectTable,
    renderer: Renderer,
    input: InputSampler,
    sounds: Vec<SoundKey>,
    local_center: Option<Vec2>,
    epoch: Instant,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let particles = ParticleSystem::new(config.particles.clone());
        Self::with_particles(config, particles)
    }

    pub fn with_particles(config: SessionConfig, particles: ParticleSystem) -> Self {
        Self {
            state: LoopState::Idle,
            buffer: SnapshotBuffer::new(),
            clock: InterpolationClock::new(config.tick_interval()),
            particles,
            effects: EffectTable::default(),
            renderer: Renderer::new(config.player_lives),
            input: InputSampler::new(config.fire_cooldown()),
            sounds: Vec::new(),
            local_center: None,
            epoch: Instant::now(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn local_player(&self) -> Option<u32> {
        match self.state {
            LoopState::Running { local_player } => Some(local_player),
            LoopState::Idle => None,
        }
    }

    pub fn buffer(&self) -> &SnapshotBuffer {
        &self.buffer
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    /// Idle -> Running. Happens once per session; later signals are ignored.
    pub fn initialize(&mut self, local_player: u32) -> bool {
        match self.state {
            LoopState::Idle => {
                log::info!("Session running as player {}", local_player);
                self.state = LoopState::Running { local_player };
                self.sounds.push(SoundKey::Music);
                true
            }
            LoopState::Running { local_player: current } => {
                log::warn!(
                    "Ignoring initialize for player {} (already running as {})",
                    local_player,
                    current
                );
                false
            }
        }
    }

    pub fn ingest_snapshot(&mut self, mut snapshot: Snapshot, arrival: Instant) {
        let dropped = snapshot.sanitize();
        if dropped > 0 {
            log::warn!(
                "Dropped {} malformed entities from snapshot {}",
                dropped,
                snapshot.tick
            );
        }

        let events = std::mem::take(&mut snapshot.events);
        self.buffer.ingest(snapshot, arrival);

        for event in &events {
            self.handle_event(event);
        }
    }

    /// Runs the effect table for one event. Ignored while idle.
    pub fn handle_event(&mut self, event: &GameEvent) {
        if self.state == LoopState::Idle {
            log::trace!("Ignoring {:?} before start", event.kind);
            return;
        }

        let effect = self.effects.get(event.kind);
        if let Some(sound) = effect.sound {
            self.sounds.push(sound);
        }

        if let Some(burst) = effect.burst {
            let latest = self.buffer.latest().map(|t| &t.snapshot);
            if let Some(origin) = EffectTable::origin(event, latest) {
                self.particles.spawn_effect(origin, burst.color, burst.count);
            }
        }
    }

    pub fn set_stick(&mut self, stick: Option<Vec2>) {
        self.input.set_stick(stick);
    }

    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.input.set_pointer(pointer);
    }

    /// Applies a user control and sends any one-shot signal immediately.
    pub fn control(
        &mut self,
        control: Control,
        pressed: bool,
        now: Instant,
        outbound: &mut dyn Outbound,
    ) {
        if self.state == LoopState::Idle {
            return;
        }

        let origin = self.aim_origin();
        let Some(signal) = self.input.control(control, pressed, now, origin) else {
            return;
        };

        if matches!(signal, ActionSignal::Fire { .. }) {
            self.sounds.push(SoundKey::PlayerShot);
        }
        outbound.send_action(signal);
    }

    /// Lets go of everything, e.g. when the window loses focus.
    pub fn release_all(&mut self, outbound: &mut dyn Outbound) {
        let signal = self.input.release_all();
        if self.state == LoopState::Idle {
            return;
        }
        if let Some(signal) = signal {
            outbound.send_action(signal);
        }
    }

    /// One display refresh: blend, draw, step particles, then sample and send intent.
    pub fn frame(
        &mut self,
        now: Instant,
        canvas: &mut dyn Canvas,
        outbound: &mut dyn Outbound,
    ) -> FrameReport {
        let LoopState::Running { local_player } = self.state else {
            return FrameReport::default();
        };

        let ctx = FrameContext {
            time_ms: now.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0,
            local_player: Some(local_player),
        };

        let mut alpha = None;
        match self.buffer.latest() {
            Some(current) => {
                let frame = match self.buffer.previous() {
                    Some(previous) => {
                        let a = self.clock.factor(now, current.arrival);
                        alpha = Some(a);
                        EntityInterpolator::interpolate(
                            Some(&previous.snapshot),
                            &current.snapshot,
                            a,
                        )
                    }
                    None => EntityInterpolator::verbatim(&current.snapshot),
                };
                self.renderer.render(canvas, &frame, &self.particles, &ctx);
                self.local_center = frame.player(local_player).map(|p| p.center());
            }
            None => {
                self.renderer.draw_background(canvas, ctx.time_ms);
                self.particles.render(canvas);
            }
        }

        self.particles.step();

        let intent = self.input.sample(self.local_center);
        outbound.send_intent(&intent);

        FrameReport {
            drawn: true,
            alpha,
            intent: Some(intent),
        }
    }

    pub fn hud(&self) -> HudView {
        let local = self.local_player();
        let hits = self.config.hits_per_charge;
        match self.buffer.latest() {
            Some(latest) => HudView::build(&latest.snapshot, local, hits),
            None => HudView::build(&Snapshot::default(), local, hits),
        }
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundKey> {
        std::mem::take(&mut self.sounds)
    }

    fn aim_origin(&self) -> Option<Vec2> {
        self.local_center.or_else(|| {
            let id = self.local_player()?;
            let player = self.buffer.latest()?.snapshot.players.get(&id)?;
            Some(player.position() + Vec2::splat(crate::snapshot::PlayerState::SIZE * 0.5))
        })
    }
}
