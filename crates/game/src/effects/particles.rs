use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ParticleConfig;
use crate::render::{Canvas, Color, Shape};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    remaining: u32,
    lifetime: u32,
}

impl Particle {
    /// Normalized remaining life in `[0, 1]`.
    pub fn life(&self) -> f32 {
        self.remaining as f32 / self.lifetime as f32
    }

    pub fn is_alive(&self) -> bool {
        self.remaining > 0
    }
}

/// Local explosion effects. Life decays by a fixed `1 / lifetime_frames` per step, so
/// every particle dies after exactly `lifetime_frames` steps.
#[derive(Debug)]
pub struct ParticleSystem {
    config: ParticleConfig,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(config: ParticleConfig) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(rand::random()))
    }

    pub fn seeded(config: ParticleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut config: ParticleConfig, rng: StdRng) -> Self {
        config.lifetime_frames = config.lifetime_frames.max(1);
        if !(config.min_speed <= config.max_speed) {
            config.max_speed = config.min_speed;
        }
        Self {
            config,
            particles: Vec::new(),
            rng,
        }
    }

    pub fn decay_rate(&self) -> f32 {
        1.0 / self.config.lifetime_frames as f32
    }

    pub fn spawn_effect(&mut self, position: Vec2, color: Color, count: usize) {
        if !position.is_finite() {
            return;
        }

        let ParticleConfig {
            lifetime_frames,
            min_speed,
            max_speed,
            ..
        } = self.config;

        self.particles.reserve(count);
        for _ in 0..count {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = if max_speed > min_speed {
                self.rng.random_range(min_speed..=max_speed)
            } else {
                min_speed
            };
            self.particles.push(Particle {
                position,
                velocity: Vec2::from_angle(angle) * speed,
                color,
                remaining: lifetime_frames,
                lifetime: lifetime_frames,
            });
        }
    }

    pub fn step(&mut self) {
        for particle in &mut self.particles {
            particle.position += particle.velocity;
            particle.remaining = particle.remaining.saturating_sub(1);
        }
        self.particles.retain(Particle::is_alive);
    }

    /// Opacity follows remaining life.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        for particle in self.particles.iter().filter(|p| p.is_alive()) {
            canvas.fill(
                Shape::circle(particle.position, self.config.radius),
                particle.color.with_alpha(particle.life()),
            );
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingCanvas;

    fn system() -> ParticleSystem {
        ParticleSystem::seeded(ParticleConfig::default(), 7)
    }

    #[test]
    fn spawned_particles_start_at_full_life() {
        let mut particles = system();
        particles.spawn_effect(Vec2::new(10.0, 20.0), Color::RED, 5);

        assert_eq!(particles.len(), 5);
        for p in particles.particles() {
            assert_eq!(p.position, Vec2::new(10.0, 20.0));
            assert_eq!(p.life(), 1.0);
            let speed = p.velocity.length();
            assert!((1.0 - 1e-4..=4.0 + 1e-4).contains(&speed), "speed {speed}");
        }
    }

    #[test]
    fn life_decreases_monotonically_and_expires() {
        let mut particles = system();
        particles.spawn_effect(Vec2::ZERO, Color::WHITE, 3);

        let mut last = 1.0;
        let mut steps = 0;
        while !particles.is_empty() {
            particles.step();
            steps += 1;
            if let Some(p) = particles.particles().first() {
                assert!(p.life() < last);
                last = p.life();
            }
            assert!(steps <= 20);
        }
        assert_eq!(steps, 20);
        assert!((steps as f32 * particles.decay_rate() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn particles_move_by_velocity() {
        let mut particles = system();
        particles.spawn_effect(Vec2::new(5.0, 5.0), Color::WHITE, 1);
        let velocity = particles.particles()[0].velocity;

        particles.step();
        particles.step();
        assert_eq!(
            particles.particles()[0].position,
            Vec2::new(5.0, 5.0) + velocity + velocity
        );
    }

    #[test]
    fn render_fades_with_life() {
        let mut particles = system();
        particles.spawn_effect(Vec2::ZERO, Color::RED, 2);
        for _ in 0..10 {
            particles.step();
        }

        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        particles.render(&mut canvas);
        let fills: Vec<_> = canvas.fills().collect();
        assert_eq!(fills.len(), 2);
        for (_, color) in fills {
            assert!((color.a - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn non_finite_origin_spawns_nothing() {
        let mut particles = system();
        particles.spawn_effect(Vec2::new(f32::NAN, 0.0), Color::RED, 4);
        assert!(particles.is_empty());
    }

    #[test]
    fn zero_lifetime_is_promoted() {
        let config = ParticleConfig {
            lifetime_frames: 0,
            ..Default::default()
        };
        let mut particles = ParticleSystem::seeded(config, 1);
        particles.spawn_effect(Vec2::ZERO, Color::RED, 1);
        particles.step();
        assert!(particles.is_empty());
    }
}
