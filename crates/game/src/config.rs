use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Frames a particle lives. Life decays by `1 / lifetime_frames` per step.
    pub lifetime_frames: u32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub radius: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            lifetime_frames: 20,
            min_speed: 1.0,
            max_speed: 4.0,
            radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Nominal server broadcast interval.
    pub tick_interval_ms: u64,
    pub world_width: f32,
    pub world_height: f32,
    pub player_lives: u32,
    pub hits_per_charge: u32,
    pub fire_cooldown_ms: u64,
    pub particles: ParticleConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            world_width: 800.0,
            world_height: 600.0,
            player_lives: 5,
            hits_per_charge: 20,
            fire_cooldown_ms: 150,
            particles: ParticleConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn fire_cooldown(&self) -> Duration {
        Duration::from_millis(self.fire_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = SessionConfig::from_toml(
            r#"
            tick_interval_ms = 100

            [particles]
            lifetime_frames = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.particles.lifetime_frames, 30);
        assert_eq!(config.particles.max_speed, 4.0);
        assert_eq!(config.player_lives, 5);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(SessionConfig::from_toml("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let err = SessionConfig::from_toml("tick_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
