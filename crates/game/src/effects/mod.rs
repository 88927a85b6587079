mod particles;
mod table;

pub use particles::{Particle, ParticleSystem};
pub use table::{Burst, EffectTable, EventEffect, SoundKey};
