mod clock;
mod entity;

pub use clock::{InterpolationClock, factor, factor_ms};
pub use entity::{EntityInterpolator, InterpolatedFrame, RenderEnemy, RenderPlayer, blend};
