use std::time::{Duration, Instant};

/// Blend factor between the buffered snapshots, driven by wall-clock time since the latest arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationClock {
    expected_interval: Duration,
}

impl InterpolationClock {
    pub fn new(expected_interval: Duration) -> Self {
        Self { expected_interval }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    pub fn factor(&self, now: Instant, last_arrival: Instant) -> f32 {
        factor(now, last_arrival, self.expected_interval)
    }
}

/// `min((now - last_arrival) / expected_interval, 1)`, clamped to `[0, 1]`.
///
/// A `now` earlier than `last_arrival` yields 0. A zero interval yields 1.
pub fn factor(now: Instant, last_arrival: Instant, expected_interval: Duration) -> f32 {
    if expected_interval.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(last_arrival);
    clamp_ratio(elapsed.as_secs_f64() / expected_interval.as_secs_f64())
}

pub fn factor_ms(elapsed_ms: f64, expected_interval_ms: f64) -> f32 {
    if !(expected_interval_ms > 0.0) {
        return 1.0;
    }
    clamp_ratio(elapsed_ms / expected_interval_ms)
}

fn clamp_ratio(ratio: f64) -> f32 {
    if ratio.is_nan() || ratio <= 0.0 {
        0.0
    } else if ratio >= 1.0 {
        1.0
    } else {
        ratio as f32
    }
}
