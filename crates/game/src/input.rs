use std::f32::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

use bitflags::bitflags;
use glam::Vec2;
use rkyv::{Archive, Deserialize, Serialize};

/// Aim used when no pointer is known: straight up the screen.
pub const DEFAULT_AIM: f32 = -FRAC_PI_2;

/// Player intent, rebuilt and sent every display frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct InputIntent {
    pub dx: f32,
    /// Screen space, positive is down.
    pub dy: f32,
    /// Radians, measured from the local player's center.
    pub aim: f32,
    pub fire: bool,
    /// True only in the first intent sampled after a skill press.
    pub skill: bool,
    pub build: bool,
}

impl InputIntent {
    pub fn movement(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }
}

/// One-shot signals sent as soon as the user acts, outside the per-frame intent stream.
#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum ActionSignal {
    Fire { aim: f32 },
    Skill,
    BuildStart,
    BuildStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Skill,
    Build,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Held: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const FIRE = 1 << 4;
        const BUILD = 1 << 5;
    }
}

impl Control {
    fn held_flag(self) -> Held {
        match self {
            Self::Up => Held::UP,
            Self::Down => Held::DOWN,
            Self::Left => Held::LEFT,
            Self::Right => Held::RIGHT,
            Self::Fire => Held::FIRE,
            Self::Build => Held::BUILD,
            Self::Skill => Held::empty(),
        }
    }
}

/// Folds key, stick and pointer state into an [`InputIntent`].
#[derive(Debug)]
pub struct InputSampler {
    held: Held,
    stick: Option<Vec2>,
    pointer: Option<Vec2>,
    skill_pending: bool,
    fire_cooldown: Duration,
    last_fire: Option<Instant>,
}

impl InputSampler {
    pub fn new(fire_cooldown: Duration) -> Self {
        Self {
            held: Held::empty(),
            stick: None,
            pointer: None,
            skill_pending: false,
            fire_cooldown,
            last_fire: None,
        }
    }

    pub fn is_held(&self, control: Control) -> bool {
        let flag = control.held_flag();
        !flag.is_empty() && self.held.contains(flag)
    }

    /// Analog stick vector in screen space. `None` hands movement back to the keys.
    pub fn set_stick(&mut self, stick: Option<Vec2>) {
        self.stick = stick.filter(|v| v.is_finite());
    }

    /// Pointer position in world coordinates.
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer.filter(|p| p.is_finite());
    }

    /// Applies a press or release. Returns the one-shot signal it triggers, if any.
    pub fn control(
        &mut self,
        control: Control,
        pressed: bool,
        now: Instant,
        origin: Option<Vec2>,
    ) -> Option<ActionSignal> {
        let flag = control.held_flag();
        let was_held = self.held.contains(flag) && !flag.is_empty();
        self.held.set(flag, pressed);

        match (control, pressed) {
            (Control::Fire, true) => self.try_fire(now, origin),
            (Control::Skill, true) => {
                self.skill_pending = true;
                Some(ActionSignal::Skill)
            }
            (Control::Build, true) if !was_held => Some(ActionSignal::BuildStart),
            (Control::Build, false) if was_held => Some(ActionSignal::BuildStop),
            _ => None,
        }
    }

    /// Fire signal, throttled to one per cooldown.
    pub fn try_fire(&mut self, now: Instant, origin: Option<Vec2>) -> Option<ActionSignal> {
        if let Some(last) = self.last_fire {
            if now.saturating_duration_since(last) < self.fire_cooldown {
                return None;
            }
        }
        self.last_fire = Some(now);
        Some(ActionSignal::Fire {
            aim: self.aim(origin),
        })
    }

    pub fn movement(&self) -> Vec2 {
        let raw = match self.stick {
            Some(stick) => stick,
            None => {
                let mut v = Vec2::ZERO;
                if self.held.contains(Held::UP) {
                    v.y -= 1.0;
                }
                if self.held.contains(Held::DOWN) {
                    v.y += 1.0;
                }
                if self.held.contains(Held::LEFT) {
                    v.x -= 1.0;
                }
                if self.held.contains(Held::RIGHT) {
                    v.x += 1.0;
                }
                v
            }
        };

        let v = if raw.length_squared() > 1.0 {
            raw.normalize()
        } else {
            raw
        };
        v.clamp(Vec2::splat(-1.0), Vec2::ONE)
    }

    pub fn aim(&self, origin: Option<Vec2>) -> f32 {
        match (origin, self.pointer) {
            (Some(origin), Some(pointer)) if pointer != origin => {
                let d = pointer - origin;
                d.y.atan2(d.x)
            }
            _ => DEFAULT_AIM,
        }
    }

    /// Builds this frame's intent and consumes the skill pulse.
    pub fn sample(&mut self, origin: Option<Vec2>) -> InputIntent {
        let movement = self.movement();
        InputIntent {
            dx: movement.x,
            dy: movement.y,
            aim: self.aim(origin),
            fire: self.held.contains(Held::FIRE),
            skill: std::mem::take(&mut self.skill_pending),
            build: self.held.contains(Held::BUILD),
        }
    }

    /// Drops every held control, the stick and a pending skill pulse.
    /// Returns `BuildStop` when a build was in progress.
    pub fn release_all(&mut self) -> Option<ActionSignal> {
        let building = self.held.contains(Held::BUILD);
        self.held = Held::empty();
        self.stick = None;
        self.skill_pending = false;
        building.then_some(ActionSignal::BuildStop)
    }
}
