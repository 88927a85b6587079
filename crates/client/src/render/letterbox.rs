use glam::Vec2;

/// Fits the logical world rectangle into the window at uniform scale, centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub offset: Vec2,
    pub window: Vec2,
}

/// World-to-clip transform handed to the canvas shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl Letterbox {
    pub fn fit(window: Vec2, world: Vec2) -> Self {
        let valid = |v: Vec2| v.is_finite() && v.x > 0.0 && v.y > 0.0;
        if !valid(window) || !valid(world) {
            return Self {
                scale: 1.0,
                offset: Vec2::ZERO,
                window: world.max(Vec2::ONE),
            };
        }

        let scale = (window.x / world.x).min(window.y / world.y);
        Self {
            scale,
            offset: (window - world * scale) * 0.5,
            window,
        }
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.offset
    }

    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.scale
    }

    pub fn uniform(&self) -> TransformUniform {
        let s = self.scale;
        let w = self.window;
        TransformUniform {
            scale: [2.0 * s / w.x, -2.0 * s / w.y],
            offset: [
                -1.0 + 2.0 * self.offset.x / w.x,
                1.0 - 2.0 * self.offset.y / w.y,
            ],
        }
    }
}
