use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `0xRRGGBB`, fully opaque.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned, anchored at the top-left corner.
    Rect { min: Vec2, size: Vec2 },
    OrientedRect {
        center: Vec2,
        half_extents: Vec2,
        angle: f32,
    },
    Circle { center: Vec2, radius: f32 },
    Line { from: Vec2, to: Vec2 },
}

impl Shape {
    pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::Rect {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle { center, radius }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub text: String,
    /// Anchor point: left edge or horizontal center, vertical middle.
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
    pub bold: bool,
    pub rotation: f32,
}

impl TextCommand {
    pub fn new(text: impl Into<String>, position: Vec2, size: f32, color: Color) -> Self {
        Self {
            text: text.into(),
            position,
            size,
            color,
            align: TextAlign::Center,
            bold: false,
            rotation: 0.0,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Fill { shape: Shape, color: Color },
    Stroke { shape: Shape, color: Color, width: f32 },
    Text(TextCommand),
}

/// Drawing surface in world coordinates, y pointing down.
pub trait Canvas {
    fn size(&self) -> Vec2;
    fn draw(&mut self, command: DrawCommand);

    fn fill(&mut self, shape: Shape, color: Color) {
        self.draw(DrawCommand::Fill { shape, color });
    }

    fn stroke(&mut self, shape: Shape, color: Color, width: f32) {
        self.draw(DrawCommand::Stroke {
            shape,
            color,
            width,
        });
    }

    fn text(&mut self, text: TextCommand) {
        self.draw(DrawCommand::Text(text));
    }
}

/// Canvas that keeps every command, for headless inspection.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn fills(&self) -> impl Iterator<Item = (&Shape, &Color)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Fill { shape, color } => Some((shape, color)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn fills_with(&self, color: Color) -> Vec<Shape> {
        self.fills()
            .filter(|(_, c)| **c == color)
            .map(|(s, _)| *s)
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn draw(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}
