use cellwars::render::{TextAlign, TextCommand};
use glam::Vec2;
use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport, Weight,
};

use super::letterbox::Letterbox;

const LINE_HEIGHT: f32 = 1.2;

struct Placement {
    left: f32,
    top: f32,
    color: Color,
}

/// Screen-space text drawn in its own pass above the canvas geometry.
pub struct TextLayer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    text_renderer: TextRenderer,
    viewport: Viewport,
    buffers: Vec<Buffer>,
    placements: Vec<Placement>,
    width: u32,
    height: u32,
}

impl TextLayer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let text_renderer = TextRenderer::new(&mut atlas, device, Default::default(), None);
        let mut viewport = Viewport::new(device, &cache);
        viewport.update(queue, Resolution { width, height });

        Self {
            font_system,
            swash_cache,
            atlas,
            text_renderer,
            viewport,
            buffers: Vec::new(),
            placements: Vec::new(),
            width,
            height,
        }
    }

    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.viewport.update(queue, Resolution { width, height });
    }

    pub fn begin_frame(&mut self) {
        self.placements.clear();
    }

    /// Places a canvas text command. Position and size follow the letterbox; rotation is dropped.
    pub fn queue_world(&mut self, command: &TextCommand, letterbox: &Letterbox) {
        let anchor = letterbox.to_screen(command.position);
        let size = command.size * letterbox.scale;
        if !anchor.is_finite() || !(size > 0.0) {
            return;
        }

        let index = self.shape(&command.text, size, command.bold, Family::SansSerif);
        let width = line_width(&self.buffers[index]);
        let left = match command.align {
            TextAlign::Left => anchor.x,
            TextAlign::Center => anchor.x - width * 0.5,
        };
        let [r, g, b, a] = command.color.to_array().map(unit_to_byte);

        self.placements.push(Placement {
            left,
            top: anchor.y - size * LINE_HEIGHT * 0.5,
            color: Color::rgba(r, g, b, a),
        });
    }

    /// Places a block of monospace text at a fixed window position.
    pub fn queue_screen(&mut self, text: &str, position: Vec2, size: f32, color: [u8; 4]) {
        if text.is_empty() {
            return;
        }
        self.shape(text, size, false, Family::Monospace);
        let [r, g, b, a] = color;
        self.placements.push(Placement {
            left: position.x,
            top: position.y,
            color: Color::rgba(r, g, b, a),
        });
    }

    /// Lays `text` out in the next free buffer and returns its index.
    fn shape(&mut self, text: &str, size: f32, bold: bool, family: Family<'_>) -> usize {
        let index = self.placements.len();
        if index == self.buffers.len() {
            self.buffers
                .push(Buffer::new(&mut self.font_system, Metrics::new(size, size)));
        }

        let buffer = &mut self.buffers[index];
        buffer.set_metrics(&mut self.font_system, Metrics::new(size, size * LINE_HEIGHT));
        buffer.set_size(&mut self.font_system, None, None);

        let weight = if bold { Weight::BOLD } else { Weight::NORMAL };
        buffer.set_text(
            &mut self.font_system,
            text,
            &Attrs::new().family(family).weight(weight),
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);
        index
    }

    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<(), glyphon::PrepareError> {
        let bounds = TextBounds {
            left: 0,
            top: 0,
            right: self.width as i32,
            bottom: self.height as i32,
        };

        let text_areas = self
            .placements
            .iter()
            .zip(&self.buffers)
            .map(|(placement, buffer)| TextArea {
                buffer,
                left: placement.left,
                top: placement.top,
                scale: 1.0,
                bounds,
                default_color: placement.color,
                custom_glyphs: &[],
            });

        self.text_renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            text_areas,
            &mut self.swash_cache,
        )
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) -> Result<(), glyphon::RenderError> {
        self.text_renderer.render(&self.atlas, &self.viewport, pass)
    }

    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}

fn line_width(buffer: &Buffer) -> f32 {
    buffer
        .layout_runs()
        .map(|run| run.line_w)
        .fold(0.0, f32::max)
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
