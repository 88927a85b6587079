use std::sync::Arc;
use std::time::Instant;

use cellwars::SessionConfig;
use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::game::GameState;
use crate::net::NetworkClient;
use crate::render::Renderer;

const WINDOW_TITLE: &str = "Cell Wars";

pub struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    game: GameState,
    network_client: NetworkClient,
    fullscreen: bool,
}

impl App {
    pub fn new(network_client: NetworkClient, config: SessionConfig) -> Self {
        Self {
            window: None,
            renderer: None,
            game: GameState::new(config),
            network_client,
            fullscreen: false,
        }
    }

    fn world_size(&self) -> Vec2 {
        let config = self.game.session.config();
        Vec2::new(config.world_width, config.world_height)
    }

    fn toggle_fullscreen(&mut self) {
        let Some(window) = &self.window else { return };

        self.fullscreen = !self.fullscreen;
        window.set_fullscreen(self.fullscreen.then(|| Fullscreen::Borderless(None)));
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.network_client.disconnect() {
            log::debug!("Failed to send leave: {}", e);
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, event: KeyEvent, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(key) = event.physical_key else {
            return;
        };
        let pressed = event.state == ElementState::Pressed;

        match key {
            KeyCode::Escape if pressed => self.quit(event_loop),
            KeyCode::F11 if pressed && !event.repeat => self.toggle_fullscreen(),
            KeyCode::F3 if pressed && !event.repeat => {
                self.game.show_debug = !self.game.show_debug;
            }
            _ => self.game.key(
                key,
                pressed,
                event.repeat,
                Instant::now(),
                &mut self.network_client,
            ),
        }
    }

    fn handle_redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        if let Err(e) = self.network_client.update() {
            log::error!("Network error: {}", e);
        }
        for inbound in self.network_client.drain_inbound() {
            self.game.apply(inbound);
        }

        let now = Instant::now();
        let canvas = renderer.begin_frame();
        self.game.frame(now, canvas, &mut self.network_client);

        let window = Vec2::new(renderer.size.width as f32, renderer.size.height as f32);
        let overlay = self
            .game
            .overlay(window, Some(self.network_client.stats()));

        match renderer.render(&overlay) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
            Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
            Err(e) => log::error!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let world = self.world_size();
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(world.x, world.y));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let renderer = tokio::runtime::Runtime::new()
            .map_err(anyhow::Error::from)
            .and_then(|rt| rt.block_on(Renderer::new(window.clone(), world)));
        match renderer {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                window.request_redraw();
            }
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                self.quit(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event, event_loop),
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(renderer) = &self.renderer {
                    let screen = Vec2::new(position.x as f32, position.y as f32);
                    self.game.cursor_moved(screen, renderer.letterbox());
                }
            }
            WindowEvent::CursorLeft { .. } => self.game.cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.game.mouse_button(
                    button,
                    state == ElementState::Pressed,
                    Instant::now(),
                    &mut self.network_client,
                );
            }
            WindowEvent::Focused(false) => {
                self.game.release_all(&mut self.network_client);
            }
            WindowEvent::RedrawRequested => self.handle_redraw(event_loop),
            _ => {}
        }
    }
}
