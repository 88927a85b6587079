use cellwars::Control;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

pub fn key_control(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(Control::Up),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(Control::Down),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Control::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Control::Right),
        KeyCode::Space => Some(Control::Fire),
        KeyCode::KeyQ => Some(Control::Skill),
        KeyCode::KeyB => Some(Control::Build),
        _ => None,
    }
}

pub fn mouse_control(button: MouseButton) -> Option<Control> {
    match button {
        MouseButton::Left => Some(Control::Fire),
        _ => None,
    }
}

/// Whether an OS key repeat is forwarded. Held fire keeps shooting under the cooldown.
pub fn forwards_repeat(control: Control) -> bool {
    control == Control::Fire
}
