// src/input_system.rs
// Input backend interface plus a frame-edge input manager.
// Components poll `InputSource`; `InputManager` turns raw press/release/move events
// (or winit window events with the `winit` feature) into per-frame edges.

use std::collections::HashMap;

use glam::Vec2;
use serde::Deserialize;

/// Mouse buttons tracked by hitboxes, in index order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
    Middle = 2,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Keys the engine binds actions to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Deserialize)]
pub enum Key {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Escape,
    Tab,
    Space,
    Enter,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
}

/// Raw state change reported by the platform.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ButtonAction {
    Pressed,
    Released,
}

/// Polled input, sampled once per frame.
pub trait InputSource {
    fn mouse_position(&self) -> Vec2;
    /// Went down this frame.
    fn is_button_pressed(&self, button: MouseButton) -> bool;
    /// Went up this frame.
    fn is_button_released(&self, button: MouseButton) -> bool;
    /// Currently held.
    fn is_button_down(&self, button: MouseButton) -> bool;
    fn is_key_pressed(&self, key: Key) -> bool;
}

// Internal per-button state (small POD)
#[derive(Copy, Clone, Debug, Default)]
struct ButtonState {
    down: bool,
    last_down_frame: Option<u64>,
    last_up_frame: Option<u64>,
}

impl ButtonState {
    fn apply(&mut self, action: ButtonAction, next_frame: u64) {
        match action {
            ButtonAction::Pressed => {
                if !self.down {
                    self.down = true;
                    self.last_down_frame = Some(next_frame);
                }
            }
            ButtonAction::Released => {
                if self.down {
                    self.down = false;
                    self.last_up_frame = Some(next_frame);
                }
            }
        }
    }
}

/// Frame-edge input tracker.
///
/// Raw events recorded between frames become visible as edges once [`InputManager::update`]
/// advances the frame, and stay visible for exactly that frame.
#[derive(Debug, Default)]
pub struct InputManager {
    frame: u64,
    mouse_states: [ButtonState; 3],
    key_states: HashMap<Key, ButtonState>,
    pointer_pos: Vec2,
    pointer_prev: Vec2,
    pointer_delta: Vec2,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------- Low-level raw updates ----------------

    pub fn raw_mouse_event(&mut self, button: MouseButton, action: ButtonAction) {
        let next = self.frame + 1;
        self.mouse_states[button.index()].apply(action, next);
    }

    pub fn raw_key_event(&mut self, key: Key, action: ButtonAction) {
        let next = self.frame + 1;
        self.key_states.entry(key).or_default().apply(action, next);
    }

    pub fn raw_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer_pos = Vec2::new(x, y);
    }

    // ---------------- Per-frame update ----------------

    /// Call once per frame, after feeding the frame's raw events.
    pub fn update(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        self.pointer_delta = self.pointer_pos - self.pointer_prev;
        self.pointer_prev = self.pointer_pos;
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    #[inline]
    fn is_edge(&self, at: Option<u64>) -> bool {
        at == Some(self.frame)
    }

    // ---------------- winit ingestion ----------------

    #[cfg(feature = "winit")]
    pub fn ingest_winit_event(&mut self, event: &winit::event::WindowEvent) {
        use winit::event::WindowEvent;
        use winit::keyboard::PhysicalKey;

        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.raw_pointer_move(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let mb = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => return,
                };
                self.raw_mouse_event(mb, (*state).into());
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(key) = Key::from_winit(code) {
                        self.raw_key_event(key, event.state.into());
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(feature = "winit")]
impl From<winit::event::ElementState> for ButtonAction {
    fn from(state: winit::event::ElementState) -> Self {
        match state {
            winit::event::ElementState::Pressed => ButtonAction::Pressed,
            winit::event::ElementState::Released => ButtonAction::Released,
        }
    }
}

#[cfg(feature = "winit")]
impl Key {
    fn from_winit(code: winit::keyboard::KeyCode) -> Option<Key> {
        use winit::keyboard::KeyCode;
        Some(match code {
            KeyCode::F1 => Key::F1,
            KeyCode::F2 => Key::F2,
            KeyCode::F3 => Key::F3,
            KeyCode::F4 => Key::F4,
            KeyCode::F5 => Key::F5,
            KeyCode::F6 => Key::F6,
            KeyCode::F7 => Key::F7,
            KeyCode::F8 => Key::F8,
            KeyCode::F9 => Key::F9,
            KeyCode::F10 => Key::F10,
            KeyCode::F11 => Key::F11,
            KeyCode::F12 => Key::F12,
            KeyCode::Escape => Key::Escape,
            KeyCode::Tab => Key::Tab,
            KeyCode::Space => Key::Space,
            KeyCode::Enter => Key::Enter,
            KeyCode::ArrowLeft => Key::ArrowLeft,
            KeyCode::ArrowRight => Key::ArrowRight,
            KeyCode::ArrowUp => Key::ArrowUp,
            KeyCode::ArrowDown => Key::ArrowDown,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            _ => return None,
        })
    }
}

impl InputSource for InputManager {
    fn mouse_position(&self) -> Vec2 {
        self.pointer_pos
    }

    fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.is_edge(self.mouse_states[button.index()].last_down_frame)
    }

    fn is_button_released(&self, button: MouseButton) -> bool {
        self.is_edge(self.mouse_states[button.index()].last_up_frame)
    }

    fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_states[button.index()].down
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.key_states
            .get(&key)
            .map(|s| self.is_edge(s.last_down_frame))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_pressed_on_first_frame() {
        let mut input = InputManager::new();
        assert!(!input.is_button_pressed(MouseButton::Left));
        input.update();
        assert!(!input.is_button_pressed(MouseButton::Left));
        assert!(!input.is_key_pressed(Key::F3));
    }

    #[test]
    fn test_press_hold_release_edges() {
        let mut input = InputManager::new();
        input.raw_mouse_event(MouseButton::Left, ButtonAction::Pressed);
        input.update();
        assert!(input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_down(MouseButton::Left));
        assert!(!input.is_button_pressed(MouseButton::Right));

        input.update();
        assert!(!input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_down(MouseButton::Left));

        input.raw_mouse_event(MouseButton::Left, ButtonAction::Released);
        input.update();
        assert!(input.is_button_released(MouseButton::Left));
        assert!(!input.is_button_down(MouseButton::Left));

        input.update();
        assert!(!input.is_button_released(MouseButton::Left));
    }

    #[test]
    fn test_key_edge_and_pointer_delta() {
        let mut input = InputManager::new();
        input.raw_key_event(Key::PageDown, ButtonAction::Pressed);
        input.raw_pointer_move(4.0, 6.0);
        input.update();
        assert!(input.is_key_pressed(Key::PageDown));
        assert_eq!(input.mouse_position(), Vec2::new(4.0, 6.0));
        assert_eq!(input.pointer_delta(), Vec2::new(4.0, 6.0));

        input.raw_key_event(Key::PageDown, ButtonAction::Pressed);
        input.update();
        assert!(!input.is_key_pressed(Key::PageDown), "held key is not a new press");
    }
}
