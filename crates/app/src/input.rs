//! Keyboard input state
//!
//! Keys are tracked two ways: `keys` holds everything currently down, and
//! `pressed` holds keys whose press event arrived since the last frame. The
//! runtime clears `pressed` after each frame, which gives edge-triggered
//! toggles without the repeat-while-held behaviour of raw polling.

use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Input snapshot for the current frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Currently held keys
    pub keys: HashSet<KeyCode>,
    /// Keys that went down since the previous frame
    pub pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a key is currently held
    #[inline]
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Check if a key went down this frame
    #[inline]
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Record a key press; auto-repeat of a held key is not a new press
    pub fn press(&mut self, key: KeyCode) {
        if self.keys.insert(key) {
            self.pressed.insert(key);
        }
    }

    /// Record a key release
    pub fn release(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    /// Forget per-frame edges (called by the runtime after each frame)
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_edge_triggered() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyF);
        assert!(input.just_pressed(KeyCode::KeyF));
        assert!(input.is_key_down(KeyCode::KeyF));

        input.end_frame();
        // Auto-repeat while held must not register a second press
        input.press(KeyCode::KeyF);
        assert!(!input.just_pressed(KeyCode::KeyF));
        assert!(input.is_key_down(KeyCode::KeyF));
    }

    #[test]
    fn test_release_then_press_again() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyN);
        input.end_frame();
        input.release(KeyCode::KeyN);
        assert!(!input.is_key_down(KeyCode::KeyN));

        input.press(KeyCode::KeyN);
        assert!(input.just_pressed(KeyCode::KeyN));
    }
}
