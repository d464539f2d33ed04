use std::collections::HashSet;

use nalgebra::Vector2;

/// Named keys the engine reacts to. Translation from actual window key codes
/// happens at the window layer, so the core never sees backend key types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    Sprint,
    ToggleMouse,
}

/// Pressed-key set plus mouse movement accumulated since the last tick.
/// Listeners write into this directly and immediately; a tick reads whatever
/// state exists at the moment it runs. There is no queuing or double
/// buffering - everything happens on one logical thread.
#[derive(Debug, Default)]
pub struct InputState {
    pressed: HashSet<Key>,
    mouse_delta: Vector2<f32>,
}

impl InputState {
    pub fn new() -> InputState {
        return Default::default();
    }

    pub fn set_pressed(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.pressed.insert(key);
        } else {
            self.pressed.remove(&key);
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        return self.pressed.contains(&key);
    }

    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.x += dx;
        self.mouse_delta.y += dy;
    }

    /// Returns the mouse movement accumulated since the last call and resets
    /// the accumulator.
    pub fn take_mouse_delta(&mut self) -> Vector2<f32> {
        let delta = self.mouse_delta;
        self.mouse_delta = Vector2::zeros();
        return delta;
    }
}
