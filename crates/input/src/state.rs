//! Per-frame input state.
//!
//! The scheduler drains the platform event queue once per frame into an
//! [`InputState`]; game logic then queries it freely during its step.
//! Wheel delta and the resize marker are one-shot values scoped to the
//! frame; key and mouse-button sets track what is currently held.

use arrayvec::ArrayVec;
use crossterm::event::{KeyCode, MouseButton};

/// Maximum simultaneously tracked keys (typical keyboard rollover).
const KEY_CAP: usize = 16;

/// Snapshot of the input device state, updated once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    quit: bool,
    wheel: i32,
    resized: bool,
    mouse_x: u16,
    mouse_y: u16,
    keys: ArrayVec<KeyCode, KEY_CAP>,
    buttons: ArrayVec<MouseButton, 4>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a quit signal has been observed (Ctrl+C or an explicit
    /// [`InputState::request_quit`]).
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    /// Wheel movement accumulated since the last drain; positive is up.
    pub fn wheel(&self) -> i32 {
        self.wheel
    }

    /// Mouse position in canvas cell coordinates.
    pub fn mouse_pos(&self) -> (u16, u16) {
        (self.mouse_x, self.mouse_y)
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Reset the one-shot wheel delta. Called at the top of each drain.
    pub fn begin_frame(&mut self) {
        self.wheel = 0;
    }

    /// Take the one-shot resize marker.
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }

    pub fn mark_resized(&mut self) {
        self.resized = true;
    }

    pub fn add_wheel(&mut self, delta: i32) {
        self.wheel += delta;
    }

    pub fn set_mouse(&mut self, x: u16, y: u16) {
        self.mouse_x = x;
        self.mouse_y = y;
    }

    /// Mark a key as held. Presses past the rollover cap are dropped.
    pub fn press_key(&mut self, key: KeyCode) {
        if !self.keys.contains(&key) {
            let _ = self.keys.try_push(key);
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys.retain(|k| *k != key);
    }

    pub fn press_button(&mut self, button: MouseButton) {
        if !self.buttons.contains(&button) {
            let _ = self.buttons.try_push(button);
        }
    }

    pub fn release_button(&mut self, button: MouseButton) {
        self.buttons.retain(|b| *b != button);
    }
}
