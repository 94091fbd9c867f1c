//! Key tracking and the per-tick input snapshot consumed by the simulation.
//!
//! - **Level-triggered (held):** movement, jump and boost. A key that went down
//!   and back up between two snapshots still reads as held for the next
//!   snapshot, because its `just_pressed` edge survives until `end_frame()`.
//!
//! - **Edge-triggered (just_pressed):** fullscreen toggling. Reported once per
//!   physical press, never repeated while the key stays down.
//!
//! The simulation only ever sees an [`InputSnapshot`]; how keys get here
//! (window events, a replay file, a test) is the caller's business.

use std::collections::HashSet;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Jump.
    D,
    /// Speed boost while held.
    A,
    /// Fullscreen toggle.
    F,
    Q,
    Escape,
}

/// Immutable record of the buttons that matter for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Up arrow. Jumps, and keeps the character from facing south.
    pub up: bool,
    /// Dedicated jump key. Does not affect facing.
    pub jump: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Speed boost.
    pub modifier: bool,
    pub quit: bool,
    pub toggle_fullscreen: bool,
}

impl InputSnapshot {
    /// Nothing held.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            quit_requested: false,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Window-close style quit that is not tied to a key.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    fn is_active(&self, key: Key) -> bool {
        self.is_held(key) || self.is_just_pressed(key)
    }

    /// Sample the current key state into a snapshot for the next tick.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            up: self.is_active(Key::Up),
            jump: self.is_active(Key::D),
            down: self.is_active(Key::Down),
            left: self.is_active(Key::Left),
            right: self.is_active(Key::Right),
            modifier: self.is_active(Key::A),
            quit: self.quit_requested
                || self.is_just_pressed(Key::Q)
                || self.is_just_pressed(Key::Escape),
            toggle_fullscreen: self.is_just_pressed(Key::F),
        }
    }

    /// Clear edge state. Call only after a tick has consumed the snapshot.
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
