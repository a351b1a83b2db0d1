//! Keyboard state handed to the simulation once per tick.
//!
//! The frontend owns polling; the core only asks "is this key held" and
//! "was this key pressed this frame".

use crate::geometry::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Crouch,
    Interact,
    Use,
}

const KEY_COUNT: usize = 7;

impl Key {
    const fn index(self) -> usize {
        match self {
            Key::Up => 0,
            Key::Down => 1,
            Key::Left => 2,
            Key::Right => 3,
            Key::Crouch => 4,
            Key::Interact => 5,
            Key::Use => 6,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: [bool; KEY_COUNT],
    pressed: [bool; KEY_COUNT],
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_held(mut self, key: Key, is_held: bool) -> Self {
        self.held[key.index()] = is_held;
        self
    }

    /// Marks `key` as pressed this frame. A fresh press also counts as held.
    pub fn with_pressed(mut self, key: Key) -> Self {
        self.pressed[key.index()] = true;
        self.held[key.index()] = true;
        self
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held[key.index()]
    }

    pub fn just_pressed(&self, key: Key) -> bool {
        self.pressed[key.index()]
    }

    /// Normalised movement direction from the held arrow/WASD keys.
    pub fn movement(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.is_held(Key::Up) {
            dir.y -= 1.0;
        }
        if self.is_held(Key::Left) {
            dir.x -= 1.0;
        }
        if self.is_held(Key::Down) {
            dir.y += 1.0;
        }
        if self.is_held(Key::Right) {
            dir.x += 1.0;
        }
        dir.normalized()
    }
}
