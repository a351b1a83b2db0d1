//! Shared state for anything a cannon can shoot: items and pirates alike.
//!
//! Flight is kinematic. A fired object moves vertically at a constant speed
//! and spins at a constant rate until the manager lands it or removes it.

use crate::geometry::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireState {
    pub hidden: bool,
    pub fired: bool,
    /// Travel direction while fired: up towards the enemy, or down onto the deck.
    pub fired_up: bool,
    /// Degrees.
    pub rotation: f32,
}

impl Default for FireState {
    fn default() -> Self {
        Self {
            hidden: false,
            fired: false,
            fired_up: true,
            rotation: 0.0,
        }
    }
}

impl FireState {
    /// One frame of flight; no-op unless fired.
    pub fn advance(&mut self, position: &mut Vec2, dt: f32, speed: f32, spin: f32) {
        if !self.fired {
            return;
        }
        let dir = if self.fired_up { -1.0 } else { 1.0 };
        position.y += speed * dt * dir;
        self.rotation = (self.rotation + spin * dt) % 360.0;
    }
}

pub trait Fireable {
    fn fire_state(&self) -> &FireState;
    fn fire_state_mut(&mut self) -> &mut FireState;
    fn set_position(&mut self, position: Vec2);

    fn hide(&mut self) {
        self.fire_state_mut().hidden = true;
    }

    fn show(&mut self) {
        self.fire_state_mut().hidden = false;
    }

    fn is_hidden(&self) -> bool {
        self.fire_state().hidden
    }

    fn is_fired(&self) -> bool {
        self.fire_state().fired
    }

    /// Appear at a cannon muzzle and start flying towards the enemy.
    fn launch(&mut self, muzzle: Vec2) {
        self.set_position(muzzle);
        self.show();
        let state = self.fire_state_mut();
        state.fired = true;
        state.fired_up = true;
        state.rotation = 0.0;
    }

    /// Start falling from `from` towards the deck.
    fn drop_from(&mut self, from: Vec2) {
        self.set_position(from);
        self.show();
        let state = self.fire_state_mut();
        state.fired = true;
        state.fired_up = false;
    }

    /// Stop flying and hand control back to normal movement.
    fn land(&mut self) {
        let state = self.fire_state_mut();
        state.fired = false;
        state.fired_up = true;
        state.rotation = 0.0;
    }
}
