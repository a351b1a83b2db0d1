//! Cannon Crew: a pirate crew defends its ship by loading whatever it can
//! find into cannons, while the enemy fires back and scurvy sets in.
//!
//! The library is the simulation. The terminal frontend in `main.rs` feeds it
//! an [`input::InputSnapshot`] every frame and draws whatever lands in the
//! [`render::Camera`] queue.

pub mod anim;
pub mod brain;
pub mod config;
pub mod entities;
pub mod events;
pub mod fireable;
pub mod geometry;
pub mod input;
pub mod interact;
pub mod manager;
pub mod pirate;
pub mod render;
pub mod schedule;
pub mod ship;
