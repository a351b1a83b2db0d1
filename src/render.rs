//! Presentation seam. Entities describe what to draw with [`Sprite`] values
//! pushed through a [`Camera`]; turning those into pixels or glyphs is left
//! to whoever drains the queue.

use crate::anim::Frame;
use crate::entities::ItemKind;
use crate::geometry::{Rect, Vec2};
use crate::ship::TileKind;

// ── Z layers ─────────────────────────────────────────────────────────────────

pub const Z_MAP: i32 = -5;
pub const Z_CANNON: i32 = -2;
pub const Z_ITEM: i32 = -1;
pub const Z_PIRATE: i32 = 0;
pub const Z_HELD_ITEM: i32 = 1;
pub const Z_MARKER: i32 = 5;
pub const Z_AIRBORNE: i32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CannonLook {
    Idle,
    Selectable,
    Firing,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sprite {
    Tile(TileKind),
    Pirate { player: bool, frame: Frame },
    Item(ItemKind),
    Cannon(CannonLook),
    /// Remaining cooldown as a 0..=1 fraction of the full duration.
    CooldownBar(f32),
    Barrel { ready: bool, highlighted: bool },
    DamageSpot { highlighted: bool },
    /// Bobbing arrow above the player.
    PlayerMarker,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawOp {
    pub sprite: Sprite,
    /// Screen-space position of the sprite's centre.
    pub screen: Vec2,
    pub z: i32,
    pub rotation: f32,
    pub flipped: bool,
}

/// World→screen transform plus a deferred, z-ordered draw queue.
#[derive(Clone, Debug)]
pub struct Camera {
    /// World position shown at the screen origin.
    pub offset: Vec2,
    /// Screen units per world unit, per axis.
    pub scale: Vec2,
    queue: Vec<DrawOp>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::new(1.0, 1.0))
    }
}

impl Camera {
    pub fn new(offset: Vec2, scale: Vec2) -> Self {
        Self {
            offset,
            scale,
            queue: Vec::new(),
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let rel = world - self.offset;
        Vec2::new(rel.x * self.scale.x, rel.y * self.scale.y)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x / self.scale.x, screen.y / self.scale.y) + self.offset
    }

    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let top_left = self.world_to_screen(Vec2::new(rect.x, rect.y));
        Rect::new(
            top_left.x,
            top_left.y,
            rect.w * self.scale.x,
            rect.h * self.scale.y,
        )
    }

    pub fn blit(&mut self, sprite: Sprite, world: Vec2, z: i32) {
        self.blit_ex(sprite, world, z, 0.0, false);
    }

    pub fn blit_ex(&mut self, sprite: Sprite, world: Vec2, z: i32, rotation: f32, flipped: bool) {
        let screen = self.world_to_screen(world);
        self.queue.push(DrawOp {
            sprite,
            screen,
            z,
            rotation,
            flipped,
        });
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Takes every queued op, lowest z first. Ops on the same layer keep
    /// their submission order.
    pub fn drain_sorted(&mut self) -> Vec<DrawOp> {
        let mut ops = std::mem::take(&mut self.queue);
        ops.sort_by_key(|op| op.z);
        ops
    }
}
