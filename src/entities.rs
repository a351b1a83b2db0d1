//! Entity identities and the item catalogue.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fireable::{FireState, Fireable};
use crate::geometry::Vec2;
use crate::render::{Camera, Sprite, Z_AIRBORNE, Z_HELD_ITEM, Z_ITEM};

// ── Handles ───────────────────────────────────────────────────────────────────

/// Key into the manager's item map. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemHandle(pub u32);

/// Key into the manager's interactable map. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InteractableHandle(pub u32);

/// Index into the manager's pirate roster. The roster never shrinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PirateId(pub usize);

// ── Item catalogue ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Cannonball,
    Anchor,
    Rum,
    Lemon,
    Plank,
    Parrot,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemInfo {
    pub name: &'static str,
    pub damage_multiplier: f32,
    pub causes_damage: bool,
    pub fixes_damage: bool,
    pub grants_drunk: bool,
    pub cures_scurvy: bool,
    pub ai_may_launch: bool,
    pub ai_may_pickup: bool,
    pub barrel_spawnable: bool,
}

const NOTHING: ItemInfo = ItemInfo {
    name: "",
    damage_multiplier: 0.0,
    causes_damage: false,
    fixes_damage: false,
    grants_drunk: false,
    cures_scurvy: false,
    ai_may_launch: false,
    ai_may_pickup: false,
    barrel_spawnable: false,
};

/// Indexed by `ItemKind as usize`.
static ITEM_TABLE: [ItemInfo; 6] = [
    ItemInfo {
        name: "Cannonball",
        damage_multiplier: 1.0,
        causes_damage: true,
        ai_may_launch: true,
        ai_may_pickup: true,
        barrel_spawnable: true,
        ..NOTHING
    },
    ItemInfo {
        name: "Anchor",
        damage_multiplier: 3.0,
        causes_damage: true,
        ai_may_launch: true,
        ai_may_pickup: true,
        ..NOTHING
    },
    ItemInfo {
        name: "Bottle o' Rum",
        damage_multiplier: 0.5,
        grants_drunk: true,
        ai_may_pickup: true,
        barrel_spawnable: true,
        ..NOTHING
    },
    ItemInfo {
        name: "Lemon",
        cures_scurvy: true,
        ai_may_pickup: true,
        barrel_spawnable: true,
        ..NOTHING
    },
    ItemInfo {
        name: "Plank",
        damage_multiplier: 0.5,
        fixes_damage: true,
        ai_may_pickup: true,
        barrel_spawnable: true,
        ..NOTHING
    },
    ItemInfo {
        name: "Parrot",
        barrel_spawnable: true,
        ..NOTHING
    },
];

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Cannonball,
        ItemKind::Anchor,
        ItemKind::Rum,
        ItemKind::Lemon,
        ItemKind::Plank,
        ItemKind::Parrot,
    ];

    pub fn info(self) -> &'static ItemInfo {
        &ITEM_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Uniform pick among the kinds a barrel can produce.
    pub fn random_from_barrel(rng: &mut impl Rng) -> ItemKind {
        let eligible: Vec<ItemKind> = ItemKind::ALL
            .into_iter()
            .filter(|kind| kind.info().barrel_spawnable)
            .collect();
        eligible[rng.gen_range(0..eligible.len())]
    }

    /// What the enemy throws at us: mostly shot, some anchors, the odd gift.
    pub fn random_incoming(rng: &mut impl Rng) -> ItemKind {
        match rng.gen_range(0..20) {
            0..=13 => ItemKind::Cannonball,
            14..=16 => ItemKind::Anchor,
            17..=18 => ItemKind::Rum,
            _ => ItemKind::Lemon,
        }
    }
}

// ── Item ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Item {
    pub kind: ItemKind,
    pub position: Vec2,
    pub held: bool,
    /// Consumed by the manager's end-of-tick sweep.
    pub removal_mark: bool,
    pub fire: FireState,
    /// 0..1, desynchronises falls within one enemy volley.
    pub phase: f32,
    /// Deck row a falling item comes to rest on.
    pub landing_y: Option<f32>,
    pub flip_texture: bool,
}

impl Item {
    pub fn new(kind: ItemKind, position: Vec2, phase: f32) -> Self {
        Self {
            kind,
            position,
            held: false,
            removal_mark: false,
            fire: FireState::default(),
            phase,
            landing_y: None,
            flip_texture: false,
        }
    }

    pub fn info(&self) -> &'static ItemInfo {
        self.kind.info()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn can_be_picked_up(&self) -> bool {
        !self.held && !self.fire.hidden && !self.fire.fired && !self.removal_mark
    }

    /// Kinematic flight only; landing and hits are the manager's call.
    pub fn update(&mut self, dt: f32, fire_speed: f32, fire_spin: f32) {
        self.fire.advance(&mut self.position, dt, fire_speed, fire_spin);
    }

    pub fn draw(&self, cam: &mut Camera) {
        if self.fire.hidden {
            return;
        }
        let z = if self.fire.fired {
            Z_AIRBORNE
        } else if self.held {
            Z_HELD_ITEM
        } else {
            Z_ITEM
        };
        cam.blit_ex(
            Sprite::Item(self.kind),
            self.position,
            z,
            self.fire.rotation,
            self.flip_texture,
        );
    }
}

impl Fireable for Item {
    fn fire_state(&self) -> &FireState {
        &self.fire
    }

    fn fire_state_mut(&mut self) -> &mut FireState {
        &mut self.fire
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}
