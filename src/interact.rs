//! Stationary things a pirate can use: cannons, item barrels and hull
//! breaches.
//!
//! `interact` only touches the interactable's own state. Whatever it means
//! for the rest of the world comes back as an [`InteractOutcome`] for the
//! manager to carry out.

use rand::Rng;

use crate::anim::{Animator, CANNON_CLIPS, CANNON_FIRING, CANNON_IDLE, CANNON_SELECTABLE};
use crate::entities::{ItemInfo, ItemKind};
use crate::geometry::{Rect, Vec2};
use crate::render::{Camera, CannonLook, Sprite, Z_CANNON, Z_ITEM, Z_MARKER};
use crate::ship::{DRAW_SCALE, TILE_SIZE};

/// Fraction of the firing clip that plays before the shot leaves the muzzle.
pub const LAUNCH_POINT: f32 = 4.0 / 6.0;

// ── Variants ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Cannon {
    pub cooldown: f32,
    pub max_cooldown: f32,
    pub anim: Animator,
}

impl Cannon {
    pub fn new(max_cooldown: f32) -> Self {
        Self {
            cooldown: 0.0,
            max_cooldown,
            anim: Animator::new(CANNON_CLIPS),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub fn is_firing(&self) -> bool {
        self.anim.selected_key() == CANNON_FIRING
    }

    /// Start a shot. Returns the delay until the fireable should leave the
    /// muzzle, or `None` while still cooling down.
    pub fn start_firing(&mut self) -> Option<f32> {
        if !self.is_ready() {
            return None;
        }
        self.anim.set(CANNON_FIRING, true, true);
        self.cooldown = self.max_cooldown;
        let clip = self.anim.duration(CANNON_FIRING).unwrap_or(1.0);
        Some(clip * LAUNCH_POINT)
    }

    pub fn look(&self, highlighted: bool) -> CannonLook {
        if self.is_firing() {
            CannonLook::Firing
        } else if highlighted && self.is_ready() {
            CannonLook::Selectable
        } else {
            CannonLook::Idle
        }
    }
}

#[derive(Clone, Debug)]
pub struct ItemBarrel {
    pub cooldown: f32,
    pub max_cooldown: f32,
}

#[derive(Clone, Debug)]
pub struct DamageSpot {
    /// Health this breach took, returned on repair.
    pub damage: f32,
}

#[derive(Clone, Debug)]
pub enum InteractableKind {
    Cannon(Cannon),
    ItemBarrel(ItemBarrel),
    DamageSpot(DamageSpot),
}

/// What the manager must do after a successful interaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractOutcome {
    Nothing,
    /// Launch the user's held item, or the user when empty-handed.
    FireCannon,
    /// Hand a fresh item of this kind to the user.
    SpawnItem(ItemKind),
    /// Consume the user's held fixer and restore this much hull.
    Repaired { damage: f32 },
}

// ── Interactable ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Interactable {
    pub position: Vec2,
    pub collider: Rect,
    pub highlight: bool,
    pub removal_mark: bool,
    pub kind: InteractableKind,
}

impl Interactable {
    pub fn cannon(position: Vec2, cooldown: f32) -> Self {
        Self::with_kind(position, InteractableKind::Cannon(Cannon::new(cooldown)))
    }

    pub fn barrel(position: Vec2, cooldown: f32) -> Self {
        Self::with_kind(
            position,
            InteractableKind::ItemBarrel(ItemBarrel {
                cooldown: 0.0,
                max_cooldown: cooldown,
            }),
        )
    }

    pub fn damage_spot(position: Vec2, damage: f32) -> Self {
        Self::with_kind(position, InteractableKind::DamageSpot(DamageSpot { damage }))
    }

    fn with_kind(position: Vec2, kind: InteractableKind) -> Self {
        let mut interactable = Self {
            position,
            collider: Rect::default(),
            highlight: false,
            removal_mark: false,
            kind,
        };
        interactable.collider = interactable.compute_collider();
        interactable
    }

    pub fn as_cannon(&self) -> Option<&Cannon> {
        match &self.kind {
            InteractableKind::Cannon(cannon) => Some(cannon),
            _ => None,
        }
    }

    pub fn as_cannon_mut(&mut self) -> Option<&mut Cannon> {
        match &mut self.kind {
            InteractableKind::Cannon(cannon) => Some(cannon),
            _ => None,
        }
    }

    pub fn is_cannon(&self) -> bool {
        matches!(self.kind, InteractableKind::Cannon(_))
    }

    pub fn is_barrel(&self) -> bool {
        matches!(self.kind, InteractableKind::ItemBarrel(_))
    }

    pub fn is_damage_spot(&self) -> bool {
        matches!(self.kind, InteractableKind::DamageSpot(_))
    }

    /// Whether pirates bump into this.
    pub fn is_solid(&self) -> bool {
        !self.is_damage_spot()
    }

    /// Where cannon shots appear.
    pub fn muzzle(&self) -> Vec2 {
        self.position - Vec2::new(0.0, TILE_SIZE * 0.5)
    }

    /// Whether a user holding `user_holding` could use this right now.
    pub fn can_highlight(&self, user_holding: Option<&ItemInfo>) -> bool {
        if self.removal_mark {
            return false;
        }
        match &self.kind {
            InteractableKind::Cannon(cannon) => cannon.is_ready(),
            InteractableKind::ItemBarrel(barrel) => {
                barrel.cooldown <= 0.0 && user_holding.is_none()
            }
            InteractableKind::DamageSpot(_) => user_holding.is_some_and(|info| info.fixes_damage),
        }
    }

    pub fn interact(
        &mut self,
        user_holding: Option<&ItemInfo>,
        rng: &mut impl Rng,
    ) -> InteractOutcome {
        if self.removal_mark {
            return InteractOutcome::Nothing;
        }
        match &mut self.kind {
            InteractableKind::Cannon(cannon) => {
                if cannon.is_ready() {
                    InteractOutcome::FireCannon
                } else {
                    InteractOutcome::Nothing
                }
            }
            InteractableKind::ItemBarrel(barrel) => {
                if barrel.cooldown > 0.0 || user_holding.is_some() {
                    return InteractOutcome::Nothing;
                }
                barrel.cooldown = barrel.max_cooldown;
                InteractOutcome::SpawnItem(ItemKind::random_from_barrel(rng))
            }
            InteractableKind::DamageSpot(spot) => match user_holding {
                Some(info) if info.fixes_damage => {
                    self.removal_mark = true;
                    InteractOutcome::Repaired {
                        damage: spot.damage,
                    }
                }
                _ => InteractOutcome::Nothing,
            },
        }
    }

    pub fn update(&mut self, dt: f32) {
        let highlight = self.highlight;
        match &mut self.kind {
            InteractableKind::Cannon(cannon) => {
                cannon.cooldown = (cannon.cooldown - dt).max(0.0);
                cannon.anim.tick(dt);
                if !cannon.is_firing() {
                    let key = if highlight && cannon.is_ready() {
                        CANNON_SELECTABLE
                    } else {
                        CANNON_IDLE
                    };
                    cannon.anim.set(key, false, true);
                }
            }
            InteractableKind::ItemBarrel(barrel) => {
                barrel.cooldown = (barrel.cooldown - dt).max(0.0);
            }
            InteractableKind::DamageSpot(_) => {}
        }
        self.collider = self.compute_collider();
    }

    fn compute_collider(&self) -> Rect {
        // (offset, size) in sheet pixels relative to the centre
        let (offset, size) = match self.kind {
            InteractableKind::Cannon(_) => (Vec2::new(0.0, -4.0), Vec2::new(12.0, 6.0)),
            InteractableKind::ItemBarrel(_) => (Vec2::ZERO, Vec2::new(10.0, 10.0)),
            InteractableKind::DamageSpot(_) => (Vec2::ZERO, Vec2::new(8.0, 6.0)),
        };
        Rect::from_center(self.position + offset * DRAW_SCALE, size * DRAW_SCALE)
    }

    pub fn draw(&self, cam: &mut Camera) {
        match &self.kind {
            InteractableKind::Cannon(cannon) => {
                cam.blit(Sprite::Cannon(cannon.look(self.highlight)), self.position, Z_CANNON);
                if cannon.cooldown > 0.0 {
                    let fraction = cannon.cooldown / cannon.max_cooldown;
                    let bar = self.position + Vec2::new(0.0, TILE_SIZE * 0.6);
                    cam.blit(Sprite::CooldownBar(fraction), bar, Z_MARKER);
                }
            }
            InteractableKind::ItemBarrel(barrel) => cam.blit(
                Sprite::Barrel {
                    ready: barrel.cooldown <= 0.0,
                    highlighted: self.highlight,
                },
                self.position,
                Z_CANNON,
            ),
            InteractableKind::DamageSpot(_) => cam.blit(
                Sprite::DamageSpot {
                    highlighted: self.highlight,
                },
                self.position,
                Z_ITEM,
            ),
        }
    }
}
