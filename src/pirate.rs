//! Crew members: the player and the AI-driven mateys.
//!
//! A pirate moves along an intent vector (keyboard for the player, target
//! seeking for the crew), gets pushed out of whatever it walks into, and
//! carries two status clocks: scurvy, which kills the player when it runs
//! out, and drunkenness, which makes everyone fast and wobbly.

use rand::Rng;

use crate::anim::{pirate_clip_key, Animator, PIRATE_CLIPS, PIRATE_DEAD};
use crate::brain::Brain;
use crate::config::GameConfig;
use crate::entities::ItemHandle;
use crate::fireable::{FireState, Fireable};
use crate::geometry::{resolve_collision, Rect, Vec2};
use crate::render::{Camera, Sprite, Z_AIRBORNE, Z_MARKER, Z_PIRATE};
use crate::ship::DRAW_SCALE;

/// Colliders whose centre is further than this (squared) are skipped.
pub const BROAD_PHASE_DIST_SQ: f32 = 20_000.0;
pub const TARGET_TOLERANCE: f32 = 8.0;
const WOBBLE_FREQUENCY: f32 = 10.0;
const WOBBLE_AMPLITUDE: f32 = 0.3;
/// Where a held item sits relative to its holder.
pub const HOLD_OFFSET: Vec2 = Vec2::new(8.0, -8.0 * DRAW_SCALE);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PirateTick {
    /// Scurvy ran out this tick.
    pub died: bool,
}

#[derive(Clone, Debug)]
pub struct Pirate {
    pub player: bool,
    pub position: Vec2,
    pub speed: f32,
    pub reach: f32,
    pub held_item: Option<ItemHandle>,
    pub crouched: bool,
    pub scurvy_time: f32,
    pub drunk_time: f32,
    pub can_move: bool,
    pub dead: bool,
    pub fire: FireState,
    /// Deck height a launched pirate comes back down to.
    pub landing_y: f32,
    pub collision_box: Rect,
    pub anim: Animator,
    /// Where the brain wants this pirate to walk. Unused for the player.
    pub target_position: Vec2,
    pub brain: Option<Box<Brain>>,
}

impl Pirate {
    fn new(player: bool, position: Vec2, config: &GameConfig, brain: Option<Box<Brain>>) -> Self {
        let mut pirate = Self {
            player,
            position,
            speed: config.pirate_speed,
            reach: config.pirate_reach,
            held_item: None,
            crouched: false,
            scurvy_time: config.scurvy_max,
            drunk_time: 0.0,
            can_move: true,
            dead: false,
            fire: FireState::default(),
            landing_y: position.y,
            collision_box: Rect::default(),
            anim: Animator::new(PIRATE_CLIPS),
            target_position: position,
            brain,
        };
        pirate.collision_box = pirate.frame_box();
        pirate
    }

    pub fn new_player(position: Vec2, config: &GameConfig) -> Self {
        Self::new(true, position, config, None)
    }

    pub fn new_crew(position: Vec2, config: &GameConfig, brain: Brain) -> Self {
        Self::new(false, position, config, Some(Box::new(brain)))
    }

    pub fn is_drunk(&self) -> bool {
        self.drunk_time > 0.0
    }

    pub fn in_reach(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.reach * self.reach
    }

    pub fn at_target(&self) -> bool {
        self.position.distance_squared(self.target_position) <= TARGET_TOLERANCE * TARGET_TOLERANCE
    }

    /// Unit step towards `target_position`, zero once within tolerance.
    pub fn seek_movement(&self) -> Vec2 {
        if self.at_target() {
            Vec2::ZERO
        } else {
            (self.target_position - self.position).normalized()
        }
    }

    pub fn drink(&mut self, config: &GameConfig, rng: &mut impl Rng) {
        self.drunk_time = rng.gen_range(config.drunk_min..=config.drunk_max);
    }

    pub fn eat_cure(&mut self, config: &GameConfig) {
        self.scurvy_time = config.scurvy_max;
    }

    /// Collision box sized from the current animation frame.
    fn frame_box(&self) -> Rect {
        let (w, h) = self.anim.current_frame().size;
        Rect::from_center(
            self.position,
            Vec2::new(f32::from(w), f32::from(h)) * DRAW_SCALE,
        )
    }

    fn speed_factor(&self, drunk: bool, config: &GameConfig) -> f32 {
        let mut factor = 1.0;
        if self.crouched {
            factor *= config.crouch_speed_factor;
        } else if self.held_item.is_some() {
            factor *= config.holding_speed_factor;
        }
        if drunk {
            factor *= config.drunk_speed_factor;
        }
        factor
    }

    pub fn update(
        &mut self,
        dt: f32,
        intent: Vec2,
        colliders: &[Rect],
        config: &GameConfig,
    ) -> PirateTick {
        let mut tick = PirateTick::default();
        if self.fire.hidden {
            return tick;
        }
        self.anim.tick(dt);

        if self.fire.fired {
            self.fire
                .advance(&mut self.position, dt, config.fire_speed, config.fire_spin);
            return tick;
        }

        let mut movement = if self.can_move { intent } else { Vec2::ZERO };

        let drunk = self.is_drunk();
        if drunk {
            let wobble = (self.drunk_time * WOBBLE_FREQUENCY).sin() * WOBBLE_AMPLITUDE;
            movement += movement.perp() * wobble;
            self.drunk_time = (self.drunk_time - dt).max(0.0);
        }

        if self.player && !self.dead {
            let rate = if drunk { 0.5 } else { 1.0 };
            self.scurvy_time -= dt * rate;
            if self.scurvy_time <= 0.0 {
                self.scurvy_time = 0.0;
                self.dead = true;
                self.can_move = false;
                movement = Vec2::ZERO;
                self.anim.set(PIRATE_DEAD, false, false);
                tick.died = true;
            }
        }

        if !self.dead {
            let key = pirate_clip_key(self.crouched, !movement.is_zero(), self.held_item.is_some());
            self.anim.set(&key, false, true);
        }
        if movement.x != 0.0 {
            self.anim.flipped = movement.x < 0.0;
        }

        self.collision_box = self.frame_box();

        let step = movement * (dt * self.speed * self.speed_factor(drunk, config));
        self.position += step;
        self.collision_box = self.collision_box.translated(step);

        for collider in colliders {
            if collider.center().distance_squared(self.position) >= BROAD_PHASE_DIST_SQ {
                continue;
            }
            let push = resolve_collision(collider, &self.collision_box);
            self.position += push;
            self.collision_box = self.collision_box.translated(push);
        }

        tick
    }

    pub fn draw(&self, cam: &mut Camera) {
        if self.fire.hidden {
            return;
        }
        let z = if self.fire.fired { Z_AIRBORNE } else { Z_PIRATE };
        cam.blit_ex(
            Sprite::Pirate {
                player: self.player,
                frame: self.anim.current_frame(),
            },
            self.position,
            z,
            self.fire.rotation,
            self.anim.flipped,
        );
        if self.player {
            let lift = if self.held_item.is_some() { 72.0 } else { 48.0 };
            cam.blit(Sprite::PlayerMarker, self.position - Vec2::new(0.0, lift), Z_MARKER);
        }
    }
}

impl Fireable for Pirate {
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
