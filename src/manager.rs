//! The shared world and its per-frame update.
//!
//! `GameManager` owns every pirate, item and interactable. Nothing else
//! mutates them: brains borrow the manager while they think, delayed actions
//! wait in the manager's scheduler, and sounds and scene changes leave as
//! queued [`GameEvent`]s.
//!
//! All randomness comes through the `rng` argument so callers control
//! determinism (tests use a seeded `StdRng`).

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, info};

use crate::brain::Brain;
use crate::config::GameConfig;
use crate::entities::{InteractableHandle, Item, ItemHandle, ItemInfo, ItemKind, PirateId};
use crate::events::{GameEvent, SceneChange, Sound};
use crate::fireable::Fireable;
use crate::geometry::{Rect, Vec2};
use crate::input::{InputSnapshot, Key};
use crate::interact::{InteractOutcome, Interactable};
use crate::pirate::{Pirate, HOLD_OFFSET};
use crate::render::Camera;
use crate::schedule::Scheduler;
use crate::ship::{ShipMap, PLAYFIELD, TILE_SIZE};

/// Damage multiplier for a pirate landing on the enemy deck.
pub const BOARDING_MULTIPLIER: f32 = 2.0;
/// Where a dropped item lands relative to the pirate.
const DROP_OFFSET: Vec2 = Vec2::new(0.0, 16.0);

const TEAM_ADJECTIVES: [&str; 8] = [
    "Salty", "Rusty", "Soggy", "Scurvy", "Jolly", "Crimson", "Barnacled", "Rotten",
];
const TEAM_NOUNS: [&str; 8] = [
    "Gulls", "Krakens", "Sea Dogs", "Barnacles", "Buccaneers", "Parrots", "Squids", "Mutineers",
];

/// Which thing a cannon is about to launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireableRef {
    Item(ItemHandle),
    Pirate(PirateId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Second half of a cannon shot, synchronised with the firing animation.
    Launch {
        cannon: InteractableHandle,
        fireable: FireableRef,
    },
    /// The player's death animation has played out.
    DeathSequenceDone,
}

/// What happened to a flying item this frame.
enum Flight {
    ReachedEnemy(ItemKind),
    HitDeck(Vec2, ItemKind),
    Settled,
}

pub struct GameManager {
    pub config: GameConfig,
    pub ship_map: ShipMap,
    /// Insertion order is update and draw order.
    pub active_pirates: Vec<Pirate>,
    pub items: BTreeMap<ItemHandle, Item>,
    pub interactables: BTreeMap<InteractableHandle, Interactable>,
    pub boat_health: f32,
    pub enemy_health: f32,
    pub team_name: String,
    pub enemy_team_name: String,
    /// Seconds until the next enemy volley.
    pub enemy_fire_timer: f32,
    player: PirateId,
    next_item: u32,
    next_interactable: u32,
    scheduler: Scheduler<ScheduledAction>,
    events: Vec<GameEvent>,
    transitioned: bool,
}

impl GameManager {
    pub fn new(config: GameConfig, ship_map: ShipMap, rng: &mut impl Rng) -> Self {
        let (team_name, enemy_team_name) = team_names(rng);
        let enemy_fire_timer =
            rng.gen_range(config.enemy_fire_min_interval..=config.enemy_fire_max_interval);

        let mut manager = Self {
            boat_health: config.boat_health,
            enemy_health: config.enemy_health,
            config,
            ship_map,
            active_pirates: Vec::new(),
            items: BTreeMap::new(),
            interactables: BTreeMap::new(),
            team_name,
            enemy_team_name,
            enemy_fire_timer,
            player: PirateId(0),
            next_item: 0,
            next_interactable: 0,
            scheduler: Scheduler::new(),
            events: Vec::new(),
            transitioned: false,
        };

        for (x, y) in manager.ship_map.cannon_tiles.clone() {
            let at = manager.ship_map.tile_center(x, y);
            manager.spawn_interactable(Interactable::cannon(at, manager.config.cannon_cooldown));
        }
        for (x, y) in manager.ship_map.barrel_tiles.clone() {
            let at = manager.ship_map.tile_center(x, y);
            manager.spawn_interactable(Interactable::barrel(at, manager.config.barrel_cooldown));
        }

        let (px, py) = manager.ship_map.player_spawn;
        let player = Pirate::new_player(manager.ship_map.tile_center(px, py), &manager.config);
        manager.player = manager.add_pirate(player);

        let spawns = manager.ship_map.crew_spawns.clone();
        for index in 0..manager.config.crew_size {
            let (x, y) = spawns
                .get(index % spawns.len().max(1))
                .copied()
                .unwrap_or((px, py));
            let mate = Pirate::new_crew(manager.ship_map.tile_center(x, y), &manager.config, Brain::crew());
            manager.add_pirate(mate);
        }

        let deck = manager.ship_map.deck_bounds();
        for i in 0..4 {
            let at = Vec2::new(deck.left() + TILE_SIZE * (3.5 + 2.0 * i as f32), deck.bottom() - TILE_SIZE * 0.5);
            manager.spawn_item(ItemKind::Cannonball, at, 0.0);
        }

        info!(
            team = %manager.team_name,
            enemy = %manager.enemy_team_name,
            crew = manager.active_pirates.len(),
            "round started"
        );
        manager
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    pub fn player_id(&self) -> PirateId {
        self.player
    }

    pub fn player(&self) -> &Pirate {
        self.pirate(self.player)
    }

    pub fn pirate(&self, id: PirateId) -> &Pirate {
        &self.active_pirates[id.0]
    }

    pub fn pirate_mut(&mut self, id: PirateId) -> &mut Pirate {
        &mut self.active_pirates[id.0]
    }

    pub fn item(&self, handle: ItemHandle) -> Option<&Item> {
        self.items.get(&handle)
    }

    /// The item, if it is lying around free to be picked up.
    pub fn pickable_item(&self, handle: ItemHandle) -> Option<&Item> {
        self.items.get(&handle).filter(|item| item.can_be_picked_up())
    }

    pub fn interactable(&self, handle: InteractableHandle) -> Option<&Interactable> {
        self.interactables.get(&handle)
    }

    /// The interactable, unless it is gone or about to be.
    pub fn live_interactable(&self, handle: InteractableHandle) -> Option<&Interactable> {
        self.interactables.get(&handle).filter(|i| !i.removal_mark)
    }

    pub fn held_item_info(&self, id: PirateId) -> Option<&'static ItemInfo> {
        self.pirate(id)
            .held_item
            .and_then(|handle| self.items.get(&handle))
            .map(Item::info)
    }

    pub fn held_item_name(&self, id: PirateId) -> Option<&'static str> {
        self.held_item_info(id).map(|info| info.name)
    }

    /// Snapshot of loose items whose kind satisfies `wanted`.
    pub fn loose_items(&self, wanted: impl Fn(&ItemInfo) -> bool) -> Vec<ItemHandle> {
        self.items
            .iter()
            .filter(|(_, item)| item.can_be_picked_up() && wanted(item.info()))
            .map(|(&handle, _)| handle)
            .collect()
    }

    fn live_interactables_where(&self, wanted: impl Fn(&Interactable) -> bool) -> Vec<InteractableHandle> {
        self.interactables
            .iter()
            .filter(|(_, i)| !i.removal_mark && wanted(i))
            .map(|(&handle, _)| handle)
            .collect()
    }

    pub fn cannons(&self) -> Vec<InteractableHandle> {
        self.live_interactables_where(Interactable::is_cannon)
    }

    pub fn barrels(&self) -> Vec<InteractableHandle> {
        self.live_interactables_where(Interactable::is_barrel)
    }

    pub fn damage_spots(&self) -> Vec<InteractableHandle> {
        self.live_interactables_where(Interactable::is_damage_spot)
    }

    /// Closest of `handles` to `from`.
    pub fn nearest(&self, from: Vec2, handles: Vec<InteractableHandle>) -> Option<InteractableHandle> {
        handles
            .into_iter()
            .filter_map(|handle| {
                self.interactables
                    .get(&handle)
                    .map(|i| (handle, i.position.distance_squared(from)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle)
    }

    pub fn is_over(&self) -> bool {
        self.transitioned
    }

    pub fn pending_scheduled(&self) -> usize {
        self.scheduler.len()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn post(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn play(&mut self, sound: Sound) {
        self.post(GameEvent::PlaySound(sound));
    }

    // ── Spawning ──────────────────────────────────────────────────────────────

    pub fn add_pirate(&mut self, pirate: Pirate) -> PirateId {
        self.active_pirates.push(pirate);
        PirateId(self.active_pirates.len() - 1)
    }

    pub fn spawn_item(&mut self, kind: ItemKind, position: Vec2, phase: f32) -> ItemHandle {
        let handle = ItemHandle(self.next_item);
        self.next_item += 1;
        self.items.insert(handle, Item::new(kind, position, phase));
        handle
    }

    pub fn spawn_interactable(&mut self, interactable: Interactable) -> InteractableHandle {
        let handle = InteractableHandle(self.next_interactable);
        self.next_interactable += 1;
        self.interactables.insert(handle, interactable);
        handle
    }

    // ── Pirate actions ────────────────────────────────────────────────────────

    fn can_act(&self, id: PirateId) -> bool {
        let pirate = self.pirate(id);
        !pirate.dead && !pirate.fire.fired && !pirate.fire.hidden
    }

    pub fn pickup_item(&mut self, id: PirateId, handle: ItemHandle) -> bool {
        if !self.can_act(id) || self.pirate(id).held_item.is_some() {
            return false;
        }
        let pirate = &mut self.active_pirates[id.0];
        let Some(item) = self.items.get_mut(&handle) else {
            return false;
        };
        if !item.can_be_picked_up() || !pirate.in_reach(item.position) {
            return false;
        }
        item.held = true;
        pirate.held_item = Some(handle);
        debug!(pirate = id.0, item = ?handle, kind = ?item.kind, "picked up");
        self.play(Sound::Pickup);
        true
    }

    pub fn drop_held(&mut self, id: PirateId) -> bool {
        let pirate = &mut self.active_pirates[id.0];
        let Some(handle) = pirate.held_item.take() else {
            return false;
        };
        if let Some(item) = self.items.get_mut(&handle) {
            item.held = false;
            item.position = pirate.position + DROP_OFFSET;
        }
        self.play(Sound::Drop);
        true
    }

    /// Drink or eat what is in hand. Returns whether anything was consumed.
    pub fn consume_held(&mut self, id: PirateId, rng: &mut impl Rng) -> bool {
        let pirate = &mut self.active_pirates[id.0];
        let Some(handle) = pirate.held_item else {
            return false;
        };
        let Some(item) = self.items.get_mut(&handle) else {
            pirate.held_item = None;
            return false;
        };
        let info = item.info();
        let sound = if info.grants_drunk {
            pirate.drink(&self.config, rng);
            Sound::Drink
        } else if info.cures_scurvy {
            pirate.eat_cure(&self.config);
            Sound::Eat
        } else {
            return false;
        };
        item.removal_mark = true;
        pirate.held_item = None;
        debug!(pirate = id.0, kind = ?item.kind, "consumed");
        self.play(sound);
        true
    }

    /// Use an interactable within reach.
    pub fn interact(
        &mut self,
        id: PirateId,
        handle: InteractableHandle,
        rng: &mut impl Rng,
    ) -> InteractOutcome {
        if !self.can_act(id) {
            return InteractOutcome::Nothing;
        }
        let holding = self.held_item_info(id);
        let pirate = &self.active_pirates[id.0];
        let Some(target) = self.interactables.get_mut(&handle) else {
            return InteractOutcome::Nothing;
        };
        if !pirate.in_reach(target.position) {
            return InteractOutcome::Nothing;
        }
        let at = target.position;
        let outcome = target.interact(holding, rng);

        match outcome {
            InteractOutcome::Nothing => {}
            InteractOutcome::FireCannon => {
                self.fire_cannon(id, handle);
            }
            InteractOutcome::SpawnItem(kind) => {
                let item = self.spawn_item(kind, at, rng.gen());
                self.give_item(id, item);
                info!(pirate = id.0, item = ?item, ?kind, "barrel opened");
                self.play(Sound::BarrelOpen);
            }
            InteractOutcome::Repaired { damage } => {
                if let Some(fixer) = self.active_pirates[id.0].held_item.take() {
                    if let Some(item) = self.items.get_mut(&fixer) {
                        item.removal_mark = true;
                    }
                }
                self.boat_health = (self.boat_health + damage).min(self.config.boat_health);
                info!(pirate = id.0, restored = damage, boat = self.boat_health, "hull repaired");
                self.play(Sound::Repair);
            }
        }
        outcome
    }

    fn give_item(&mut self, id: PirateId, handle: ItemHandle) {
        if let Some(item) = self.items.get_mut(&handle) {
            item.held = true;
            self.active_pirates[id.0].held_item = Some(handle);
        }
    }

    /// Load the firer's held item, or the firer, into `cannon` and start the
    /// shot. The launch itself happens partway through the firing animation.
    pub fn fire_cannon(&mut self, id: PirateId, cannon: InteractableHandle) -> bool {
        let Some(gun) = self
            .interactables
            .get_mut(&cannon)
            .and_then(Interactable::as_cannon_mut)
        else {
            return false;
        };
        let Some(delay) = gun.start_firing() else {
            return false;
        };

        let pirate = &mut self.active_pirates[id.0];
        let fireable = match pirate.held_item.take() {
            Some(handle) => {
                if let Some(item) = self.items.get_mut(&handle) {
                    item.held = false;
                    item.hide();
                }
                FireableRef::Item(handle)
            }
            None => {
                pirate.landing_y = pirate.position.y;
                pirate.hide();
                FireableRef::Pirate(id)
            }
        };

        info!(pirate = id.0, cannon = ?cannon, ?fireable, "cannon fired");
        self.scheduler
            .schedule_in(delay, ScheduledAction::Launch { cannon, fireable });
        self.play(Sound::CannonFire);
        true
    }

    // ── Hits ──────────────────────────────────────────────────────────────────

    /// A falling `kind` landed on our deck at `at`. Damaging kinds take
    /// `base_roll × multiplier` off the hull and leave a breach there.
    pub fn apply_incoming_hit(
        &mut self,
        at: Vec2,
        kind: ItemKind,
        base_roll: f32,
    ) -> Option<InteractableHandle> {
        let info = kind.info();
        if !info.causes_damage {
            return None;
        }
        let damage = base_roll * info.damage_multiplier;
        self.boat_health = (self.boat_health - damage).max(0.0);
        let spot = self.spawn_interactable(Interactable::damage_spot(at, damage));
        info!(?kind, damage, boat = self.boat_health, spot = ?spot, "hull hit");
        self.play(Sound::Hit);
        Some(spot)
    }

    /// Something of ours reached the enemy ship.
    pub fn apply_outgoing_hit(&mut self, multiplier: f32, base_roll: f32) -> f32 {
        let damage = base_roll * multiplier;
        if damage <= 0.0 {
            return 0.0;
        }
        self.enemy_health = (self.enemy_health - damage).max(0.0);
        info!(damage, enemy = self.enemy_health, "enemy hit");
        self.play(Sound::EnemyHit);
        damage
    }

    fn roll_damage(rng: &mut impl Rng) -> f32 {
        rng.gen_range(1.0..=5.0)
    }

    fn spawn_enemy_volley(&mut self, rng: &mut impl Rng) {
        let count = rng.gen_range(1..=self.config.max_volley);
        let deck = self.ship_map.deck_bounds();
        let columns = self.ship_map.width().max(3);
        for _ in 0..count {
            let kind = ItemKind::random_incoming(rng);
            let phase: f32 = rng.gen();
            let column = rng.gen_range(1..columns - 1);
            let x = self.ship_map.tile_center(column, 0).x;
            let start = Vec2::new(x, PLAYFIELD.top() - TILE_SIZE * (1.0 + 4.0 * phase));
            let handle = self.spawn_item(kind, start, phase);
            if let Some(item) = self.items.get_mut(&handle) {
                item.landing_y = Some(deck.top() + phase * deck.h);
                item.drop_from(start);
            }
            debug!(item = ?handle, ?kind, column, "incoming");
        }
    }

    // ── Per-frame update ──────────────────────────────────────────────────────

    pub fn update(&mut self, dt: f32, input: &InputSnapshot, rng: &mut impl Rng) {
        if self.transitioned {
            return;
        }

        for action in self.scheduler.advance(dt) {
            self.run_scheduled(action);
        }

        // 1. Incoming fire
        self.enemy_fire_timer -= dt;
        if self.enemy_fire_timer <= 0.0 {
            self.spawn_enemy_volley(rng);
            self.enemy_fire_timer = rng
                .gen_range(self.config.enemy_fire_min_interval..=self.config.enemy_fire_max_interval);
        }

        // 2. Pirates
        let colliders = self.collider_snapshot();
        for index in 0..self.active_pirates.len() {
            let id = PirateId(index);
            self.update_pirate(dt, id, input, &colliders, rng);
        }

        // 3. Items
        self.update_items(dt, rng);

        // 4. Item sweep
        self.sweep_items();

        // 5. Interactables
        for interactable in self.interactables.values_mut() {
            interactable.update(dt);
        }
        self.interactables.retain(|_, i| !i.removal_mark);

        // 6. Static geometry
        self.ship_map.update(dt);

        // 7. Terminal conditions
        if self.enemy_health <= 0.0 {
            self.change_scene(SceneChange::win());
        } else if self.boat_health <= 0.0 {
            self.change_scene(SceneChange::lose(false));
        }
    }

    fn change_scene(&mut self, change: SceneChange) {
        if self.transitioned {
            return;
        }
        self.transitioned = true;
        info!(scene = ?change.scene, context = ?change.context, "scene change");
        self.post(GameEvent::ChangeScene(change));
    }

    fn run_scheduled(&mut self, action: ScheduledAction) {
        match action {
            ScheduledAction::Launch { cannon, fireable } => {
                let muzzle = self.interactables.get(&cannon).map(Interactable::muzzle);
                match fireable {
                    FireableRef::Item(handle) => {
                        if let Some(item) = self.items.get_mut(&handle) {
                            let at = muzzle.unwrap_or(item.position);
                            item.launch(at);
                        }
                    }
                    FireableRef::Pirate(id) => {
                        let pirate = &mut self.active_pirates[id.0];
                        let at = muzzle.unwrap_or(pirate.position);
                        pirate.launch(at);
                    }
                }
            }
            ScheduledAction::DeathSequenceDone => {
                self.change_scene(SceneChange::lose(true));
            }
        }
    }

    /// Static rails plus every solid interactable, as of now.
    fn collider_snapshot(&self) -> Vec<Rect> {
        let mut colliders = self.ship_map.colliders().to_vec();
        colliders.extend(
            self.interactables
                .values()
                .filter(|i| i.is_solid() && !i.removal_mark)
                .map(|i| i.collider),
        );
        colliders
    }

    fn update_pirate(
        &mut self,
        dt: f32,
        id: PirateId,
        input: &InputSnapshot,
        colliders: &[Rect],
        rng: &mut impl Rng,
    ) {
        let pirate = &mut self.active_pirates[id.0];
        let intent = if pirate.player {
            pirate.crouched = input.is_held(Key::Crouch);
            input.movement()
        } else {
            pirate.seek_movement()
        };
        let tick = pirate.update(dt, intent, colliders, &self.config);
        if tick.died {
            self.begin_death_sequence(id);
        }
        self.resolve_pirate_flight(id, rng);

        if self.pirate(id).player {
            self.player_actions(id, input, rng);
        } else if self.can_act(id) {
            if let Some(mut brain) = self.active_pirates[id.0].brain.take() {
                brain.update(dt, id, self, rng);
                self.active_pirates[id.0].brain = Some(brain);
            }
        }
    }

    fn begin_death_sequence(&mut self, id: PirateId) {
        info!(pirate = id.0, "died of scurvy");
        self.play(Sound::Death);
        self.scheduler
            .schedule_in(self.config.death_sequence, ScheduledAction::DeathSequenceDone);
    }

    /// Boarding on the way up, landing on the way down.
    fn resolve_pirate_flight(&mut self, id: PirateId, rng: &mut impl Rng) {
        let pirate = &mut self.active_pirates[id.0];
        if !pirate.fire.fired {
            return;
        }
        if pirate.fire.fired_up {
            if pirate.position.y < PLAYFIELD.top() {
                pirate.fire.fired_up = false;
                pirate.position.y = PLAYFIELD.top();
                info!(pirate = id.0, "boarded the enemy");
                let roll = Self::roll_damage(rng);
                self.apply_outgoing_hit(BOARDING_MULTIPLIER, roll);
            }
        } else if pirate.position.y >= pirate.landing_y {
            pirate.position.y = pirate.landing_y;
            pirate.land();
            self.play(Sound::Splash);
        }
    }

    fn player_actions(&mut self, id: PirateId, input: &InputSnapshot, rng: &mut impl Rng) {
        let highlighted = self.refresh_highlight(id);
        if !self.can_act(id) {
            return;
        }

        if input.just_pressed(Key::Interact) {
            if let Some(handle) = highlighted {
                self.interact(id, handle, rng);
            } else if self.pirate(id).held_item.is_none() {
                if let Some(item) = self.nearest_pickable(id) {
                    self.pickup_item(id, item);
                }
            } else {
                self.drop_held(id);
            }
        }

        if input.just_pressed(Key::Use) {
            self.consume_held(id, rng);
        }
    }

    /// Light up the closest interactable in reach that this pirate could use
    /// with what they are holding.
    fn refresh_highlight(&mut self, id: PirateId) -> Option<InteractableHandle> {
        let holding = self.held_item_info(id);
        let pirate = &self.active_pirates[id.0];
        let from = pirate.position;
        let reach_sq = pirate.reach * pirate.reach;

        let mut by_distance: Vec<(InteractableHandle, f32)> = self
            .interactables
            .iter()
            .filter(|(_, i)| i.can_highlight(holding))
            .map(|(&handle, i)| (handle, i.position.distance_squared(from)))
            .filter(|&(_, dist_sq)| dist_sq <= reach_sq)
            .collect();
        by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));

        for interactable in self.interactables.values_mut() {
            interactable.highlight = false;
        }
        let (handle, _) = by_distance.first().copied()?;
        let closest = self.interactables.get_mut(&handle)?;
        closest.highlight = true;
        Some(handle)
    }

    fn nearest_pickable(&self, id: PirateId) -> Option<ItemHandle> {
        let pirate = self.pirate(id);
        self.items
            .iter()
            .filter(|(_, item)| item.can_be_picked_up() && pirate.in_reach(item.position))
            .map(|(&handle, item)| (handle, item.position.distance_squared(pirate.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle)
    }

    fn update_items(&mut self, dt: f32, rng: &mut impl Rng) {
        for pirate in &self.active_pirates {
            let Some(handle) = pirate.held_item else {
                continue;
            };
            if let Some(item) = self.items.get_mut(&handle) {
                let side = if pirate.anim.flipped { -1.0 } else { 1.0 };
                item.position = pirate.position + Vec2::new(HOLD_OFFSET.x * side, HOLD_OFFSET.y);
                item.flip_texture = pirate.anim.flipped;
            }
        }

        let (speed, spin) = (self.config.fire_speed, self.config.fire_spin);
        let mut flights = Vec::new();
        for item in self.items.values_mut() {
            if item.removal_mark {
                continue;
            }
            item.update(dt, speed, spin);
            if !item.fire.fired {
                continue;
            }
            let pos = item.position;
            if item.fire.fired_up {
                if pos.y < PLAYFIELD.top() {
                    item.removal_mark = true;
                    flights.push(Flight::ReachedEnemy(item.kind));
                }
            } else if item.landing_y.is_some_and(|landing| pos.y >= landing) {
                if item.info().causes_damage {
                    item.removal_mark = true;
                    flights.push(Flight::HitDeck(pos, item.kind));
                } else {
                    item.land();
                    item.landing_y = None;
                    flights.push(Flight::Settled);
                }
            } else if pos.y > PLAYFIELD.bottom() {
                item.removal_mark = true;
            }
            if pos.x < PLAYFIELD.left() || pos.x > PLAYFIELD.right() {
                item.removal_mark = true;
            }
        }

        for flight in flights {
            match flight {
                Flight::ReachedEnemy(kind) => {
                    let info = kind.info();
                    if info.causes_damage {
                        let roll = Self::roll_damage(rng);
                        self.apply_outgoing_hit(info.damage_multiplier, roll);
                    } else {
                        self.play(Sound::Splash);
                    }
                }
                Flight::HitDeck(at, kind) => {
                    let roll = Self::roll_damage(rng);
                    self.apply_incoming_hit(at, kind, roll);
                }
                Flight::Settled => self.play(Sound::Splash),
            }
        }
    }

    /// Drop every removal-marked item, letting go of it first.
    pub fn sweep_items(&mut self) {
        let doomed: Vec<ItemHandle> = self
            .items
            .iter()
            .filter(|(_, item)| item.removal_mark)
            .map(|(&handle, _)| handle)
            .collect();
        for handle in doomed {
            for pirate in &mut self.active_pirates {
                if pirate.held_item == Some(handle) {
                    pirate.held_item = None;
                }
            }
            self.items.remove(&handle);
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    pub fn draw(&self, cam: &mut Camera) {
        self.ship_map.draw(cam);
        for interactable in self.interactables.values() {
            interactable.draw(cam);
        }
        for item in self.items.values() {
            item.draw(cam);
        }
        for pirate in &self.active_pirates {
            pirate.draw(cam);
        }
    }
}

fn team_names(rng: &mut impl Rng) -> (String, String) {
    let ours = (
        rng.gen_range(0..TEAM_ADJECTIVES.len()),
        rng.gen_range(0..TEAM_NOUNS.len()),
    );
    let mut theirs = ours;
    while theirs == ours {
        theirs = (
            rng.gen_range(0..TEAM_ADJECTIVES.len()),
            rng.gen_range(0..TEAM_NOUNS.len()),
        );
    }
    let name = |(adj, noun): (usize, usize)| format!("The {} {}", TEAM_ADJECTIVES[adj], TEAM_NOUNS[noun]);
    (name(ours), name(theirs))
}
