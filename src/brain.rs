//! Utility AI for the crew.
//!
//! A [`Brain`] holds a weighted pool of task kinds (weight = number of
//! copies in the pool) and at most one active [`Task`]. When the task is done,
//! or has run for longer than the configured ceiling, the brain draws kinds
//! from the pool until one whose prerequisite holds comes up.
//!
//! Tasks lock onto a target handle when they start and re-check it on every
//! call: anything may have been picked up, fired or swept since last frame.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::entities::{InteractableHandle, ItemHandle, ItemInfo, PirateId};
use crate::geometry::Vec2;
use crate::interact::InteractOutcome;
use crate::manager::GameManager;
use crate::ship::TILE_SIZE;

/// Draws attempted before giving up on this frame.
const MAX_TASK_DRAWS: usize = 64;

/// Tasks that can make use of an item already in hand.
const HELD_ITEM_TASKS: [TaskKind; 4] = [
    TaskKind::FireCannon,
    TaskKind::GetDrunk,
    TaskKind::EatCure,
    TaskKind::RepairBoat,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    WalkToPosition,
    FindItem,
    PickUpItem,
    FireCannon,
    GetDrunk,
    EatCure,
    RepairBoat,
    DropItem,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Goal {
    WalkToPosition {
        target: Vec2,
    },
    /// Fetch a fresh item from a barrel.
    FindItem {
        barrel: Option<InteractableHandle>,
    },
    PickUpItem {
        item: Option<ItemHandle>,
    },
    FireCannon {
        cannon: Option<InteractableHandle>,
    },
    GetDrunk {
        item: Option<ItemHandle>,
        done: bool,
    },
    EatCure {
        item: Option<ItemHandle>,
        done: bool,
    },
    RepairBoat {
        spot: Option<InteractableHandle>,
        fixer: Option<ItemHandle>,
        done: bool,
    },
    /// Put down something no other task has a use for.
    DropItem {
        done: bool,
    },
}

// ── Task ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Task {
    pub goal: Goal,
    /// Seconds since selection.
    pub age: f32,
    /// Age after which a task with no completion rule of its own gives up.
    pub boredom: f32,
}

impl Task {
    pub fn new(goal: Goal, boredom: f32) -> Self {
        Self {
            goal,
            age: 0.0,
            boredom,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self.goal {
            Goal::WalkToPosition { .. } => TaskKind::WalkToPosition,
            Goal::FindItem { .. } => TaskKind::FindItem,
            Goal::PickUpItem { .. } => TaskKind::PickUpItem,
            Goal::FireCannon { .. } => TaskKind::FireCannon,
            Goal::GetDrunk { .. } => TaskKind::GetDrunk,
            Goal::EatCure { .. } => TaskKind::EatCure,
            Goal::RepairBoat { .. } => TaskKind::RepairBoat,
            Goal::DropItem { .. } => TaskKind::DropItem,
        }
    }

    /// Fresh, un-started task of `kind`.
    pub fn instantiate(kind: TaskKind, world: &GameManager, rng: &mut impl Rng) -> Self {
        let config = &world.config;
        let boredom = rng.gen_range(config.boredom_min..=config.boredom_max);
        let goal = match kind {
            TaskKind::WalkToPosition => {
                let deck = world.ship_map.deck_bounds();
                let margin = TILE_SIZE * 0.5;
                Goal::WalkToPosition {
                    target: Vec2::new(
                        rng.gen_range(deck.left() + margin..=deck.right() - margin),
                        rng.gen_range(deck.top() + margin..=deck.bottom() - margin),
                    ),
                }
            }
            TaskKind::FindItem => Goal::FindItem { barrel: None },
            TaskKind::PickUpItem => Goal::PickUpItem { item: None },
            TaskKind::FireCannon => Goal::FireCannon { cannon: None },
            TaskKind::GetDrunk => Goal::GetDrunk {
                item: None,
                done: false,
            },
            TaskKind::EatCure => Goal::EatCure {
                item: None,
                done: false,
            },
            TaskKind::RepairBoat => Goal::RepairBoat {
                spot: None,
                fixer: None,
                done: false,
            },
            TaskKind::DropItem => Goal::DropItem { done: false },
        };
        Task::new(goal, boredom)
    }

    pub fn prereq(kind: TaskKind, pirate: PirateId, world: &GameManager) -> bool {
        let hands_empty = world.pirate(pirate).held_item.is_none();
        let holding = world.held_item_info(pirate);
        match kind {
            TaskKind::WalkToPosition => true,
            TaskKind::FindItem => hands_empty && !world.barrels().is_empty(),
            TaskKind::PickUpItem => {
                hands_empty && !world.loose_items(|info| info.ai_may_pickup).is_empty()
            }
            TaskKind::FireCannon => {
                holding.is_some_and(|info| info.ai_may_launch) && !world.cannons().is_empty()
            }
            TaskKind::GetDrunk => {
                !world.pirate(pirate).is_drunk() && can_get(world, hands_empty, holding, |info| info.grants_drunk)
            }
            TaskKind::EatCure => can_get(world, hands_empty, holding, |info| info.cures_scurvy),
            TaskKind::RepairBoat => {
                !world.damage_spots().is_empty()
                    && can_get(world, hands_empty, holding, |info| info.fixes_damage)
            }
            TaskKind::DropItem => {
                !hands_empty
                    && !HELD_ITEM_TASKS
                        .iter()
                        .any(|&kind| Task::prereq(kind, pirate, world))
            }
        }
    }

    /// Lock onto targets. Called once, right after selection.
    pub fn start(&mut self, pirate: PirateId, world: &GameManager, rng: &mut impl Rng) {
        let held = world.pirate(pirate).held_item;
        let position = world.pirate(pirate).position;
        match &mut self.goal {
            Goal::WalkToPosition { .. } | Goal::DropItem { .. } => {}
            Goal::FindItem { barrel } => {
                *barrel = world.barrels().choose(rng).copied();
            }
            Goal::PickUpItem { item } => {
                *item = world.loose_items(|info| info.ai_may_pickup).choose(rng).copied();
            }
            Goal::FireCannon { cannon } => {
                let ready: Vec<InteractableHandle> = world
                    .cannons()
                    .into_iter()
                    .filter(|handle| {
                        world
                            .interactable(*handle)
                            .and_then(|i| i.as_cannon())
                            .is_some_and(|c| c.is_ready())
                    })
                    .collect();
                let pool = if ready.is_empty() { world.cannons() } else { ready };
                *cannon = pool.choose(rng).copied();
            }
            Goal::GetDrunk { item, .. } => {
                *item = held_or_loose(world, held, rng, |info| info.grants_drunk);
            }
            Goal::EatCure { item, .. } => {
                *item = held_or_loose(world, held, rng, |info| info.cures_scurvy);
            }
            Goal::RepairBoat { spot, fixer, .. } => {
                *spot = world.nearest(position, world.damage_spots());
                *fixer = held_or_loose(world, held, rng, |info| info.fixes_damage);
            }
        }
    }

    pub fn can_finish(&self, pirate: PirateId, world: &GameManager) -> bool {
        let me = world.pirate(pirate);
        match self.goal {
            Goal::WalkToPosition { .. } => self.age > self.boredom,
            Goal::FindItem { barrel } => {
                me.held_item.is_some() || barrel.and_then(|h| world.live_interactable(h)).is_none()
            }
            Goal::PickUpItem { item } => {
                me.held_item.is_some() || item.and_then(|h| world.pickable_item(h)).is_none()
            }
            Goal::FireCannon { cannon } => {
                me.held_item.is_none() || cannon.and_then(|h| world.live_interactable(h)).is_none()
            }
            Goal::GetDrunk { item, done } | Goal::EatCure { item, done } => {
                done || !target_reachable(me.held_item, item, world)
            }
            Goal::RepairBoat { spot, fixer, done } => {
                done
                    || spot.and_then(|h| world.live_interactable(h)).is_none()
                    || !target_reachable(me.held_item, fixer, world)
            }
            Goal::DropItem { done } => done || me.held_item.is_none(),
        }
    }

    pub fn process(
        &mut self,
        dt: f32,
        pirate: PirateId,
        world: &mut GameManager,
        rng: &mut impl Rng,
    ) {
        self.age += dt;
        let here = world.pirate(pirate).position;

        match &mut self.goal {
            Goal::WalkToPosition { target } => {
                world.pirate_mut(pirate).target_position = *target;
            }
            Goal::FindItem { barrel } => {
                let Some((handle, at)) = barrel.and_then(|h| world.live_interactable(h).map(|i| (h, i.position)))
                else {
                    world.pirate_mut(pirate).target_position = here;
                    return;
                };
                world.pirate_mut(pirate).target_position = at;
                let me = world.pirate(pirate);
                if me.held_item.is_none() && me.in_reach(at) {
                    world.interact(pirate, handle, rng);
                }
            }
            Goal::PickUpItem { item } => {
                walk_and_pick_up(pirate, *item, world);
            }
            Goal::FireCannon { cannon } => {
                let Some((handle, at, ready)) = cannon.and_then(|h| {
                    world.live_interactable(h).map(|i| {
                        (h, i.position, i.as_cannon().is_some_and(|c| c.is_ready()))
                    })
                }) else {
                    world.pirate_mut(pirate).target_position = here;
                    return;
                };
                // stand on the deck side of the barrel
                world.pirate_mut(pirate).target_position = at + Vec2::new(0.0, TILE_SIZE * 0.75);
                let me = world.pirate(pirate);
                if ready && me.held_item.is_some() && me.in_reach(at) {
                    world.interact(pirate, handle, rng);
                }
            }
            Goal::GetDrunk { item, done } | Goal::EatCure { item, done } => {
                if *done {
                    return;
                }
                if item.is_some() && world.pirate(pirate).held_item == *item {
                    *done = world.consume_held(pirate, rng);
                } else {
                    walk_and_pick_up(pirate, *item, world);
                }
            }
            Goal::RepairBoat { spot, fixer, done } => {
                if *done {
                    return;
                }
                let holding_fixer = fixer.is_some() && world.pirate(pirate).held_item == *fixer;
                if !holding_fixer {
                    walk_and_pick_up(pirate, *fixer, world);
                    return;
                }
                let Some((handle, at)) = spot.and_then(|h| world.live_interactable(h).map(|i| (h, i.position)))
                else {
                    world.pirate_mut(pirate).target_position = here;
                    return;
                };
                world.pirate_mut(pirate).target_position = at;
                if world.pirate(pirate).in_reach(at) {
                    let outcome = world.interact(pirate, handle, rng);
                    *done = matches!(outcome, InteractOutcome::Repaired { .. });
                }
            }
            Goal::DropItem { done } => {
                if !*done {
                    world.pirate_mut(pirate).target_position = here;
                    *done = world.drop_held(pirate);
                }
            }
        }
    }
}

fn can_get(
    world: &GameManager,
    hands_empty: bool,
    holding: Option<&ItemInfo>,
    wanted: impl Fn(&ItemInfo) -> bool,
) -> bool {
    match holding {
        Some(info) => wanted(info),
        None => hands_empty && !world.loose_items(wanted).is_empty(),
    }
}

fn held_or_loose(
    world: &GameManager,
    held: Option<ItemHandle>,
    rng: &mut impl Rng,
    wanted: impl Fn(&ItemInfo) -> bool,
) -> Option<ItemHandle> {
    if let Some(handle) = held {
        return world
            .item(handle)
            .filter(|item| wanted(item.info()))
            .map(|_| handle);
    }
    world.loose_items(wanted).choose(rng).copied()
}

/// The target is already in hand, or still lying around to be picked up.
fn target_reachable(held: Option<ItemHandle>, target: Option<ItemHandle>, world: &GameManager) -> bool {
    match target {
        Some(handle) => held == Some(handle) || world.pickable_item(handle).is_some(),
        None => false,
    }
}

fn walk_and_pick_up(pirate: PirateId, item: Option<ItemHandle>, world: &mut GameManager) {
    let here = world.pirate(pirate).position;
    let Some((handle, at)) = item.and_then(|h| world.pickable_item(h).map(|i| (h, i.position)))
    else {
        world.pirate_mut(pirate).target_position = here;
        return;
    };
    world.pirate_mut(pirate).target_position = at;
    if world.pirate(pirate).in_reach(at) {
        world.pickup_item(pirate, handle);
    }
}

// ── Brain ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Brain {
    pool: Vec<TaskKind>,
    task: Option<Task>,
}

impl Brain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The weighting every AI crew member starts with.
    pub fn crew() -> Self {
        let mut brain = Self::new();
        brain.add_task(TaskKind::WalkToPosition, 5);
        brain.add_task(TaskKind::FindItem, 2);
        brain.add_task(TaskKind::PickUpItem, 3);
        brain.add_task(TaskKind::FireCannon, 8);
        brain.add_task(TaskKind::GetDrunk, 1);
        brain.add_task(TaskKind::EatCure, 1);
        brain.add_task(TaskKind::RepairBoat, 4);
        brain.add_task(TaskKind::DropItem, 2);
        brain
    }

    pub fn add_task(&mut self, kind: TaskKind, weight: usize) {
        self.pool.extend(std::iter::repeat(kind).take(weight));
    }

    pub fn pool(&self) -> &[TaskKind] {
        &self.pool
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn set_task(&mut self, task: Task) {
        self.task = Some(task);
    }

    pub fn update(
        &mut self,
        dt: f32,
        pirate: PirateId,
        world: &mut GameManager,
        rng: &mut impl Rng,
    ) {
        let replace = match &self.task {
            None => true,
            Some(task) => {
                task.can_finish(pirate, world) || task.age > world.config.task_age_ceiling
            }
        };
        if replace {
            self.pick_task(pirate, world, rng);
        }
        if let Some(task) = &mut self.task {
            task.process(dt, pirate, world, rng);
        }
    }

    /// Draw from the pool until a kind whose prerequisite holds comes up.
    /// Leaves the brain idle for this frame if nothing qualifies.
    pub fn pick_task(&mut self, pirate: PirateId, world: &GameManager, rng: &mut impl Rng) {
        self.task = None;
        for _ in 0..MAX_TASK_DRAWS {
            let Some(&kind) = self.pool.choose(rng) else {
                return;
            };
            if !Task::prereq(kind, pirate, world) {
                continue;
            }
            let mut task = Task::instantiate(kind, world, rng);
            task.start(pirate, world, rng);
            debug!(pirate = pirate.0, task = ?kind, "task selected");
            self.task = Some(task);
            return;
        }
    }
}
