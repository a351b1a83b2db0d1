use cannon_crew::anim::PIRATE_DEAD;
use cannon_crew::config::GameConfig;
use cannon_crew::entities::*;
use cannon_crew::events::*;
use cannon_crew::fireable::Fireable;
use cannon_crew::geometry::Vec2;
use cannon_crew::input::{InputSnapshot, Key};
use cannon_crew::interact::{InteractOutcome, InteractableKind};
use cannon_crew::manager::GameManager;
use cannon_crew::pirate::HOLD_OFFSET;
use cannon_crew::render::Camera;
use cannon_crew::ship::ShipMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// No crew and no enemy fire, so only the test moves things.
fn quiet_config() -> GameConfig {
    GameConfig {
        crew_size: 0,
        enemy_fire_min_interval: 1000.0,
        enemy_fire_max_interval: 1000.0,
        ..GameConfig::default()
    }
}

fn make_manager(rng: &mut StdRng) -> GameManager {
    GameManager::new(quiet_config(), ShipMap::standard().unwrap(), rng)
}

fn idle() -> InputSnapshot {
    InputSnapshot::empty()
}

fn scene_changes(events: &[GameEvent]) -> Vec<SceneChange> {
    events
        .iter()
        .filter_map(|event| match event {
            GameEvent::ChangeScene(change) => Some(*change),
            _ => None,
        })
        .collect()
}

/// Put the player next to `handle` and return the player's id.
fn stand_next_to(manager: &mut GameManager, handle: InteractableHandle) -> PirateId {
    let at = manager.interactable(handle).unwrap().position;
    let id = manager.player_id();
    manager.pirate_mut(id).position = at + Vec2::new(0.0, 40.0);
    id
}

fn give(manager: &mut GameManager, id: PirateId, kind: ItemKind) -> ItemHandle {
    let at = manager.pirate(id).position;
    let item = manager.spawn_item(kind, at, 0.0);
    assert!(manager.pickup_item(id, item));
    item
}

// ── Setup ─────────────────────────────────────────────────────────────────────

#[test]
fn round_starts_with_full_ship() {
    let mut rng = seeded_rng();
    let manager = GameManager::new(GameConfig::default(), ShipMap::standard().unwrap(), &mut rng);
    assert_eq!(manager.boat_health, 100.0);
    assert_eq!(manager.enemy_health, 100.0);
    assert_eq!(manager.cannons().len(), 6);
    assert_eq!(manager.barrels().len(), 3);
    assert!(manager.damage_spots().is_empty());
    // player plus the configured crew
    assert_eq!(manager.active_pirates.len(), 1 + 4);
    assert!(manager.player().player);
    assert!(manager.active_pirates[1..].iter().all(|p| p.brain.is_some()));
    assert!(!manager.items.is_empty());
    assert_ne!(manager.team_name, manager.enemy_team_name);
    assert!(manager.team_name.starts_with("The "));
}

#[test]
fn handles_are_never_reused() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let first = manager.spawn_item(ItemKind::Parrot, Vec2::ZERO, 0.0);
    manager.items.get_mut(&first).unwrap().removal_mark = true;
    manager.sweep_items();
    let second = manager.spawn_item(ItemKind::Parrot, Vec2::ZERO, 0.0);
    assert!(second > first);
}

// ── Pickup, drop, removal ─────────────────────────────────────────────────────

#[test]
fn pickup_needs_reach() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    let far = manager.player().position + Vec2::new(500.0, 0.0);
    let item = manager.spawn_item(ItemKind::Lemon, far, 0.0);
    assert!(!manager.pickup_item(id, item));
    assert!(manager.player().held_item.is_none());
    assert!(!manager.items[&item].held);
}

#[test]
fn one_item_per_hand() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    give(&mut manager, id, ItemKind::Lemon);
    let at = manager.player().position;
    let second = manager.spawn_item(ItemKind::Plank, at, 0.0);
    assert!(!manager.pickup_item(id, second));
}

#[test]
fn removal_sweep_clears_the_holder() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    let item = give(&mut manager, id, ItemKind::Cannonball);

    manager.items.get_mut(&item).unwrap().removal_mark = true;
    manager.sweep_items();

    assert!(!manager.items.contains_key(&item));
    assert!(manager.player().held_item.is_none());
    assert!(manager.held_item_info(id).is_none());
}

#[test]
fn no_holder_points_at_a_missing_item_after_a_tick() {
    let mut rng = seeded_rng();
    let mut manager = GameManager::new(GameConfig::default(), ShipMap::standard().unwrap(), &mut rng);
    for _ in 0..600 {
        manager.update(1.0 / 30.0, &idle(), &mut rng);
        for pirate in &manager.active_pirates {
            if let Some(held) = pirate.held_item {
                assert!(manager.items.contains_key(&held));
            }
        }
        if manager.is_over() {
            break;
        }
    }
}

#[test]
fn held_item_follows_its_holder() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    let item = give(&mut manager, id, ItemKind::Plank);
    manager.update(0.05, &idle(), &mut rng);
    let expected = manager.player().position + HOLD_OFFSET;
    assert_eq!(manager.items[&item].position, expected);
}

#[test]
fn space_drops_what_is_held() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    // well away from every interactable
    manager.pirate_mut(id).position = Vec2::new(640.0, 560.0);
    let item = give(&mut manager, id, ItemKind::Parrot);

    let press = InputSnapshot::empty().with_pressed(Key::Interact);
    manager.update(0.01, &press, &mut rng);

    assert!(manager.player().held_item.is_none());
    assert!(!manager.items[&item].held);
    assert!(manager.items[&item].can_be_picked_up());
}

#[test]
fn full_hands_drop_beside_a_ready_barrel() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let barrel = manager.barrels()[0];
    let id = stand_next_to(&mut manager, barrel);
    let item = give(&mut manager, id, ItemKind::Parrot);
    let items_before = manager.items.len();

    let press = InputSnapshot::empty().with_pressed(Key::Interact);
    manager.update(0.01, &press, &mut rng);

    assert!(!manager.interactables[&barrel].highlight);
    assert!(manager.player().held_item.is_none());
    assert!(!manager.items[&item].held);
    assert_eq!(manager.items.len(), items_before);
}

#[test]
fn breach_only_lights_up_for_a_fixer() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    manager.pirate_mut(id).position = Vec2::new(640.0, 560.0);
    let spot = manager
        .apply_incoming_hit(Vec2::new(640.0, 530.0), ItemKind::Cannonball, 2.0)
        .unwrap();
    let parrot = give(&mut manager, id, ItemKind::Parrot);
    let press = InputSnapshot::empty().with_pressed(Key::Interact);

    manager.update(0.01, &idle(), &mut rng);
    assert!(!manager.interactables[&spot].highlight);

    manager.update(0.01, &press, &mut rng);
    assert!(manager.player().held_item.is_none());
    assert!(!manager.items[&parrot].held);
    assert!(manager.interactables.contains_key(&spot));

    manager.pirate_mut(id).position = Vec2::new(640.0, 560.0);
    give(&mut manager, id, ItemKind::Plank);
    manager.update(0.01, &idle(), &mut rng);
    assert!(manager.interactables[&spot].highlight);
}

#[test]
fn space_picks_up_the_nearest_loose_item() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    manager.pirate_mut(id).position = Vec2::new(640.0, 560.0);
    let near = manager.spawn_item(ItemKind::Lemon, Vec2::new(650.0, 560.0), 0.0);
    manager.spawn_item(ItemKind::Plank, Vec2::new(700.0, 560.0), 0.0);

    let press = InputSnapshot::empty().with_pressed(Key::Interact);
    manager.update(0.01, &press, &mut rng);

    assert_eq!(manager.player().held_item, Some(near));
}

// ── Consuming ─────────────────────────────────────────────────────────────────

#[test]
fn rum_makes_you_drunk() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    let rum = give(&mut manager, id, ItemKind::Rum);
    assert!(manager.consume_held(id, &mut rng));
    let player = manager.player();
    assert!(player.is_drunk());
    assert!((8.0..=15.0).contains(&player.drunk_time));
    assert!(player.held_item.is_none());
    assert!(manager.items[&rum].removal_mark);
}

#[test]
fn lemon_cures_scurvy() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    manager.pirate_mut(id).scurvy_time = 10.0;
    give(&mut manager, id, ItemKind::Lemon);
    let press = InputSnapshot::empty().with_pressed(Key::Use);
    manager.update(0.01, &press, &mut rng);
    assert_eq!(manager.player().scurvy_time, manager.config.scurvy_max);
    assert!(manager.player().held_item.is_none());
}

#[test]
fn shot_is_not_food() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    let ball = give(&mut manager, id, ItemKind::Cannonball);
    assert!(!manager.consume_held(id, &mut rng));
    assert_eq!(manager.player().held_item, Some(ball));
}

// ── Barrels ───────────────────────────────────────────────────────────────────

#[test]
fn barrel_puts_exactly_one_new_item_in_hand() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let barrel = manager.barrels()[0];
    let id = stand_next_to(&mut manager, barrel);
    let before: Vec<ItemHandle> = manager.items.keys().copied().collect();

    let outcome = manager.interact(id, barrel, &mut rng);
    let InteractOutcome::SpawnItem(kind) = outcome else {
        panic!("expected a spawned item, got {outcome:?}");
    };

    assert_eq!(manager.items.len(), before.len() + 1);
    let held = manager.player().held_item.unwrap();
    assert!(!before.contains(&held));
    assert_eq!(manager.items[&held].kind, kind);
    assert!(manager.items[&held].held);

    // cooling down, and the hand is full anyway
    assert_eq!(manager.interact(id, barrel, &mut rng), InteractOutcome::Nothing);
    assert_eq!(manager.items.len(), before.len() + 1);
}

// ── Cannons ───────────────────────────────────────────────────────────────────

#[test]
fn cooling_cannon_changes_nothing() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let cannon = manager.cannons()[0];
    let id = stand_next_to(&mut manager, cannon);
    let ball = give(&mut manager, id, ItemKind::Cannonball);
    manager
        .interactables
        .get_mut(&cannon)
        .and_then(|i| i.as_cannon_mut())
        .unwrap()
        .cooldown = 5.0;

    assert_eq!(manager.interact(id, cannon, &mut rng), InteractOutcome::Nothing);
    assert!(!manager.fire_cannon(id, cannon));

    let gun = manager.interactable(cannon).unwrap().as_cannon().unwrap();
    assert_eq!(gun.cooldown, 5.0);
    assert!(!gun.is_firing());
    assert_eq!(manager.player().held_item, Some(ball));
    assert!(!manager.items[&ball].is_hidden());
    assert_eq!(manager.pending_scheduled(), 0);
}

#[test]
fn firing_a_cannonball_hits_the_enemy() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let cannon = manager.cannons()[0];
    let id = stand_next_to(&mut manager, cannon);
    let ball = give(&mut manager, id, ItemKind::Cannonball);

    assert_eq!(manager.interact(id, cannon, &mut rng), InteractOutcome::FireCannon);
    assert!(manager.player().held_item.is_none());
    assert!(manager.items[&ball].is_hidden());
    assert_eq!(manager.interactable(cannon).unwrap().as_cannon().unwrap().cooldown, 12.0);
    assert_eq!(manager.pending_scheduled(), 1);

    // not yet out of the muzzle
    manager.update(0.5, &idle(), &mut rng);
    assert!(manager.items[&ball].is_hidden());

    // launched and climbing
    manager.update(0.2, &idle(), &mut rng);
    assert!(manager.items[&ball].is_fired());
    assert!(!manager.items[&ball].is_hidden());

    // over the top
    manager.update(1.0, &idle(), &mut rng);
    assert!(!manager.items.contains_key(&ball));
    assert!(manager.enemy_health <= 99.0 && manager.enemy_health >= 95.0);
    assert!(manager.events().contains(&GameEvent::PlaySound(Sound::EnemyHit)));
}

#[test]
fn empty_handed_pirate_fires_themselves_and_comes_back() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let cannon = manager.cannons()[0];
    let id = stand_next_to(&mut manager, cannon);
    let start_y = manager.player().position.y;

    assert_eq!(manager.interact(id, cannon, &mut rng), InteractOutcome::FireCannon);
    assert!(manager.player().fire.hidden);

    manager.update(0.7, &idle(), &mut rng);
    assert!(manager.player().fire.fired);
    manager.update(0.4, &idle(), &mut rng);
    // boarded the enemy, now falling back
    assert!(!manager.player().fire.fired_up);
    assert!(manager.enemy_health <= 98.0 && manager.enemy_health >= 90.0);

    manager.update(1.3, &idle(), &mut rng);
    let player = manager.player();
    assert!(!player.fire.fired);
    assert_eq!(player.position.y, start_y);
}

// ── Hits and repairs ──────────────────────────────────────────────────────────

#[test]
fn anchor_hit_for_three_leaves_a_nine_point_breach() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let impact = Vec2::new(500.0, 500.0);

    let spot = manager.apply_incoming_hit(impact, ItemKind::Anchor, 3.0).unwrap();

    assert_eq!(manager.boat_health, 91.0);
    assert_eq!(manager.damage_spots(), vec![spot]);
    let breach = manager.interactable(spot).unwrap();
    assert_eq!(breach.position, impact);
    match &breach.kind {
        InteractableKind::DamageSpot(s) => assert_eq!(s.damage, 9.0),
        other => panic!("expected a damage spot, got {other:?}"),
    }
}

#[test]
fn harmless_items_leave_no_breach() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    assert!(manager
        .apply_incoming_hit(Vec2::new(500.0, 500.0), ItemKind::Lemon, 3.0)
        .is_none());
    assert_eq!(manager.boat_health, 100.0);
    assert!(manager.damage_spots().is_empty());
}

#[test]
fn plank_repairs_the_breach_once() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let spot = manager
        .apply_incoming_hit(Vec2::new(500.0, 500.0), ItemKind::Cannonball, 4.0)
        .unwrap();
    manager.boat_health = 80.0;
    let id = stand_next_to(&mut manager, spot);
    let plank = give(&mut manager, id, ItemKind::Plank);

    assert_eq!(
        manager.interact(id, spot, &mut rng),
        InteractOutcome::Repaired { damage: 4.0 }
    );
    assert_eq!(manager.boat_health, 84.0);
    assert!(manager.player().held_item.is_none());
    assert!(manager.items[&plank].removal_mark);

    assert_eq!(manager.interact(id, spot, &mut rng), InteractOutcome::Nothing);
    assert_eq!(manager.boat_health, 84.0);

    manager.update(0.01, &idle(), &mut rng);
    assert!(manager.interactable(spot).is_none());
    assert!(!manager.items.contains_key(&plank));
}

#[test]
fn repairs_never_overfill_the_hull() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let spot = manager
        .apply_incoming_hit(Vec2::new(500.0, 500.0), ItemKind::Anchor, 5.0)
        .unwrap();
    manager.boat_health = 99.0;
    let id = stand_next_to(&mut manager, spot);
    give(&mut manager, id, ItemKind::Plank);
    manager.interact(id, spot, &mut rng);
    assert_eq!(manager.boat_health, 100.0);
}

#[test]
fn enemy_volley_falls_towards_the_deck() {
    let mut rng = seeded_rng();
    let config = GameConfig {
        crew_size: 0,
        enemy_fire_min_interval: 0.5,
        enemy_fire_max_interval: 0.5,
        max_volley: 1,
        ..GameConfig::default()
    };
    let mut manager = GameManager::new(config, ShipMap::standard().unwrap(), &mut rng);
    let deck = manager.ship_map.deck_bounds();

    manager.update(0.6, &idle(), &mut rng);

    let falling: Vec<&Item> = manager
        .items
        .values()
        .filter(|item| item.is_fired() && !item.fire.fired_up)
        .collect();
    assert_eq!(falling.len(), 1);
    let landing = falling[0].landing_y.unwrap();
    assert!(landing >= deck.top() && landing <= deck.bottom());
}

// ── Round end ─────────────────────────────────────────────────────────────────

#[test]
fn sunk_enemy_wins_exactly_once() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    manager.enemy_health = 3.0;
    manager.apply_outgoing_hit(1.0, 3.0);
    assert_eq!(manager.enemy_health, 0.0);

    manager.update(0.01, &idle(), &mut rng);
    let first = manager.drain_events();
    assert_eq!(scene_changes(&first), vec![SceneChange::win()]);
    assert_eq!(scene_changes(&first)[0].context, None);
    assert!(manager.is_over());

    manager.update(0.01, &idle(), &mut rng);
    manager.update(0.01, &idle(), &mut rng);
    assert!(scene_changes(&manager.drain_events()).is_empty());
}

#[test]
fn sunk_ship_loses_in_combat() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    manager.boat_health = 2.0;
    manager.apply_incoming_hit(Vec2::new(500.0, 500.0), ItemKind::Anchor, 1.0);
    assert_eq!(manager.boat_health, 0.0);

    manager.update(0.01, &idle(), &mut rng);
    assert_eq!(scene_changes(manager.events()), vec![SceneChange::lose(false)]);
}

#[test]
fn scurvy_kills_then_loses_after_the_death_sequence() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    manager.pirate_mut(id).scurvy_time = 0.01;

    manager.update(0.05, &idle(), &mut rng);
    let player = manager.player();
    assert!(player.dead);
    assert!(!player.can_move);
    assert_eq!(player.scurvy_time, 0.0);
    assert_eq!(player.anim.selected_key(), PIRATE_DEAD);
    assert!(manager.events().contains(&GameEvent::PlaySound(Sound::Death)));
    assert!(scene_changes(manager.events()).is_empty());

    // still dying
    manager.update(1.0, &idle(), &mut rng);
    manager.update(1.0, &idle(), &mut rng);
    assert!(scene_changes(manager.events()).is_empty());

    manager.update(0.6, &idle(), &mut rng);
    assert_eq!(scene_changes(manager.events()), vec![SceneChange::lose(true)]);
}

#[test]
fn dead_pirates_stay_put() {
    let mut rng = seeded_rng();
    let mut manager = make_manager(&mut rng);
    let id = manager.player_id();
    manager.pirate_mut(id).scurvy_time = 0.01;
    manager.update(0.05, &idle(), &mut rng);
    let at = manager.player().position;

    let walk = InputSnapshot::empty().with_held(Key::Right, true);
    manager.update(0.5, &walk, &mut rng);
    assert_eq!(manager.player().position, at);
}

// ── Drawing ───────────────────────────────────────────────────────────────────

#[test]
fn draw_queues_every_visible_thing() {
    let mut rng = seeded_rng();
    let manager = make_manager(&mut rng);
    let mut cam = Camera::default();
    manager.draw(&mut cam);
    let map = &manager.ship_map;
    let tiles = (map.width() * map.height()) as usize;
    // tiles + interactables + items + player + marker
    let expected = tiles + manager.interactables.len() + manager.items.len() + 2;
    assert_eq!(cam.pending(), expected);
    let ops = cam.drain_sorted();
    assert!(ops.windows(2).all(|pair| pair[0].z <= pair[1].z));
}
