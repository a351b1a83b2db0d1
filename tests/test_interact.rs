use cannon_crew::anim::{CANNON_FIRING, CANNON_IDLE, CANNON_SELECTABLE};
use cannon_crew::entities::ItemKind;
use cannon_crew::geometry::Vec2;
use cannon_crew::interact::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn cannon_state(i: &Interactable) -> &Cannon {
    i.as_cannon().expect("a cannon")
}

// ── Cannon ────────────────────────────────────────────────────────────────────

#[test]
fn ready_cannon_asks_to_fire() {
    let mut cannon = Interactable::cannon(Vec2::new(100.0, 100.0), 12.0);
    assert!(cannon.can_highlight(None));
    assert_eq!(cannon.interact(None, &mut seeded_rng()), InteractOutcome::FireCannon);
}

#[test]
fn start_firing_restarts_cooldown_and_times_the_launch() {
    let mut cannon = Interactable::cannon(Vec2::ZERO, 12.0);
    let delay = cannon.as_cannon_mut().unwrap().start_firing().unwrap();
    assert!((delay - 4.0 / 6.0).abs() < 1e-6);
    let state = cannon_state(&cannon);
    assert_eq!(state.cooldown, 12.0);
    assert!(state.is_firing());
    assert!(!cannon.can_highlight(None));
}

#[test]
fn cooling_cannon_ignores_interaction() {
    let mut rng = seeded_rng();
    let mut cannon = Interactable::cannon(Vec2::ZERO, 12.0);
    cannon.as_cannon_mut().unwrap().start_firing();
    cannon.update(1.5);
    let before = cannon_state(&cannon).cooldown;
    let clip = cannon_state(&cannon).anim.selected_key();

    let holding = Some(ItemKind::Cannonball.info());
    assert_eq!(cannon.interact(holding, &mut rng), InteractOutcome::Nothing);
    assert_eq!(cannon.as_cannon_mut().unwrap().start_firing(), None);

    assert_eq!(cannon_state(&cannon).cooldown, before);
    assert_eq!(cannon_state(&cannon).anim.selected_key(), clip);
}

#[test]
fn cooldown_counts_down_to_zero() {
    let mut cannon = Interactable::cannon(Vec2::ZERO, 2.0);
    cannon.as_cannon_mut().unwrap().start_firing();
    for _ in 0..30 {
        cannon.update(0.1);
    }
    assert_eq!(cannon_state(&cannon).cooldown, 0.0);
    assert!(cannon.can_highlight(None));
}

#[test]
fn highlight_drives_the_idle_clip() {
    let mut cannon = Interactable::cannon(Vec2::ZERO, 12.0);
    cannon.highlight = true;
    cannon.update(0.01);
    assert_eq!(cannon_state(&cannon).anim.selected_key(), CANNON_SELECTABLE);
    cannon.highlight = false;
    cannon.update(0.01);
    assert_eq!(cannon_state(&cannon).anim.selected_key(), CANNON_IDLE);
}

#[test]
fn firing_clip_survives_highlight_changes() {
    let mut cannon = Interactable::cannon(Vec2::ZERO, 12.0);
    cannon.as_cannon_mut().unwrap().start_firing();
    cannon.highlight = true;
    cannon.update(0.01);
    assert_eq!(cannon_state(&cannon).anim.selected_key(), CANNON_FIRING);
}

#[test]
fn muzzle_is_above_the_cannon() {
    let cannon = Interactable::cannon(Vec2::new(50.0, 300.0), 12.0);
    assert!(cannon.muzzle().y < 300.0);
    assert_eq!(cannon.muzzle().x, 50.0);
}

// ── Item barrel ───────────────────────────────────────────────────────────────

#[test]
fn barrel_hands_out_an_item_then_cools_down() {
    let mut rng = seeded_rng();
    let mut barrel = Interactable::barrel(Vec2::ZERO, 3.0);
    match barrel.interact(None, &mut rng) {
        InteractOutcome::SpawnItem(kind) => assert!(kind.info().barrel_spawnable),
        other => panic!("expected an item, got {other:?}"),
    }
    assert!(!barrel.can_highlight(None));
    assert_eq!(barrel.interact(None, &mut rng), InteractOutcome::Nothing);

    barrel.update(3.0);
    assert!(barrel.can_highlight(None));
}

#[test]
fn barrel_refuses_full_hands() {
    let mut barrel = Interactable::barrel(Vec2::ZERO, 3.0);
    let holding = Some(ItemKind::Lemon.info());
    assert_eq!(barrel.interact(holding, &mut seeded_rng()), InteractOutcome::Nothing);
    assert!(!barrel.can_highlight(holding));
    assert!(barrel.can_highlight(None));
}

// ── Damage spot ───────────────────────────────────────────────────────────────

#[test]
fn spot_needs_a_fixer() {
    let mut rng = seeded_rng();
    let mut spot = Interactable::damage_spot(Vec2::ZERO, 4.0);
    assert!(!spot.is_solid());
    assert_eq!(spot.interact(None, &mut rng), InteractOutcome::Nothing);
    assert_eq!(
        spot.interact(Some(ItemKind::Cannonball.info()), &mut rng),
        InteractOutcome::Nothing
    );
    assert!(!spot.removal_mark);
    assert!(!spot.can_highlight(None));
    assert!(!spot.can_highlight(Some(ItemKind::Cannonball.info())));
    assert!(spot.can_highlight(Some(ItemKind::Plank.info())));
}

#[test]
fn spot_repairs_once() {
    let mut rng = seeded_rng();
    let mut spot = Interactable::damage_spot(Vec2::ZERO, 4.0);
    let plank = Some(ItemKind::Plank.info());
    assert_eq!(spot.interact(plank, &mut rng), InteractOutcome::Repaired { damage: 4.0 });
    assert!(spot.removal_mark);
    assert!(!spot.can_highlight(plank));
    assert_eq!(spot.interact(plank, &mut rng), InteractOutcome::Nothing);
}
