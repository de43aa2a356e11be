use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use space_invaders::formation::*;
use space_invaders::removal::RemovalSet;

const SPRITE: Vec2 = Vec2::new(20.0, 15.0);

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn position_of(f: &Formation, i: usize) -> Vec2 {
    f.invaders[i].asset.placement().unwrap().position
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn random_formation_size_stays_in_range() {
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let f = Formation::new(&mut rng, Some(SPRITE));
        assert!((MIN_ROWS..=MAX_ROWS).contains(&f.rows));
        assert!((MIN_COLUMNS..=MAX_COLUMNS).contains(&f.columns));
        assert_eq!(f.invaders.len(), f.rows * f.columns);
        assert_eq!(f.width, f.columns as f32 * 30.0);
    }
}

#[test]
fn same_seed_same_formation() {
    let a = Formation::new(&mut seeded_rng(), None);
    let b = Formation::new(&mut seeded_rng(), None);
    assert_eq!((a.rows, a.columns), (b.rows, b.columns));
}

#[test]
fn invaders_are_grid_aligned_column_major() {
    let f = Formation::with_dimensions(2, 3, Some(SPRITE));
    assert_eq!(f.invaders.len(), 6);
    let expected = [
        (0.0, 0.0),
        (0.0, 30.0),
        (30.0, 0.0),
        (30.0, 30.0),
        (60.0, 0.0),
        (60.0, 30.0),
    ];
    for (i, (x, y)) in expected.iter().enumerate() {
        assert_eq!(position_of(&f, i), Vec2::new(*x, *y));
    }
    assert_eq!(f.position, Vec2::ZERO);
    assert_eq!(f.velocity, Vec2::new(3.0, 0.0));
    assert_eq!(f.width, 90.0);
}

#[test]
fn formation_without_sprite_starts_pending() {
    let f = Formation::with_dimensions(2, 3, None);
    assert_eq!(f.invaders.len(), 6);
    assert_eq!(f.live_invaders(), 0);
}

#[test]
fn sprite_arrival_places_invaders_at_spawn_offsets() {
    let mut f = Formation::with_dimensions(2, 3, None);
    f.invader_asset_ready(SPRITE);
    assert_eq!(f.live_invaders(), 6);
    assert_eq!(position_of(&f, 5), Vec2::new(60.0, 30.0));
}

#[test]
fn late_sprite_places_invaders_relative_to_drifted_formation() {
    let mut f = Formation::with_dimensions(2, 3, None);
    for _ in 0..10 {
        f.update(500.0);
        f.advance_invaders();
    }
    assert_eq!(f.position, Vec2::new(30.0, 0.0));

    f.invader_asset_ready(SPRITE);
    assert_eq!(position_of(&f, 0), Vec2::new(30.0, 0.0));
    assert_eq!(position_of(&f, 5), Vec2::new(90.0, 30.0));

    // The extent refit agrees with where the formation already is.
    f.recompute_extent();
    assert_eq!(f.position.x, 30.0);
    assert_eq!(f.width, 60.0 + 20.0);
}

// ── Movement & bounce ─────────────────────────────────────────────────────────

#[test]
fn drift_without_bounce() {
    let mut f = Formation::with_dimensions(2, 3, Some(SPRITE));
    f.position.x = 100.0;
    f.update(500.0);
    assert_eq!(f.position.x, 103.0);
    assert_eq!(f.velocity, Vec2::new(3.0, 0.0));
}

#[test]
fn bounce_off_right_edge_flips_and_drops() {
    // x=480, width=60 → 483 + 60 = 543 ≥ 500
    let mut f = Formation::with_dimensions(2, 2, Some(SPRITE));
    f.position.x = 480.0;
    f.width = 60.0;
    f.update(500.0);
    assert_eq!(f.position.x, 483.0);
    assert_eq!(f.velocity, Vec2::new(-3.0, 30.0));
}

#[test]
fn bounce_off_left_edge_flips_and_drops() {
    let mut f = Formation::with_dimensions(2, 2, Some(SPRITE));
    f.position.x = 2.0;
    f.velocity.x = -3.0;
    f.update(500.0);
    assert_eq!(f.position.x, -1.0);
    assert_eq!(f.velocity, Vec2::new(3.0, 30.0));
}

#[test]
fn drop_impulse_lasts_one_frame() {
    let mut f = Formation::with_dimensions(2, 2, Some(SPRITE));
    f.position.x = 480.0;
    f.width = 60.0;
    f.update(500.0); // bounce
    f.position.x = 200.0;
    f.update(500.0);
    assert_eq!(f.position.y, 30.0);
    assert_eq!(f.velocity, Vec2::new(-3.0, 0.0));
    f.update(500.0);
    assert_eq!(f.position.y, 30.0);
}

#[test]
fn invaders_pick_up_the_drop_on_the_bounce_frame() {
    let mut f = Formation::with_dimensions(2, 2, Some(SPRITE));
    f.position.x = 480.0;
    f.width = 60.0;
    f.update(500.0);
    f.advance_invaders();
    assert_eq!(position_of(&f, 0), Vec2::new(-3.0, 30.0));
}

// ── Firing ────────────────────────────────────────────────────────────────────

#[test]
fn fire_uses_a_live_invader() {
    let f = Formation::with_dimensions(3, 4, Some(SPRITE));
    let mut sink = Vec::new();
    assert!(f.fire(&mut seeded_rng(), &mut sink));
    assert_eq!(sink.len(), 1);
    let shooter = f.pick_shooter(&mut seeded_rng()).unwrap();
    let p = position_of(&f, shooter);
    assert_eq!(sink[0].position, Vec2::new(p.x + 10.0, p.y + 15.0));
}

#[test]
fn pending_formation_holds_fire() {
    let f = Formation::with_dimensions(3, 4, None);
    let mut sink = Vec::new();
    assert!(!f.fire(&mut seeded_rng(), &mut sink));
    assert!(sink.is_empty());
}

// ── Removal & extent ──────────────────────────────────────────────────────────

#[test]
fn removing_edge_column_refits_extent() {
    // 2x3: indices 0,1 are column 0
    let mut f = Formation::with_dimensions(2, 3, Some(SPRITE));
    let mut doomed = RemovalSet::with_len(f.invaders.len());
    doomed.mark(0);
    doomed.mark(1);
    assert_eq!(f.remove_invaders(&doomed), 2);
    assert_eq!(f.invaders.len(), 4);
    assert_eq!(f.position.x, 30.0);
    assert_eq!(f.width, 60.0 - 30.0 + 20.0);
}

#[test]
fn interior_removal_keeps_first_last_proxy() {
    let mut f = Formation::with_dimensions(1, 3, Some(SPRITE));
    let mut doomed = RemovalSet::with_len(3);
    doomed.mark(1);
    f.remove_invaders(&doomed);
    assert_eq!(f.position.x, 0.0);
    assert_eq!(f.width, 80.0);
}

#[test]
fn proxy_understates_width_when_last_in_spawn_order_is_not_rightmost() {
    let mut f = Formation::with_dimensions(2, 2, Some(SPRITE));
    // Shift the last-spawned invader left of its neighbour.
    if let Some(p) = f.invaders[3].asset.placement_mut() {
        p.position.x = 10.0;
    }
    f.recompute_extent();
    assert_eq!(f.width, 30.0);
}

#[test]
fn removing_everything_leaves_an_empty_formation() {
    let mut f = Formation::with_dimensions(2, 2, Some(SPRITE));
    let mut doomed = RemovalSet::with_len(4);
    for i in 0..4 {
        doomed.mark(i);
    }
    assert_eq!(f.remove_invaders(&doomed), 4);
    assert!(f.is_empty());
}
