//! Full sessions driven through `tick` with synthetic input

use std::collections::BTreeMap;
use std::sync::Arc;

use cosmic_incremental::catalog::ids;
use cosmic_incremental::sim::layout::{menu_play_button, summary_buttons};
use cosmic_incremental::sim::{GameEvent, GamePhase, GameState, Key, TickInput, tick};
use cosmic_incremental::{EconomySnapshot, GameConfig, UpgradeCatalog, persistence, world_to_screen};

fn wait_for(state: &mut GameState, phase: GamePhase, max_frames: u32) {
    for _ in 0..max_frames {
        if state.phase == phase {
            return;
        }
        tick(state, &TickInput::default());
    }
    assert_eq!(state.phase, phase);
}

fn hunt(state: &mut GameState) {
    let center = state.config.screen_center();
    while state.phase == GamePhase::Playing {
        let aim = state
            .bodies
            .iter()
            .filter(|b| b.visual_scale() >= 1.0)
            .min_by(|a, b| a.orbit_radius.total_cmp(&b.orbit_radius))
            .map(|b| world_to_screen(b.pos, center, state.zoom))
            .unwrap_or(center);
        tick(state, &TickInput::pointer(aim));
    }
}

#[test]
fn test_menu_run_summary_shop_run() {
    let mut state = GameState::standard(2024).unwrap();
    let play = menu_play_button(&state.config).center();
    tick(&mut state, &TickInput::click(play));
    wait_for(&mut state, GamePhase::Playing, 100);

    hunt(&mut state);
    assert_eq!(state.phase, GamePhase::TransitionToSummary);
    wait_for(&mut state, GamePhase::Summary, 500);

    let earned = state.run.earnings;
    assert!(earned > 0, "auto-aim should destroy something in 30s");
    assert_eq!(state.economy().bank(), earned);
    assert!(state.bodies.is_empty());

    let events = state.drain_events();
    let destroyed: u64 = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::BodyDestroyed { value, .. } => Some(*value),
            _ => None,
        })
        .sum();
    assert_eq!(destroyed, earned);

    let shop = summary_buttons(&state.config)[1].1.center();
    tick(&mut state, &TickInput::click(shop));
    wait_for(&mut state, GamePhase::Progression, 500);
    for _ in 0..10 {
        tick(&mut state, &TickInput::default());
    }
    tick(&mut state, &TickInput::key(Key::Shop));
    assert_eq!(state.phase, GamePhase::TransitionFromShop);
    wait_for(&mut state, GamePhase::Playing, 500);

    assert_eq!(state.run.earnings, 0);
    assert_eq!(state.run.time_remaining, state.config.run_duration_secs);
    assert_eq!(state.economy().bank(), earned);
}

#[test]
fn test_snapshot_survives_save_file() {
    let mut state = GameState::standard(9).unwrap();
    state.deposit(5_000);
    assert!(state.purchase(ids::DAMAGE));
    assert!(state.purchase(ids::RADIUS));
    assert!(state.purchase(ids::DURATION));
    let snapshot = state.snapshot();

    let dir = std::env::temp_dir().join(format!("cosmic-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("save.json");
    persistence::save(&path, &snapshot).unwrap();
    let loaded = persistence::load(&path).unwrap().unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    let mut fresh = GameState::standard(10).unwrap();
    fresh.restore(&loaded);
    assert_eq!(fresh.economy().stats(), state.economy().stats());
    assert_eq!(fresh.economy().bank(), state.economy().bank());
    assert_eq!(fresh.cursor.radius, 40.0);
}

#[test]
fn test_restore_ignores_unknown_and_clamps() {
    let mut state = GameState::standard(1).unwrap();
    let snapshot = EconomySnapshot {
        bank: 7,
        levels: BTreeMap::from([
            ("warp_drive".to_string(), 3),
            (ids::RESONANCE.to_string(), 9),
        ]),
    };
    state.restore(&snapshot);

    assert_eq!(state.economy().level(ids::RESONANCE), 1);
    assert_eq!(state.economy().level("warp_drive"), 0);
    assert_eq!(state.economy().bank(), 7);
}

#[test]
fn test_resonance_reopens_quota_on_level_up() {
    let config = GameConfig {
        xp_base_requirement: 50.0,
        ..Default::default()
    };
    let catalog = Arc::new(UpgradeCatalog::standard(&config).unwrap());
    let mut state = GameState::new(config, catalog, 31);
    state.deposit(500);
    assert!(state.purchase(ids::RESONANCE));
    state.phase = GamePhase::Playing;

    // Let the whole first wave arrive and settle
    for _ in 0..120 {
        tick(&mut state, &TickInput::default());
    }
    assert_eq!(state.spawner.remaining(state.economy().stats().spawn_limit), 0);

    hunt_frames(&mut state, 1200);
    let events = state.drain_events();
    assert!(events.contains(&GameEvent::Resonance));
    assert!(state.singularity.level > 1);
}

fn hunt_frames(state: &mut GameState, frames: u32) {
    let center = state.config.screen_center();
    for _ in 0..frames {
        if state.phase != GamePhase::Playing {
            break;
        }
        let aim = state
            .bodies
            .first()
            .map(|b| world_to_screen(b.pos, center, state.zoom))
            .unwrap_or(center);
        tick(state, &TickInput::pointer(aim));
    }
}

#[test]
fn test_cursor_radius_follows_public_purchases() {
    let mut state = GameState::standard(3).unwrap();
    state.deposit(1_000);
    for _ in 0..3 {
        assert!(state.purchase(ids::RADIUS));
    }
    assert_eq!(state.cursor.radius, state.economy().stats().cursor_radius);
    assert_eq!(state.cursor.radius, 50.0);
}
