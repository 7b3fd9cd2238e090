//! Cosmic Incremental headless driver
//!
//! Plays scripted sessions against the engine: an auto-aiming cursor during
//! runs and greedy purchases in the shop between runs. The economy can be
//! loaded from and saved to a JSON record.
//!
//! Usage:
//!   cosmic-incremental --runs 5 --save economy.json
//!   RUST_LOG=debug cosmic-incremental --seed 42

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use glam::Vec2;

use cosmic_incremental::persistence;
use cosmic_incremental::sim::layout::menu_play_button;
use cosmic_incremental::sim::shop::visible_nodes;
use cosmic_incremental::sim::{GamePhase, GameState, Key, TickInput, tick};
use cosmic_incremental::{GameConfig, UpgradeCatalog, world_to_screen};

/// Safety cap on frames spent waiting for any single phase
const MAX_WAIT_FRAMES: u32 = 60 * 60 * 10;

#[derive(Parser, Debug)]
#[command(name = "cosmic-incremental")]
#[command(about = "Play scripted sessions of the orbital incremental game headlessly")]
struct Args {
    /// RNG seed for the session
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of runs to play
    #[arg(long, default_value_t = 5)]
    runs: u32,
    /// JSON config overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Economy save file, loaded at start and written at the end
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let catalog = Arc::new(UpgradeCatalog::standard(&config).context("building upgrade catalog")?);
    let mut state = GameState::new(config, catalog, args.seed);

    if let Some(path) = &args.save {
        if let Some(snapshot) = persistence::load(path)? {
            state.restore(&snapshot);
        }
    }
    log::info!("Session seed {} with {} runs", args.seed, args.runs);

    let play = menu_play_button(&state.config).center();
    tick(&mut state, &TickInput::click(play));
    wait_for(&mut state, GamePhase::Playing)?;

    for run in 1..=args.runs {
        play_run(&mut state)?;
        wait_for(&mut state, GamePhase::Summary)?;
        println!(
            "Run {:>2}: earned {:>6}, destroyed {:>3}, singularity level {:>2}, bank {}",
            run,
            state.run.earnings,
            state.run.total_destroyed(),
            state.singularity.level,
            state.economy().bank()
        );
        for (tier, count) in &state.run.destroyed_by_tier {
            println!("         tier {}: {}", tier, count);
        }

        if run < args.runs {
            shop(&mut state)?;
        }
        state.drain_events();
    }

    println!();
    println!("Upgrades:");
    for (id, level) in state.economy().levels().iter().filter(|(_, level)| **level > 0) {
        println!("  {:<16} level {}", id, level);
    }

    if let Some(path) = &args.save {
        persistence::save(path, &state.snapshot())?;
    }
    Ok(())
}

/// Tick with an idle pointer until `phase` is reached
fn wait_for(state: &mut GameState, phase: GamePhase) -> Result<()> {
    for _ in 0..MAX_WAIT_FRAMES {
        if state.phase == phase {
            return Ok(());
        }
        tick(state, &TickInput::default());
    }
    Err(anyhow!("stuck in {:?} waiting for {:?}", state.phase, phase))
}

/// Play until the run's singularity starts covering the screen
fn play_run(state: &mut GameState) -> Result<()> {
    for _ in 0..MAX_WAIT_FRAMES {
        if state.phase != GamePhase::Playing {
            return Ok(());
        }
        let aim = aim_point(state);
        tick(state, &TickInput::pointer(aim));
    }
    Err(anyhow!("run did not finish"))
}

/// Screen position of the innermost fully spawned body, or the centre
fn aim_point(state: &GameState) -> Vec2 {
    let center = state.config.screen_center();
    state
        .bodies
        .iter()
        .filter(|body| body.visual_scale() >= 1.0)
        .min_by(|a, b| a.orbit_radius.total_cmp(&b.orbit_radius))
        .map(|body| world_to_screen(body.pos, center, state.zoom))
        .unwrap_or(center)
}

/// Open the shop, buy the cheapest affordable node until broke, leave
fn shop(state: &mut GameState) -> Result<()> {
    tick(state, &TickInput::key(Key::Shop));
    wait_for(state, GamePhase::Progression)?;
    while state.shop_progress < 1.0 {
        tick(state, &TickInput::default());
    }

    let center = state.config.screen_center();
    loop {
        let nodes = visible_nodes(state.economy(), center, state.shop_progress);
        let Some(node) = nodes
            .iter()
            .filter(|node| node.affordable)
            .min_by_key(|node| node.cost)
        else {
            break;
        };
        let before = state.economy().bank();
        tick(state, &TickInput::click(node.pos));
        if state.economy().bank() == before {
            log::warn!("Click on {} did not purchase", node.id);
            break;
        }
    }

    tick(state, &TickInput::click(center));
    wait_for(state, GamePhase::Playing)
}
