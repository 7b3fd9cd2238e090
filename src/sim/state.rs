//! Game state: the context every subsystem works on
//!
//! One `GameState` owns the economy, the current run, the live entity lists
//! and the seeded RNG. The renderer reads it once per frame; only
//! [`super::tick`] mutates it.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{BodyKind, OrbitalBody};
use super::effects::Effects;
use super::phase::GamePhase;
use super::progression::ProgressionTracker;
use super::singularity::Singularity;
use super::spawn::SpawnController;
use crate::catalog::{CatalogError, UpgradeCatalog};
use crate::config::GameConfig;
use crate::economy::{EconomyLedger, EconomySnapshot};
use crate::screen_to_world;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    BodySpawned { id: u32, kind: BodyKind, tier: u32 },
    BodyDestroyed { id: u32, kind: BodyKind, tier: u32, value: u64 },
    CriticalHit { id: u32 },
    Split { parent: u32, child: u32 },
    TimeRefund { seconds: f32 },
    LevelUp { level: u32 },
    Resonance,
    Purchased { id: String, level: u32 },
}

/// Per-run counters, reset at the start of each run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Seconds left, terminal at 0
    pub time_remaining: f32,
    /// Money earned this run (also credited to the bank)
    pub earnings: u64,
    /// Destroyed bodies per tier
    pub destroyed_by_tier: BTreeMap<u32, u32>,
}

impl RunState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            time_remaining: config.run_duration_secs,
            earnings: 0,
            destroyed_by_tier: BTreeMap::new(),
        }
    }

    pub fn total_destroyed(&self) -> u32 {
        self.destroyed_by_tier.values().sum()
    }

    pub fn is_over(&self) -> bool {
        self.time_remaining <= 0.0
    }
}

/// The player's damage area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Pointer position in screen pixels
    pub screen_pos: Vec2,
    /// Collision radius (world units)
    pub radius: f32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState<R = Pcg32> {
    pub config: GameConfig,
    /// Mutated only through `GameState` so derived stats reach the cursor
    pub(crate) economy: EconomyLedger,
    pub phase: GamePhase,
    pub singularity: Singularity,
    pub spawner: SpawnController,
    pub progression: ProgressionTracker,
    pub run: RunState,
    /// Live bodies, in spawn order
    pub bodies: Vec<OrbitalBody>,
    pub effects: Effects,
    pub cursor: Cursor,
    /// Current world-to-screen scale
    pub zoom: f32,
    /// Menu slide offset in pixels (0 = shown)
    pub menu_offset: f32,
    /// Shop node animation, 0 (collapsed) to 1 (extended)
    pub shop_progress: f32,
    /// Frames since the last damage tick
    pub damage_timer: u32,
    /// Simulation frame counter
    pub time_ticks: u64,
    pub(super) events: Vec<GameEvent>,
    pub(super) rng: R,
    next_id: u32,
}

impl GameState<Pcg32> {
    /// Create a state with a seeded PCG generator
    pub fn new(config: GameConfig, catalog: Arc<UpgradeCatalog>, seed: u64) -> Self {
        Self::with_rng(config, catalog, Pcg32::seed_from_u64(seed))
    }

    /// Default config and the standard upgrade tree
    pub fn standard(seed: u64) -> Result<Self, CatalogError> {
        let config = GameConfig::default();
        let catalog = Arc::new(UpgradeCatalog::standard(&config)?);
        Ok(Self::new(config, catalog, seed))
    }
}

impl<R: Rng> GameState<R> {
    /// Create a state drawing randomness from `rng`
    pub fn with_rng(config: GameConfig, catalog: Arc<UpgradeCatalog>, rng: R) -> Self {
        let economy = EconomyLedger::new(catalog, config.clone());
        let cursor = Cursor {
            screen_pos: config.screen_center(),
            radius: economy.stats().cursor_radius,
        };
        Self {
            singularity: Singularity::new(&config),
            spawner: SpawnController::new(),
            progression: ProgressionTracker::new(&config),
            run: RunState::new(&config),
            bodies: Vec::new(),
            effects: Effects::new(),
            cursor,
            zoom: 1.0,
            menu_offset: 0.0,
            shop_progress: 0.0,
            damage_timer: 0,
            time_ticks: 0,
            phase: GamePhase::Menu,
            events: Vec::new(),
            rng,
            next_id: 1,
            economy,
            config,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn economy(&self) -> &EconomyLedger {
        &self.economy
    }

    /// Credit the bank outside of a run
    pub fn deposit(&mut self, amount: u64) {
        self.economy.deposit(amount);
    }

    /// Cursor position in world space, accounting for zoom
    pub fn cursor_world(&self) -> Vec2 {
        screen_to_world(self.cursor.screen_pos, self.config.screen_center(), self.zoom)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a fresh run: timer, xp, quota, entities, singularity
    pub fn reset_run(&mut self) {
        self.run = RunState::new(&self.config);
        self.progression.reset();
        self.spawner.reset();
        self.bodies.clear();
        self.effects.clear();
        self.damage_timer = 0;
        self.singularity.shrink_to_base();
        self.sync_cursor();
        log::debug!("Run reset");
    }

    /// Buy the next level of an upgrade; `false` if declined
    pub fn purchase(&mut self, id: &str) -> bool {
        if !self.economy.purchase(id) {
            return false;
        }
        self.sync_cursor();
        let level = self.economy.level(id);
        self.push_event(GameEvent::Purchased {
            id: id.to_string(),
            level,
        });
        true
    }

    /// Persisted economy: bank and purchased levels
    pub fn snapshot(&self) -> EconomySnapshot {
        self.economy.snapshot()
    }

    pub fn restore(&mut self, snapshot: &EconomySnapshot) {
        self.economy.restore(snapshot);
        self.sync_cursor();
    }

    /// Live stats that are mirrored on entities
    fn sync_cursor(&mut self) {
        self.cursor.radius = self.economy.stats().cursor_radius;
    }

    /// Deposit run earnings and record the kill
    pub(super) fn record_destruction(&mut self, body: &OrbitalBody) {
        let value = body.payout();
        self.run.earnings = self.run.earnings.saturating_add(value);
        self.economy.deposit(value);
        *self.run.destroyed_by_tier.entry(body.tier).or_insert(0) += 1;
        self.push_event(GameEvent::BodyDestroyed {
            id: body.id,
            kind: body.kind,
            tier: body.tier,
            value,
        });
    }
}
