//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per frame
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod effects;
pub mod layout;
pub mod phase;
pub mod progression;
pub mod shop;
pub mod singularity;
pub mod spawn;
pub mod state;
pub mod tick;

pub use body::{BodyKind, BodyProfile, DamageResult, OrbitalBody};
pub use collision::{DamageReport, cursor_overlaps, resolve_damage_tick};
pub use effects::{Debris, Effects, FloatingText, Shockwave, TextKind};
pub use layout::{Rect, SummaryChoice};
pub use phase::{GamePhase, PhaseAction, PhaseEvent, transition};
pub use progression::ProgressionTracker;
pub use shop::{ShopClick, ShopNode};
pub use singularity::Singularity;
pub use spawn::SpawnController;
pub use state::{Cursor, GameEvent, GameState, RunState};
pub use tick::{InputEvent, Key, PointerButton, TickInput, apply_phase_event, tick};
