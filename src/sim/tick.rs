//! Fixed timestep simulation tick
//!
//! One call advances the game by one frame: input first, then whatever the
//! current phase animates. While playing, the frame order is
//! timer → spawn → singularity → zoom → bodies → effects → damage tick, so
//! damage always sees positions already moved this frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::resolve_damage_tick;
use super::layout::{SummaryChoice, menu_play_button, summary_choice_at};
use super::phase::{GamePhase, PhaseAction, PhaseEvent, transition};
use super::shop::{self, ShopClick};
use super::singularity::{ease_zoom, zoom_for_level};
use super::spawn::spawn_body;
use super::state::{GameEvent, GameState};
use crate::consts::{MENU_SLIDE_DISTANCE, MENU_SLIDE_SPEED, SHOP_NODES_STEP, TRANSITION_ARRIVAL};

/// Pointer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Toggle pause while playing
    Pause,
    /// End the run early while paused
    Quit,
    /// Play again from the summary
    Restart,
    /// Open the shop from the summary, or leave it
    Shop,
}

/// A discrete input event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { pos: Vec2, button: PointerButton },
    KeyDown(Key),
}

/// Input for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Current pointer position (screen pixels), if known
    pub pointer: Option<Vec2>,
    /// Discrete events since the last tick, in arrival order
    pub events: Vec<InputEvent>,
}

impl TickInput {
    /// Pointer moved, nothing pressed
    pub fn pointer(pos: Vec2) -> Self {
        Self {
            pointer: Some(pos),
            events: Vec::new(),
        }
    }

    /// Primary click at `pos`
    pub fn click(pos: Vec2) -> Self {
        Self {
            pointer: Some(pos),
            events: vec![InputEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
            }],
        }
    }

    pub fn key(key: Key) -> Self {
        Self {
            pointer: None,
            events: vec![InputEvent::KeyDown(key)],
        }
    }
}

/// Advance the game state by one frame
pub fn tick<R: Rng>(state: &mut GameState<R>, input: &TickInput) {
    if let Some(pos) = input.pointer {
        state.cursor.screen_pos = pos;
    }
    for event in &input.events {
        handle_input(state, event);
    }

    if state.phase == GamePhase::Paused {
        return;
    }
    state.time_ticks += 1;

    match state.phase {
        GamePhase::Menu | GamePhase::Summary | GamePhase::Paused => {}
        GamePhase::TransitionFromMenu => {
            state.menu_offset = (state.menu_offset + MENU_SLIDE_SPEED).min(MENU_SLIDE_DISTANCE);
            if state.menu_offset >= MENU_SLIDE_DISTANCE {
                state.menu_offset = 0.0;
                apply_phase_event(state, PhaseEvent::AnimationComplete);
            }
        }
        GamePhase::TransitionToMenu => {
            state.menu_offset = (state.menu_offset - MENU_SLIDE_SPEED).max(0.0);
            update_camera(state);
            if state.menu_offset <= 0.0 && state.singularity.has_arrived(TRANSITION_ARRIVAL) {
                apply_phase_event(state, PhaseEvent::AnimationComplete);
            }
        }
        GamePhase::Playing => run_frame(state),
        GamePhase::TransitionToSummary => {
            state.singularity.update();
            state.effects.update_texts();
            if state.singularity.is_settled() {
                apply_phase_event(state, PhaseEvent::AnimationComplete);
            }
        }
        GamePhase::TransitionToShop => {
            state.singularity.update();
            if state.singularity.has_arrived(TRANSITION_ARRIVAL) {
                apply_phase_event(state, PhaseEvent::AnimationComplete);
            }
        }
        GamePhase::Progression => {
            state.shop_progress = (state.shop_progress + SHOP_NODES_STEP).min(1.0);
            state.singularity.update();
        }
        GamePhase::TransitionFromShop => {
            state.shop_progress = (state.shop_progress - SHOP_NODES_STEP).max(0.0);
            state.singularity.update();
            if state.shop_progress <= 0.0 {
                apply_phase_event(state, PhaseEvent::AnimationComplete);
            }
        }
        GamePhase::TransitionToPlay => {
            update_camera(state);
            if state.singularity.has_arrived(TRANSITION_ARRIVAL) {
                apply_phase_event(state, PhaseEvent::AnimationComplete);
            }
        }
    }
}

/// Translate one input event for the current phase
fn handle_input<R: Rng>(state: &mut GameState<R>, event: &InputEvent) {
    use GamePhase as P;

    let phase_event = match (state.phase, *event) {
        (P::Menu, InputEvent::PointerDown { pos, button: PointerButton::Primary })
            if menu_play_button(&state.config).contains(pos) =>
        {
            Some(PhaseEvent::StartClicked)
        }
        (P::Playing | P::Paused, InputEvent::KeyDown(Key::Pause)) => Some(PhaseEvent::PauseToggled),
        (P::Paused, InputEvent::KeyDown(Key::Quit)) => Some(PhaseEvent::EndRunRequested),
        (P::Summary, InputEvent::PointerDown { pos, button: PointerButton::Primary }) => {
            summary_choice_at(&state.config, pos).map(|choice| match choice {
                SummaryChoice::Restart => PhaseEvent::Restart,
                SummaryChoice::Shop => PhaseEvent::OpenShop,
                SummaryChoice::Menu => PhaseEvent::BackToMenu,
            })
        }
        (P::Summary, InputEvent::KeyDown(Key::Restart)) => Some(PhaseEvent::Restart),
        (P::Summary, InputEvent::KeyDown(Key::Shop)) => Some(PhaseEvent::OpenShop),
        (P::Progression, InputEvent::PointerDown { pos, button: PointerButton::Primary }) => {
            let center = state.config.screen_center();
            match shop::click(
                &state.economy,
                center,
                state.config.shop_core_radius,
                state.shop_progress,
                pos,
            ) {
                ShopClick::Core => Some(PhaseEvent::LeaveShop),
                ShopClick::Node(id) => {
                    if !state.purchase(&id) {
                        log::debug!("Declined purchase of {}", id);
                    }
                    None
                }
                ShopClick::Nothing => None,
            }
        }
        (P::Progression, InputEvent::KeyDown(Key::Shop)) => Some(PhaseEvent::LeaveShop),
        _ => None,
    };

    if let Some(phase_event) = phase_event {
        apply_phase_event(state, phase_event);
    }
}

/// Feed an event through the transition table and perform its action.
/// Returns false when the current phase ignores the event.
pub fn apply_phase_event<R: Rng>(state: &mut GameState<R>, event: PhaseEvent) -> bool {
    let Some((next, action)) = transition(state.phase, event) else {
        return false;
    };
    perform(state, action);
    let from = state.phase;
    state.phase = next;
    log::info!("Phase {:?} -> {:?}", from, next);
    state.push_event(GameEvent::PhaseChanged { from, to: next });
    true
}

fn perform<R: Rng>(state: &mut GameState<R>, action: PhaseAction) {
    match action {
        PhaseAction::None => {}
        PhaseAction::ExpandSingularity => {
            let diagonal = state.config.screen_diagonal();
            state.singularity.expand_to_cover_screen(diagonal);
        }
        PhaseAction::ClearArena => {
            state.bodies.clear();
            state.effects.clear();
            log::info!(
                "Run over: earned {} destroying {} bodies (bank {})",
                state.run.earnings,
                state.run.total_destroyed(),
                state.economy.bank()
            );
        }
        PhaseAction::ResetRun => state.reset_run(),
        PhaseAction::EnterShop => {
            let core = state.config.shop_core_radius;
            state.singularity.shrink_to_core(core);
            state.shop_progress = 0.0;
        }
        PhaseAction::ReturnToMenu => {
            state.reset_run();
            state.menu_offset = MENU_SLIDE_DISTANCE;
        }
    }
}

fn update_camera<R: Rng>(state: &mut GameState<R>) {
    state.singularity.update();
    state.zoom = ease_zoom(state.zoom, zoom_for_level(state.singularity.level));
}

/// One frame of an active run
fn run_frame<R: Rng>(state: &mut GameState<R>) {
    state.run.time_remaining -= state.config.frame_dt();
    if state.run.is_over() {
        state.run.time_remaining = 0.0;
        apply_phase_event(state, PhaseEvent::TimeExpired);
        return;
    }

    let quota = state.economy.stats().spawn_limit;
    if state.spawner.poll(quota, &state.config) {
        let id = state.next_entity_id();
        let body = spawn_body(
            id,
            &state.config,
            state.economy.stats(),
            &state.singularity,
            &mut state.rng,
        );
        state.events.push(GameEvent::BodySpawned {
            id,
            kind: body.kind,
            tier: body.tier,
        });
        state.bodies.push(body);
    }

    update_camera(state);

    for body in &mut state.bodies {
        body.update();
    }

    let singularity_radius = state.singularity.radius;
    state.effects.update(&mut state.bodies, singularity_radius);

    state.damage_timer += 1;
    if state.damage_timer >= state.config.damage_tick_frames {
        state.damage_timer = 0;
        resolve_damage_tick(state);
    }
}
