//! Cursor-versus-body damage ticks
//!
//! Each damage tick:
//! 1. Map the cursor into world space through the current zoom
//! 2. Circle-circle overlap against every live body (grazes count)
//! 3. Roll crits and apply damage through each body's defense
//! 4. Remove destroyed bodies after the pass, then pay out, grant xp,
//!    roll time refund and fission, and scatter debris

use glam::Vec2;
use rand::Rng;

use super::body::OrbitalBody;
use super::effects::{TextKind, shatter};
use super::progression;
use super::spawn::spawn_fragment;
use super::state::{GameEvent, GameState};

/// Whether a cursor circle overlaps a body's current (animated) size
#[inline]
pub fn cursor_overlaps(cursor_world: Vec2, cursor_radius: f32, body: &OrbitalBody) -> bool {
    let reach = cursor_radius + body.current_size;
    cursor_world.distance_squared(body.pos) < reach * reach
}

/// What one damage tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageReport {
    pub hits: u32,
    pub crits: u32,
    pub destroyed: u32,
    pub splits: u32,
    pub levels_gained: u32,
}

/// Run one damage tick against every live body
pub fn resolve_damage_tick<R: Rng>(state: &mut GameState<R>) -> DamageReport {
    let mut report = DamageReport::default();
    let cursor = state.cursor_world();
    let radius = state.cursor.radius;
    let stats = state.economy.stats().clone();

    for body in state.bodies.iter_mut() {
        if !cursor_overlaps(cursor, radius, body) {
            continue;
        }
        let crit = stats.crit_chance > 0.0 && state.rng.random::<f32>() < stats.crit_chance;
        let incoming = if crit {
            stats.damage * stats.crit_multiplier
        } else {
            stats.damage
        };
        let result = body.apply_damage(incoming);
        report.hits += 1;
        state.effects.add_text(
            body.pos,
            TextKind::Damage {
                amount: result.dealt,
                crit,
            },
        );
        if crit {
            report.crits += 1;
            state.events.push(GameEvent::CriticalHit { id: body.id });
        }
    }

    if report.hits == 0 {
        return report;
    }

    let (destroyed, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.bodies)
        .into_iter()
        .partition(|body| body.is_destroyed());
    state.bodies = alive;

    for body in &destroyed {
        on_destroyed(state, body, &mut report);
    }

    log::debug!(
        "Damage tick: {} hits, {} crits, {} destroyed",
        report.hits,
        report.crits,
        report.destroyed
    );
    report
}

/// Everything that follows a destruction. `body` is already out of the live set.
fn on_destroyed<R: Rng>(state: &mut GameState<R>, body: &OrbitalBody, report: &mut DamageReport) {
    let stats = state.economy.stats().clone();
    report.destroyed += 1;

    state.record_destruction(body);
    state.effects.add_text(body.pos, TextKind::Money(body.payout()));

    let levels = state
        .progression
        .add_experience(body.mass * state.config.xp_per_mass);
    for _ in 0..levels {
        let resonated = progression::level_up(
            &mut state.singularity,
            &mut state.spawner,
            &mut state.effects,
            &stats,
        );
        state.events.push(GameEvent::LevelUp {
            level: state.singularity.level,
        });
        if resonated {
            state.events.push(GameEvent::Resonance);
        }
    }
    report.levels_gained += levels;

    if stats.time_refund_chance > 0.0 && state.rng.random::<f32>() < stats.time_refund_chance {
        let seconds = state.config.time_refund_secs;
        state.run.time_remaining += seconds;
        state.effects.add_text(body.pos, TextKind::TimeBonus(seconds));
        state.events.push(GameEvent::TimeRefund { seconds });
    }

    if body.kind.can_split()
        && stats.fission_chance > 0.0
        && state.rng.random::<f32>() < stats.fission_chance
    {
        let id = state.next_entity_id();
        let fragment = spawn_fragment(id, body, &state.config, &stats, &mut state.rng);
        state.effects.add_text(body.pos, TextKind::Split);
        state.events.push(GameEvent::Split {
            parent: body.id,
            child: id,
        });
        state.bodies.push(fragment);
        report.splits += 1;
    }

    let debris = shatter(body, &mut state.rng);
    state.effects.debris.extend(debris);
}
