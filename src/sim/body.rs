//! Orbital bodies
//!
//! Bodies orbit the singularity in polar coordinates. Two variants share one
//! contract (update, apply damage, payout); their stats come from a per-kind
//! [`BodyProfile`].

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{KEPLER_SCALE, MIN_EFFECTIVE_DAMAGE, MIN_ORBIT_RADIUS, ORBIT_SPEED};
use crate::{normalize_angle, polar_to_cartesian};

/// Push velocity retained per frame
pub const PUSH_DECAY: f32 = 0.9;

/// Body variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// Standard body, eligible for fission
    Asteroid,
    /// Heavy body: tougher, richer, more debris
    Planet,
}

/// Per-variant stat derivation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyProfile {
    /// Size multiplier drawn uniformly from this range
    pub size_range: (f32, f32),
    pub defense_per_tier: f32,
    pub health_per_tier: f32,
    pub value_scale: f32,
    pub mass_per_tier: f32,
    pub base_size: f32,
    pub size_per_tier: f32,
    /// Debris particles per unit size multiplier
    pub debris_range: (u32, u32),
    pub debris_scale: f32,
    pub can_split: bool,
}

const ASTEROID_PROFILE: BodyProfile = BodyProfile {
    size_range: (0.6, 2.2),
    defense_per_tier: 0.5,
    health_per_tier: 30.0,
    value_scale: 5.0,
    mass_per_tier: 10.0,
    base_size: 10.0,
    size_per_tier: 5.0,
    debris_range: (3, 6),
    debris_scale: 1.0,
    can_split: true,
};

const PLANET_PROFILE: BodyProfile = BodyProfile {
    size_range: (1.2, 2.0),
    defense_per_tier: 0.75,
    health_per_tier: 90.0,
    value_scale: 15.0,
    mass_per_tier: 30.0,
    base_size: 24.0,
    size_per_tier: 8.0,
    debris_range: (15, 25),
    debris_scale: 2.5,
    can_split: false,
};

impl BodyKind {
    pub fn profile(self) -> &'static BodyProfile {
        match self {
            BodyKind::Asteroid => &ASTEROID_PROFILE,
            BodyKind::Planet => &PLANET_PROFILE,
        }
    }

    /// Whether destruction may roll a fission split
    pub fn can_split(self) -> bool {
        self.profile().can_split
    }
}

/// Outcome of one damage application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageResult {
    /// Damage actually removed after defense
    pub dealt: f32,
    /// True only on the hit that takes health to zero or below
    pub destroyed: bool,
}

/// Elastic-out easing: 0 → 1 with an overshooting wobble
pub fn elastic_out(t: f32) -> f32 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        let c4 = TAU / 3.0;
        2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
    }
}

/// A celestial body orbiting the singularity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitalBody {
    pub id: u32,
    pub kind: BodyKind,
    pub tier: u32,
    pub size_multiplier: f32,
    pub defense_factor: f32,
    pub mass: f32,
    pub max_health: f32,
    pub health: f32,
    pub value: u64,
    /// Distance from the singularity (world units)
    pub orbit_radius: f32,
    pub angle: f32,
    /// Radians per frame; sign gives direction
    pub angular_speed: f32,
    /// Outward radial velocity from shockwaves (world units per frame)
    pub push_velocity: f32,
    pub target_size: f32,
    /// Animated visual/collision size
    pub current_size: f32,
    pub spawn_timer: u32,
    pub spawn_duration: u32,
    /// Cartesian position (world space, singularity at origin)
    pub pos: Vec2,
    /// Unit polygon outline for rendering
    pub outline: Vec<Vec2>,
    /// Shockwaves that already pushed this body
    pub hit_shockwaves: Vec<u32>,
}

impl OrbitalBody {
    /// Build a body with a fixed size multiplier, parked at the origin.
    /// Tier 0 is lifted to 1.
    pub fn new(id: u32, kind: BodyKind, tier: u32, size_multiplier: f32) -> Self {
        let profile = kind.profile();
        let tier = if tier == 0 {
            log::warn!("Body {} had tier 0, using 1", id);
            1
        } else {
            tier
        };
        let size = if size_multiplier.is_finite() && size_multiplier > 0.0 {
            size_multiplier
        } else {
            log::warn!("Body {} had size multiplier {}, using 1.0", id, size_multiplier);
            1.0
        };
        let t = tier as f32;
        let max_health = profile.health_per_tier * t * size.powf(1.5);
        let value = (t.powf(1.8) * size.powf(1.2) * profile.value_scale) as u64;

        Self {
            id,
            kind,
            tier,
            size_multiplier: size,
            defense_factor: 1.0 + (t - 1.0) * profile.defense_per_tier,
            mass: t * profile.mass_per_tier * size,
            max_health,
            health: max_health,
            value: value.max(1),
            orbit_radius: MIN_ORBIT_RADIUS,
            angle: 0.0,
            angular_speed: 0.0,
            push_velocity: 0.0,
            target_size: (profile.base_size + t * profile.size_per_tier) * size,
            current_size: 0.0,
            spawn_timer: 0,
            spawn_duration: (30.0 + 20.0 * size) as u32,
            pos: Vec2::ZERO,
            outline: Vec::new(),
            hit_shockwaves: Vec::new(),
        }
    }

    /// Create a body with random size, outline and orbit direction
    pub fn spawn<R: Rng>(
        id: u32,
        kind: BodyKind,
        tier: u32,
        orbit_radius: f32,
        angle: f32,
        rng: &mut R,
    ) -> Self {
        let (lo, hi) = kind.profile().size_range;
        let mut body = Self::new(id, kind, tier, rng.random_range(lo..=hi));
        body.outline = random_outline(rng);
        let clockwise = rng.random::<bool>();
        body.set_orbit(orbit_radius, angle, clockwise);
        body
    }

    /// Place the body on an orbit. Angular speed falls off with radius.
    pub fn set_orbit(&mut self, orbit_radius: f32, angle: f32, clockwise: bool) {
        self.orbit_radius = clamp_orbit_radius(self.id, orbit_radius);
        self.angle = normalize_angle(angle);
        let speed = KEPLER_SCALE / self.orbit_radius * ORBIT_SPEED;
        self.angular_speed = if clockwise { -speed } else { speed };
        self.update_position();
    }

    /// Advance one frame: push impulse, orbit, spawn-in animation
    pub fn update(&mut self) {
        if self.push_velocity != 0.0 {
            self.orbit_radius += self.push_velocity;
            self.push_velocity *= PUSH_DECAY;
            if self.push_velocity.abs() < 0.01 {
                self.push_velocity = 0.0;
            }
        }
        self.orbit_radius = clamp_orbit_radius(self.id, self.orbit_radius);
        self.angle = normalize_angle(self.angle + self.angular_speed);

        if self.spawn_timer < self.spawn_duration {
            self.spawn_timer += 1;
            let t = self.spawn_timer as f32 / self.spawn_duration as f32;
            self.current_size = self.target_size * elastic_out(t);
        } else {
            self.current_size = self.target_size;
        }

        self.update_position();
    }

    fn update_position(&mut self) {
        self.pos = polar_to_cartesian(self.orbit_radius, self.angle);
    }

    /// Apply incoming damage through this body's defense.
    ///
    /// Effective damage is `incoming / defense`, never below
    /// [`MIN_EFFECTIVE_DAMAGE`] so every hit makes progress.
    pub fn apply_damage(&mut self, incoming: f32) -> DamageResult {
        let was_alive = self.health > 0.0;
        let incoming = if incoming.is_finite() { incoming.max(0.0) } else { 0.0 };
        let defense = if self.defense_factor > 0.0 { self.defense_factor } else { 1.0 };
        let dealt = (incoming / defense).max(MIN_EFFECTIVE_DAMAGE);
        self.health -= dealt;
        DamageResult {
            dealt,
            destroyed: was_alive && self.health <= 0.0,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    /// Health as a fraction in [0, 1]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Money paid out on destruction (always at least 1)
    pub fn payout(&self) -> u64 {
        self.value
    }

    /// Visual scale relative to the fully spawned size
    pub fn visual_scale(&self) -> f32 {
        if self.target_size > 0.0 {
            self.current_size / self.target_size
        } else {
            0.0
        }
    }
}

/// Keep a requested tier inside `1..=top_tier`
pub fn clamp_tier(id: u32, tier: u32, top_tier: u32) -> u32 {
    let top = top_tier.max(1);
    let clamped = tier.clamp(1, top);
    if clamped != tier {
        log::warn!("Body {} asked for tier {}, clamped to {}", id, tier, clamped);
    }
    clamped
}

fn clamp_orbit_radius(id: u32, radius: f32) -> f32 {
    if !radius.is_finite() {
        log::warn!("Body {} had non-finite orbit radius, resetting", id);
        MIN_ORBIT_RADIUS
    } else {
        radius.max(MIN_ORBIT_RADIUS)
    }
}

/// Irregular polygon: 5-9 vertices with radial jitter around the unit circle
pub fn random_outline<R: Rng>(rng: &mut R) -> Vec<Vec2> {
    let count = rng.random_range(5..=9);
    (0..count)
        .map(|i| {
            let theta = i as f32 / count as f32 * TAU;
            polar_to_cartesian(rng.random_range(0.8..=1.2), theta)
        })
        .collect()
}
