//! Short-lived feedback objects
//!
//! Shockwaves, debris and floating text are owned by the frame loop and swept
//! with `retain` once spent. Only shockwaves feed back into the simulation
//! (outward push on bodies they sweep over).

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{BodyKind, OrbitalBody};
use crate::polar_to_cartesian;

/// Frames a floating text stays visible
pub const TEXT_LIFE_FRAMES: u32 = 60;
/// Pixels a floating text rises per frame
pub const TEXT_RISE_SPEED: f32 = 1.0;

pub const SHOCKWAVE_START_RADIUS: f32 = 10.0;
pub const SHOCKWAVE_GROWTH: f32 = 20.0;
pub const SHOCKWAVE_FADE: f32 = 5.0;
/// Push falls off linearly and is floored at 10% by this radius
pub const SHOCKWAVE_FALLOFF_RADIUS: f32 = 800.0;

/// Expanding ring emitted on a singularity level-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shockwave {
    pub id: u32,
    pub radius: f32,
    /// 255 at birth, inactive at 0
    pub alpha: f32,
    /// Push impulse at the centre
    pub strength: f32,
}

impl Shockwave {
    pub fn new(id: u32, level: u32) -> Self {
        Self {
            id,
            radius: SHOCKWAVE_START_RADIUS,
            alpha: 255.0,
            strength: 5.0 + 1.5 * level as f32,
        }
    }

    pub fn update(&mut self) {
        self.radius += SHOCKWAVE_GROWTH;
        self.alpha -= SHOCKWAVE_FADE;
    }

    pub fn is_active(&self) -> bool {
        self.alpha > 0.0
    }

    /// Outward velocity given to a body at `orbit_radius`
    pub fn push_force(&self, orbit_radius: f32) -> f32 {
        self.strength * (1.0 - orbit_radius / SHOCKWAVE_FALLOFF_RADIUS).max(0.1)
    }

    /// Push every body the front has reached, once per body
    pub fn push_bodies(&self, bodies: &mut [OrbitalBody]) {
        for body in bodies {
            if self.radius >= body.orbit_radius - body.current_size
                && !body.hit_shockwaves.contains(&self.id)
            {
                body.push_velocity += self.push_force(body.orbit_radius);
                body.hit_shockwaves.push(self.id);
            }
        }
    }
}

/// Fragment spiralling into the singularity after a destruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debris {
    pub kind: BodyKind,
    pub tier: u32,
    pub orbit_radius: f32,
    pub angle: f32,
    pub angular_speed: f32,
    /// Radius lost per frame
    pub decay: f32,
    pub size: f32,
    pub pos: Vec2,
}

impl Debris {
    pub fn update(&mut self) {
        self.angle += self.angular_speed;
        self.orbit_radius -= self.decay;
        self.pos = polar_to_cartesian(self.orbit_radius.max(0.0), self.angle);
    }

    pub fn is_consumed(&self, singularity_radius: f32) -> bool {
        self.orbit_radius <= singularity_radius
    }
}

/// Break a destroyed body into debris
pub fn shatter<R: Rng>(body: &OrbitalBody, rng: &mut R) -> Vec<Debris> {
    let profile = body.kind.profile();
    let (lo, hi) = profile.debris_range;
    let count = (rng.random_range(lo..=hi.max(lo)) as f32 * body.size_multiplier) as u32;
    let jitter = body.current_size.max(1.0) * 0.5;

    (0..count)
        .map(|_| {
            let orbit_radius = (body.orbit_radius + rng.random_range(-jitter..=jitter)).max(0.0);
            let angle = body.angle + rng.random_range(-0.1..=0.1);
            let direction = body.angular_speed.signum();
            Debris {
                kind: body.kind,
                tier: body.tier,
                orbit_radius,
                angle,
                angular_speed: direction * rng.random_range(0.02..=0.05),
                decay: rng.random_range(1.0..=2.0),
                size: rng.random_range(3.0..=6.0) * profile.debris_scale,
                pos: polar_to_cartesian(orbit_radius, angle),
            }
        })
        .collect()
}

/// What a floating text says
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextKind {
    Damage { amount: f32, crit: bool },
    Money(u64),
    TimeBonus(f32),
    Split,
    Resonance,
    LevelUp(u32),
}

impl TextKind {
    pub fn label(&self) -> String {
        match self {
            TextKind::Damage { amount, crit: false } => format!("{:.0}", amount.max(1.0)),
            TextKind::Damage { amount, crit: true } => format!("{:.0}!", amount.max(1.0)),
            TextKind::Money(value) => format!("+${}", value),
            TextKind::TimeBonus(secs) => format!("+{}s", secs),
            TextKind::Split => "SPLIT!".to_string(),
            TextKind::Resonance => "RESONANCE!".to_string(),
            TextKind::LevelUp(level) => format!("LEVEL {}", level),
        }
    }
}

/// Rising, fading text (world space)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub kind: TextKind,
    pub life: u32,
}

impl FloatingText {
    pub fn new(pos: Vec2, kind: TextKind) -> Self {
        Self {
            pos,
            kind,
            life: TEXT_LIFE_FRAMES,
        }
    }

    pub fn update(&mut self) {
        self.pos.y -= TEXT_RISE_SPEED;
        self.life = self.life.saturating_sub(1);
    }

    /// Opacity in [0, 1]
    pub fn alpha(&self) -> f32 {
        self.life as f32 / TEXT_LIFE_FRAMES as f32
    }

    pub fn is_expired(&self) -> bool {
        self.life == 0
    }
}

/// All live effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    pub shockwaves: Vec<Shockwave>,
    pub debris: Vec<Debris>,
    pub texts: Vec<FloatingText>,
    next_wave_id: u32,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a level-up shockwave from the centre
    pub fn spawn_shockwave(&mut self, level: u32) -> u32 {
        self.next_wave_id += 1;
        let id = self.next_wave_id;
        self.shockwaves.push(Shockwave::new(id, level));
        id
    }

    pub fn add_text(&mut self, pos: Vec2, kind: TextKind) {
        self.texts.push(FloatingText::new(pos, kind));
    }

    pub fn update_texts(&mut self) {
        for text in &mut self.texts {
            text.update();
        }
        self.texts.retain(|t| !t.is_expired());
    }

    /// Grow shockwaves and push whatever they reach
    pub fn update_shockwaves(&mut self, bodies: &mut [OrbitalBody]) {
        for wave in &mut self.shockwaves {
            wave.update();
            if wave.is_active() {
                wave.push_bodies(bodies);
            }
        }
        self.shockwaves.retain(|w| w.is_active());
    }

    pub fn update_debris(&mut self, singularity_radius: f32) {
        for piece in &mut self.debris {
            piece.update();
        }
        self.debris.retain(|d| !d.is_consumed(singularity_radius));
    }

    /// One frame of every effect, in frame order
    pub fn update(&mut self, bodies: &mut [OrbitalBody], singularity_radius: f32) {
        self.update_texts();
        self.update_shockwaves(bodies);
        self.update_debris(singularity_radius);
    }

    pub fn clear(&mut self) {
        self.shockwaves.clear();
        self.debris.clear();
        self.texts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.shockwaves.is_empty() && self.debris.is_empty() && self.texts.is_empty()
    }
}
