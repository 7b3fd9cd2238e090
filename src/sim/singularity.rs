//! The singularity at the centre of the world
//!
//! Features:
//! - Radius eases toward a target, capped below by the animation speed
//! - Snaps exactly onto the target, so transitions always terminate
//! - Explicit expand/shrink transitions used by the phase machine
//! - Level-driven camera zoom

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::consts::{RADIUS_EASE_RATE, RADIUS_EPSILON, ZOOM_EASE_RATE, ZOOM_EPSILON, ZOOM_PER_LEVEL};

/// Central attractor. Sits at the world origin (screen centre).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Singularity {
    /// Starts at 1, only grows within a run
    pub level: u32,
    pub radius: f32,
    pub target_radius: f32,
    /// Minimum radius change per frame while easing
    pub anim_speed: f32,
    base_radius: f32,
    growth_per_level: f32,
    level_up_speed: f32,
    expand_speed: f32,
    shrink_speed: f32,
}

impl Singularity {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            level: 1,
            radius: config.singularity_base_radius,
            target_radius: config.singularity_base_radius,
            anim_speed: config.level_up_anim_speed,
            base_radius: config.singularity_base_radius,
            growth_per_level: config.singularity_growth_per_level,
            level_up_speed: config.level_up_anim_speed,
            expand_speed: config.expand_anim_speed,
            shrink_speed: config.shrink_anim_speed,
        }
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    /// Resting radius for a given level
    pub fn radius_for_level(&self, level: u32) -> f32 {
        self.base_radius + level.saturating_sub(1) as f32 * self.growth_per_level
    }

    /// Advance the radius one frame toward its target
    pub fn update(&mut self) {
        let diff = self.target_radius - self.radius;
        let dist = diff.abs();
        if dist <= RADIUS_EPSILON {
            self.radius = self.target_radius;
            return;
        }
        let speed = if self.anim_speed.is_finite() && self.anim_speed > 0.0 {
            self.anim_speed
        } else {
            RADIUS_EPSILON
        };
        let step = (dist * RADIUS_EASE_RATE).max(speed);
        if step >= dist {
            self.radius = self.target_radius;
        } else {
            self.radius += step * diff.signum();
            if (self.target_radius - self.radius).signum() != diff.signum() {
                self.radius = self.target_radius;
            }
        }
    }

    /// Ease toward an arbitrary radius at the given speed
    pub fn set_target(&mut self, target: f32, anim_speed: f32) {
        if !target.is_finite() {
            log::warn!("Ignoring non-finite singularity target {}", target);
            return;
        }
        self.target_radius = target.max(0.0);
        self.anim_speed = anim_speed;
    }

    /// Gain a level and start growing slowly toward the new resting radius
    pub fn level_up(&mut self) {
        self.level += 1;
        let target = self.radius_for_level(self.level);
        self.set_target(target, self.level_up_speed);
        log::info!("Singularity reached level {}", self.level);
    }

    /// Grow fast until the whole screen is covered
    pub fn expand_to_cover_screen(&mut self, screen_diagonal: f32) {
        self.set_target(screen_diagonal, self.expand_speed);
    }

    /// Back to level 1 and the base radius.
    ///
    /// Growing back from below (after the shop) uses the slow level-up speed.
    pub fn shrink_to_base(&mut self) {
        self.level = 1;
        let speed = if self.radius < self.base_radius {
            self.level_up_speed
        } else {
            self.shrink_speed
        };
        self.set_target(self.base_radius, speed);
    }

    /// Shrink into the shop's central button
    pub fn shrink_to_core(&mut self, core_radius: f32) {
        self.set_target(core_radius, self.expand_speed);
    }

    pub fn is_settled(&self) -> bool {
        self.radius == self.target_radius
    }

    /// Within `tolerance` of the target
    pub fn has_arrived(&self, tolerance: f32) -> bool {
        (self.target_radius - self.radius).abs() <= tolerance
    }
}

/// Zoom the camera should settle at for a singularity level
pub fn zoom_for_level(level: u32) -> f32 {
    1.0 / (1.0 + level.saturating_sub(1) as f32 * ZOOM_PER_LEVEL)
}

/// Ease `zoom` toward `target`, snapping when close
pub fn ease_zoom(zoom: f32, target: f32) -> f32 {
    if !zoom.is_finite() || (target - zoom).abs() < ZOOM_EPSILON {
        target
    } else {
        zoom + (target - zoom) * ZOOM_EASE_RATE
    }
}
