//! Cosmic Incremental - an orbital clicker/incremental game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, singularity, spawning, damage, phases)
//! - `catalog`: Static upgrade definitions and their validation
//! - `economy`: Purchased levels, costs and derived gameplay stats
//! - `config`: Numeric game constants consumed at startup
//! - `persistence`: Save/load of the economy snapshot
//!
//! Rendering, audio and input devices live outside this crate. The renderer
//! reads [`sim::GameState`] once per frame; input arrives as [`sim::TickInput`].

pub mod catalog;
pub mod config;
pub mod economy;
pub mod persistence;
pub mod sim;

pub use catalog::{CatalogError, UpgradeCatalog, UpgradeCategory, UpgradeDefinition};
pub use config::{ConfigError, GameConfig};
pub use economy::{EconomyLedger, EconomySnapshot, Stats};

use glam::Vec2;

/// Fixed simulation constants (not part of the tunable config)
pub mod consts {
    /// Distance under which the singularity radius snaps to its target
    pub const RADIUS_EPSILON: f32 = 0.1;
    /// Fraction of the remaining radius gap covered per frame
    pub const RADIUS_EASE_RATE: f32 = 0.05;
    /// Transition states consider the singularity "arrived" inside this gap
    pub const TRANSITION_ARRIVAL: f32 = 1.0;

    /// Orbit radii are clamped to at least this before any division
    pub const MIN_ORBIT_RADIUS: f32 = 1.0;
    /// Angular speed numerator: speed = KEPLER_SCALE / r * ORBIT_SPEED
    pub const KEPLER_SCALE: f32 = 100.0;
    pub const ORBIT_SPEED: f32 = 0.005;

    /// Zoom shrinks by this fraction per singularity level
    pub const ZOOM_PER_LEVEL: f32 = 0.1;
    pub const ZOOM_EASE_RATE: f32 = 0.05;
    pub const ZOOM_EPSILON: f32 = 0.001;

    /// Minimum effective damage per hit, regardless of defense
    pub const MIN_EFFECTIVE_DAMAGE: f32 = 0.1;

    /// Menu slide animation
    pub const MENU_SLIDE_SPEED: f32 = 15.0;
    pub const MENU_SLIDE_DISTANCE: f32 = 400.0;

    /// Shop node appear/retract animation step per frame
    pub const SHOP_NODES_STEP: f32 = 0.05;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Map a screen position to world space (singularity at the origin).
///
/// The world is scaled about the screen centre by `zoom`, so zooming out
/// (`zoom < 1`) makes each screen pixel cover more world distance.
#[inline]
pub fn screen_to_world(screen: Vec2, screen_center: Vec2, zoom: f32) -> Vec2 {
    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    (screen - screen_center) / zoom
}

/// Inverse of [`screen_to_world`]
#[inline]
pub fn world_to_screen(world: Vec2, screen_center: Vec2, zoom: f32) -> Vec2 {
    screen_center + world * zoom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_wraps() {
        use std::f32::consts::PI;
        // 3π sits on the wrap boundary, so either sign of π is acceptable
        let a = normalize_angle(3.0 * PI);
        assert!((a.abs() - PI).abs() < 1e-4);
        assert!((-PI..PI).contains(&a));
        assert!((normalize_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
        assert!((normalize_angle(-2.0 * PI - 0.5) + 0.5).abs() < 1e-5);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_screen_world_roundtrip_with_zoom() {
        let center = Vec2::new(512.0, 384.0);
        let screen = Vec2::new(612.0, 334.0);
        let world = screen_to_world(screen, center, 0.5);
        assert_eq!(world, Vec2::new(200.0, -100.0));
        assert_eq!(world_to_screen(world, center, 0.5), screen);
    }
}
