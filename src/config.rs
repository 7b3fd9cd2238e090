//! Game configuration constants
//!
//! Loaded once at startup (or taken from `Default`) and treated as read-only
//! for the rest of the process.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config value `{field}` is invalid: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Numeric constants consumed by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Screen ===
    pub screen_width: f32,
    pub screen_height: f32,
    pub fps: u32,

    // === Run ===
    /// Run length in seconds
    pub run_duration_secs: f32,
    /// Seconds added by a successful time-refund roll
    pub time_refund_secs: f32,

    // === Player ===
    pub base_damage: f32,
    /// Frames between damage ticks
    pub damage_tick_frames: u32,
    pub cursor_radius: f32,
    /// Multiplier applied by a critical hit before any upgrade
    pub base_crit_multiplier: f32,

    // === Singularity ===
    pub singularity_base_radius: f32,
    pub singularity_growth_per_level: f32,
    pub level_up_anim_speed: f32,
    pub expand_anim_speed: f32,
    pub shrink_anim_speed: f32,
    /// Radius the singularity shrinks to when it becomes the shop's core button
    pub shop_core_radius: f32,

    // === Experience ===
    pub xp_base_requirement: f32,
    pub xp_scaling: f32,
    /// Experience granted per unit of body mass
    pub xp_per_mass: f32,

    // === Spawning ===
    pub spawn_distance_min: f32,
    pub spawn_distance_max: f32,
    /// Gap kept between the singularity edge and the spawn annulus
    pub spawn_margin: f32,
    /// Outer spawn bound growth per singularity level
    pub spawn_outer_growth_per_level: f32,
    pub spawn_interval_frames: u32,
    /// Bodies per wave before any upgrade
    pub base_spawn_limit: u32,
    /// How many levels below the singularity level the lowest tier may be
    pub tier_lookback: u32,
    pub top_tier: u32,

    // === Heavy bodies ===
    pub heavy_min_singularity_level: u32,
    pub heavy_spawn_chance: f32,
    pub heavy_tier_lookback: u32,

    // === Fission ===
    pub fission_radius_spread: f32,
    pub fission_angle_spread: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 1024.0,
            screen_height: 768.0,
            fps: 60,

            run_duration_secs: 30.0,
            time_refund_secs: 1.0,

            base_damage: 8.0,
            damage_tick_frames: 30,
            cursor_radius: 35.0,
            base_crit_multiplier: 1.5,

            singularity_base_radius: 50.0,
            singularity_growth_per_level: 15.0,
            level_up_anim_speed: 0.5,
            expand_anim_speed: 15.0,
            shrink_anim_speed: 10.0,
            shop_core_radius: 25.0,

            xp_base_requirement: 300.0,
            xp_scaling: 1.5,
            xp_per_mass: 10.0,

            spawn_distance_min: 150.0,
            spawn_distance_max: 400.0,
            spawn_margin: 80.0,
            spawn_outer_growth_per_level: 100.0,
            spawn_interval_frames: 2,
            base_spawn_limit: 10,
            tier_lookback: 3,
            top_tier: 6,

            heavy_min_singularity_level: 5,
            heavy_spawn_chance: 0.2,
            heavy_tier_lookback: 6,

            fission_radius_spread: 30.0,
            fission_angle_spread: 0.2,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive finite number",
                })
            }
        }

        positive("screen_width", self.screen_width)?;
        positive("screen_height", self.screen_height)?;
        positive("run_duration_secs", self.run_duration_secs)?;
        positive("singularity_base_radius", self.singularity_base_radius)?;
        positive("xp_base_requirement", self.xp_base_requirement)?;
        positive("expand_anim_speed", self.expand_anim_speed)?;
        positive("shrink_anim_speed", self.shrink_anim_speed)?;
        positive("level_up_anim_speed", self.level_up_anim_speed)?;
        positive("base_crit_multiplier", self.base_crit_multiplier)?;

        if self.fps == 0 {
            return Err(ConfigError::Invalid {
                field: "fps",
                reason: "must be non-zero",
            });
        }
        if self.damage_tick_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "damage_tick_frames",
                reason: "must be non-zero",
            });
        }
        if self.spawn_interval_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "spawn_interval_frames",
                reason: "must be non-zero",
            });
        }
        if self.top_tier == 0 {
            return Err(ConfigError::Invalid {
                field: "top_tier",
                reason: "must be at least 1",
            });
        }
        if !(self.xp_scaling >= 1.0) {
            return Err(ConfigError::Invalid {
                field: "xp_scaling",
                reason: "must be at least 1.0",
            });
        }
        if !(self.spawn_distance_min <= self.spawn_distance_max) {
            return Err(ConfigError::Invalid {
                field: "spawn_distance_min",
                reason: "must not exceed spawn_distance_max",
            });
        }
        if !(0.0..=1.0).contains(&self.heavy_spawn_chance) {
            return Err(ConfigError::Invalid {
                field: "heavy_spawn_chance",
                reason: "must be a probability",
            });
        }
        Ok(())
    }

    /// Frame duration in seconds
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps as f32
    }

    pub fn screen_center(&self) -> Vec2 {
        Vec2::new(self.screen_width / 2.0, self.screen_height / 2.0)
    }

    /// Screen diagonal: the singularity radius that covers the whole screen
    pub fn screen_diagonal(&self) -> f32 {
        Vec2::new(self.screen_width, self.screen_height).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "base_damage": 12.0, "fps": 30 }"#).unwrap();
        assert_eq!(config.base_damage, 12.0);
        assert_eq!(config.fps, 30);
        assert_eq!(config.cursor_radius, GameConfig::default().cursor_radius);
    }

    #[test]
    fn test_rejects_zero_tick_rate() {
        let err = GameConfig::from_json(r#"{ "damage_tick_frames": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "damage_tick_frames",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_spawn_bounds() {
        let config = GameConfig {
            spawn_distance_min: 500.0,
            spawn_distance_max: 100.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_screen_geometry() {
        let config = GameConfig::default();
        assert_eq!(config.screen_center(), Vec2::new(512.0, 384.0));
        assert!((config.screen_diagonal() - 1280.0).abs() < 1e-3);
    }
}
