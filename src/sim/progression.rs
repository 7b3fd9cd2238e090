//! Experience and singularity level-ups

use serde::{Deserialize, Serialize};

use super::effects::{Effects, TextKind};
use super::singularity::Singularity;
use super::spawn::SpawnController;
use crate::config::GameConfig;
use crate::economy::Stats;

/// Upper bound on level-ups resolved from a single experience gain
pub const MAX_LEVEL_UPS_PER_GAIN: u32 = 100;

/// Experience toward the next singularity level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionTracker {
    pub xp: f32,
    pub xp_required: f32,
    base_requirement: f32,
    scaling: f32,
}

impl ProgressionTracker {
    pub fn new(config: &GameConfig) -> Self {
        let base = config.xp_base_requirement.max(1.0);
        Self {
            xp: 0.0,
            xp_required: base,
            base_requirement: base,
            scaling: config.xp_scaling.max(1.0),
        }
    }

    pub fn reset(&mut self) {
        self.xp = 0.0;
        self.xp_required = self.base_requirement;
    }

    /// Add experience and return how many levels were gained.
    ///
    /// Each level consumes the current requirement, then the requirement
    /// grows by the scaling factor (floored, at least 1).
    pub fn add_experience(&mut self, amount: f32) -> u32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0;
        }
        self.xp += amount;
        let mut levels = 0;
        while self.xp >= self.xp_required {
            if levels == MAX_LEVEL_UPS_PER_GAIN {
                log::warn!("Level-up cap hit with {} xp banked", self.xp);
                break;
            }
            self.xp -= self.xp_required;
            self.xp_required = (self.xp_required * self.scaling).floor().max(1.0);
            levels += 1;
        }
        levels
    }

    /// Fill of the xp bar in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.xp / self.xp_required).clamp(0.0, 1.0)
    }
}

/// Apply one singularity level-up: grow, emit a shockwave and, with
/// resonance, reopen the spawn quota. Returns whether resonance fired.
pub fn level_up(
    singularity: &mut Singularity,
    spawner: &mut SpawnController,
    effects: &mut Effects,
    stats: &Stats,
) -> bool {
    singularity.level_up();
    effects.spawn_shockwave(singularity.level);
    effects.add_text(glam::Vec2::ZERO, TextKind::LevelUp(singularity.level));
    if stats.resonance > 0.0 {
        spawner.refill();
        effects.add_text(glam::Vec2::new(0.0, -40.0), TextKind::Resonance);
        log::info!("Resonance refilled the wave at level {}", singularity.level);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UpgradeCatalog;
    use std::collections::BTreeMap;

    #[test]
    fn test_requirement_grows_by_scaling() {
        let mut tracker = ProgressionTracker::new(&GameConfig::default());
        assert_eq!(tracker.xp_required, 300.0);
        assert_eq!(tracker.add_experience(300.0), 1);
        assert_eq!(tracker.xp_required, 450.0);
        assert_eq!(tracker.xp, 0.0);
    }

    #[test]
    fn test_one_gain_many_levels() {
        let mut tracker = ProgressionTracker::new(&GameConfig::default());
        // 300 + 450 + 675 = 1425
        assert_eq!(tracker.add_experience(1500.0), 3);
        assert_eq!(tracker.xp, 75.0);
        assert_eq!(tracker.xp_required, 1012.0);
    }

    #[test]
    fn test_ignores_bad_amounts() {
        let mut tracker = ProgressionTracker::new(&GameConfig::default());
        assert_eq!(tracker.add_experience(-5.0), 0);
        assert_eq!(tracker.add_experience(f32::NAN), 0);
        assert_eq!(tracker.xp, 0.0);
    }

    #[test]
    fn test_flat_curve_is_capped() {
        let config = GameConfig {
            xp_base_requirement: 1.0,
            xp_scaling: 1.0,
            ..Default::default()
        };
        let mut tracker = ProgressionTracker::new(&config);
        assert_eq!(tracker.add_experience(1.0e9), MAX_LEVEL_UPS_PER_GAIN);
    }

    #[test]
    fn test_level_up_with_resonance_refills() {
        let config = GameConfig::default();
        let catalog = UpgradeCatalog::standard(&config).unwrap();
        let mut stats = Stats::derive(&catalog, &BTreeMap::new(), &config);
        let mut singularity = Singularity::new(&config);
        let mut spawner = SpawnController::new();
        let mut effects = Effects::new();
        spawner.spawned = 10;

        assert!(!level_up(&mut singularity, &mut spawner, &mut effects, &stats));
        assert_eq!(spawner.spawned, 10);
        assert_eq!(singularity.level, 2);
        assert_eq!(effects.shockwaves.len(), 1);

        stats.resonance = 1.0;
        assert!(level_up(&mut singularity, &mut spawner, &mut effects, &stats));
        assert_eq!(spawner.spawned, 0);
        assert_eq!(singularity.level, 3);
    }
}
