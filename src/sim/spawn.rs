//! Wave spawning
//!
//! Bodies arrive at a fixed frame cadence until the wave quota is used up.
//! Only a resonance refill (on level-up) or a run reset reopens the quota.

use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{BodyKind, OrbitalBody, clamp_tier};
use super::singularity::Singularity;
use crate::config::GameConfig;
use crate::economy::Stats;

/// Quota and cadence bookkeeping for the current wave
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnController {
    /// Bodies spawned against the quota this wave
    pub spawned: u32,
    frame_counter: u32,
}

impl SpawnController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh wave for a new run
    pub fn reset(&mut self) {
        self.spawned = 0;
        self.frame_counter = 0;
    }

    /// Resonance: open one more full wave
    pub fn refill(&mut self) {
        self.spawned = 0;
    }

    pub fn remaining(&self, quota: u32) -> u32 {
        quota.saturating_sub(self.spawned)
    }

    /// Advance the cadence by one frame. Returns true when a body should
    /// spawn now; the quota is charged immediately.
    pub fn poll(&mut self, quota: u32, config: &GameConfig) -> bool {
        if self.spawned >= quota {
            return false;
        }
        self.frame_counter += 1;
        if self.frame_counter < config.spawn_interval_frames.max(1) {
            return false;
        }
        self.frame_counter = 0;
        self.spawned += 1;
        true
    }
}

/// Radial band new bodies appear in: clear of the singularity, widening
/// with its level
pub fn spawn_annulus(config: &GameConfig, singularity: &Singularity) -> (f32, f32) {
    let inner = config
        .spawn_distance_min
        .max(singularity.radius + config.spawn_margin);
    let outer = config.spawn_distance_max
        + singularity.level as f32 * config.spawn_outer_growth_per_level;
    (inner, outer.max(inner))
}

fn bounded_tiers(level: u32, lookback: u32, max_tier: u32, top_tier: u32) -> RangeInclusive<u32> {
    let hi = max_tier.clamp(1, top_tier.max(1));
    let lo = level.saturating_sub(lookback).max(1).min(hi);
    lo..=hi
}

/// Tiers a standard body may be drawn from
pub fn standard_tiers(config: &GameConfig, stats: &Stats, level: u32) -> RangeInclusive<u32> {
    bounded_tiers(level, config.tier_lookback, stats.max_tier, config.top_tier)
}

/// Tiers a heavy body may be drawn from
pub fn heavy_tiers(config: &GameConfig, stats: &Stats, level: u32) -> RangeInclusive<u32> {
    bounded_tiers(level, config.heavy_tier_lookback, stats.heavy_max_tier, config.top_tier)
}

/// Roll which variant arrives next
pub fn choose_kind<R: Rng>(config: &GameConfig, stats: &Stats, level: u32, rng: &mut R) -> BodyKind {
    if stats.heavy_unlocked
        && level >= config.heavy_min_singularity_level
        && rng.random::<f32>() < config.heavy_spawn_chance
    {
        BodyKind::Planet
    } else {
        BodyKind::Asteroid
    }
}

/// Create one wave body somewhere in the spawn annulus
pub fn spawn_body<R: Rng>(
    id: u32,
    config: &GameConfig,
    stats: &Stats,
    singularity: &Singularity,
    rng: &mut R,
) -> OrbitalBody {
    let kind = choose_kind(config, stats, singularity.level, rng);
    let tiers = match kind {
        BodyKind::Asteroid => standard_tiers(config, stats, singularity.level),
        BodyKind::Planet => heavy_tiers(config, stats, singularity.level),
    };
    let tier = clamp_tier(id, rng.random_range(tiers), config.top_tier);
    let (inner, outer) = spawn_annulus(config, singularity);
    let radius = rng.random_range(inner..=outer);
    let angle = rng.random_range(0.0..TAU);

    let body = OrbitalBody::spawn(id, kind, tier, radius, angle, rng);
    log::debug!(
        "Spawned {:?} #{} tier {} at r={:.0}",
        kind,
        id,
        tier,
        body.orbit_radius
    );
    body
}

/// Fission: a standard body one tier up at most, next to the parent.
/// Does not count against the wave quota.
pub fn spawn_fragment<R: Rng>(
    id: u32,
    parent: &OrbitalBody,
    config: &GameConfig,
    stats: &Stats,
    rng: &mut R,
) -> OrbitalBody {
    let max_tier = stats.max_tier.clamp(1, config.top_tier.max(1));
    let tier = clamp_tier(id, parent.tier + rng.random_range(0..=1), max_tier);
    let spread = config.fission_radius_spread.abs();
    let radius = (parent.orbit_radius + rng.random_range(-spread..=spread))
        .max(config.spawn_distance_min);
    let twist = config.fission_angle_spread.abs();
    let angle = parent.angle + rng.random_range(-twist..=twist);

    log::debug!("Body #{} split into #{} (tier {})", parent.id, id, tier);
    OrbitalBody::spawn(id, BodyKind::Asteroid, tier, radius, angle, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UpgradeCatalog;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::BTreeMap;

    fn base_stats(config: &GameConfig) -> Stats {
        let catalog = UpgradeCatalog::standard(config).unwrap();
        Stats::derive(&catalog, &BTreeMap::new(), config)
    }

    #[test]
    fn test_cadence_and_quota() {
        let config = GameConfig::default();
        let mut spawner = SpawnController::new();
        let fired: Vec<bool> = (0..6).map(|_| spawner.poll(2, &config)).collect();
        assert_eq!(fired, vec![false, true, false, true, false, false]);
        assert_eq!(spawner.spawned, 2);
        assert_eq!(spawner.remaining(2), 0);

        spawner.refill();
        assert_eq!(spawner.remaining(2), 2);
    }

    #[test]
    fn test_annulus_clears_singularity() {
        let config = GameConfig::default();
        let mut singularity = Singularity::new(&config);
        assert_eq!(spawn_annulus(&config, &singularity), (150.0, 500.0));

        singularity.radius = 300.0;
        singularity.level = 2;
        let (inner, outer) = spawn_annulus(&config, &singularity);
        assert_eq!(inner, 380.0);
        assert_eq!(outer, 600.0);

        singularity.radius = 2000.0;
        let (inner, outer) = spawn_annulus(&config, &singularity);
        assert_eq!(inner, outer);
    }

    #[test]
    fn test_tier_window_follows_level() {
        let config = GameConfig::default();
        let mut stats = base_stats(&config);
        stats.max_tier = 6;
        assert_eq!(standard_tiers(&config, &stats, 1), 1..=6);
        assert_eq!(standard_tiers(&config, &stats, 5), 2..=6);
        assert_eq!(standard_tiers(&config, &stats, 40), 6..=6);

        stats.max_tier = 2;
        assert_eq!(standard_tiers(&config, &stats, 40), 2..=2);
    }

    #[test]
    fn test_heavy_needs_unlock_and_level() {
        let config = GameConfig {
            heavy_spawn_chance: 1.0,
            ..Default::default()
        };
        let mut stats = base_stats(&config);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(choose_kind(&config, &stats, 10, &mut rng), BodyKind::Asteroid);

        stats.heavy_unlocked = true;
        assert_eq!(choose_kind(&config, &stats, 4, &mut rng), BodyKind::Asteroid);
        assert_eq!(choose_kind(&config, &stats, 5, &mut rng), BodyKind::Planet);
    }

    #[test]
    fn test_fragment_near_parent() {
        let config = GameConfig::default();
        let mut stats = base_stats(&config);
        stats.max_tier = 3;
        let mut rng = Pcg32::seed_from_u64(9);
        let mut parent = OrbitalBody::new(1, BodyKind::Asteroid, 3, 1.0);
        parent.set_orbit(300.0, 1.0, false);

        for id in 2..40 {
            let fragment = spawn_fragment(id, &parent, &config, &stats, &mut rng);
            assert_eq!(fragment.kind, BodyKind::Asteroid);
            assert_eq!(fragment.tier, 3);
            assert!((fragment.orbit_radius - 300.0).abs() <= 30.0);
        }
    }

    #[test]
    fn test_fragment_of_oversized_parent_is_clamped() {
        let config = GameConfig::default();
        let mut stats = base_stats(&config);
        stats.max_tier = 99;
        let mut rng = Pcg32::seed_from_u64(4);
        let mut parent = OrbitalBody::new(1, BodyKind::Asteroid, 12, 1.0);
        parent.set_orbit(300.0, 0.0, false);

        let fragment = spawn_fragment(2, &parent, &config, &stats, &mut rng);
        assert_eq!(fragment.tier, config.top_tier);
    }

    proptest! {
        #[test]
        fn prop_never_spawns_above_unlocked_tier(
            seed in any::<u64>(),
            level in 1u32..60,
            max_tier in 1u32..8,
            heavy_max in 1u32..8,
            heavy in any::<bool>(),
        ) {
            let config = GameConfig::default();
            let mut stats = base_stats(&config);
            stats.max_tier = max_tier;
            stats.heavy_max_tier = heavy_max;
            stats.heavy_unlocked = heavy;
            let mut singularity = Singularity::new(&config);
            singularity.level = level;
            let mut rng = Pcg32::seed_from_u64(seed);

            for id in 0..20 {
                let body = spawn_body(id, &config, &stats, &singularity, &mut rng);
                let cap = match body.kind {
                    BodyKind::Asteroid => max_tier,
                    BodyKind::Planet => heavy_max,
                };
                prop_assert!(body.tier >= 1);
                prop_assert!(body.tier <= cap.min(config.top_tier));
                let (inner, outer) = spawn_annulus(&config, &singularity);
                prop_assert!(body.orbit_radius >= inner && body.orbit_radius <= outer);
            }
        }
    }
}
