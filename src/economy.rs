//! Economy ledger: purchased upgrade levels, bank balance and derived stats
//!
//! Stats are a pure function of purchased levels and are rebuilt in full on
//! every level change, so they are never partially stale.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{UpgradeCatalog, UpgradeDefinition, ids};
use crate::config::GameConfig;

/// Gameplay values derived from purchased levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub damage: f32,
    pub cursor_radius: f32,
    /// Probability of a time refund per destruction
    pub time_refund_chance: f32,
    /// Bodies spawned per wave
    pub spawn_limit: u32,
    pub mass_bonus: u32,
    /// Highest standard-body tier that may spawn
    pub max_tier: u32,
    pub resonance: f32,
    pub fission_chance: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub heavy_unlocked: bool,
    pub heavy_mass_bonus: u32,
    /// Highest heavy-body tier that may spawn
    pub heavy_max_tier: u32,
}

impl Stats {
    /// Derive every stat from `levels`. Missing catalog entries fall back to
    /// the config's base values.
    pub fn derive(catalog: &UpgradeCatalog, levels: &BTreeMap<String, u32>, config: &GameConfig) -> Self {
        let value = |id: &str, fallback: f32| -> f32 {
            catalog
                .get(id)
                .map(|def| def.value_at(levels.get(id).copied().unwrap_or(0)))
                .unwrap_or(fallback)
        };
        // Integral stats: floor, never negative
        let whole = |v: f32| -> u32 { v.max(0.0).floor() as u32 };

        let mass_bonus = whole(value(ids::MASS, 0.0));
        let heavy_mass_bonus = whole(value(ids::PLANET_MASS, 0.0));
        let top = config.top_tier.max(1);

        Self {
            damage: value(ids::DAMAGE, config.base_damage),
            cursor_radius: value(ids::RADIUS, config.cursor_radius),
            time_refund_chance: value(ids::DURATION, 0.0).clamp(0.0, 1.0),
            spawn_limit: whole(value(ids::SPAWN_RATE, config.base_spawn_limit as f32)),
            mass_bonus,
            max_tier: (1 + mass_bonus).min(top),
            resonance: value(ids::RESONANCE, 0.0),
            fission_chance: value(ids::FISSION, 0.0).clamp(0.0, 1.0),
            crit_chance: value(ids::CRITICAL_CHANCE, 0.0).clamp(0.0, 1.0),
            crit_multiplier: value(ids::CRITICAL_DAMAGE, config.base_crit_multiplier),
            heavy_unlocked: value(ids::PLANET_UNLOCK, 0.0) > 0.0,
            heavy_mass_bonus,
            heavy_max_tier: (1 + heavy_mass_bonus).min(top),
        }
    }
}

/// Persisted part of the economy: bank balance and purchased levels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    pub bank: u64,
    pub levels: BTreeMap<String, u32>,
}

/// Purchased levels, bank balance and the stats derived from them
#[derive(Debug, Clone)]
pub struct EconomyLedger {
    catalog: Arc<UpgradeCatalog>,
    config: GameConfig,
    levels: BTreeMap<String, u32>,
    bank: u64,
    stats: Stats,
}

impl EconomyLedger {
    pub fn new(catalog: Arc<UpgradeCatalog>, config: GameConfig) -> Self {
        let levels: BTreeMap<String, u32> = catalog.iter().map(|d| (d.id.clone(), 0)).collect();
        let stats = Stats::derive(&catalog, &levels, &config);
        Self {
            catalog,
            config,
            levels,
            bank: 0,
            stats,
        }
    }

    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn bank(&self) -> u64 {
        self.bank
    }

    /// Add money to the bank
    pub fn deposit(&mut self, amount: u64) {
        self.bank = self.bank.saturating_add(amount);
    }

    pub fn level(&self, id: &str) -> u32 {
        self.levels.get(id).copied().unwrap_or(0)
    }

    pub fn levels(&self) -> &BTreeMap<String, u32> {
        &self.levels
    }

    /// Cost of the next level of `id` (`None` for unknown ids)
    pub fn cost_of(&self, id: &str) -> Option<u64> {
        self.catalog.get(id).map(|def| def.cost_at(self.level(id)))
    }

    pub fn is_maxed(&self, id: &str) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|def| def.is_maxed(self.level(id)))
    }

    /// Root nodes are always unlockable; others need a purchased parent
    pub fn is_unlocked(&self, id: &str) -> bool {
        match self.catalog.get(id) {
            Some(UpgradeDefinition { parent: None, .. }) => true,
            Some(UpgradeDefinition {
                parent: Some(parent),
                ..
            }) => self.level(parent) > 0,
            None => false,
        }
    }

    pub fn can_afford(&self, id: &str) -> bool {
        self.cost_of(id).is_some_and(|cost| self.bank >= cost)
    }

    /// Buy the next level of `id`.
    ///
    /// Returns `false` without changing anything when the id is unknown or
    /// locked, the upgrade is maxed, or the bank cannot cover the cost.
    pub fn purchase(&mut self, id: &str) -> bool {
        let Some(def) = self.catalog.get(id) else {
            return false;
        };
        let level = self.level(id);
        if def.is_maxed(level) || !self.is_unlocked(id) {
            return false;
        }
        let cost = def.cost_at(level);
        if self.bank < cost {
            return false;
        }

        self.bank -= cost;
        self.levels.insert(id.to_string(), level + 1);
        self.recalculate();
        log::info!("Purchased {} level {} for {} (bank {})", id, level + 1, cost, self.bank);
        true
    }

    fn recalculate(&mut self) {
        self.stats = Stats::derive(&self.catalog, &self.levels, &self.config);
    }

    /// Capture bank and levels for persistence
    pub fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            bank: self.bank,
            levels: self
                .levels
                .iter()
                .filter(|(_, level)| **level > 0)
                .map(|(id, level)| (id.clone(), *level))
                .collect(),
        }
    }

    /// Replace bank and levels from a snapshot.
    ///
    /// Ids missing from the catalog are dropped and levels above `max_level`
    /// are clamped, both with a warning.
    pub fn restore(&mut self, snapshot: &EconomySnapshot) {
        let mut levels: BTreeMap<String, u32> =
            self.catalog.iter().map(|d| (d.id.clone(), 0)).collect();
        for (id, &level) in &snapshot.levels {
            let Some(def) = self.catalog.get(id) else {
                log::warn!("Ignoring saved level for unknown upgrade `{}`", id);
                continue;
            };
            let clamped = def.max_level.map_or(level, |max| level.min(max));
            if clamped != level {
                log::warn!("Clamping saved level of `{}` from {} to {}", id, level, clamped);
            }
            levels.insert(id.clone(), clamped);
        }
        self.levels = levels;
        self.bank = snapshot.bank;
        self.recalculate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{UpgradeCategory, UpgradeDefinition};
    use proptest::prelude::*;

    fn ledger() -> EconomyLedger {
        let config = GameConfig::default();
        let catalog = Arc::new(UpgradeCatalog::standard(&config).unwrap());
        EconomyLedger::new(catalog, config)
    }

    #[test]
    fn test_initial_stats_match_config() {
        let ledger = ledger();
        let stats = ledger.stats();
        assert_eq!(stats.damage, 8.0);
        assert_eq!(stats.cursor_radius, 35.0);
        assert_eq!(stats.spawn_limit, 10);
        assert_eq!(stats.max_tier, 1);
        assert_eq!(stats.crit_multiplier, 1.5);
        assert!(!stats.heavy_unlocked);
    }

    #[test]
    fn test_purchase_debits_exact_cost() {
        let mut ledger = ledger();
        ledger.deposit(100);
        assert!(ledger.purchase(ids::DAMAGE));
        assert_eq!(ledger.bank(), 60);
        assert_eq!(ledger.level(ids::DAMAGE), 1);
        assert_eq!(ledger.stats().damage, 10.0);
        assert_eq!(ledger.cost_of(ids::DAMAGE), Some(56));
        assert!(ledger.purchase(ids::DAMAGE));
        assert_eq!(ledger.bank(), 4);
        assert_eq!(ledger.cost_of(ids::DAMAGE), Some(78));
    }

    #[test]
    fn test_purchase_declined_without_funds() {
        let mut ledger = ledger();
        ledger.deposit(39);
        assert!(!ledger.purchase(ids::DAMAGE));
        assert_eq!(ledger.bank(), 39);
        assert_eq!(ledger.level(ids::DAMAGE), 0);
    }

    #[test]
    fn test_purchase_declined_at_max_level() {
        let mut ledger = ledger();
        ledger.deposit(10_000);
        assert!(ledger.purchase(ids::RESONANCE));
        let bank = ledger.bank();
        assert!(!ledger.purchase(ids::RESONANCE));
        assert_eq!(ledger.bank(), bank);
        assert_eq!(ledger.level(ids::RESONANCE), 1);
        assert!(ledger.is_maxed(ids::RESONANCE));
        assert_eq!(ledger.stats().resonance, 1.0);
    }

    #[test]
    fn test_child_locked_until_parent_bought() {
        let mut ledger = ledger();
        ledger.deposit(1_000);
        assert!(!ledger.is_unlocked(ids::FISSION));
        assert!(!ledger.purchase(ids::SPAWN_RATE));
        assert!(ledger.purchase(ids::DAMAGE));
        assert!(ledger.purchase(ids::SPAWN_RATE));
        assert_eq!(ledger.stats().spawn_limit, 11);
        assert!(ledger.is_unlocked(ids::FISSION));
    }

    #[test]
    fn test_mass_caps_max_tier() {
        let mut ledger = ledger();
        ledger.deposit(1_000_000);
        assert!(ledger.purchase(ids::DAMAGE));
        for _ in 0..5 {
            assert!(ledger.purchase(ids::MASS));
        }
        assert_eq!(ledger.stats().max_tier, 6);
        assert!(!ledger.purchase(ids::MASS));
    }

    #[test]
    fn test_snapshot_restore_reproduces_stats() {
        let mut ledger = ledger();
        ledger.deposit(5_000);
        ledger.purchase(ids::DAMAGE);
        ledger.purchase(ids::RADIUS);
        ledger.purchase(ids::DURATION);
        ledger.purchase(ids::RESONANCE);
        let snapshot = ledger.snapshot();

        let mut restored = self::ledger();
        restored.restore(&snapshot);
        assert_eq!(restored.stats(), ledger.stats());
        assert_eq!(restored.bank(), ledger.bank());
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_restore_drops_unknown_and_clamps() {
        let mut ledger = ledger();
        let mut levels = BTreeMap::new();
        levels.insert("warp_drive".to_string(), 3);
        levels.insert(ids::RESONANCE.to_string(), 9);
        ledger.restore(&EconomySnapshot { bank: 7, levels });
        assert_eq!(ledger.level(ids::RESONANCE), 1);
        assert_eq!(ledger.level("warp_drive"), 0);
        assert_eq!(ledger.bank(), 7);
    }

    #[test]
    fn test_missing_catalog_entries_fall_back_to_config() {
        let config = GameConfig {
            base_spawn_limit: 4,
            base_crit_multiplier: 2.0,
            ..Default::default()
        };
        let catalog = UpgradeCatalog::new(vec![UpgradeDefinition {
            id: "lonely".into(),
            name: "Lonely".into(),
            description: String::new(),
            category: UpgradeCategory::Unique,
            parent: None,
            tree_pos: (0.0, 0.0),
            base_cost: 1.0,
            cost_multiplier: 1.0,
            base_value: 0.0,
            increment: 1.0,
            max_level: None,
        }])
        .unwrap();
        let ledger = EconomyLedger::new(Arc::new(catalog), config.clone());
        assert_eq!(ledger.stats().damage, config.base_damage);
        assert_eq!(ledger.stats().cursor_radius, config.cursor_radius);
        assert_eq!(ledger.stats().spawn_limit, 4);
        assert_eq!(ledger.stats().crit_multiplier, 2.0);
        assert_eq!(ledger.cost_of(ids::DAMAGE), None);
    }

    proptest! {
        #[test]
        fn prop_cost_non_decreasing(
            base in 0.0f64..10_000.0,
            mult in 1.0f64..3.0,
            level in 0u32..40,
        ) {
            let def = UpgradeDefinition {
                id: "x".into(),
                name: "x".into(),
                description: String::new(),
                category: UpgradeCategory::Attack,
                parent: None,
                tree_pos: (0.0, 0.0),
                base_cost: base,
                cost_multiplier: mult,
                base_value: 0.0,
                increment: 1.0,
                max_level: None,
            };
            prop_assert!(def.cost_at(level) <= def.cost_at(level + 1));
        }

        #[test]
        fn prop_purchase_accounting(bank in 0u64..5_000, attempts in 1usize..20) {
            let mut ledger = ledger();
            ledger.deposit(bank);
            for _ in 0..attempts {
                let before_bank = ledger.bank();
                let before_level = ledger.level(ids::RESONANCE);
                let cost = ledger.cost_of(ids::RESONANCE).unwrap();
                if ledger.purchase(ids::RESONANCE) {
                    prop_assert_eq!(ledger.bank(), before_bank - cost);
                    prop_assert_eq!(ledger.level(ids::RESONANCE), before_level + 1);
                } else {
                    prop_assert_eq!(ledger.bank(), before_bank);
                    prop_assert_eq!(ledger.level(ids::RESONANCE), before_level);
                }
                prop_assert!(ledger.level(ids::RESONANCE) <= 1);
            }
        }
    }
}
