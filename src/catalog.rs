//! Upgrade catalog
//!
//! Immutable definitions for every upgrade in the shop tree. Parents form a
//! forest: a node becomes purchasable once its parent has at least one level.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GameConfig;

/// Well-known upgrade identifiers read by stat derivation
pub mod ids {
    pub const DAMAGE: &str = "damage";
    pub const RADIUS: &str = "radius";
    pub const DURATION: &str = "duration";
    pub const SPAWN_RATE: &str = "spawn_rate";
    pub const MASS: &str = "mass";
    pub const RESONANCE: &str = "resonance";
    pub const FISSION: &str = "fission";
    pub const CRITICAL_CHANCE: &str = "critical_chance";
    pub const CRITICAL_DAMAGE: &str = "critical_damage";
    pub const PLANET_UNLOCK: &str = "planet_unlock";
    pub const PLANET_MASS: &str = "planet_mass";
}

/// Shop branch an upgrade belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeCategory {
    Attack,
    Defense,
    Unique,
    SecondaryBody,
}

impl UpgradeCategory {
    pub const ALL: [UpgradeCategory; 4] = [
        UpgradeCategory::Attack,
        UpgradeCategory::Defense,
        UpgradeCategory::Unique,
        UpgradeCategory::SecondaryBody,
    ];

    /// Direction of this branch in the shop tree (radians, screen space)
    pub fn branch_angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            UpgradeCategory::Attack => PI,
            UpgradeCategory::Defense => 0.0,
            UpgradeCategory::Unique => -FRAC_PI_2,
            UpgradeCategory::SecondaryBody => FRAC_PI_2,
        }
    }
}

/// Static definition of one upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: UpgradeCategory,
    #[serde(default)]
    pub parent: Option<String>,
    /// (column along the branch, row across it)
    #[serde(default)]
    pub tree_pos: (f32, f32),
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub base_value: f32,
    pub increment: f32,
    #[serde(default)]
    pub max_level: Option<u32>,
}

impl UpgradeDefinition {
    /// Cost of buying the next level when `level` levels are owned
    pub fn cost_at(&self, level: u32) -> u64 {
        let cost = self.base_cost * self.cost_multiplier.powi(level as i32);
        if cost.is_finite() && cost >= 0.0 {
            // Absorb representation error so 40 * 1.4 floors to 56, not 55
            (cost + 1e-9).floor() as u64
        } else {
            u64::MAX
        }
    }

    /// Effect value with `level` levels owned
    pub fn value_at(&self, level: u32) -> f32 {
        self.base_value + level as f32 * self.increment
    }

    pub fn is_maxed(&self, level: u32) -> bool {
        self.max_level.is_some_and(|max| level >= max)
    }
}

/// Catalog validation failure. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate upgrade id `{0}`")]
    DuplicateId(String),
    #[error("upgrade `{id}` references unknown parent `{parent}`")]
    UnknownParent { id: String, parent: String },
    #[error("upgrade `{0}` is part of a parent cycle")]
    Cycle(String),
    #[error("upgrade `{0}` has a cost multiplier below 1.0")]
    ShrinkingCost(String),
    #[error("upgrade `{0}` has max_level 0")]
    ZeroMaxLevel(String),
    #[error("upgrade `{0}` has a non-finite or negative number")]
    BadNumber(String),
    #[error("failed to parse catalog: {0}")]
    Parse(String),
}

/// Validated, immutable set of upgrade definitions (definition order kept)
#[derive(Debug, Clone)]
pub struct UpgradeCatalog {
    upgrades: Vec<UpgradeDefinition>,
    index: HashMap<String, usize>,
}

impl UpgradeCatalog {
    /// Validate definitions and build the catalog
    pub fn new(upgrades: Vec<UpgradeDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(upgrades.len());
        for (i, def) in upgrades.iter().enumerate() {
            if index.insert(def.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(def.id.clone()));
            }
            let numbers_ok = def.base_cost.is_finite()
                && def.base_cost >= 0.0
                && def.cost_multiplier.is_finite()
                && def.base_value.is_finite()
                && def.increment.is_finite();
            if !numbers_ok {
                return Err(CatalogError::BadNumber(def.id.clone()));
            }
            if def.cost_multiplier < 1.0 {
                return Err(CatalogError::ShrinkingCost(def.id.clone()));
            }
            if def.max_level == Some(0) {
                return Err(CatalogError::ZeroMaxLevel(def.id.clone()));
            }
        }

        for def in &upgrades {
            if let Some(parent) = &def.parent {
                if !index.contains_key(parent) {
                    return Err(CatalogError::UnknownParent {
                        id: def.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        // Walk each parent chain; a chain longer than the catalog must loop
        for def in &upgrades {
            let mut steps = 0;
            let mut current = def.parent.as_deref();
            while let Some(parent) = current {
                steps += 1;
                if parent == def.id || steps > upgrades.len() {
                    return Err(CatalogError::Cycle(def.id.clone()));
                }
                current = upgrades[index[parent]].parent.as_deref();
            }
        }

        Ok(Self { upgrades, index })
    }

    /// Parse a JSON array of definitions and validate it
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let upgrades: Vec<UpgradeDefinition> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(upgrades)
    }

    pub fn get(&self, id: &str) -> Option<&UpgradeDefinition> {
        self.index.get(id).map(|&i| &self.upgrades[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDefinition> {
        self.upgrades.iter()
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Upgrades grouped by shop branch, in definition order
    pub fn by_category(&self) -> BTreeMap<UpgradeCategory, Vec<&UpgradeDefinition>> {
        let mut groups: BTreeMap<UpgradeCategory, Vec<&UpgradeDefinition>> = BTreeMap::new();
        for def in &self.upgrades {
            groups.entry(def.category).or_default().push(def);
        }
        groups
    }

    /// The shipped upgrade tree. Base values of damage and radius come from
    /// the config so the two stay in agreement.
    pub fn standard(config: &GameConfig) -> Result<Self, CatalogError> {
        use UpgradeCategory::*;

        #[allow(clippy::too_many_arguments)]
        fn def(
            id: &str,
            name: &str,
            description: &str,
            category: UpgradeCategory,
            parent: Option<&str>,
            tree_pos: (f32, f32),
            base_cost: f64,
            cost_multiplier: f64,
            base_value: f32,
            increment: f32,
            max_level: Option<u32>,
        ) -> UpgradeDefinition {
            UpgradeDefinition {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                category,
                parent: parent.map(str::to_string),
                tree_pos,
                base_cost,
                cost_multiplier,
                base_value,
                increment,
                max_level,
            }
        }

        let upgrades = vec![
            def(ids::DAMAGE, "Tidal Force", "Increases damage per tick", Attack, None,
                (0.0, 0.0), 40.0, 1.4, config.base_damage, 2.0, None),
            def(ids::SPAWN_RATE, "Attraction", "More celestial bodies per wave", Attack,
                Some(ids::DAMAGE), (1.0, 0.8), 10.0, 1.8, config.base_spawn_limit as f32, 1.0, None),
            def(ids::MASS, "Nucleosynthesis", "Unlocks higher body tiers", Attack,
                Some(ids::DAMAGE), (1.0, -0.8), 10.0, 1.5, 0.0, 1.0, Some(5)),
            def(ids::FISSION, "Fission", "Chance to split a body on destruction", Attack,
                Some(ids::SPAWN_RATE), (2.0, 0.8), 10.0, 1.6, 0.0, 0.1, Some(10)),
            def(ids::CRITICAL_CHANCE, "Perihelion", "Chance of a critical hit", Attack,
                Some(ids::MASS), (2.0, -0.8), 150.0, 1.5, 0.0, 0.05, Some(10)),
            def(ids::CRITICAL_DAMAGE, "Spaghettification", "Critical hit multiplier", Attack,
                Some(ids::CRITICAL_CHANCE), (3.0, -0.8), 200.0, 1.6, config.base_crit_multiplier, 0.25, None),
            def(ids::RADIUS, "Horizon", "Increases the cursor's reach", Defense, None,
                (0.0, 0.0), 10.0, 1.6, config.cursor_radius, 5.0, None),
            def(ids::DURATION, "Time Dilation", "Chance of +1s on destruction", Defense,
                Some(ids::RADIUS), (1.0, 0.0), 200.0, 1.4, 0.0, 0.05, Some(20)),
            def(ids::RESONANCE, "Resonance", "Refill the wave on level up", Unique, None,
                (0.0, 0.0), 500.0, 1.0, 0.0, 1.0, Some(1)),
            def(ids::PLANET_UNLOCK, "Accretion Disk", "Planets join the orbit", SecondaryBody,
                None, (0.0, 0.0), 1000.0, 1.0, 0.0, 1.0, Some(1)),
            def(ids::PLANET_MASS, "Planetary Mass", "Unlocks higher planet tiers", SecondaryBody,
                Some(ids::PLANET_UNLOCK), (1.0, 0.0), 800.0, 1.7, 0.0, 1.0, Some(5)),
        ];

        Self::new(upgrades)
    }
}
