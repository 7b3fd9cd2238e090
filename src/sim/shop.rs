//! Upgrade tree layout and hit-testing
//!
//! Each category is a branch leaving the shop core in its own direction.
//! A node's `tree_pos` is `(depth along the branch, sideways offset)`.
//! Only unlocked nodes (roots, or children of purchased parents) are shown.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::{UpgradeCategory, UpgradeDefinition};
use crate::economy::EconomyLedger;

/// Distance from the core to the first node of a branch
pub const BRANCH_START: f32 = 100.0;
/// Distance between successive depths on a branch
pub const BRANCH_SPACING: f32 = 80.0;
/// Distance between sideways rows
pub const ROW_SPACING: f32 = 64.0;
/// Click radius around a node (pixels)
pub const NODE_CLICK_TOLERANCE: f32 = 25.0;

/// One visible node as the renderer needs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopNode {
    pub id: String,
    pub category: UpgradeCategory,
    /// Screen position
    pub pos: Vec2,
    /// Screen position of the parent, for the connecting line
    pub parent_pos: Option<Vec2>,
    pub level: u32,
    /// Next-level cost; `None` once maxed
    pub cost: Option<u64>,
    pub affordable: bool,
}

/// Result of a click while the shop is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopClick {
    /// The central singularity: leave the shop
    Core,
    Node(String),
    Nothing,
}

/// Fully extended screen position of a node around `center`
pub fn node_position(def: &UpgradeDefinition, center: Vec2, progress: f32) -> Vec2 {
    let angle = def.category.branch_angle();
    let along = Vec2::new(angle.cos(), angle.sin());
    let across = along.perp();
    let (depth, side) = def.tree_pos;
    let offset = along * (BRANCH_START + depth * BRANCH_SPACING) + across * (side * ROW_SPACING);
    center + offset * progress.clamp(0.0, 1.0)
}

/// Nodes currently shown, in catalog order. `progress` scales the tree
/// outward from the core during the appear/retract animation.
pub fn visible_nodes(ledger: &EconomyLedger, center: Vec2, progress: f32) -> Vec<ShopNode> {
    let catalog = ledger.catalog();
    catalog
        .iter()
        .filter(|def| ledger.is_unlocked(&def.id))
        .map(|def| {
            let maxed = ledger.is_maxed(&def.id);
            ShopNode {
                id: def.id.clone(),
                category: def.category,
                pos: node_position(def, center, progress),
                parent_pos: def
                    .parent
                    .as_deref()
                    .and_then(|p| catalog.get(p))
                    .map(|parent| node_position(parent, center, progress)),
                level: ledger.level(&def.id),
                cost: if maxed { None } else { ledger.cost_of(&def.id) },
                affordable: !maxed && ledger.can_afford(&def.id),
            }
        })
        .collect()
}

/// Closest visible node within the click tolerance
pub fn node_at(nodes: &[ShopNode], point: Vec2) -> Option<&ShopNode> {
    nodes
        .iter()
        .map(|node| (node, node.pos.distance_squared(point)))
        .filter(|(_, d2)| *d2 <= NODE_CLICK_TOLERANCE * NODE_CLICK_TOLERANCE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(node, _)| node)
}

/// Classify a click on the open shop
pub fn click(ledger: &EconomyLedger, center: Vec2, core_radius: f32, progress: f32, point: Vec2) -> ShopClick {
    if point.distance(center) <= core_radius {
        return ShopClick::Core;
    }
    let nodes = visible_nodes(ledger, center, progress);
    match node_at(&nodes, point) {
        Some(node) => ShopClick::Node(node.id.clone()),
        None => ShopClick::Nothing,
    }
}
