//! Host collaborator interfaces.
//!
//! The quest core never touches the game world directly. Everything it needs
//! from the host simulation (inventory counts, reward issuance, chat,
//! registry names, player vitals) goes through the traits in this module.
//! [`QuestHost`] bundles them so call sites take a single `&mut H`.
//!
//! [`HeadlessHost`] is a complete in-memory implementation used by tests,
//! benchmarks and headless simulation.

use std::collections::HashMap;

use crate::message::StyledText;
use crate::types::{PlayerId, TargetId};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A stack of items, used when a reward cannot be placed in the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    /// Item type.
    pub item: TargetId,
    /// Number of items.
    pub count: u32,
}

/// Read access to player inventories.
pub trait Inventory {
    /// Total number of `item` currently held by `player`.
    fn count_held(&self, player: PlayerId, item: &TargetId) -> u32;
}

/// Reward issuance.
pub trait Rewards {
    /// Give experience points.
    fn grant_experience(&mut self, player: PlayerId, amount: u32);

    /// Try to place items in the inventory. Returns `false` if they did not fit.
    fn grant_item(&mut self, player: PlayerId, item: &TargetId, count: u32) -> bool;

    /// Drop a stack on the ground at the player's position.
    fn drop_at_feet(&mut self, player: PlayerId, stack: ItemStack);

    /// Remove up to `count` of `item` from the inventory.
    fn consume_items(&mut self, player: PlayerId, item: &TargetId, count: u32);
}

/// Chat delivery. Fire-and-forget.
pub trait Notifier {
    /// Send a styled message to one player.
    fn send_message(&mut self, player: PlayerId, message: StyledText);
}

/// Human-readable names for entity and item types.
pub trait Registry {
    /// Display name of an entity type, if known.
    fn entity_name(&self, id: &TargetId) -> Option<String>;

    /// Display name of an item type, if known.
    fn item_name(&self, id: &TargetId) -> Option<String>;
}

/// Observable player statistics used to build a `GameState` lazily.
pub trait PlayerStats {
    /// Current health, rounded down.
    fn health(&self, player: PlayerId) -> u32;

    /// Lifetime hostile mob kills.
    fn mobs_killed(&self, player: PlayerId) -> u32;

    /// Lifetime items collected, when the host tracks it.
    fn items_collected(&self, _player: PlayerId) -> u32 {
        0
    }
}

/// Everything the quest core needs from the host.
pub trait QuestHost: Inventory + Rewards + Notifier + Registry + PlayerStats {}

impl<T: Inventory + Rewards + Notifier + Registry + PlayerStats + ?Sized> QuestHost for T {}

// ---------------------------------------------------------------------------
// Headless in-memory host
// ---------------------------------------------------------------------------

/// Full health of a fresh player.
const DEFAULT_HEALTH: u32 = 20;

/// In-memory host: inventories are plain counters, messages are recorded.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    /// Item counts per player.
    pub inventories: HashMap<PlayerId, HashMap<TargetId, u32>>,
    /// Experience granted per player.
    pub experience: HashMap<PlayerId, u32>,
    /// Stacks dropped at players' feet.
    pub dropped: Vec<(PlayerId, ItemStack)>,
    /// Every message sent, in order.
    pub messages: Vec<(PlayerId, StyledText)>,
    /// Health overrides; players not listed have full health.
    pub health: HashMap<PlayerId, u32>,
    /// Lifetime kills per player.
    pub kills: HashMap<PlayerId, u32>,
    /// Registry display names.
    pub names: HashMap<TargetId, String>,
    /// Maximum number of items a single inventory holds. `None` is unlimited.
    pub inventory_capacity: Option<u32>,
}

impl HeadlessHost {
    /// Create an empty host with no registry names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host whose registry knows the vanilla targets used by the
    /// default generator pools.
    #[must_use]
    pub fn with_vanilla_names() -> Self {
        let mut host = Self::new();
        for (id, name) in [
            ("minecraft:zombie", "Zombie"),
            ("minecraft:skeleton", "Skeleton"),
            ("minecraft:spider", "Spider"),
            ("minecraft:creeper", "Creeper"),
            ("minecraft:witch", "Witch"),
            ("minecraft:enderman", "Enderman"),
            ("minecraft:slime", "Slime"),
            ("minecraft:blaze", "Blaze"),
            ("minecraft:wither_skeleton", "Wither Skeleton"),
            ("minecraft:ghast", "Ghast"),
            ("minecraft:dirt", "Dirt"),
            ("minecraft:cobblestone", "Cobblestone"),
            ("minecraft:oak_log", "Oak Log"),
            ("minecraft:sand", "Sand"),
            ("minecraft:iron_ingot", "Iron Ingot"),
            ("minecraft:gold_ingot", "Gold Ingot"),
            ("minecraft:redstone", "Redstone Dust"),
            ("minecraft:diamond", "Diamond"),
            ("minecraft:emerald", "Emerald"),
            ("minecraft:ancient_debris", "Ancient Debris"),
        ] {
            host.names.insert(TargetId::from(id), name.to_string());
        }
        host
    }

    /// Add items to a player's inventory, ignoring capacity.
    pub fn give(&mut self, player: PlayerId, item: &TargetId, count: u32) {
        *self
            .inventories
            .entry(player)
            .or_default()
            .entry(item.clone())
            .or_insert(0) += count;
    }

    /// Set the exact count of an item held by a player.
    pub fn set_held(&mut self, player: PlayerId, item: &TargetId, count: u32) {
        self.inventories
            .entry(player)
            .or_default()
            .insert(item.clone(), count);
    }

    /// Override a player's health.
    pub fn set_health(&mut self, player: PlayerId, health: u32) {
        self.health.insert(player, health);
    }

    /// Bump a player's lifetime kill counter.
    pub fn record_kill(&mut self, player: PlayerId) {
        *self.kills.entry(player).or_insert(0) += 1;
    }

    /// Experience granted to a player so far.
    #[must_use]
    pub fn experience_of(&self, player: PlayerId) -> u32 {
        self.experience.get(&player).copied().unwrap_or(0)
    }

    /// Plain text of every message sent to `player`.
    #[must_use]
    pub fn messages_for(&self, player: PlayerId) -> Vec<String> {
        self.messages
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, m)| m.plain_text())
            .collect()
    }

    fn total_held(&self, player: PlayerId) -> u32 {
        self.inventories
            .get(&player)
            .map_or(0, |inv| inv.values().sum())
    }
}

impl Inventory for HeadlessHost {
    fn count_held(&self, player: PlayerId, item: &TargetId) -> u32 {
        self.inventories
            .get(&player)
            .and_then(|inv| inv.get(item))
            .copied()
            .unwrap_or(0)
    }
}

impl Rewards for HeadlessHost {
    fn grant_experience(&mut self, player: PlayerId, amount: u32) {
        *self.experience.entry(player).or_insert(0) += amount;
    }

    fn grant_item(&mut self, player: PlayerId, item: &TargetId, count: u32) -> bool {
        if let Some(capacity) = self.inventory_capacity {
            if self.total_held(player).saturating_add(count) > capacity {
                return false;
            }
        }
        self.give(player, item, count);
        true
    }

    fn drop_at_feet(&mut self, player: PlayerId, stack: ItemStack) {
        self.dropped.push((player, stack));
    }

    fn consume_items(&mut self, player: PlayerId, item: &TargetId, count: u32) {
        if let Some(held) = self
            .inventories
            .get_mut(&player)
            .and_then(|inv| inv.get_mut(item))
        {
            *held = held.saturating_sub(count);
        }
    }
}

impl Notifier for HeadlessHost {
    fn send_message(&mut self, player: PlayerId, message: StyledText) {
        self.messages.push((player, message));
    }
}

impl Registry for HeadlessHost {
    fn entity_name(&self, id: &TargetId) -> Option<String> {
        self.names.get(id).cloned()
    }

    fn item_name(&self, id: &TargetId) -> Option<String> {
        self.names.get(id).cloned()
    }
}

impl PlayerStats for HeadlessHost {
    fn health(&self, player: PlayerId) -> u32 {
        self.health.get(&player).copied().unwrap_or(DEFAULT_HEALTH)
    }

    fn mobs_killed(&self, player: PlayerId) -> u32 {
        self.kills.get(&player).copied().unwrap_or(0)
    }
}
