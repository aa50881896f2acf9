//! Configuration for the quest system.
//!
//! Maps directly to `questai.toml`. Every section and field has a default,
//! so an empty file yields the stock behaviour.

use serde::{Deserialize, Serialize};

use crate::error::{QuestError, Result};

/// Top-level QUESTAI configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Per-player and global quest pool sizes.
    #[serde(default)]
    pub quests: QuestPoolConfig,
    /// Reward amounts.
    #[serde(default)]
    pub rewards: RewardConfig,
    /// Procedural generation tiers.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Q-learning hyperparameters.
    #[serde(default)]
    pub learning: LearningConfig,
    /// Replacement policy after completion.
    #[serde(default)]
    pub regeneration: RegenerationConfig,
    /// Persistence / save settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl QuestConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `QuestError::Config` if the TOML is invalid or a value is out
    /// of range.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| QuestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    /// Returns `QuestError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(QuestError::Config(format!("{name} must be within [0, 1], got {v}")))
            }
        };
        unit("learning.learning_rate", self.learning.learning_rate)?;
        unit("learning.discount_factor", self.learning.discount_factor)?;
        unit("learning.exploration_rate", self.learning.exploration_rate)?;

        let generator = &self.generator;
        if generator.base_min == 0 || generator.base_min > generator.base_max {
            return Err(QuestError::Config(format!(
                "generator base range {}..={} is invalid",
                generator.base_min, generator.base_max
            )));
        }
        for (label, tiers) in [("enemy", &generator.enemy), ("item", &generator.item)] {
            unit(&format!("generator.{label}.advanced_probability"), tiers.advanced_probability)?;
            unit(&format!("generator.{label}.extreme_probability"), tiers.extreme_probability)?;
            for (tier, cfg) in [
                ("standard", &tiers.standard),
                ("advanced", &tiers.advanced),
                ("extreme", &tiers.extreme),
            ] {
                if cfg.targets.is_empty() {
                    return Err(QuestError::Config(format!(
                        "generator.{label}.{tier} has no targets"
                    )));
                }
                if cfg.cap == 0 {
                    return Err(QuestError::Config(format!(
                        "generator.{label}.{tier}.cap must be at least 1"
                    )));
                }
            }
        }

        if self.quests.max_active_per_player < 2 {
            return Err(QuestError::Config(
                "quests.max_active_per_player must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether the quest system reacts to host events at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
        }
    }
}

/// Quest pool sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestPoolConfig {
    /// Hard cap on concurrently active quests per player.
    #[serde(default = "default_10")]
    pub max_active_per_player: usize,
    /// Cap on the shared pool of registered quests.
    #[serde(default = "default_10")]
    pub max_global_quests: usize,
    /// Difficulty level assigned to new players.
    #[serde(default = "default_1")]
    pub initial_difficulty: u32,
}

impl Default for QuestPoolConfig {
    fn default() -> Self {
        Self {
            max_active_per_player: 10,
            max_global_quests: 10,
            initial_difficulty: 1,
        }
    }
}

/// What a completed quest pays out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Experience points granted for a kill quest.
    #[serde(default = "default_kill_xp")]
    pub kill_experience: u32,
    /// Item granted for a collection quest.
    #[serde(default = "default_token_item")]
    pub token_item: String,
    /// How many tokens are granted.
    #[serde(default = "default_1")]
    pub token_count: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            kill_experience: 50,
            token_item: default_token_item(),
            token_count: 1,
        }
    }
}

/// A single difficulty tier: candidate targets plus amount scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    /// Namespaced target identifiers drawn uniformly.
    pub targets: Vec<String>,
    /// Multiplier applied to the difficulty factor.
    pub coefficient: f64,
    /// Maximum required amount for targets of this tier.
    pub cap: u32,
}

/// The three tiers for one quest kind plus their unlock rules.
///
/// Overriding a `[generator.enemy]` or `[generator.item]` table replaces it
/// wholesale, so every field must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSet {
    /// Always available.
    pub standard: TierConfig,
    /// Hard enemies / rare items.
    pub advanced: TierConfig,
    /// Very hard enemies / very rare items.
    pub extreme: TierConfig,
    /// Difficulty factor above which the advanced tier can be rolled.
    pub advanced_unlock_factor: f64,
    /// Difficulty factor above which the extreme tier can be rolled.
    pub extreme_unlock_factor: f64,
    /// Probability of picking the advanced tier once unlocked.
    pub advanced_probability: f64,
    /// Probability of picking the extreme tier once unlocked.
    pub extreme_probability: f64,
}

/// Procedural generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Lower bound of the random base amount.
    #[serde(default = "default_1")]
    pub base_min: u32,
    /// Upper bound (inclusive) of the random base amount.
    #[serde(default = "default_3")]
    pub base_max: u32,
    /// Kill quest tiers.
    #[serde(default = "default_enemy_tiers")]
    pub enemy: TierSet,
    /// Collection quest tiers.
    #[serde(default = "default_item_tiers")]
    pub item: TierSet,
    /// Fixed RNG seed; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_min: 1,
            base_max: 3,
            enemy: default_enemy_tiers(),
            item: default_item_tiers(),
            seed: None,
        }
    }
}

/// Tabular Q-learning hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Step size α.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Discount γ.
    #[serde(default = "default_discount")]
    pub discount_factor: f64,
    /// Exploration probability ε.
    #[serde(default = "default_exploration")]
    pub exploration_rate: f64,
    /// Fixed RNG seed; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration_rate: 0.2,
            seed: None,
        }
    }
}

/// When completed quests are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerationPolicy {
    /// Replace on every sweep; the cooldown timestamp is informational.
    #[default]
    Immediate,
    /// Keep completed quests in place until the cooldown has elapsed.
    CooldownGated,
}

/// Regeneration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerationConfig {
    /// Replacement policy.
    #[serde(default)]
    pub policy: RegenerationPolicy,
    /// Minimum milliseconds between two regenerations for one player.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for RegenerationConfig {
    fn default() -> Self {
        Self {
            policy: RegenerationPolicy::Immediate,
            cooldown_ms: 5_000,
        }
    }
}

/// Persistence / save configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Use WAL mode for concurrent reads.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Detect save corruption via checksums.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn tier(targets: &[&str], coefficient: f64, cap: u32) -> TierConfig {
    TierConfig {
        targets: targets.iter().map(|t| (*t).to_string()).collect(),
        coefficient,
        cap,
    }
}

fn default_enemy_tiers() -> TierSet {
    TierSet {
        standard: tier(
            &["minecraft:zombie", "minecraft:skeleton", "minecraft:spider", "minecraft:creeper"],
            2.0,
            20,
        ),
        advanced: tier(&["minecraft:witch", "minecraft:enderman", "minecraft:slime"], 1.0, 6),
        extreme: tier(
            &["minecraft:blaze", "minecraft:wither_skeleton", "minecraft:ghast"],
            0.5,
            2,
        ),
        advanced_unlock_factor: 2.0,
        extreme_unlock_factor: 4.0,
        advanced_probability: 0.4,
        extreme_probability: 0.3,
    }
}

fn default_item_tiers() -> TierSet {
    TierSet {
        standard: tier(
            &["minecraft:dirt", "minecraft:cobblestone", "minecraft:oak_log", "minecraft:sand"],
            3.0,
            32,
        ),
        advanced: tier(
            &["minecraft:iron_ingot", "minecraft:gold_ingot", "minecraft:redstone"],
            1.0,
            8,
        ),
        extreme: tier(
            &["minecraft:diamond", "minecraft:emerald", "minecraft:ancient_debris"],
            0.5,
            2,
        ),
        advanced_unlock_factor: 3.0,
        extreme_unlock_factor: 4.0,
        advanced_probability: 0.4,
        extreme_probability: 0.3,
    }
}

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_token_item() -> String { "minecraft_quest_ai:quest_token".to_string() }
fn default_learning_rate() -> f64 { 0.1 }
fn default_discount() -> f64 { 0.9 }
fn default_exploration() -> f64 { 0.2 }
fn default_1() -> u32 { 1 }
fn default_3() -> u32 { 3 }
fn default_10() -> usize { 10 }
fn default_kill_xp() -> u32 { 50 }
fn default_cooldown_ms() -> u64 { 5_000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = QuestConfig::from_toml("").expect("parse");
        assert!(config.general.enabled);
        assert_eq!(config.rewards.kill_experience, 50);
        assert_eq!(config.regeneration.policy, RegenerationPolicy::Immediate);
        assert_eq!(config.regeneration.cooldown_ms, 5_000);
        assert!((config.learning.exploration_rate - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.generator.enemy.extreme.cap, 2);
    }

    #[test]
    fn partial_override() {
        let config = QuestConfig::from_toml(
            r#"
            [regeneration]
            policy = "cooldown_gated"
            cooldown_ms = 60000

            [learning]
            seed = 7
            "#,
        )
        .expect("parse");
        assert_eq!(config.regeneration.policy, RegenerationPolicy::CooldownGated);
        assert_eq!(config.regeneration.cooldown_ms, 60_000);
        assert_eq!(config.learning.seed, Some(7));
        assert!((config.learning.learning_rate - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_rate_is_rejected() {
        let err = QuestConfig::from_toml("[learning]\nexploration_rate = 1.5\n")
            .expect_err("should reject");
        assert!(matches!(err, QuestError::Config(_)));
    }

    #[test]
    fn inverted_base_range_is_rejected() {
        assert!(QuestConfig::from_toml("[generator]\nbase_min = 4\nbase_max = 2\n").is_err());
    }
}
