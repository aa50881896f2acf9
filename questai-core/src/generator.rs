//! Procedural quest generation and per-player difficulty tuning.
//!
//! The generator itself is stateless apart from its configuration and RNG.
//! Everything that adapts to a player lives in [`DifficultyTuning`], which the
//! caller owns (one per player) and passes into every call.
//!
//! Required amounts follow
//!
//! ```text
//! amount = clamp(base + floor(factor × coefficient) + modifier, 1, tier.cap)
//! ```
//!
//! where `base` is drawn from the configured base range and the tier is
//! rolled independently per quest.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{GeneratorConfig, TierConfig, TierSet};
use crate::host::Registry;
use crate::learning::{GameState, QLearning, QuestAction};
use crate::quest::{Quest, QuestKind};
use crate::types::{QuestId, TargetId};

/// Completions in a row (with no failures) that raise the level.
pub const COMPLETIONS_TO_LEVEL_UP: u32 = 3;

/// Failures in a row that lower the level.
pub const FAILURES_TO_LEVEL_DOWN: u32 = 2;

/// Target used when a tier's pool is empty.
const FALLBACK_ENEMY: &str = "minecraft:zombie";
const FALLBACK_ITEM: &str = "minecraft:dirt";

// ---------------------------------------------------------------------------
// Difficulty tuning
// ---------------------------------------------------------------------------

/// Per-player difficulty knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTuning {
    /// Current difficulty level, never below 1.
    pub level: u32,
    /// Added to collection quest amounts.
    pub item_modifier: u32,
    /// Added to kill quest amounts.
    pub enemy_modifier: u32,
    /// Completions since the level last changed.
    pub consecutive_completions: u32,
    /// Failures since the level was last lowered.
    pub consecutive_failures: u32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self::at_level(1)
    }
}

impl DifficultyTuning {
    /// Fresh tuning at `level` (raised to 1 if zero).
    #[must_use]
    pub fn at_level(level: u32) -> Self {
        Self {
            level: level.max(1),
            item_modifier: 0,
            enemy_modifier: 0,
            consecutive_completions: 0,
            consecutive_failures: 0,
        }
    }

    /// The level as a generation factor.
    #[must_use]
    pub fn factor(&self) -> f64 {
        f64::from(self.level)
    }

    /// Modifier that applies to quests of `kind`.
    #[must_use]
    pub fn modifier_for(&self, kind: QuestKind) -> u32 {
        match kind {
            QuestKind::Kill => self.enemy_modifier,
            QuestKind::Collection => self.item_modifier,
        }
    }

    /// Apply an agent action. Returns `true` if the level changed.
    pub fn apply_action(&mut self, action: QuestAction) -> bool {
        let before = self.level;
        let modifier = if action.targets_mobs() {
            &mut self.enemy_modifier
        } else {
            &mut self.item_modifier
        };
        if action.is_increase() {
            *modifier += 1;
            self.level += 1;
        } else {
            *modifier = modifier.saturating_sub(1);
            self.level = self.level.saturating_sub(1).max(1);
        }
        let changed = self.level != before;
        if changed {
            self.consecutive_completions = 0;
        }
        changed
    }

    /// Count a completion. Returns `true` if the level was raised.
    pub fn record_completion(&mut self) -> bool {
        self.consecutive_completions += 1;
        if self.consecutive_completions >= COMPLETIONS_TO_LEVEL_UP && self.consecutive_failures == 0 {
            self.level += 1;
            self.consecutive_completions = 0;
            return true;
        }
        false
    }

    /// Count a failure. Breaks the completion streak. Returns `true` if the
    /// level was lowered.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;
        self.consecutive_completions = 0;
        if self.consecutive_failures >= FAILURES_TO_LEVEL_DOWN {
            let before = self.level;
            self.level = self.level.saturating_sub(1).max(1);
            self.consecutive_failures = 0;
            return self.level != before;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Result of [`QuestGenerator::generate_follow_up`].
#[derive(Debug, Clone)]
pub struct FollowUp {
    /// The replacement quest.
    pub quest: Quest,
    /// Action the agent chose.
    pub action: QuestAction,
    /// Whether the level went up, down or stayed.
    pub level_change: std::cmp::Ordering,
}

/// Procedural quest factory.
#[derive(Debug, Clone)]
pub struct QuestGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl QuestGenerator {
    /// Create a generator. Uses `config.seed` when set.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self { config, rng }
    }

    /// Default configuration with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(GeneratorConfig {
            seed: Some(seed),
            ..GeneratorConfig::default()
        })
    }

    /// Generation settings.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one quest of `kind` at `difficulty_factor`.
    pub fn generate_quest<R: Registry + ?Sized>(
        &mut self,
        kind: QuestKind,
        difficulty_factor: f64,
        tuning: &DifficultyTuning,
        registry: &R,
    ) -> Quest {
        let tiers = match kind {
            QuestKind::Kill => &self.config.enemy,
            QuestKind::Collection => &self.config.item,
        };
        let tier = select_tier(tiers, difficulty_factor, &mut self.rng);
        let target = tier.targets.choose(&mut self.rng).map_or_else(
            || {
                TargetId::from(match kind {
                    QuestKind::Kill => FALLBACK_ENEMY,
                    QuestKind::Collection => FALLBACK_ITEM,
                })
            },
            |t| TargetId::new(t.clone()),
        );
        let base = self
            .rng
            .gen_range(self.config.base_min..=self.config.base_max.max(self.config.base_min));
        let amount = required_amount(base, difficulty_factor, tier, tuning.modifier_for(kind));

        let name = match kind {
            QuestKind::Kill => registry.entity_name(&target),
            QuestKind::Collection => registry.item_name(&target),
        }
        .unwrap_or_else(|| target.path().to_string());
        let title = match kind {
            QuestKind::Kill => format!("Kill {name}"),
            QuestKind::Collection => format!("Collect {name}"),
        };
        let id = QuestId(format!(
            "{}_{}_{}",
            kind.id_prefix(),
            target.path(),
            Uuid::new_v4().simple()
        ));

        debug!(%id, %target, amount, difficulty_factor, "quest generated");
        Quest::new(kind, id, title, target, amount, registry)
    }

    /// One kill quest and one collection quest at the tuning's level.
    pub fn generate_defaults<R: Registry + ?Sized>(
        &mut self,
        tuning: &DifficultyTuning,
        registry: &R,
    ) -> Vec<Quest> {
        vec![
            self.generate_quest(QuestKind::Kill, tuning.factor(), tuning, registry),
            self.generate_quest(QuestKind::Collection, tuning.factor(), tuning, registry),
        ]
    }

    /// Replace `completed` with a quest of the opposite kind.
    ///
    /// Asks the agent for an action in `state`, applies it to `tuning`,
    /// counts the completion towards auto-difficulty and generates at the
    /// resulting level.
    pub fn generate_follow_up<R: Registry + ?Sized>(
        &mut self,
        completed: &Quest,
        state: &GameState,
        agent: &mut QLearning,
        tuning: &mut DifficultyTuning,
        registry: &R,
    ) -> FollowUp {
        let before = tuning.level;
        let action = agent.choose_action(state);
        tuning.apply_action(action);
        if tuning.record_completion() {
            info!(level = tuning.level, "streak raised difficulty");
        }

        let quest = self.generate_quest(completed.kind().opposite(), tuning.factor(), tuning, registry);
        info!(
            replaced = %completed.id(),
            new = %quest.id(),
            %action,
            level = tuning.level,
            "follow-up quest generated"
        );
        FollowUp {
            quest,
            action,
            level_change: tuning.level.cmp(&before),
        }
    }
}

/// Roll the tier for one quest. Harder tiers are checked first, each with
/// its own independent roll.
fn select_tier<'a>(tiers: &'a TierSet, factor: f64, rng: &mut StdRng) -> &'a TierConfig {
    if factor > tiers.extreme_unlock_factor && rng.gen_bool(tiers.extreme_probability) {
        &tiers.extreme
    } else if factor > tiers.advanced_unlock_factor && rng.gen_bool(tiers.advanced_probability) {
        &tiers.advanced
    } else {
        &tiers.standard
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn required_amount(base: u32, factor: f64, tier: &TierConfig, modifier: u32) -> u32 {
    let scaled = (factor * tier.coefficient).floor().max(0.0) as u32;
    base.saturating_add(scaled)
        .saturating_add(modifier)
        .min(tier.cap)
        .max(1)
}
