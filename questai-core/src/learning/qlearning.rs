//! Tabular Q-learning agent.
//!
//! One value per `(GameState, QuestAction)` pair, updated with the
//! temporal-difference rule
//!
//! ```text
//! Q[s,a] += α · (r + γ · max_a' Q[s',a'] − Q[s,a])
//! ```
//!
//! Missing entries read as `0.0`. The table grows with every distinct state
//! observed and is never evicted.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LearningConfig;
use crate::learning::action::QuestAction;
use crate::learning::state::GameState;

/// One row of an exported Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    /// State key.
    pub state: GameState,
    /// Action key.
    pub action: QuestAction,
    /// Learned value.
    pub value: f64,
}

/// Epsilon-greedy tabular Q-learning agent.
#[derive(Debug, Clone)]
pub struct QLearning {
    table: HashMap<GameState, HashMap<QuestAction, f64>>,
    learning_rate: f64,
    discount_factor: f64,
    exploration_rate: f64,
    rng: StdRng,
}

impl QLearning {
    /// Create an agent from configuration. Uses `config.seed` when set.
    #[must_use]
    pub fn new(config: &LearningConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            table: HashMap::new(),
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            exploration_rate: config.exploration_rate,
            rng,
        }
    }

    /// Create an agent with default hyperparameters and a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(&LearningConfig {
            seed: Some(seed),
            ..LearningConfig::default()
        })
    }

    /// Pick an action for `state`: a uniformly random one with probability
    /// ε, otherwise the greedy [`best_action`](Self::best_action).
    pub fn choose_action(&mut self, state: &GameState) -> QuestAction {
        if self.rng.gen_bool(self.exploration_rate) {
            QuestAction::ALL[self.rng.gen_range(0..QuestAction::ALL.len())]
        } else {
            self.best_action(state)
        }
    }

    /// The action with the highest value for `state`.
    ///
    /// Unseen entries count as `0.0` and ties go to the earliest action in
    /// enumeration order, so an unseen state yields
    /// [`QuestAction::IncreaseMobs`].
    #[must_use]
    pub fn best_action(&self, state: &GameState) -> QuestAction {
        let mut best = QuestAction::ALL[0];
        let mut best_value = self.value(state, best);
        for &action in &QuestAction::ALL[1..] {
            let value = self.value(state, action);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        best
    }

    /// Current estimate for `(state, action)`, `0.0` if never updated.
    #[must_use]
    pub fn value(&self, state: &GameState, action: QuestAction) -> f64 {
        self.table
            .get(state)
            .and_then(|row| row.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Highest estimate over all actions for `state`.
    #[must_use]
    pub fn max_value(&self, state: &GameState) -> f64 {
        QuestAction::ALL
            .iter()
            .map(|&a| self.value(state, a))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Apply one temporal-difference update and return the new value.
    pub fn update(
        &mut self,
        state: &GameState,
        action: QuestAction,
        reward: f64,
        next_state: &GameState,
    ) -> f64 {
        let old = self.value(state, action);
        let future = self.max_value(next_state);
        let new = old + self.learning_rate * (reward + self.discount_factor * future - old);
        self.table.entry(*state).or_default().insert(action, new);

        debug!(
            %state,
            %action,
            reward,
            old,
            new,
            "Q-value updated"
        );
        new
    }

    /// Number of stored `(state, action)` entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    /// Number of distinct states observed.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.table.len()
    }

    /// Configured exploration rate ε.
    #[must_use]
    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Export the table as a flat list of entries.
    #[must_use]
    pub fn export(&self) -> Vec<QEntry> {
        let mut entries: Vec<QEntry> = self
            .table
            .iter()
            .flat_map(|(state, row)| {
                row.iter().map(|(&action, &value)| QEntry {
                    state: *state,
                    action,
                    value,
                })
            })
            .collect();
        entries.sort_by_key(|e| {
            (
                e.state.difficulty_level,
                e.state.quests_completed,
                e.state.mobs_killed,
                e.state.items_collected,
                e.state.player_health,
                e.action,
            )
        });
        entries
    }

    /// Replace the table with previously exported entries.
    pub fn restore(&mut self, entries: &[QEntry]) {
        self.table.clear();
        for entry in entries {
            self.table
                .entry(entry.state)
                .or_default()
                .insert(entry.action, entry.value);
        }
    }
}
