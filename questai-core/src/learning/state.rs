//! The reinforcement-learning state key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Immutable snapshot of a player's situation, used by value as a Q-table key.
///
/// Two snapshots with equal fields are the same RL state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Lifetime hostile mob kills.
    pub mobs_killed: u32,
    /// Lifetime items collected (0 when the host does not track it).
    pub items_collected: u32,
    /// Quests completed by this player.
    pub quests_completed: u32,
    /// Current health, rounded down.
    pub player_health: u32,
    /// Difficulty level the player's quests are generated at.
    pub difficulty_level: u32,
}

impl GameState {
    /// Build a snapshot from its five components.
    #[must_use]
    pub fn new(
        mobs_killed: u32,
        items_collected: u32,
        quests_completed: u32,
        player_health: u32,
        difficulty_level: u32,
    ) -> Self {
        Self {
            mobs_killed,
            items_collected,
            quests_completed,
            player_health,
            difficulty_level,
        }
    }

    /// Copy with a different difficulty level.
    #[must_use]
    pub fn with_difficulty(self, difficulty_level: u32) -> Self {
        Self {
            difficulty_level,
            ..self
        }
    }

    /// Copy with a different completion count.
    #[must_use]
    pub fn with_quests_completed(self, quests_completed: u32) -> Self {
        Self {
            quests_completed,
            ..self
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GameState{{mobs_killed={}, items_collected={}, quests_completed={}, player_health={}, difficulty={}}}",
            self.mobs_killed,
            self.items_collected,
            self.quests_completed,
            self.player_health,
            self.difficulty_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn equal_fields_are_the_same_key() {
        let mut table = HashMap::new();
        table.insert(GameState::new(3, 0, 1, 20, 1), 1.5);
        let lookup = GameState::new(3, 0, 1, 20, 1);
        assert_eq!(table.get(&lookup), Some(&1.5));
        assert!(table.get(&lookup.with_difficulty(2)).is_none());
    }
}
