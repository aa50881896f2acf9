//! The closed set of difficulty adjustments the agent can take.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tuning action applied to a player's difficulty after a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestAction {
    /// Raise kill requirements.
    IncreaseMobs,
    /// Lower kill requirements.
    DecreaseMobs,
    /// Raise collection requirements.
    IncreaseItems,
    /// Lower collection requirements.
    DecreaseItems,
}

impl QuestAction {
    /// All actions in enumeration order. Ties in the Q-table resolve to the
    /// earliest entry.
    pub const ALL: [Self; 4] = [
        Self::IncreaseMobs,
        Self::DecreaseMobs,
        Self::IncreaseItems,
        Self::DecreaseItems,
    ];

    /// Whether this action makes quests harder.
    #[must_use]
    pub fn is_increase(self) -> bool {
        matches!(self, Self::IncreaseMobs | Self::IncreaseItems)
    }

    /// Whether this action makes quests easier.
    #[must_use]
    pub fn is_decrease(self) -> bool {
        !self.is_increase()
    }

    /// Whether this action tunes kill quests (as opposed to collection quests).
    #[must_use]
    pub fn targets_mobs(self) -> bool {
        matches!(self, Self::IncreaseMobs | Self::DecreaseMobs)
    }

    /// Position in [`Self::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::IncreaseMobs => 0,
            Self::DecreaseMobs => 1,
            Self::IncreaseItems => 2,
            Self::DecreaseItems => 3,
        }
    }
}

impl fmt::Display for QuestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IncreaseMobs => "INCREASE_MOBS",
            Self::DecreaseMobs => "DECREASE_MOBS",
            Self::IncreaseItems => "INCREASE_ITEMS",
            Self::DecreaseItems => "DECREASE_ITEMS",
        };
        f.write_str(name)
    }
}
