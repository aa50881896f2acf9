//! Reward shaping for the difficulty agent.
//!
//! All terms are additive and independent:
//!
//! | Term | Condition |
//! |------|-----------|
//! | +1.0 | always (a quest was completed) |
//! | +2.0 | completions > 5 × level |
//! | −1.0 | increase action while health < 10 |
//! | +3.0 | increase action while completions > 10 × level |
//! | +3.0 | decrease action while completions < 3 × level |

use crate::learning::action::QuestAction;
use crate::learning::state::GameState;

/// Health below which making quests harder is penalised.
pub const LOW_HEALTH: u32 = 10;

/// Reward for having taken `action` in `state` after a completion.
#[must_use]
pub fn shape_reward(state: &GameState, action: QuestAction) -> f64 {
    let completed = u64::from(state.quests_completed);
    let level = u64::from(state.difficulty_level);

    let mut reward = 1.0;
    if completed > 5 * level {
        reward += 2.0;
    }
    if action.is_increase() {
        if state.player_health < LOW_HEALTH {
            reward -= 1.0;
        }
        if completed > 10 * level {
            reward += 3.0;
        }
    } else if completed < 3 * level {
        reward += 3.0;
    }
    reward
}
