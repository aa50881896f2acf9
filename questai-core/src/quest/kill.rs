//! Kill quests: defeat N entities of one type.

use std::collections::HashMap;

use tracing::debug;

use super::{CompletionState, describe};
use crate::config::RewardConfig;
use crate::host::{Notifier, Registry, Rewards};
use crate::message::{Color, StyledText};
use crate::types::{PlayerId, QuestId, TargetId};

/// Placeholder used when the registry does not know the target.
pub const UNKNOWN_ENTITY: &str = "unknown entity";

/// Progress notifications are sent every this many kills.
const NOTIFY_EVERY: u32 = 5;

/// A quest to kill `required_amount` entities of type `target`.
#[derive(Debug, Clone)]
pub struct KillQuest {
    id: QuestId,
    title: String,
    description: String,
    target: TargetId,
    required_amount: u32,
    progress: HashMap<PlayerId, u32>,
    state: HashMap<PlayerId, CompletionState>,
}

impl KillQuest {
    /// Create a kill quest. The description uses the registry name of
    /// `target`, or a placeholder when it is unknown.
    pub fn new<R: Registry + ?Sized>(
        id: QuestId,
        title: impl Into<String>,
        target: TargetId,
        required_amount: u32,
        registry: &R,
    ) -> Self {
        let name = registry
            .entity_name(&target)
            .unwrap_or_else(|| UNKNOWN_ENTITY.to_string());
        Self {
            id,
            title: title.into(),
            description: describe("Kill", required_amount, &name),
            target,
            required_amount,
            progress: HashMap::new(),
            state: HashMap::new(),
        }
    }

    /// Quest id.
    #[must_use]
    pub fn id(&self) -> &QuestId {
        &self.id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// "Kill N Name(s)".
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Entity type to kill.
    #[must_use]
    pub fn target(&self) -> &TargetId {
        &self.target
    }

    /// Kills needed.
    #[must_use]
    pub fn required_amount(&self) -> u32 {
        self.required_amount
    }

    /// Kills counted so far for `player`.
    #[must_use]
    pub fn progress(&self, player: PlayerId) -> u32 {
        self.progress.get(&player).copied().unwrap_or(0)
    }

    /// Completion state for `player`.
    #[must_use]
    pub fn completion_state(&self, player: PlayerId) -> CompletionState {
        self.state.get(&player).copied().unwrap_or_default()
    }

    /// Set `Completed` if the counter has reached the requirement.
    pub fn check_completion(&mut self, player: PlayerId) -> bool {
        if self.progress(player) >= self.required_amount {
            self.advance(player, CompletionState::Completed);
        }
        self.completion_state(player).is_completed()
    }

    /// Count a kill of `observed` by `player`.
    ///
    /// Ignored once the quest is completed for that player or if the type
    /// does not match. Returns `true` if the kill counted.
    pub fn on_entity_killed<H: Notifier + ?Sized>(
        &mut self,
        player: PlayerId,
        observed: &TargetId,
        host: &mut H,
    ) -> bool {
        if self.completion_state(player).is_completed() || *observed != self.target {
            return false;
        }

        let count = self.progress.entry(player).or_insert(0);
        *count += 1;
        let count = *count;
        debug!(quest = %self.id, %player, count, required = self.required_amount, "kill counted");

        if count % NOTIFY_EVERY == 0 || count == self.required_amount || self.required_amount <= NOTIFY_EVERY {
            host.send_message(
                player,
                StyledText::tagged(
                    "[Quest Progress] ",
                    Color::GOLD,
                    format!("{}: {}/{}", self.title, count, self.required_amount),
                    Color::WHITE,
                ),
            );
        }

        if count == self.required_amount {
            self.advance(player, CompletionState::Completed);
            host.send_message(
                player,
                StyledText::tagged(
                    "[Quest Ready] ",
                    Color::GREEN,
                    format!("{} complete! Visit the quest board to claim your reward.", self.title),
                    Color::WHITE,
                ),
            );
        }
        true
    }

    /// Grant the experience reward once.
    pub fn reward<H: Rewards + Notifier + ?Sized>(
        &mut self,
        player: PlayerId,
        host: &mut H,
        rewards: &RewardConfig,
    ) -> bool {
        if self.completion_state(player) == CompletionState::Rewarded {
            return false;
        }
        self.progress.insert(player, self.required_amount);
        self.advance(player, CompletionState::Rewarded);

        host.grant_experience(player, rewards.kill_experience);
        host.send_message(
            player,
            StyledText::tagged(
                "Received quest reward: ",
                Color::GREEN,
                format!("{} XP", rewards.kill_experience),
                Color::GOLD,
            ),
        );
        true
    }

    /// Restore a player's saved counter and state.
    pub fn restore(&mut self, player: PlayerId, progress: u32, state: CompletionState) {
        let progress = if state.is_completed() {
            progress.max(self.required_amount)
        } else {
            progress
        };
        self.progress.insert(player, progress.min(self.required_amount));
        self.advance(player, state);
    }

    fn advance(&mut self, player: PlayerId, to: CompletionState) {
        let state = self.state.entry(player).or_default();
        *state = state.advance(to);
    }
}
