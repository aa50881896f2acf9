//! Collection quests: hold N items of one type.

use std::collections::HashMap;

use tracing::debug;

use super::{CompletionState, describe};
use crate::config::RewardConfig;
use crate::host::{Inventory, ItemStack, Notifier, Registry, Rewards};
use crate::message::{Color, StyledText};
use crate::types::{PlayerId, QuestId, TargetId};

/// Placeholder used when the registry does not know the item.
pub const UNKNOWN_ITEM: &str = "unknown item";

/// A quest to hold `required_amount` items of type `target`.
#[derive(Debug, Clone)]
pub struct CollectionQuest {
    id: QuestId,
    title: String,
    description: String,
    target: TargetId,
    required_amount: u32,
    state: HashMap<PlayerId, CompletionState>,
}

impl CollectionQuest {
    /// Create a collection quest. The description uses the registry name
    /// of `target`, or a placeholder when it is unknown.
    pub fn new<R: Registry + ?Sized>(
        id: QuestId,
        title: impl Into<String>,
        target: TargetId,
        required_amount: u32,
        registry: &R,
    ) -> Self {
        let name = registry
            .item_name(&target)
            .unwrap_or_else(|| UNKNOWN_ITEM.to_string());
        Self {
            id,
            title: title.into(),
            description: describe("Collect", required_amount, &name),
            target,
            required_amount,
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

    /// "Collect N Name(s)".
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Item type to collect.
    #[must_use]
    pub fn target(&self) -> &TargetId {
        &self.target
    }

    /// Items needed.
    #[must_use]
    pub fn required_amount(&self) -> u32 {
        self.required_amount
    }

    /// Live count of the target item in `player`'s inventory.
    pub fn progress<H: Inventory + ?Sized>(&self, player: PlayerId, host: &H) -> u32 {
        host.count_held(player, &self.target)
    }

    /// Completion state for `player`.
    #[must_use]
    pub fn completion_state(&self, player: PlayerId) -> CompletionState {
        self.state.get(&player).copied().unwrap_or_default()
    }

    /// Recount the inventory and set `Completed` if it meets the requirement.
    pub fn check_completion<H: Inventory + ?Sized>(&mut self, player: PlayerId, host: &H) -> bool {
        let held = self.progress(player, host);
        if held >= self.required_amount {
            debug!(quest = %self.id, %player, held, "collection requirement met");
            self.advance(player, CompletionState::Completed);
        }
        self.completion_state(player).is_completed()
    }

    /// Grant the token reward once and consume the collected items.
    ///
    /// The token is dropped at the player's feet when it does not fit in the
    /// inventory.
    pub fn reward<H: Rewards + Notifier + ?Sized>(
        &mut self,
        player: PlayerId,
        host: &mut H,
        rewards: &RewardConfig,
    ) -> bool {
        if self.completion_state(player) == CompletionState::Rewarded {
            return false;
        }
        self.advance(player, CompletionState::Rewarded);

        let token = TargetId::new(rewards.token_item.clone());
        if !host.grant_item(player, &token, rewards.token_count) {
            debug!(%player, "inventory full, dropping quest token");
            host.drop_at_feet(
                player,
                ItemStack {
                    item: token,
                    count: rewards.token_count,
                },
            );
        }
        host.consume_items(player, &self.target, self.required_amount);
        host.send_message(
            player,
            StyledText::tagged("Received quest reward: ", Color::GREEN, "Quest Token", Color::GOLD),
        );
        true
    }

    /// Restore a player's saved state.
    pub fn restore(&mut self, player: PlayerId, state: CompletionState) {
        self.advance(player, state);
    }

    fn advance(&mut self, player: PlayerId, to: CompletionState) {
        let state = self.state.entry(player).or_default();
        *state = state.advance(to);
    }
}
