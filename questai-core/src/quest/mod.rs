//! Quests: per-player progress tracking, completion and reward issuance.
//!
//! Two variants with deliberately different progress models:
//!
//! - [`KillQuest`] counts matching kill events per player. The counter only
//!   grows and freezes once the quest is completed.
//! - [`CollectionQuest`] stores nothing. Progress is recounted from the
//!   player's inventory on every read, so it can go down again.
//!
//! Both share the sticky per-player [`CompletionState`].

pub mod collection;
pub mod kill;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RewardConfig;
use crate::host::{Inventory, Notifier, Registry, Rewards};
use crate::persistence::SavedQuest;
use crate::types::{PlayerId, QuestId, TargetId};

pub use collection::CollectionQuest;
pub use kill::KillQuest;

/// Per-player completion progression. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    /// Requirement not yet met.
    #[default]
    Active,
    /// Requirement met, reward not yet issued.
    Completed,
    /// Reward issued.
    Rewarded,
}

impl CompletionState {
    /// `Completed` or `Rewarded`.
    #[must_use]
    pub fn is_completed(self) -> bool {
        self != Self::Active
    }

    /// Return the later of the two states.
    #[must_use]
    pub fn advance(self, to: Self) -> Self {
        self.max(to)
    }
}

/// Which variant a quest is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    /// Defeat a number of entities of one type.
    Kill,
    /// Hold a number of items of one type.
    Collection,
}

impl QuestKind {
    /// The other variant. Completed quests are replaced by the opposite kind.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Kill => Self::Collection,
            Self::Collection => Self::Kill,
        }
    }

    /// Token used in generated quest ids.
    #[must_use]
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Kill => "kill",
            Self::Collection => "collect",
        }
    }
}

impl fmt::Display for QuestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kill => "kill",
            Self::Collection => "collection",
        })
    }
}

/// A quest of either variant.
#[derive(Debug, Clone)]
pub enum Quest {
    /// See [`KillQuest`].
    Kill(KillQuest),
    /// See [`CollectionQuest`].
    Collection(CollectionQuest),
}

impl Quest {
    /// Build a quest of `kind`, deriving its description from the registry.
    pub fn new<R: Registry + ?Sized>(
        kind: QuestKind,
        id: QuestId,
        title: impl Into<String>,
        target: TargetId,
        required_amount: u32,
        registry: &R,
    ) -> Self {
        match kind {
            QuestKind::Kill => Self::Kill(KillQuest::new(id, title, target, required_amount, registry)),
            QuestKind::Collection => {
                Self::Collection(CollectionQuest::new(id, title, target, required_amount, registry))
            }
        }
    }

    /// Globally unique id.
    #[must_use]
    pub fn id(&self) -> &QuestId {
        match self {
            Self::Kill(q) => q.id(),
            Self::Collection(q) => q.id(),
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Kill(q) => q.title(),
            Self::Collection(q) => q.title(),
        }
    }

    /// Description fixed at construction.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Kill(q) => q.description(),
            Self::Collection(q) => q.description(),
        }
    }

    /// Entity or item type this quest is about.
    #[must_use]
    pub fn target(&self) -> &TargetId {
        match self {
            Self::Kill(q) => q.target(),
            Self::Collection(q) => q.target(),
        }
    }

    /// Amount needed to complete.
    #[must_use]
    pub fn required_amount(&self) -> u32 {
        match self {
            Self::Kill(q) => q.required_amount(),
            Self::Collection(q) => q.required_amount(),
        }
    }

    /// Variant tag.
    #[must_use]
    pub fn kind(&self) -> QuestKind {
        match self {
            Self::Kill(_) => QuestKind::Kill,
            Self::Collection(_) => QuestKind::Collection,
        }
    }

    /// Current progress for `player`: the stored counter for kill quests,
    /// a live inventory count for collection quests.
    pub fn progress<H: Inventory + ?Sized>(&self, player: PlayerId, host: &H) -> u32 {
        match self {
            Self::Kill(q) => q.progress(player),
            Self::Collection(q) => q.progress(player, host),
        }
    }

    /// Completion state for `player`.
    #[must_use]
    pub fn completion_state(&self, player: PlayerId) -> CompletionState {
        match self {
            Self::Kill(q) => q.completion_state(player),
            Self::Collection(q) => q.completion_state(player),
        }
    }

    /// Whether `player` has completed this quest. Pure read of the sticky
    /// state; see [`check_completion`](Self::check_completion).
    #[must_use]
    pub fn is_completed(&self, player: PlayerId) -> bool {
        self.completion_state(player).is_completed()
    }

    /// Whether `player` has already been rewarded.
    #[must_use]
    pub fn is_rewarded(&self, player: PlayerId) -> bool {
        self.completion_state(player) == CompletionState::Rewarded
    }

    /// Mark the quest completed for `player` if the requirement is met and
    /// return the resulting completion.
    pub fn check_completion<H: Inventory + ?Sized>(&mut self, player: PlayerId, host: &H) -> bool {
        match self {
            Self::Kill(q) => q.check_completion(player),
            Self::Collection(q) => q.check_completion(player, host),
        }
    }

    /// Not yet rewarded, and either flagged completed or at the requirement.
    pub fn is_ready<H: Inventory + ?Sized>(&self, player: PlayerId, host: &H) -> bool {
        !self.is_rewarded(player)
            && (self.is_completed(player) || self.progress(player, host) >= self.required_amount())
    }

    /// Issue the reward once. Returns `true` if anything was granted.
    pub fn reward<H: Inventory + Rewards + Notifier + ?Sized>(
        &mut self,
        player: PlayerId,
        host: &mut H,
        rewards: &RewardConfig,
    ) -> bool {
        match self {
            Self::Kill(q) => q.reward(player, host, rewards),
            Self::Collection(q) => q.reward(player, host, rewards),
        }
    }

    /// Feed an observed kill. No-op for collection quests. Returns `true`
    /// if the event counted.
    pub fn on_progress_event<H: Notifier + ?Sized>(
        &mut self,
        player: PlayerId,
        observed: &TargetId,
        host: &mut H,
    ) -> bool {
        match self {
            Self::Kill(q) => q.on_entity_killed(player, observed, host),
            Self::Collection(_) => false,
        }
    }

    /// Snapshot this quest as seen by `player`.
    #[must_use]
    pub fn to_saved(&self, player: PlayerId) -> SavedQuest {
        SavedQuest {
            id: self.id().clone(),
            kind: self.kind(),
            title: self.title().to_string(),
            target: self.target().clone(),
            required_amount: self.required_amount(),
            progress: match self {
                Self::Kill(q) => q.progress(player),
                Self::Collection(_) => 0,
            },
            state: self.completion_state(player),
        }
    }

    /// Rebuild a quest from a snapshot, restoring `player`'s state.
    pub fn from_saved<R: Registry + ?Sized>(saved: &SavedQuest, player: PlayerId, registry: &R) -> Self {
        let mut quest = Self::new(
            saved.kind,
            saved.id.clone(),
            saved.title.clone(),
            saved.target.clone(),
            saved.required_amount.max(1),
            registry,
        );
        match &mut quest {
            Self::Kill(q) => q.restore(player, saved.progress, saved.state),
            Self::Collection(q) => q.restore(player, saved.state),
        }
        quest
    }
}

impl fmt::Display for Quest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title(), self.id())
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// "Kill 3 Zombie(s)" / "Collect 10 Dirt(s)".
pub(crate) fn describe(verb: &str, amount: u32, name: &str) -> String {
    format!("{verb} {amount} {name}(s)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;

    fn zombie_quest(host: &HeadlessHost) -> Quest {
        Quest::new(
            QuestKind::Kill,
            QuestId::from("kill_zombie_test"),
            "Kill Zombie",
            TargetId::from("minecraft:zombie"),
            3,
            host,
        )
    }

    #[test]
    fn completion_state_only_advances() {
        let s = CompletionState::Rewarded;
        assert_eq!(s.advance(CompletionState::Completed), CompletionState::Rewarded);
        assert_eq!(
            CompletionState::Active.advance(CompletionState::Completed),
            CompletionState::Completed
        );
        assert!(!CompletionState::Active.is_completed());
        assert!(CompletionState::Rewarded.is_completed());
    }

    #[test]
    fn opposite_kind() {
        assert_eq!(QuestKind::Kill.opposite(), QuestKind::Collection);
        assert_eq!(QuestKind::Collection.opposite(), QuestKind::Kill);
    }

    #[test]
    fn is_ready_excludes_rewarded() {
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        let zombie = TargetId::from("minecraft:zombie");
        let mut quest = zombie_quest(&host);

        assert!(!quest.is_ready(player, &host));
        for _ in 0..3 {
            quest.on_progress_event(player, &zombie, &mut host);
        }
        assert!(quest.is_ready(player, &host));
        assert!(quest.reward(player, &mut host, &RewardConfig::default()));
        assert!(!quest.is_ready(player, &host));
        assert!(quest.is_completed(player));
    }

    #[test]
    fn saved_round_trip_keeps_player_state() {
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        let zombie = TargetId::from("minecraft:zombie");
        let mut quest = zombie_quest(&host);
        quest.on_progress_event(player, &zombie, &mut host);
        quest.on_progress_event(player, &zombie, &mut host);

        let saved = quest.to_saved(player);
        let restored = Quest::from_saved(&saved, player, &host);
        assert_eq!(restored.kind(), QuestKind::Kill);
        assert_eq!(restored.progress(player, &host), 2);
        assert_eq!(restored.description(), "Kill 3 Zombie(s)");
        assert_eq!(restored.completion_state(player), CompletionState::Active);
    }
}
