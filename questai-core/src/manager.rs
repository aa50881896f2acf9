//! Per-player quest sets and the completion → reward → replacement loop.
//!
//! [`QuestManager`] owns every player's active quests, their difficulty
//! tuning, the shared generator and the shared Q-learning agent. It never
//! touches the game directly; all effects go through a [`QuestHost`].
//!
//! The central operation is [`QuestManager::sweep`]:
//!
//! 1. A player with no quests gets the two defaults and the sweep stops.
//! 2. Quests are split into completed (already rewarded, or ready now) and
//!    remaining. Ready quests are rewarded on the spot.
//! 3. Every completed quest is replaced by a follow-up of the opposite kind,
//!    chosen through the agent, and the agent is updated with the shaped
//!    reward.
//! 4. The active list becomes `remaining + replacements`.
//!
//! Under [`RegenerationPolicy::CooldownGated`] step 3 is postponed until the
//! cooldown since the last regeneration has elapsed.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::{QuestConfig, RegenerationPolicy};
use crate::error::Result;
use crate::generator::{DifficultyTuning, QuestGenerator};
use crate::host::{Notifier, PlayerStats, QuestHost, Registry};
use crate::learning::{GameState, QLearning, QuestAction, shape_reward};
use crate::message::{Color, StyledText};
use crate::persistence::{PlayerQuestData, QuestStore};
use crate::quest::{Quest, QuestKind};
use crate::types::{PlayerId, QuestId, TargetId, Timestamp};

// ---------------------------------------------------------------------------
// Records and reports
// ---------------------------------------------------------------------------

/// Everything the manager tracks for one player.
#[derive(Debug, Clone, Default)]
pub struct PlayerRecord {
    /// Active quests, in display order.
    pub quests: Vec<Quest>,
    /// When quests were last regenerated. `EPOCH` means never.
    pub last_generation: Timestamp,
    /// Last RL state observed for this player.
    pub game_state: Option<GameState>,
    /// Difficulty knobs.
    pub tuning: DifficultyTuning,
    /// Lifetime completions.
    pub quests_completed: u32,
}

/// What a sweep did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// The player had no quests and received the defaults.
    pub initialized: bool,
    /// Quests rewarded during this sweep.
    pub rewarded: Vec<QuestId>,
    /// `(completed, replacement)` pairs.
    pub replaced: Vec<(QuestId, QuestId)>,
    /// Agent actions taken, one per replacement.
    pub actions: Vec<QuestAction>,
    /// Replacement was postponed by the cooldown.
    pub deferred: bool,
}

impl SweepReport {
    /// Whether the sweep changed anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.initialized && self.rewarded.is_empty() && self.replaced.is_empty()
    }
}

/// How [`QuestManager::load_player`] obtained the player's quests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rebuilt from full saved quests.
    Restored(usize),
    /// Rebuilt from quest ids, via lookup or heuristic reconstruction.
    Reconstructed(usize),
    /// Nothing usable was stored; default quests were assigned.
    Initialized,
    /// Nothing usable was stored; the player's live quests were kept.
    Kept(usize),
}

// ---------------------------------------------------------------------------
// QuestManager
// ---------------------------------------------------------------------------

/// Owner of all per-player quest state.
#[derive(Debug)]
pub struct QuestManager {
    config: QuestConfig,
    generator: QuestGenerator,
    agent: QLearning,
    global_quests: Vec<Quest>,
    players: HashMap<PlayerId, PlayerRecord>,
}

impl QuestManager {
    /// Create a manager with its own generator and agent.
    #[must_use]
    pub fn new(config: QuestConfig) -> Self {
        let generator = QuestGenerator::new(config.generator.clone());
        let agent = QLearning::new(&config.learning);
        Self {
            config,
            generator,
            agent,
            global_quests: Vec::new(),
            players: HashMap::new(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &QuestConfig {
        &self.config
    }

    /// The shared agent.
    #[must_use]
    pub fn agent(&self) -> &QLearning {
        &self.agent
    }

    /// Mutable access to the generator, for scenario setup.
    pub fn generator_mut(&mut self) -> &mut QuestGenerator {
        &mut self.generator
    }

    /// Record for `player`, if tracked.
    #[must_use]
    pub fn record(&self, player: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&player)
    }

    /// Active quests of `player` (empty if untracked).
    #[must_use]
    pub fn quests_for(&self, player: PlayerId) -> &[Quest] {
        self.players.get(&player).map_or(&[], |r| r.quests.as_slice())
    }

    /// Whether `player` has at least one active quest.
    #[must_use]
    pub fn has_quests(&self, player: PlayerId) -> bool {
        !self.quests_for(player).is_empty()
    }

    /// Difficulty tuning of `player` (default if untracked).
    #[must_use]
    pub fn tuning(&self, player: PlayerId) -> DifficultyTuning {
        self.players
            .get(&player)
            .map_or_else(|| self.initial_tuning(), |r| r.tuning)
    }

    /// Number of tracked players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Players with runtime state, in no particular order.
    pub fn tracked_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.keys().copied()
    }

    /// Forget `player`'s runtime state. Returns `true` if it was tracked.
    pub fn unload_player(&mut self, player: PlayerId) -> bool {
        self.players.remove(&player).is_some()
    }

    fn initial_tuning(&self) -> DifficultyTuning {
        DifficultyTuning::at_level(self.config.quests.initial_difficulty)
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    /// Give `player` one kill and one collection quest if they have none.
    ///
    /// Returns `true` if quests were assigned.
    pub fn initialize_player<H: QuestHost + ?Sized>(
        &mut self,
        player: PlayerId,
        host: &H,
        now: Timestamp,
    ) -> bool {
        if self.has_quests(player) {
            return false;
        }
        let tuning = self.initial_tuning();
        let record = self.players.entry(player).or_insert_with(|| PlayerRecord {
            tuning,
            ..PlayerRecord::default()
        });

        record.quests = self.generator.generate_defaults(&record.tuning, host);
        record.last_generation = Timestamp::EPOCH;
        record.game_state = Some(GameState::new(
            0,
            0,
            record.quests_completed,
            host.health(player),
            record.tuning.level,
        ));

        for quest in &record.quests {
            info!(%player, quest = %quest, "assigned default quest");
        }
        debug!(%player, at = now.0, "player initialized");
        true
    }

    /// Replace `player`'s active quests with `quests`, truncated to the
    /// configured maximum.
    pub fn assign_quests(&mut self, player: PlayerId, mut quests: Vec<Quest>) {
        let max = self.config.quests.max_active_per_player;
        if quests.len() > max {
            warn!(%player, given = quests.len(), max, "too many quests, truncating");
            quests.truncate(max);
        }
        let tuning = self.initial_tuning();
        let record = self.players.entry(player).or_insert_with(|| PlayerRecord {
            tuning,
            ..PlayerRecord::default()
        });
        record.quests = quests;
    }

    /// Add a quest to the shared pool. Returns `false` once the pool is full.
    pub fn register_quest(&mut self, quest: Quest) -> bool {
        if self.global_quests.len() >= self.config.quests.max_global_quests {
            debug!(quest = %quest, "global pool full");
            return false;
        }
        info!(quest = %quest, "quest registered");
        self.global_quests.push(quest);
        true
    }

    /// Quests in the shared pool.
    #[must_use]
    pub fn global_quests(&self) -> &[Quest] {
        &self.global_quests
    }

    /// Look a quest up by id: shared pool first, then every player's set.
    #[must_use]
    pub fn find_quest_by_id(&self, id: &QuestId) -> Option<&Quest> {
        self.global_quests
            .iter()
            .chain(self.players.values().flat_map(|r| r.quests.iter()))
            .find(|q| q.id() == id)
    }

    // ------------------------------------------------------------------
    // Progress and failure
    // ------------------------------------------------------------------

    /// Route a kill by `player` to each of their kill quests. Returns how
    /// many quests counted it.
    pub fn on_entity_killed<H: Notifier + ?Sized>(
        &mut self,
        player: PlayerId,
        target: &TargetId,
        host: &mut H,
    ) -> usize {
        let Some(record) = self.players.get_mut(&player) else {
            return 0;
        };
        let mut counted = 0;
        for quest in &mut record.quests {
            if quest.on_progress_event(player, target, host) {
                counted += 1;
            }
        }
        counted
    }

    /// Count a failure (death, abandoned quest) towards auto-difficulty.
    /// Returns `true` if the level was lowered.
    pub fn record_failure(&mut self, player: PlayerId) -> bool {
        let tuning = self.initial_tuning();
        let record = self.players.entry(player).or_insert_with(|| PlayerRecord {
            tuning,
            ..PlayerRecord::default()
        });
        let lowered = record.tuning.record_failure();
        if lowered {
            info!(%player, level = record.tuning.level, "failures lowered difficulty");
            if let Some(state) = record.game_state.as_mut() {
                *state = state.with_difficulty(record.tuning.level);
            }
        }
        lowered
    }

    /// Drop quest `id` and replace it with a fresh quest of the same kind.
    ///
    /// Counts as a failure. Returns the replacement's id, or `None` if the
    /// player has no such quest or has already completed it.
    pub fn abandon_quest<H: QuestHost + ?Sized>(
        &mut self,
        player: PlayerId,
        id: &QuestId,
        host: &mut H,
    ) -> Option<QuestId> {
        let index = self.quests_for(player).iter().position(|q| q.id() == id)?;
        if self.quests_for(player)[index].is_completed(player) {
            debug!(%player, %id, "completed quest cannot be abandoned");
            return None;
        }
        self.record_failure(player);

        let record = self.players.get_mut(&player)?;
        let abandoned = record.quests.remove(index);
        let replacement = self.generator.generate_quest(
            abandoned.kind(),
            record.tuning.factor(),
            &record.tuning,
            &*host,
        );
        let new_id = replacement.id().clone();
        info!(%player, abandoned = %abandoned, replacement = %replacement, "quest abandoned");

        host.send_message(
            player,
            StyledText::tagged("[Quest System] ", Color::GOLD, "Quest abandoned: ", Color::GRAY)
                .push(abandoned.title(), Color::WHITE),
        );
        announce_new_quest(host, player, &replacement);
        record.quests.push(replacement);
        Some(new_id)
    }

    // ------------------------------------------------------------------
    // RL state
    // ------------------------------------------------------------------

    /// Current RL state for `player`, built from host stats when missing.
    pub fn game_state<H: PlayerStats + ?Sized>(&mut self, player: PlayerId, host: &H) -> GameState {
        let tuning = self.initial_tuning();
        let record = self.players.entry(player).or_insert_with(|| PlayerRecord {
            tuning,
            ..PlayerRecord::default()
        });
        let (completed, level) = (record.quests_completed, record.tuning.level);
        *record.game_state.get_or_insert_with(|| {
            GameState::new(
                host.mobs_killed(player),
                host.items_collected(player),
                completed,
                host.health(player),
                level,
            )
        })
    }

    // ------------------------------------------------------------------
    // Sweep
    // ------------------------------------------------------------------

    /// Reward completed quests and replace them. See the module docs.
    pub fn sweep<H: QuestHost + ?Sized>(
        &mut self,
        player: PlayerId,
        host: &mut H,
        now: Timestamp,
    ) -> SweepReport {
        let mut report = SweepReport::default();
        if !self.has_quests(player) {
            info!(%player, "no quests, initializing");
            report.initialized = self.initialize_player(player, &*host, now);
            return report;
        }

        let rewards = self.config.rewards.clone();
        let Some(record) = self.players.get_mut(&player) else {
            return report;
        };

        let mut completed = Vec::new();
        let mut remaining = Vec::new();
        for mut quest in std::mem::take(&mut record.quests) {
            let progress = quest.progress(player, &*host);
            debug!(
                %player,
                quest = %quest,
                progress,
                required = quest.required_amount(),
                state = ?quest.completion_state(player),
                "quest check"
            );
            if quest.is_rewarded(player) {
                completed.push(quest);
            } else if quest.is_ready(player, &*host) {
                quest.check_completion(player, &*host);
                quest.reward(player, host, &rewards);
                record.quests_completed += 1;
                if let Some(state) = record.game_state.as_mut() {
                    *state = state.with_quests_completed(record.quests_completed);
                }
                info!(%player, quest = %quest, total = record.quests_completed, "quest completed");
                host.send_message(
                    player,
                    StyledText::tagged("[Quest Completed] ", Color::GREEN, quest.title(), Color::WHITE),
                );
                report.rewarded.push(quest.id().clone());
                completed.push(quest);
            } else {
                remaining.push(quest);
            }
        }

        if completed.is_empty() {
            debug!(%player, "no completed quests");
            record.quests = remaining;
            return report;
        }

        if self.config.regeneration.policy == RegenerationPolicy::CooldownGated {
            let elapsed = now.millis_since(record.last_generation);
            let cooldown = self.config.regeneration.cooldown_ms;
            debug!(%player, elapsed, cooldown, "cooldown check");
            if elapsed < cooldown {
                let wait_secs = (cooldown - elapsed).div_ceil(1000);
                host.send_message(
                    player,
                    StyledText::tagged(
                        "[Quest System] ",
                        Color::GOLD,
                        format!("New quests will be available in {wait_secs} seconds."),
                        Color::GRAY,
                    ),
                );
                remaining.extend(completed);
                record.quests = remaining;
                report.deferred = true;
                return report;
            }
        }

        info!(%player, count = completed.len(), "replacing completed quests");
        for quest in &completed {
            let state = GameState::new(
                host.mobs_killed(player),
                host.items_collected(player),
                record.quests_completed,
                host.health(player),
                record.tuning.level,
            );
            let follow = self.generator.generate_follow_up(
                quest,
                &state,
                &mut self.agent,
                &mut record.tuning,
                &*host,
            );
            let reward = shape_reward(&state, follow.action);
            let next = state.with_difficulty(record.tuning.level);
            self.agent.update(&state, follow.action, reward, &next);
            record.game_state = Some(next);

            let (text, color) = if follow.action.is_increase() {
                ("The quests are getting more challenging!", Color::YELLOW)
            } else {
                ("The quests are becoming more manageable.", Color::GRAY)
            };
            host.send_message(
                player,
                StyledText::tagged("[Quest System] ", Color::GOLD, text, color),
            );
            announce_new_quest(host, player, &follow.quest);

            report.replaced.push((quest.id().clone(), follow.quest.id().clone()));
            report.actions.push(follow.action);
            remaining.push(follow.quest);
        }

        record.quests = remaining;
        record.last_generation = now;
        info!(%player, active = record.quests.len(), "quest list updated");

        let info_text = system_info_text(Some(record));
        host.send_message(player, info_text);
        report
    }

    /// "[Quest System] Current Difficulty: N, Quests Completed: M".
    #[must_use]
    pub fn system_info(&self, player: PlayerId) -> StyledText {
        system_info_text(self.players.get(&player))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Snapshot of `player`'s state, `None` if untracked.
    #[must_use]
    pub fn snapshot(&self, player: PlayerId) -> Option<PlayerQuestData> {
        let record = self.players.get(&player)?;
        Some(PlayerQuestData {
            quest_ids: record.quests.iter().map(|q| q.id().clone()).collect(),
            quests_completed: record.quests_completed,
            last_generation: record.last_generation,
            difficulty_level: record.tuning.level,
            quests: record.quests.iter().map(|q| q.to_saved(player)).collect(),
            tuning: Some(record.tuning),
        })
    }

    /// Write `player`'s snapshot to `store`. Untracked players are a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub fn save_player<S: QuestStore + ?Sized>(&self, player: PlayerId, store: &mut S) -> Result<()> {
        let Some(data) = self.snapshot(player) else {
            debug!(%player, "nothing to save");
            return Ok(());
        };
        store.save(player, &data)?;
        info!(%player, quests = data.quest_ids.len(), "saved quest data");
        Ok(())
    }

    /// Restore `player` from `store`.
    ///
    /// Never fails: store errors and empty snapshots keep the player's live
    /// quests, or assign the defaults if there are none. Saved quests are
    /// preferred; otherwise each id is resolved through
    /// [`find_quest_by_id`](Self::find_quest_by_id) and, failing that,
    /// rebuilt from the id's kind token. At most `max_active_per_player`
    /// quests are restored.
    pub fn load_player<S, H>(
        &mut self,
        player: PlayerId,
        store: &mut S,
        host: &H,
        now: Timestamp,
    ) -> LoadOutcome
    where
        S: QuestStore + ?Sized,
        H: QuestHost + ?Sized,
    {
        let data = match store.load(player) {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(%player, "no saved quest data");
                return self.reinitialize(player, host, now);
            }
            Err(e) => {
                warn!(%player, error = %e, "failed to load quest data");
                return self.reinitialize(player, host, now);
            }
        };

        let max = self.config.quests.max_active_per_player;
        let stored = data.quests.len().max(data.quest_ids.len());
        if stored > max {
            warn!(%player, stored, max, "too many saved quests, truncating");
        }
        let (quests, outcome) = if data.quests.is_empty() {
            let quests: Vec<Quest> = data
                .quest_ids
                .iter()
                .take(max)
                .map(|id| self.resolve_quest(id, host))
                .collect();
            let n = quests.len();
            (quests, LoadOutcome::Reconstructed(n))
        } else {
            let quests: Vec<Quest> = data
                .quests
                .iter()
                .take(max)
                .map(|saved| Quest::from_saved(saved, player, host))
                .collect();
            let n = quests.len();
            (quests, LoadOutcome::Restored(n))
        };

        if quests.is_empty() {
            return self.reinitialize(player, host, now);
        }

        let tuning = data.resume_tuning();
        let record = PlayerRecord {
            quests,
            last_generation: data.last_generation,
            game_state: Some(GameState::new(
                0,
                0,
                data.quests_completed,
                host.health(player),
                tuning.level,
            )),
            tuning,
            quests_completed: data.quests_completed,
        };
        info!(%player, quests = record.quests.len(), ?outcome, "loaded quest data");
        self.players.insert(player, record);
        outcome
    }

    fn reinitialize<H: QuestHost + ?Sized>(
        &mut self,
        player: PlayerId,
        host: &H,
        now: Timestamp,
    ) -> LoadOutcome {
        let live = self.quests_for(player).len();
        if live > 0 {
            debug!(%player, quests = live, "keeping live quests");
            return LoadOutcome::Kept(live);
        }
        self.initialize_player(player, host, now);
        LoadOutcome::Initialized
    }

    /// Known quest with this id, or a new quest of the kind the id suggests.
    fn resolve_quest<R: Registry + ?Sized>(&mut self, id: &QuestId, registry: &R) -> Quest {
        if let Some(found) = self.find_quest_by_id(id) {
            return found.clone();
        }
        let kind = kind_from_id(id);
        warn!(%id, %kind, "unknown quest id, generating replacement");
        let tuning = DifficultyTuning::default();
        self.generator.generate_quest(kind, tuning.factor(), &tuning, registry)
    }

    /// Persist the agent's table.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub fn save_agent<S: QuestStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let entries = self.agent.export();
        store.save_agent(&entries)?;
        info!(entries = entries.len(), "saved agent table");
        Ok(())
    }

    /// Restore the agent's table. Returns `true` if a table was found.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub fn load_agent<S: QuestStore + ?Sized>(&mut self, store: &mut S) -> Result<bool> {
        match store.load_agent()? {
            Some(entries) => {
                self.agent.restore(&entries);
                info!(entries = entries.len(), "restored agent table");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Guess a quest's kind from its id: `kill` or `enemy` means a kill quest.
#[must_use]
pub fn kind_from_id(id: &QuestId) -> QuestKind {
    let id = id.as_str();
    if id.contains("kill") || id.contains("enemy") {
        QuestKind::Kill
    } else {
        QuestKind::Collection
    }
}

fn announce_new_quest<H: Notifier + ?Sized>(host: &mut H, player: PlayerId, quest: &Quest) {
    host.send_message(
        player,
        StyledText::tagged("[New Quest] ", Color::GREEN, quest.title(), Color::WHITE),
    );
    host.send_message(player, StyledText::plain(quest.description(), Color::GRAY));
}

fn system_info_text(record: Option<&PlayerRecord>) -> StyledText {
    match record {
        Some(r) => StyledText::tagged(
            "[Quest System] ",
            Color::GOLD,
            format!(
                "Current Difficulty: {}, Quests Completed: {}",
                r.tuning.level, r.quests_completed
            ),
            Color::WHITE,
        ),
        None => StyledText::tagged(
            "[Quest System] ",
            Color::GOLD,
            "No quest data available.",
            Color::WHITE,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::persistence::MemoryQuestStore;

    fn manager() -> QuestManager {
        let mut config = QuestConfig::default();
        config.generator.seed = Some(7);
        config.learning.seed = Some(7);
        QuestManager::new(config)
    }

    fn zombie(host: &HeadlessHost, required: u32) -> Quest {
        Quest::new(
            QuestKind::Kill,
            QuestId::from("kill_zombie_fixed"),
            "Kill Zombie",
            TargetId::from("minecraft:zombie"),
            required,
            host,
        )
    }

    #[test]
    fn empty_player_gets_two_defaults() {
        let mut m = manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let p = PlayerId::new();
        let report = m.sweep(p, &mut host, Timestamp(1_000));
        assert!(report.initialized);
        let kinds: Vec<QuestKind> = m.quests_for(p).iter().map(Quest::kind).collect();
        assert_eq!(kinds, vec![QuestKind::Kill, QuestKind::Collection]);
        assert_eq!(m.tuning(p).level, 1);
    }

    #[test]
    fn sweep_without_completions_is_noop() {
        let mut m = manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let p = PlayerId::new();
        m.assign_quests(p, vec![zombie(&host, 3)]);
        let report = m.sweep(p, &mut host, Timestamp(1_000));
        assert!(report.is_noop());
        assert_eq!(m.quests_for(p).len(), 1);
        assert!(host.messages_for(p).is_empty());
    }

    #[test]
    fn completed_kill_is_replaced_by_collection() {
        let mut m = manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let p = PlayerId::new();
        let target = TargetId::from("minecraft:zombie");
        m.assign_quests(p, vec![zombie(&host, 2)]);
        m.on_entity_killed(p, &target, &mut host);
        m.on_entity_killed(p, &target, &mut host);

        let report = m.sweep(p, &mut host, Timestamp(10_000));
        assert_eq!(report.rewarded.len(), 1);
        assert_eq!(report.replaced.len(), 1);
        assert_eq!(m.quests_for(p).len(), 1);
        assert_eq!(m.quests_for(p)[0].kind(), QuestKind::Collection);
        assert_eq!(host.experience_of(p), 50);
        assert_eq!(m.record(p).map(|r| r.quests_completed), Some(1));
        assert_eq!(m.record(p).map(|r| r.last_generation), Some(Timestamp(10_000)));
        assert_eq!(m.agent().entry_count(), 1);

        let messages = host.messages_for(p);
        assert!(messages.iter().any(|t| t == "[Quest Completed] Kill Zombie"));
        assert!(messages.iter().any(|t| t.starts_with("[New Quest] Collect ")));
        let expected = format!(
            "[Quest System] Current Difficulty: {}, Quests Completed: 1",
            m.tuning(p).level
        );
        assert_eq!(messages.last(), Some(&expected));
    }

    #[test]
    fn cooldown_gate_defers_replacement() {
        let mut config = QuestConfig::default();
        config.regeneration.policy = RegenerationPolicy::CooldownGated;
        config.generator.seed = Some(3);
        config.learning.seed = Some(3);
        let mut m = QuestManager::new(config);
        let mut host = HeadlessHost::with_vanilla_names();
        let p = PlayerId::new();
        let target = TargetId::from("minecraft:zombie");

        // First regeneration happened at t = 10s.
        m.assign_quests(p, vec![zombie(&host, 1)]);
        m.on_entity_killed(p, &target, &mut host);
        let first = m.sweep(p, &mut host, Timestamp(10_000));
        assert_eq!(first.replaced.len(), 1);

        let replacement = m.quests_for(p)[0].clone();
        let second_quest = Quest::new(
            QuestKind::Kill,
            QuestId::from("kill_zombie_second"),
            "Kill Zombie",
            target.clone(),
            1,
            &host,
        );
        m.assign_quests(p, vec![replacement, second_quest]);
        m.on_entity_killed(p, &target, &mut host);

        let gated = m.sweep(p, &mut host, Timestamp(12_000));
        assert!(gated.deferred);
        assert_eq!(gated.rewarded.len(), 1);
        assert!(gated.replaced.is_empty());
        assert_eq!(m.quests_for(p).len(), 2);
        assert!(
            host.messages_for(p)
                .iter()
                .any(|t| t == "[Quest System] New quests will be available in 3 seconds.")
        );

        // Rewarded but still present; the next sweep after the cooldown
        // replaces it without paying out again.
        let xp_before = host.experience_of(p);
        let later = m.sweep(p, &mut host, Timestamp(15_000));
        assert!(later.rewarded.is_empty());
        assert_eq!(later.replaced.len(), 1);
        assert_eq!(host.experience_of(p), xp_before);
    }

    #[test]
    fn abandon_replaces_with_same_kind() {
        let mut m = manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let p = PlayerId::new();
        m.assign_quests(p, vec![zombie(&host, 3)]);
        let new_id = m
            .abandon_quest(p, &QuestId::from("kill_zombie_fixed"), &mut host)
            .expect("abandoned");
        assert_eq!(m.quests_for(p).len(), 1);
        assert_eq!(m.quests_for(p)[0].id(), &new_id);
        assert_eq!(m.quests_for(p)[0].kind(), QuestKind::Kill);
        assert_eq!(m.tuning(p).consecutive_failures, 1);
        assert!(m.abandon_quest(p, &QuestId::from("missing"), &mut host).is_none());
    }

    #[test]
    fn two_failures_lower_level() {
        let mut m = manager();
        let p = PlayerId::new();
        m.assign_quests(p, Vec::new());
        if let Some(record) = m.players.get_mut(&p) {
            record.tuning.level = 3;
        }
        assert!(!m.record_failure(p));
        assert!(m.record_failure(p));
        assert_eq!(m.tuning(p).level, 2);
    }

    #[test]
    fn global_pool_is_bounded() {
        let mut m = manager();
        let host = HeadlessHost::with_vanilla_names();
        for i in 0..12 {
            let q = Quest::new(
                QuestKind::Collection,
                QuestId(format!("collect_dirt_{i}")),
                "Collect Dirt",
                TargetId::from("minecraft:dirt"),
                5,
                &host,
            );
            let accepted = m.register_quest(q);
            assert_eq!(accepted, i < 10);
        }
        assert_eq!(m.global_quests().len(), 10);
        assert!(m.find_quest_by_id(&QuestId::from("collect_dirt_3")).is_some());
    }

    #[test]
    fn system_info_for_unknown_player() {
        let m = manager();
        assert_eq!(
            m.system_info(PlayerId::new()).plain_text(),
            "[Quest System] No quest data available."
        );
    }

    #[test]
    fn game_state_is_built_lazily() {
        let mut m = manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let p = PlayerId::new();
        host.set_health(p, 12);
        host.record_kill(p);
        let state = m.game_state(p, &host);
        assert_eq!(state, GameState::new(1, 0, 0, 12, 1));
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut m = manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let mut store = MemoryQuestStore::new();
        let p = PlayerId::new();
        let target = TargetId::from("minecraft:zombie");
        m.assign_quests(p, vec![zombie(&host, 5)]);
        m.on_entity_killed(p, &target, &mut host);
        m.on_entity_killed(p, &target, &mut host);
        m.save_player(p, &mut store).expect("save");

        let mut fresh = manager();
        let outcome = fresh.load_player(p, &mut store, &host, Timestamp(0));
        assert_eq!(outcome, LoadOutcome::Restored(1));
        assert_eq!(fresh.quests_for(p)[0].progress(p, &host), 2);
    }

    #[test]
    fn missing_save_initializes() {
        let mut m = manager();
        let host = HeadlessHost::with_vanilla_names();
        let mut store = MemoryQuestStore::new();
        let p = PlayerId::new();
        assert_eq!(
            m.load_player(p, &mut store, &host, Timestamp(0)),
            LoadOutcome::Initialized
        );
        assert_eq!(m.quests_for(p).len(), 2);
    }

    #[test]
    fn missing_save_keeps_live_quests() {
        let mut m = manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let mut store = MemoryQuestStore::new();
        let p = PlayerId::new();
        m.assign_quests(p, vec![zombie(&host, 3)]);
        m.on_entity_killed(p, &TargetId::from("minecraft:zombie"), &mut host);

        assert_eq!(
            m.load_player(p, &mut store, &host, Timestamp(0)),
            LoadOutcome::Kept(1)
        );
        assert_eq!(m.quests_for(p)[0].id(), &QuestId::from("kill_zombie_fixed"));
        assert_eq!(m.quests_for(p)[0].progress(p, &host), 1);
    }

    #[test]
    fn load_caps_at_max_active() {
        let mut config = QuestConfig::default();
        config.quests.max_active_per_player = 2;
        let mut m = QuestManager::new(config);
        let host = HeadlessHost::with_vanilla_names();
        let mut store = MemoryQuestStore::new();
        let p = PlayerId::new();
        let quests: Vec<Quest> = (0..4)
            .map(|i| {
                Quest::new(
                    QuestKind::Kill,
                    QuestId(format!("kill_zombie_{i}")),
                    "Kill Zombie",
                    TargetId::from("minecraft:zombie"),
                    3,
                    &host,
                )
            })
            .collect();
        let data = PlayerQuestData {
            quest_ids: quests.iter().map(|q| q.id().clone()).collect(),
            quests_completed: 0,
            last_generation: Timestamp::EPOCH,
            difficulty_level: 1,
            quests: quests.iter().map(|q| q.to_saved(p)).collect(),
            tuning: None,
        };
        store.save(p, &data).expect("save");

        assert_eq!(
            m.load_player(p, &mut store, &host, Timestamp(0)),
            LoadOutcome::Restored(2)
        );
        let ids: Vec<&QuestId> = m.quests_for(p).iter().map(Quest::id).collect();
        assert_eq!(ids, vec![&QuestId::from("kill_zombie_0"), &QuestId::from("kill_zombie_1")]);

        store
            .save(p, &PlayerQuestData { quests: Vec::new(), ..data })
            .expect("save ids only");
        assert_eq!(
            m.load_player(p, &mut store, &host, Timestamp(0)),
            LoadOutcome::Reconstructed(2)
        );
    }

    #[test]
    fn completed_quest_cannot_be_abandoned() {
        let mut m = manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let p = PlayerId::new();
        m.assign_quests(p, vec![zombie(&host, 1)]);
        m.on_entity_killed(p, &TargetId::from("minecraft:zombie"), &mut host);
        assert!(m.quests_for(p)[0].is_completed(p));

        assert!(m.abandon_quest(p, &QuestId::from("kill_zombie_fixed"), &mut host).is_none());
        assert_eq!(m.tuning(p).consecutive_failures, 0);
        assert_eq!(m.quests_for(p).len(), 1);
        assert_eq!(m.quests_for(p)[0].id(), &QuestId::from("kill_zombie_fixed"));
    }

    #[test]
    fn kind_heuristic() {
        assert_eq!(kind_from_id(&QuestId::from("kill_zombie_1")), QuestKind::Kill);
        assert_eq!(kind_from_id(&QuestId::from("enemy_quest")), QuestKind::Kill);
        assert_eq!(kind_from_id(&QuestId::from("collect_dirt_1")), QuestKind::Collection);
        assert_eq!(kind_from_id(&QuestId::from("whatever")), QuestKind::Collection);
    }
}
