//! The quest system as the server sees it.
//!
//! [`QuestSystem`] owns the quest manager, the save store and the player
//! registry, and turns each [`HostEvent`] into manager calls:
//!
//! | Event            | Effect                                          |
//! |------------------|-------------------------------------------------|
//! | login, respawn   | load the player's quests (defaults on failure)  |
//! | logout           | save, then drop runtime state                   |
//! | death            | count a failure, save if configured             |
//! | clone (death)    | copy saved quests to the new entity             |
//! | kill             | advance matching kill quests                    |
//! | board            | list quests, then sweep                         |
//! | abandon          | replace the quest, count a failure              |
//! | info             | send difficulty and completion count            |
//!
//! Store failures never reach the server; they are logged and play goes on.

use questai_core::config::QuestConfig;
use questai_core::host::QuestHost;
use questai_core::manager::{LoadOutcome, QuestManager};
use questai_core::persistence::QuestStore;
use questai_core::types::{PlayerId, QuestId};
use tracing::{debug, info, warn};

use crate::board::{self, BoardOutcome};
use crate::bridge::PlayerRegistry;
use crate::events::HostEvent;

/// What handling one event did.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The system is disabled or the event needs no action.
    Ignored,
    /// The player's quests were loaded.
    Loaded(LoadOutcome),
    /// The player's quests were saved (`false` if the save failed) and
    /// their runtime state dropped.
    Unloaded {
        /// Whether the save succeeded.
        saved: bool,
    },
    /// A death was recorded.
    Died {
        /// Whether auto-difficulty lowered the level.
        lowered: bool,
    },
    /// Saved quests were copied to a cloned entity.
    Copied(bool),
    /// A kill was routed; the count is how many quests advanced.
    Progress(usize),
    /// The quest board was used.
    Board(BoardOutcome),
    /// A quest was abandoned; holds the replacement's id.
    Abandoned(Option<QuestId>),
    /// System info was sent.
    Info,
}

/// Quest manager, save store and player registry for one server.
#[derive(Debug)]
pub struct QuestSystem<S> {
    manager: QuestManager,
    store: S,
    registry: PlayerRegistry,
    save_on_death: bool,
}

impl<S: QuestStore> QuestSystem<S> {
    /// Create a system over `store` and restore the agent's learned table.
    pub fn new(config: QuestConfig, store: S) -> Self {
        let mut system = Self {
            manager: QuestManager::new(config),
            store,
            registry: PlayerRegistry::new(),
            save_on_death: true,
        };
        match system.manager.load_agent(&mut system.store) {
            Ok(true) => {}
            Ok(false) => debug!("no saved agent table"),
            Err(e) => warn!(error = %e, "failed to load agent table"),
        }
        system
    }

    /// Whether deaths trigger a save.
    #[must_use]
    pub fn with_save_on_death(mut self, save_on_death: bool) -> Self {
        self.save_on_death = save_on_death;
        self
    }

    /// The quest manager.
    #[must_use]
    pub fn manager(&self) -> &QuestManager {
        &self.manager
    }

    /// Mutable access to the quest manager, for admin tooling.
    pub fn manager_mut(&mut self) -> &mut QuestManager {
        &mut self.manager
    }

    /// The save store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the save store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The player handle registry.
    pub fn registry_mut(&mut self) -> &mut PlayerRegistry {
        &mut self.registry
    }

    /// `PlayerId` for a server handle, registering it if unseen.
    pub fn player_for(&mut self, handle: &str) -> PlayerId {
        self.registry.resolve(handle)
    }

    /// Whether the quest system is switched on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.manager.config().general.enabled
    }

    /// Handle one server event.
    pub fn handle<H: QuestHost + ?Sized>(&mut self, event: &HostEvent, host: &mut H) -> EventOutcome {
        if !self.is_enabled() {
            return EventOutcome::Ignored;
        }
        debug!(kind = event.kind(), player = %event.player(), "host event");

        match event {
            HostEvent::PlayerLoggedIn { player, timestamp }
            | HostEvent::PlayerRespawned { player, timestamp } => EventOutcome::Loaded(
                self.manager
                    .load_player(*player, &mut self.store, &*host, *timestamp),
            ),
            HostEvent::PlayerLoggedOut { player, .. } => {
                let saved = self.save_player(*player);
                self.manager.unload_player(*player);
                info!(%player, saved, "player logged out");
                EventOutcome::Unloaded { saved }
            }
            HostEvent::PlayerDied { player, .. } => {
                let lowered = self.manager.record_failure(*player);
                if self.save_on_death {
                    self.save_player(*player);
                }
                EventOutcome::Died { lowered }
            }
            HostEvent::PlayerCloned {
                original,
                clone,
                was_death,
                ..
            } => {
                if !*was_death || original == clone {
                    return EventOutcome::Ignored;
                }
                match self.store.copy(*original, *clone) {
                    Ok(copied) => {
                        debug!(%original, %clone, copied, "copied quest data to clone");
                        if copied {
                            self.manager.unload_player(*original);
                        }
                        EventOutcome::Copied(copied)
                    }
                    Err(e) => {
                        warn!(%original, %clone, error = %e, "failed to copy quest data");
                        EventOutcome::Copied(false)
                    }
                }
            }
            HostEvent::EntityKilled { killer, target, .. } => {
                EventOutcome::Progress(self.manager.on_entity_killed(*killer, target, host))
            }
            HostEvent::QuestBoardUsed { player, timestamp } => EventOutcome::Board(
                board::use_board(&mut self.manager, *player, host, *timestamp),
            ),
            HostEvent::QuestAbandoned { player, quest, .. } => {
                EventOutcome::Abandoned(self.manager.abandon_quest(*player, quest, host))
            }
            HostEvent::SystemInfoRequested { player, .. } => {
                host.send_message(*player, self.manager.system_info(*player));
                EventOutcome::Info
            }
        }
    }

    /// Save one player's quests. Returns `false` and logs on failure.
    pub fn save_player(&mut self, player: PlayerId) -> bool {
        match self.manager.save_player(player, &mut self.store) {
            Ok(()) => true,
            Err(e) => {
                warn!(%player, error = %e, "failed to save quest data");
                false
            }
        }
    }

    /// Save every tracked player and the agent table. Returns how many
    /// players were saved.
    pub fn shutdown(&mut self) -> usize {
        let players: Vec<PlayerId> = self.manager.tracked_players().collect();
        let saved = players.into_iter().filter(|p| self.save_player(*p)).count();
        if let Err(e) = self.manager.save_agent(&mut self.store) {
            warn!(error = %e, "failed to save agent table");
        }
        info!(players = saved, "quest system shut down");
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questai_core::host::HeadlessHost;
    use questai_core::persistence::MemoryQuestStore;
    use questai_core::types::Timestamp;

    use crate::hooks;

    fn system() -> QuestSystem<MemoryQuestStore> {
        let mut config = QuestConfig::default();
        config.generator.seed = Some(21);
        config.learning.seed = Some(21);
        QuestSystem::new(config, MemoryQuestStore::new())
    }

    #[test]
    fn login_without_save_initializes() {
        let mut system = system();
        let mut host = HeadlessHost::with_vanilla_names();
        let player = system.player_for("Steve");

        let outcome = system.handle(&hooks::on_login(player, Timestamp(0)), &mut host);
        assert_eq!(outcome, EventOutcome::Loaded(LoadOutcome::Initialized));
        assert_eq!(system.manager().quests_for(player).len(), 2);
    }

    #[test]
    fn logout_saves_and_unloads() {
        let mut system = system();
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        system.handle(&hooks::on_login(player, Timestamp(0)), &mut host);

        let outcome = system.handle(&hooks::on_logout(player, Timestamp(1)), &mut host);
        assert_eq!(outcome, EventOutcome::Unloaded { saved: true });
        assert!(!system.manager().has_quests(player));
        assert_eq!(system.store().len(), 1);
    }

    #[test]
    fn disabled_system_ignores_everything() {
        let mut config = QuestConfig::default();
        config.general.enabled = false;
        let mut system = QuestSystem::new(config, MemoryQuestStore::new());
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        assert_eq!(
            system.handle(&hooks::on_quest_board(player, Timestamp(0)), &mut host),
            EventOutcome::Ignored
        );
        assert!(host.messages.is_empty());
    }

    #[test]
    fn non_death_clone_is_ignored() {
        let mut system = system();
        let mut host = HeadlessHost::with_vanilla_names();
        let event = hooks::on_clone(PlayerId::new(), PlayerId::new(), false, Timestamp(0));
        assert_eq!(system.handle(&event, &mut host), EventOutcome::Ignored);
    }

    #[test]
    fn death_clone_unloads_the_original() {
        let mut system = system();
        let mut host = HeadlessHost::with_vanilla_names();
        let original = PlayerId::new();
        let clone = PlayerId::new();
        system.handle(&hooks::on_login(original, Timestamp(0)), &mut host);
        assert!(system.save_player(original));

        let event = hooks::on_clone(original, clone, true, Timestamp(1));
        assert_eq!(system.handle(&event, &mut host), EventOutcome::Copied(true));
        assert!(!system.manager().has_quests(original));
        assert_eq!(system.manager().tracked_players().count(), 0);
        assert_eq!(system.store().len(), 2);
    }

    #[test]
    fn info_request_sends_one_message() {
        let mut system = system();
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        system.handle(&hooks::on_login(player, Timestamp(0)), &mut host);
        system.handle(&hooks::on_info_request(player, Timestamp(1)), &mut host);
        assert_eq!(
            host.messages_for(player),
            vec!["[Quest System] Current Difficulty: 1, Quests Completed: 0".to_owned()]
        );
    }
}
