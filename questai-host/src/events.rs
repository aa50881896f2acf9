//! Host events the quest system reacts to.
//!
//! Session events (login, logout, respawn, death, clone) drive loading and
//! saving; gameplay events (kills, board use, abandon) drive quest progress.

use questai_core::types::{PlayerId, QuestId, TargetId, Timestamp};

/// Something that happened on the server that quests care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A player joined the server.
    PlayerLoggedIn {
        player: PlayerId,
        timestamp: Timestamp,
    },

    /// A player left the server.
    PlayerLoggedOut {
        player: PlayerId,
        timestamp: Timestamp,
    },

    /// A player died.
    PlayerDied {
        player: PlayerId,
        timestamp: Timestamp,
    },

    /// A player respawned after death or a dimension change.
    PlayerRespawned {
        player: PlayerId,
        timestamp: Timestamp,
    },

    /// The server replaced a player entity with a fresh copy.
    PlayerCloned {
        original: PlayerId,
        clone: PlayerId,
        /// `true` when the clone was caused by death.
        was_death: bool,
        timestamp: Timestamp,
    },

    /// A player killed an entity.
    EntityKilled {
        killer: PlayerId,
        target: TargetId,
        timestamp: Timestamp,
    },

    /// A player interacted with a quest board.
    QuestBoardUsed {
        player: PlayerId,
        timestamp: Timestamp,
    },

    /// A player gave up on one of their quests.
    QuestAbandoned {
        player: PlayerId,
        quest: QuestId,
        timestamp: Timestamp,
    },

    /// A player asked for their difficulty and completion count.
    SystemInfoRequested {
        player: PlayerId,
        timestamp: Timestamp,
    },
}

impl HostEvent {
    /// When the event happened.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::PlayerLoggedIn { timestamp, .. }
            | Self::PlayerLoggedOut { timestamp, .. }
            | Self::PlayerDied { timestamp, .. }
            | Self::PlayerRespawned { timestamp, .. }
            | Self::PlayerCloned { timestamp, .. }
            | Self::EntityKilled { timestamp, .. }
            | Self::QuestBoardUsed { timestamp, .. }
            | Self::QuestAbandoned { timestamp, .. }
            | Self::SystemInfoRequested { timestamp, .. } => *timestamp,
        }
    }

    /// The player the event is about. For clones this is the new entity.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            Self::PlayerLoggedIn { player, .. }
            | Self::PlayerLoggedOut { player, .. }
            | Self::PlayerDied { player, .. }
            | Self::PlayerRespawned { player, .. }
            | Self::QuestBoardUsed { player, .. }
            | Self::QuestAbandoned { player, .. }
            | Self::SystemInfoRequested { player, .. } => *player,
            Self::PlayerCloned { clone, .. } => *clone,
            Self::EntityKilled { killer, .. } => *killer,
        }
    }

    /// Whether the event loads, saves or copies stored quest data.
    #[must_use]
    pub fn is_session_event(&self) -> bool {
        matches!(
            self,
            Self::PlayerLoggedIn { .. }
                | Self::PlayerLoggedOut { .. }
                | Self::PlayerDied { .. }
                | Self::PlayerRespawned { .. }
                | Self::PlayerCloned { .. }
        )
    }

    /// Short name for log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlayerLoggedIn { .. } => "login",
            Self::PlayerLoggedOut { .. } => "logout",
            Self::PlayerDied { .. } => "death",
            Self::PlayerRespawned { .. } => "respawn",
            Self::PlayerCloned { .. } => "clone",
            Self::EntityKilled { .. } => "kill",
            Self::QuestBoardUsed { .. } => "board",
            Self::QuestAbandoned { .. } => "abandon",
            Self::SystemInfoRequested { .. } => "info",
        }
    }
}
