//! Integration hooks for the server's existing callbacks.
//!
//! Each hook turns one server callback into a [`HostEvent`]. Raw registry
//! ids are normalized here, so the rest of the system only ever sees
//! canonical targets.

use questai_core::types::{PlayerId, QuestId, Timestamp};

use crate::bridge::normalize_target;
use crate::events::HostEvent;

/// Create a login event from the server's join callback.
#[must_use]
pub fn on_login(player: PlayerId, timestamp: Timestamp) -> HostEvent {
    HostEvent::PlayerLoggedIn { player, timestamp }
}

/// Create a logout event from the server's disconnect callback.
#[must_use]
pub fn on_logout(player: PlayerId, timestamp: Timestamp) -> HostEvent {
    HostEvent::PlayerLoggedOut { player, timestamp }
}

/// Create a death event from the server's player-death callback.
#[must_use]
pub fn on_death(player: PlayerId, timestamp: Timestamp) -> HostEvent {
    HostEvent::PlayerDied { player, timestamp }
}

/// Create a respawn event from the server's respawn callback.
#[must_use]
pub fn on_respawn(player: PlayerId, timestamp: Timestamp) -> HostEvent {
    HostEvent::PlayerRespawned { player, timestamp }
}

/// Create a clone event when the server swaps a player entity.
#[must_use]
pub fn on_clone(
    original: PlayerId,
    clone: PlayerId,
    was_death: bool,
    timestamp: Timestamp,
) -> HostEvent {
    HostEvent::PlayerCloned {
        original,
        clone,
        was_death,
        timestamp,
    }
}

/// Create a kill event from the server's entity-death callback.
///
/// `raw_target` is the killed entity's registry id in any casing, with or
/// without a namespace.
#[must_use]
pub fn on_entity_killed(killer: PlayerId, raw_target: &str, timestamp: Timestamp) -> HostEvent {
    HostEvent::EntityKilled {
        killer,
        target: normalize_target(raw_target),
        timestamp,
    }
}

/// Create a board event when a player uses a quest board block.
#[must_use]
pub fn on_quest_board(player: PlayerId, timestamp: Timestamp) -> HostEvent {
    HostEvent::QuestBoardUsed { player, timestamp }
}

/// Create an abandon event from a player command.
#[must_use]
pub fn on_abandon(player: PlayerId, quest: impl Into<QuestId>, timestamp: Timestamp) -> HostEvent {
    HostEvent::QuestAbandoned {
        player,
        quest: quest.into(),
        timestamp,
    }
}

/// Create an info request from a player command.
#[must_use]
pub fn on_info_request(player: PlayerId, timestamp: Timestamp) -> HostEvent {
    HostEvent::SystemInfoRequested { player, timestamp }
}
