//! Bridge module: maps the server's identifiers onto QUESTAI's types.
//!
//! Servers identify players by whatever handle they have at hand (a UUID
//! string, an account name) and entities/items by namespaced registry ids
//! that are sometimes written without the namespace. This module turns both
//! into stable `PlayerId`s and canonical `TargetId`s.

use std::collections::HashMap;

use questai_core::types::{PlayerId, TargetId};
use tracing::debug;
use uuid::Uuid;

/// Namespace assumed for bare registry ids such as `zombie`.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

// ---------------------------------------------------------------------------
// Target ids
// ---------------------------------------------------------------------------

/// Canonical form of a registry id: trimmed, lower-case, namespaced.
///
/// `"Zombie"` and `"minecraft:zombie"` both become `minecraft:zombie`;
/// ids that already carry a namespace keep it.
#[must_use]
pub fn normalize_target(raw: &str) -> TargetId {
    let id = raw.trim().to_ascii_lowercase();
    if id.contains(':') {
        TargetId::new(id)
    } else {
        TargetId::new(format!("{DEFAULT_NAMESPACE}:{id}"))
    }
}

// ---------------------------------------------------------------------------
// Player handles
// ---------------------------------------------------------------------------

/// Parse a handle that is itself a UUID (hyphenated or simple form).
#[must_use]
pub fn parse_player_id(handle: &str) -> Option<PlayerId> {
    Uuid::parse_str(handle.trim()).ok().map(PlayerId)
}

/// Two-way map between server player handles and `PlayerId`s.
///
/// UUID handles map to the same `PlayerId` on every run, so saved quests
/// survive restarts. Other handles get a fresh id the first time they are
/// seen.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    by_handle: HashMap<String, PlayerId>,
    handles: HashMap<PlayerId, String>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `PlayerId` for `handle`, registering it if unseen.
    pub fn resolve(&mut self, handle: &str) -> PlayerId {
        if let Some(id) = self.by_handle.get(handle) {
            return *id;
        }
        let id = parse_player_id(handle).unwrap_or_default();
        debug!(handle, player = %id, "registered player handle");
        self.bind(handle, id);
        id
    }

    /// Point `handle` at `player`, replacing any previous binding.
    pub fn bind(&mut self, handle: &str, player: PlayerId) {
        if let Some(old) = self.by_handle.insert(handle.to_owned(), player) {
            self.handles.remove(&old);
        }
        self.handles.insert(player, handle.to_owned());
    }

    /// Look a handle up without registering it.
    #[must_use]
    pub fn get(&self, handle: &str) -> Option<PlayerId> {
        self.by_handle.get(handle).copied()
    }

    /// The handle `player` was registered under.
    #[must_use]
    pub fn handle_of(&self, player: PlayerId) -> Option<&str> {
        self.handles.get(&player).map(String::as_str)
    }

    /// Remove `handle`. Returns the id it was bound to.
    pub fn forget(&mut self, handle: &str) -> Option<PlayerId> {
        let id = self.by_handle.remove(handle)?;
        self.handles.remove(&id);
        Some(id)
    }

    /// Every registered player.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.handles.keys().copied()
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    /// Whether no handle is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ids_get_the_default_namespace() {
        assert_eq!(normalize_target("zombie").as_str(), "minecraft:zombie");
        assert_eq!(normalize_target("  Skeleton ").as_str(), "minecraft:skeleton");
        assert_eq!(normalize_target("minecraft:dirt").as_str(), "minecraft:dirt");
        assert_eq!(normalize_target("mymod:Wraith").as_str(), "mymod:wraith");
    }

    #[test]
    fn uuid_handles_are_stable() {
        let raw = "0f8fad5b-d9cb-469f-a165-70867728950e";
        let mut first = PlayerRegistry::new();
        let mut second = PlayerRegistry::new();
        assert_eq!(first.resolve(raw), second.resolve(raw));
        assert_eq!(Some(first.resolve(raw)), parse_player_id(raw));
    }

    #[test]
    fn name_handles_are_remembered() {
        let mut registry = PlayerRegistry::new();
        let steve = registry.resolve("Steve");
        assert_eq!(registry.resolve("Steve"), steve);
        assert_ne!(registry.resolve("Alex"), steve);
        assert_eq!(registry.handle_of(steve), Some("Steve"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rebinding_moves_the_handle() {
        let mut registry = PlayerRegistry::new();
        let old = registry.resolve("Steve");
        let new = PlayerId::new();
        registry.bind("Steve", new);
        assert_eq!(registry.get("Steve"), Some(new));
        assert_eq!(registry.handle_of(old), None);
        assert_eq!(registry.forget("Steve"), Some(new));
        assert!(registry.is_empty());
    }
}
