//! Quest persistence: snapshot types, the [`QuestStore`] seam and a SQLite
//! engine.
//!
//! Each player's quest snapshot is serialised to JSON and stored in one row.
//! The agent's Q-table is stored the same way in a single-row table:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS player_quests (
//!     player_id  TEXT PRIMARY KEY,
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! CREATE TABLE IF NOT EXISTS agent_table (
//!     id         INTEGER PRIMARY KEY CHECK (id = 1),
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL
//! );
//! ```
//!
//! A CRC-32 of the JSON bytes is stored with each player row when checksums
//! are enabled; a mismatch on load is logged and the data still returned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{QuestError, Result};
use crate::generator::DifficultyTuning;
use crate::learning::QEntry;
use crate::quest::{CompletionState, QuestKind};
use crate::types::{PlayerId, QuestId, TargetId, Timestamp};

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// One quest as seen by one player, with an explicit variant tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuest {
    /// Quest id.
    pub id: QuestId,
    /// Variant.
    pub kind: QuestKind,
    /// Display title.
    pub title: String,
    /// Entity or item type.
    pub target: TargetId,
    /// Amount needed.
    pub required_amount: u32,
    /// Stored kill counter (always 0 for collection quests).
    #[serde(default)]
    pub progress: u32,
    /// Completion state for the owning player.
    #[serde(default)]
    pub state: CompletionState,
}

/// Everything persisted for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerQuestData {
    /// Ids of the active quests, in order.
    pub quest_ids: Vec<QuestId>,
    /// Lifetime completions.
    pub quests_completed: u32,
    /// When quests were last regenerated.
    pub last_generation: Timestamp,
    /// Difficulty level at save time.
    pub difficulty_level: u32,
    /// Full quest snapshots. Preferred over `quest_ids` when present.
    #[serde(default)]
    pub quests: Vec<SavedQuest>,
    /// Full tuning state. Older saves only carry `difficulty_level`.
    #[serde(default)]
    pub tuning: Option<DifficultyTuning>,
}

impl PlayerQuestData {
    /// Tuning to resume with: the saved one, or a fresh one at the saved
    /// level.
    #[must_use]
    pub fn resume_tuning(&self) -> DifficultyTuning {
        self.tuning
            .unwrap_or_else(|| DifficultyTuning::at_level(self.difficulty_level))
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Where quest snapshots and the agent table are kept.
pub trait QuestStore {
    /// Save (upsert) a player's snapshot.
    ///
    /// # Errors
    /// Implementation-defined storage failures.
    fn save(&mut self, player: PlayerId, data: &PlayerQuestData) -> Result<()>;

    /// Load a player's snapshot, `None` if nothing was saved.
    ///
    /// # Errors
    /// Implementation-defined storage or decoding failures.
    fn load(&mut self, player: PlayerId) -> Result<Option<PlayerQuestData>>;

    /// Copy `from`'s snapshot to `to`. Returns `false` if `from` has none.
    ///
    /// # Errors
    /// Implementation-defined storage failures.
    fn copy(&mut self, from: PlayerId, to: PlayerId) -> Result<bool> {
        match self.load(from)? {
            Some(data) => {
                self.save(to, &data)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save the agent's Q-table.
    ///
    /// # Errors
    /// Implementation-defined storage failures.
    fn save_agent(&mut self, entries: &[QEntry]) -> Result<()>;

    /// Load the agent's Q-table, `None` if nothing was saved.
    ///
    /// # Errors
    /// Implementation-defined storage or decoding failures.
    fn load_agent(&mut self) -> Result<Option<Vec<QEntry>>>;
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuestStore {
    players: HashMap<PlayerId, PlayerQuestData>,
    agent: Option<Vec<QEntry>>,
}

impl MemoryQuestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no player has been saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl QuestStore for MemoryQuestStore {
    fn save(&mut self, player: PlayerId, data: &PlayerQuestData) -> Result<()> {
        self.players.insert(player, data.clone());
        Ok(())
    }

    fn load(&mut self, player: PlayerId) -> Result<Option<PlayerQuestData>> {
        Ok(self.players.get(&player).cloned())
    }

    fn save_agent(&mut self, entries: &[QEntry]) -> Result<()> {
        self.agent = Some(entries.to_vec());
        Ok(())
    }

    fn load_agent(&mut self) -> Result<Option<Vec<QEntry>>> {
        Ok(self.agent.clone())
    }
}

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 of `data` as lowercase hex.
fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

/// CRC-32 (ISO 3309 / ITU-T V.42), bitwise.
fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ POLY } else { crc >> 1 };
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// PersistenceEngine
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS player_quests (
        player_id  TEXT PRIMARY KEY,
        data       BLOB NOT NULL,
        updated_at TEXT NOT NULL,
        checksum   TEXT
    );
    CREATE TABLE IF NOT EXISTS agent_table (
        id         INTEGER PRIMARY KEY CHECK (id = 1),
        data       BLOB NOT NULL,
        updated_at TEXT NOT NULL
    );";

/// Handle to a SQLite database of quest snapshots.
///
/// ```no_run
/// # use questai_core::persistence::{PersistenceEngine, QuestStore};
/// # use questai_core::config::PersistenceConfig;
/// # use questai_core::types::PlayerId;
/// let mut engine = PersistenceEngine::open("quests.db", &PersistenceConfig::default())?;
/// let loaded = engine.load(PlayerId::new())?;
/// assert!(loaded.is_none());
/// # Ok::<(), questai_core::error::QuestError>(())
/// ```
pub struct PersistenceEngine {
    conn: Connection,
    config: PersistenceConfig,
    db_path: PathBuf,
}

impl std::fmt::Debug for PersistenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceEngine")
            .field("db_path", &self.db_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PersistenceEngine {
    /// Open (or create) a database at `path` and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "quest persistence engine opened"
        );

        Ok(Self {
            conn,
            config: config.clone(),
            db_path,
        })
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            config: config.clone(),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Save (upsert) a player's snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Serialization`] if encoding fails, or
    /// [`QuestError::Database`] on SQLite failures.
    pub fn save_player(&self, player: PlayerId, data: &PlayerQuestData) -> Result<()> {
        let start = Instant::now();
        let json = serde_json::to_vec(data)?;
        let checksum = self.config.checksum_enabled.then(|| crc32_hex(&json));

        self.conn.execute(
            "INSERT INTO player_quests (player_id, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(player_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![player.0.to_string(), json, Utc::now().to_rfc3339(), checksum],
        )?;

        debug!(
            %player,
            quests = data.quest_ids.len(),
            bytes = json.len(),
            elapsed_us = start.elapsed().as_micros(),
            "saved player quests"
        );
        Ok(())
    }

    /// Load a player's snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Serialization`] if the stored JSON does not
    /// decode, or [`QuestError::Database`] on SQLite failures.
    pub fn load_player(&self, player: PlayerId) -> Result<Option<PlayerQuestData>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT data, checksum FROM player_quests WHERE player_id = ?1")?;
        let row: Option<(Vec<u8>, Option<String>)> = stmt
            .query_row(params![player.0.to_string()], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((data, stored_checksum)) = row else {
            return Ok(None);
        };

        if self.config.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(&data);
                if expected != actual {
                    warn!(
                        %player,
                        %expected,
                        %actual,
                        "checksum mismatch, quest save may be corrupt"
                    );
                }
            }
        }

        let decoded: PlayerQuestData = serde_json::from_slice(&data)?;
        debug!(%player, quests = decoded.quest_ids.len(), "loaded player quests");
        Ok(Some(decoded))
    }

    /// Delete a player's snapshot. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Database`] on SQLite failures.
    pub fn delete(&self, player: PlayerId) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM player_quests WHERE player_id = ?1",
            params![player.0.to_string()],
        )?;
        Ok(deleted > 0)
    }

    /// Every player with a saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Database`] on SQLite failures.
    pub fn list_players(&self) -> Result<Vec<PlayerId>> {
        let mut stmt = self.conn.prepare_cached("SELECT player_id FROM player_quests")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut players = Vec::new();
        for row in rows {
            let id = row?;
            match uuid::Uuid::parse_str(&id) {
                Ok(uuid) => players.push(PlayerId(uuid)),
                Err(_) => warn!(%id, "skipping row with invalid player id"),
            }
        }
        Ok(players)
    }

    /// Store the agent's Q-table, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Serialization`] or [`QuestError::Database`].
    pub fn save_agent_table(&self, entries: &[QEntry]) -> Result<()> {
        let json = serde_json::to_vec(entries)?;
        self.conn.execute(
            "INSERT INTO agent_table (id, data, updated_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at",
            params![json, Utc::now().to_rfc3339()],
        )?;
        debug!(entries = entries.len(), "saved agent table");
        Ok(())
    }

    /// Load the agent's Q-table.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Serialization`] or [`QuestError::Database`].
    pub fn load_agent_table(&self) -> Result<Option<Vec<QEntry>>> {
        let data: Option<Vec<u8>> = self
            .conn
            .query_row("SELECT data FROM agent_table WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        data.map(|bytes| serde_json::from_slice(&bytes).map_err(QuestError::from))
            .transpose()
    }

    /// Copy the database to `dest_path` with SQLite's online-backup API.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let start = Instant::now();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dest)?;
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;
        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "quest database backup completed"
        );
        Ok(())
    }

    /// Path to the database file, or `:memory:`.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run `PRAGMA integrity_check`. `Ok(true)` means healthy.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }
}

impl QuestStore for PersistenceEngine {
    fn save(&mut self, player: PlayerId, data: &PlayerQuestData) -> Result<()> {
        self.save_player(player, data)
    }

    fn load(&mut self, player: PlayerId) -> Result<Option<PlayerQuestData>> {
        self.load_player(player)
    }

    fn save_agent(&mut self, entries: &[QEntry]) -> Result<()> {
        self.save_agent_table(entries)
    }

    fn load_agent(&mut self) -> Result<Option<Vec<QEntry>>> {
        self.load_agent_table()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::{GameState, QuestAction};

    fn sample() -> PlayerQuestData {
        PlayerQuestData {
            quest_ids: vec![QuestId::from("kill_zombie_a"), QuestId::from("collect_dirt_b")],
            quests_completed: 4,
            last_generation: Timestamp(1_700_000_000_000),
            difficulty_level: 2,
            quests: vec![SavedQuest {
                id: QuestId::from("kill_zombie_a"),
                kind: QuestKind::Kill,
                title: "Kill Zombie".to_string(),
                target: TargetId::from("minecraft:zombie"),
                required_amount: 5,
                progress: 3,
                state: CompletionState::Active,
            }],
            tuning: None,
        }
    }

    fn engine() -> PersistenceEngine {
        PersistenceEngine::open_in_memory(&PersistenceConfig::default()).expect("open")
    }

    #[test]
    fn round_trip_save_load() {
        let engine = engine();
        let player = PlayerId::new();
        engine.save_player(player, &sample()).expect("save");
        let loaded = engine.load_player(player).expect("load").expect("Some");
        assert_eq!(loaded, sample());
        assert_eq!(loaded.resume_tuning().level, 2);
    }

    #[test]
    fn load_nonexistent_returns_none() {
        assert!(engine().load_player(PlayerId::new()).expect("load").is_none());
    }

    #[test]
    fn legacy_snapshot_without_quests_decodes() {
        let json = r#"{"quest_ids":["kill_enemy_x"],"quests_completed":1,"last_generation":0,"difficulty_level":1}"#;
        let data: PlayerQuestData = serde_json::from_str(json).expect("decode");
        assert!(data.quests.is_empty());
        assert!(data.tuning.is_none());
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let engine = engine();
        let player = PlayerId::new();
        engine
            .conn
            .execute(
                "INSERT INTO player_quests (player_id, data, updated_at) VALUES (?1, ?2, 'now')",
                params![player.0.to_string(), b"not json".to_vec()],
            )
            .expect("insert");
        assert!(matches!(
            engine.load_player(player),
            Err(QuestError::Serialization(_))
        ));
    }

    #[test]
    fn checksum_mismatch_still_loads() {
        let engine = engine();
        let player = PlayerId::new();
        engine.save_player(player, &sample()).expect("save");
        engine
            .conn
            .execute(
                "UPDATE player_quests SET checksum = 'deadbeef' WHERE player_id = ?1",
                params![player.0.to_string()],
            )
            .expect("corrupt checksum");
        assert!(engine.load_player(player).expect("load").is_some());
    }

    #[test]
    fn copy_delete_and_list() {
        let mut engine = engine();
        let a = PlayerId::new();
        let b = PlayerId::new();
        engine.save(a, &sample()).expect("save");
        assert!(engine.copy(a, b).expect("copy"));
        assert!(!engine.copy(PlayerId::new(), b).expect("copy missing"));
        assert_eq!(engine.list_players().expect("list").len(), 2);
        assert!(engine.delete(a).expect("delete"));
        assert!(!engine.delete(a).expect("delete again"));
        assert_eq!(engine.load(b).expect("load"), Some(sample()));
    }

    #[test]
    fn agent_table_round_trip() {
        let mut engine = engine();
        assert!(engine.load_agent().expect("load").is_none());
        let entries = vec![QEntry {
            state: GameState::new(1, 0, 2, 20, 1),
            action: QuestAction::DecreaseItems,
            value: 0.25,
        }];
        engine.save_agent(&entries).expect("save");
        engine.save_agent(&entries).expect("save twice");
        assert_eq!(engine.load_agent().expect("load"), Some(entries));
    }

    #[test]
    fn only_missing_rows_are_optional() {
        let engine = engine();
        engine
            .conn
            .execute_batch("DROP TABLE agent_table;")
            .expect("drop");
        assert!(matches!(
            engine.load_agent_table(),
            Err(QuestError::Database(_))
        ));
    }

    #[test]
    fn file_based_open_and_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PersistenceConfig::default();
        let engine = PersistenceEngine::open(dir.path().join("quests.db"), &config).expect("open");
        let player = PlayerId::new();
        engine.save_player(player, &sample()).expect("save");
        assert!(engine.integrity_check().expect("check"));

        let backup_path = dir.path().join("quests_backup.db");
        engine.backup(&backup_path).expect("backup");
        let restored = PersistenceEngine::open(&backup_path, &config).expect("open backup");
        assert_eq!(restored.load_player(player).expect("load"), Some(sample()));
    }

    #[test]
    fn memory_store_behaves_like_engine() {
        let mut store = MemoryQuestStore::new();
        let a = PlayerId::new();
        assert!(store.is_empty());
        store.save(a, &sample()).expect("save");
        assert!(store.copy(a, PlayerId::new()).expect("copy"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn crc32_known_vector() {
        assert_eq!(crc32_compute(b"123456789"), 0xCBF4_3926);
    }
}
