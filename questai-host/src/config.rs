//! Server-side configuration for the quest system.
//!
//! Wraps the core `QuestConfig` with what only a running server needs: where
//! the save database lives and how logs are formatted.
//!
//! ```toml
//! database_path = "world/questai.db"
//! json_logs = false
//!
//! [quest.general]
//! log_level = "info"
//!
//! [quest.regeneration]
//! policy = "cooldown_gated"
//! ```

use std::path::{Path, PathBuf};

use questai_core::config::QuestConfig;
use questai_core::error::{QuestError, Result};
use questai_core::persistence::PersistenceEngine;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Database path that selects an in-memory store.
pub const IN_MEMORY: &str = ":memory:";

/// Server configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// SQLite file for player quests and the agent table.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,
    /// Save a player's quests when they die, not only on logout.
    #[serde(default = "default_save_on_death")]
    pub save_on_death: bool,
    /// Core quest configuration.
    #[serde(default)]
    pub quest: QuestConfig,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("questai.db")
}
fn default_save_on_death() -> bool {
    true
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            json_logs: false,
            save_on_death: default_save_on_death(),
            quest: QuestConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `QuestError::Config` if the TOML is invalid or a quest value
    /// is out of range.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| QuestError::Config(e.to_string()))?;
        config.quest.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Open the configured save database.
    ///
    /// # Errors
    /// Returns `QuestError::Database` if SQLite cannot open the file.
    pub fn open_store(&self) -> Result<PersistenceEngine> {
        if self.database_path.as_os_str() == IN_MEMORY {
            PersistenceEngine::open_in_memory(&self.quest.persistence)
        } else {
            PersistenceEngine::open(&self.database_path, &self.quest.persistence)
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise from
/// `quest.general.log_level`. Returns `false` if a subscriber was already
/// installed, which is expected when the server has its own.
pub fn init_tracing(config: &HostConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.quest.general.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.json_logs {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
