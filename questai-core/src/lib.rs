//! # QUESTAI Core Library
//!
//! Game-agnostic adaptive quests: per-player objectives whose difficulty
//! tunes itself from how players are doing.
//!
//! - **Quests**: kill and collection quests with sticky per-player
//!   completion and one-time rewards ([`quest`])
//! - **Generator**: tiered procedural quests scaled by a per-player
//!   [`DifficultyTuning`] ([`generator`])
//! - **Agent**: tabular Q-learning over [`GameState`] × [`QuestAction`]
//!   ([`learning`])
//! - **Manager**: the completion sweep that rewards, replaces and feeds the
//!   agent ([`manager`])
//!
//! The host game plugs in through the traits in [`host`]. Everything runs on
//! the caller's thread; time is passed in explicitly as a [`Timestamp`].

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod generator;
pub mod host;
pub mod learning;
pub mod manager;
pub mod message;
pub mod persistence;
pub mod quest;
pub mod types;

pub use config::{QuestConfig, RegenerationPolicy};
pub use error::QuestError;
pub use generator::{DifficultyTuning, QuestGenerator};
pub use host::{HeadlessHost, QuestHost};
pub use learning::{GameState, QLearning, QuestAction};
pub use manager::{QuestManager, SweepReport};
pub use message::{Color, StyledText};
pub use quest::{CompletionState, Quest, QuestKind};
pub use types::*;
