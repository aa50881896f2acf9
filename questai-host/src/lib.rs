//! # questai-host: Host Integration for QUESTAI
//!
//! This crate is the layer between the game-agnostic `questai-core` library
//! and a running game server. The server translates its own callbacks into
//! [`HostEvent`]s (see [`hooks`]) and hands them to a [`QuestSystem`], which
//! drives the quest manager and the save store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Game server                 │
//! │  ┌───────────────────────────────────┐  │
//! │  │       questai-host                │  │
//! │  │  ┌─────────────┐ ┌─────────────┐ │  │
//! │  │  │ Hooks/Bridge│ │ QuestSystem │ │  │
//! │  │  └──────┬──────┘ └──────┬──────┘ │  │
//! │  │         │               │         │  │
//! │  │         ▼               ▼         │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │      questai-core       │    │  │
//! │  │    └─────────────────────────┘    │  │
//! │  └───────────────────────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events`: host events the quest system reacts to
//! - `hooks`: constructors the server calls from its own callbacks
//! - `bridge`: host player handles and target ids to core types
//! - `board`: the quest-board interaction (listing, progress bars, sweep)
//! - `systems`: [`QuestSystem`], session lifecycle and event dispatch
//! - `config`: [`HostConfig`] and tracing setup

#![deny(clippy::unwrap_used)]

pub mod board;
pub mod bridge;
pub mod config;
pub mod events;
pub mod hooks;
pub mod systems;

pub use bridge::PlayerRegistry;
pub use config::{HostConfig, init_tracing};
pub use events::HostEvent;
pub use systems::{EventOutcome, QuestSystem};
