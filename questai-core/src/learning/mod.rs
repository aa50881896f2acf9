//! Adaptive difficulty: RL state, actions, the tabular agent and reward
//! shaping.

pub mod action;
pub mod qlearning;
pub mod reward;
pub mod state;

pub use action::QuestAction;
pub use qlearning::{QEntry, QLearning};
pub use reward::shape_reward;
pub use state::GameState;
