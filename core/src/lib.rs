//! Debt Trap core: a month-by-month personal finance survival game.
//!
//! The engine is a pure state machine: a `GameState` and a `GameAction`
//! go in, the next `GameState` and a list of `SimEvent`s come out.
//! Persistence (leaderboard, saved sessions, event log) lives in `store`
//! and is driven by the host, never by the engine.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod life_event;
pub mod loan;
pub mod metrics;
pub mod rng;
pub mod score;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod terminal;
pub mod types;

pub use command::GameAction;
pub use config::{GameConfig, RuleConfig};
pub use engine::{transition, ActionOutcome, GameEngine, Transition};
pub use error::{Rejection, SimError, SimResult};
pub use event::SimEvent;
pub use state::{GameState, HistoryPoint};
