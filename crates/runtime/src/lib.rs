//! Runtime that drives a battle in real time.
//!
//! The engine in `battle-core` only moves when ticked. This crate supplies
//! the clock ([`BattleRuntime::run`]), the player intent
//! ([`ActionProvider`]) and the fan-out of battle events to subscribers
//! ([`EventBus`]). Frontends pick the pieces they need:
//!
//! - a CLI runs the whole loop headless under an [`AutoPilot`]
//! - an interactive client feeds commands through [`QueuedProvider`] or
//!   [`BattleRuntime::submit`] and steps the runtime from its own frame loop
pub mod config;
pub mod error;
pub mod events;
pub mod provider;
pub mod runtime;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use events::{Event, EventBus, Topic};
pub use provider::{ActionProvider, AutoPilot, IdleProvider, PlayerView, QueuedProvider};
pub use runtime::{BattleRuntime, RunSummary, StepStatus};
