//! Presentation sequences and the queue that plays them.
//!
//! A [`Sequence`] is a tick-driven state machine: the [`Sequencer`] starts it,
//! ticks it once per engine tick until it reports
//! [`SequenceStatus::Finished`], then ends it. Only one sequence runs at a
//! time and the engine does not advance its phase while one is running.
mod animation;
mod dialogue;
mod params;
mod script;
mod sequencer;

use std::fmt;

pub use animation::AnimationSequence;
pub use dialogue::DialogueSequence;
pub use params::{Address, DispatchError};
pub use script::{ActionKind, AnimationScript, ScriptError, ScriptLine};
pub use sequencer::Sequencer;

use crate::context::BattleContext;
use crate::env::Presentation;

/// Result of one sequence tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceStatus {
    Running,
    Finished,
}

/// Unit of queued presentation.
pub trait Sequence: Send + fmt::Debug {
    fn name(&self) -> &str;

    /// Called once, on the tick the sequence leaves the queue.
    fn start(&mut self, ctx: &mut BattleContext<'_>, stage: &mut dyn Presentation);

    /// Advances the sequence by one tick.
    ///
    /// Called for the first time on the same tick as [`start`](Self::start).
    fn tick(
        &mut self,
        ctx: &mut BattleContext<'_>,
        stage: &mut dyn Presentation,
    ) -> SequenceStatus;

    /// Called once, on the tick the sequence finishes.
    fn end(&mut self, _ctx: &mut BattleContext<'_>, _stage: &mut dyn Presentation) {}
}
