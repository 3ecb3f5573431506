use std::collections::VecDeque;

use tracing::debug;

use super::{Sequence, SequenceStatus};
use crate::context::BattleContext;
use crate::env::Presentation;

/// FIFO runner that plays one [`Sequence`] at a time.
///
/// A tick either starts the next queued sequence and ticks it once, or ticks
/// the running one. A sequence that finishes is ended on the same tick; the
/// next one starts on the following tick.
#[derive(Debug, Default)]
pub struct Sequencer {
    queue: VecDeque<Box<dyn Sequence>>,
    current: Option<Box<dyn Sequence>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, sequence: Box<dyn Sequence>) {
        self.queue.push_back(sequence);
    }

    /// Whether a sequence is running or waiting to run.
    pub fn is_active(&self) -> bool {
        self.current.is_some() || !self.queue.is_empty()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Name of the running sequence.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref().map(|sequence| sequence.name())
    }

    pub fn tick(&mut self, ctx: &mut BattleContext<'_>, stage: &mut dyn Presentation) {
        if self.current.is_none() {
            let Some(mut next) = self.queue.pop_front() else {
                return;
            };
            debug!(sequence = next.name(), queued = self.queue.len(), "sequence started");
            next.start(ctx, stage);
            self.current = Some(next);
        }

        if let Some(sequence) = self.current.as_mut() {
            if sequence.tick(ctx, stage) == SequenceStatus::Finished {
                sequence.end(ctx, stage);
                debug!(sequence = sequence.name(), "sequence finished");
                self.current = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::HeadlessStage;
    use crate::sequence::DialogueSequence;
    use crate::testing::Fixture;

    #[test]
    fn plays_in_order_one_at_a_time() {
        let mut fx = Fixture::duel();
        let mut ctx = fx.context();
        let mut stage = HeadlessStage::new().manual_advance();
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Box::new(DialogueSequence::new("first")));
        sequencer.enqueue(Box::new(DialogueSequence::new("second")));

        sequencer.tick(&mut ctx, &mut stage);
        sequencer.tick(&mut ctx, &mut stage);
        assert_eq!(stage.dialogue, vec!["first".to_owned()]);
        assert!(sequencer.is_active());

        stage.press_advance();
        sequencer.tick(&mut ctx, &mut stage);
        assert_eq!(sequencer.current(), None);
        assert_eq!(sequencer.queued(), 1);

        sequencer.tick(&mut ctx, &mut stage);
        assert_eq!(stage.dialogue, vec!["first".to_owned(), "second".to_owned()]);

        stage.press_advance();
        sequencer.tick(&mut ctx, &mut stage);
        assert!(!sequencer.is_active());
    }
}
