use tracing::trace;

use super::{Sequence, SequenceStatus};
use crate::context::BattleContext;
use crate::env::{DialogueDisplay, Presentation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DialogueState {
    /// Box not shown yet.
    Waiting,
    Printing,
}

/// Shows one line in the dialogue box.
///
/// Waits until the box is ready, then starts the typewriter. An advance
/// input while the text is still printing completes it; an advance input
/// after that ends the sequence.
#[derive(Clone, Debug)]
pub struct DialogueSequence {
    text: String,
    state: DialogueState,
}

impl DialogueSequence {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: DialogueState::Waiting,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Sequence for DialogueSequence {
    fn name(&self) -> &str {
        "dialogue"
    }

    fn start(&mut self, _ctx: &mut BattleContext<'_>, stage: &mut dyn Presentation) {
        self.state = DialogueState::Waiting;
        stage.clear_dialogue();
    }

    fn tick(
        &mut self,
        _ctx: &mut BattleContext<'_>,
        stage: &mut dyn Presentation,
    ) -> SequenceStatus {
        if self.state == DialogueState::Waiting {
            if !stage.dialogue_ready() {
                return SequenceStatus::Running;
            }
            trace!(text = %self.text, "printing dialogue");
            stage.begin_dialogue(&self.text);
            self.state = DialogueState::Printing;
        }

        if stage.take_advance() {
            if stage.dialogue_printing() {
                stage.complete_dialogue(&self.text);
            } else {
                return SequenceStatus::Finished;
            }
        }
        SequenceStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::HeadlessStage;
    use crate::testing::Fixture;

    #[test]
    fn waits_for_box_then_prints() {
        let mut fx = Fixture::duel();
        let mut ctx = fx.context();
        let mut stage = HeadlessStage::new().manual_advance();
        stage.set_box_ready(false);
        let mut line = DialogueSequence::new("Slime approaches!");

        line.start(&mut ctx, &mut stage);
        assert_eq!(line.tick(&mut ctx, &mut stage), SequenceStatus::Running);
        assert!(stage.dialogue.is_empty());

        stage.set_box_ready(true);
        assert_eq!(line.tick(&mut ctx, &mut stage), SequenceStatus::Running);
        assert_eq!(stage.shown_text(), "Slime approaches!");

        stage.press_advance();
        assert_eq!(line.tick(&mut ctx, &mut stage), SequenceStatus::Finished);
    }

    #[test]
    fn first_advance_completes_printing_text() {
        let mut fx = Fixture::duel();
        let mut ctx = fx.context();
        let mut stage = HeadlessStage::new().slow_typewriter();
        let mut line = DialogueSequence::new("Critical Hit!");

        line.start(&mut ctx, &mut stage);
        assert_eq!(line.tick(&mut ctx, &mut stage), SequenceStatus::Running);
        assert!(stage.dialogue_printing());

        stage.press_advance();
        assert_eq!(line.tick(&mut ctx, &mut stage), SequenceStatus::Running);
        assert!(!stage.dialogue_printing());

        stage.press_advance();
        assert_eq!(line.tick(&mut ctx, &mut stage), SequenceStatus::Finished);
    }
}
