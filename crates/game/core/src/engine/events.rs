//! Notifications produced while the engine ticks.
//!
//! Battle logic never talks to the presentation layer or the runtime bus
//! directly. It pushes [`BattleEvent`]s and queues [`Sequence`]s into a
//! [`BattleFeed`]; the engine moves sequences into its sequencer and the
//! runtime drains events after every tick.

use tracing::trace;

use super::{BattlePhase, Outcome};
use crate::sequence::{DialogueSequence, Sequence};
use crate::state::EntityId;

/// Something the presentation or runtime layer may want to react to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum BattleEvent {
    PhaseChanged {
        from: BattlePhase,
        to: BattlePhase,
    },
    PlayerInitialized {
        entity: EntityId,
        name: String,
    },
    EnemyInitialized {
        entity: EntityId,
        name: String,
    },
    /// A player was dealt a fresh hand.
    HandDealt {
        entity: EntityId,
        spells: Vec<String>,
    },
    DialogueQueued {
        text: String,
    },
    SequenceQueued {
        name: String,
    },
    CastResolved {
        user: EntityId,
        target: EntityId,
        spell: String,
        success: bool,
        /// Damage shown to the player, capped at the hit that defeats the target.
        damage: i32,
        critical: bool,
    },
    EnemyDefeated {
        entity: EntityId,
        name: String,
    },
    PlayerDefeated {
        entity: EntityId,
        name: String,
    },
    GameOver {
        outcome: Outcome,
    },
}

/// Outbox filled during a tick.
#[derive(Debug, Default)]
pub struct BattleFeed {
    events: Vec<BattleEvent>,
    sequences: Vec<Box<dyn Sequence>>,
}

impl BattleFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        trace!(?event, "battle event");
        self.events.push(event);
    }

    /// Queues a line of dialogue for the dialogue box.
    pub fn queue_dialogue(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.sequences
            .push(Box::new(DialogueSequence::new(text.clone())));
        self.push(BattleEvent::DialogueQueued { text });
    }

    pub fn queue_sequence(&mut self, sequence: Box<dyn Sequence>) {
        let name = sequence.name().to_owned();
        self.sequences.push(sequence);
        self.push(BattleEvent::SequenceQueued { name });
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Removes the queued sequences in queue order.
    pub fn take_sequences(&mut self) -> Vec<Box<dyn Sequence>> {
        std::mem::take(&mut self.sequences)
    }

    pub fn pending_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Every dialogue line queued so far and not yet drained.
    pub fn dialogue_lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::DialogueQueued { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}
