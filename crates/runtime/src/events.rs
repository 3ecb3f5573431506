//! Topic-based event bus.
//!
//! Battle events are routed by topic so a dialogue log, a renderer and a
//! recorder can each subscribe to only what they consume. Publishing is
//! best-effort: events published while a topic has no subscriber are
//! dropped, and slow subscribers observe `Lagged` instead of blocking the
//! battle.

use std::collections::HashMap;
use std::sync::Arc;

use battle_core::BattleEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Phase changes, casts, defeats, game over.
    Battle,
    /// Lines queued for the dialogue box.
    Dialogue,
    /// Sequences queued for playback.
    Sequence,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Battle, Topic::Dialogue, Topic::Sequence];
}

/// A battle event stamped with the runtime tick that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub tick: u64,
    pub event: BattleEvent,
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self.event {
            BattleEvent::DialogueQueued { .. } => Topic::Dialogue,
            BattleEvent::SequenceQueued { .. } => Topic::Sequence,
            _ => Topic::Battle,
        }
    }
}

/// Topic-based event bus.
///
/// Receivers can be polled with `try_recv` outside an async context.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(crate::RuntimeConfig::DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a bus with `capacity` buffered events per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();
        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publishes an event to its topic. Returns the number of receivers.
    pub fn publish(&self, event: Event) -> usize {
        let topic = event.topic();
        let Some(tx) = self.channels.get(&topic) else {
            return 0;
        };
        match tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!(?topic, "no subscribers for topic");
                0
            }
        }
    }

    pub fn subscribe(&self, topic: Topic) -> Option<broadcast::Receiver<Event>> {
        self.channels.get(&topic).map(broadcast::Sender::subscribe)
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .filter_map(|&topic| self.subscribe(topic).map(|rx| (topic, rx)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattlePhase, EntityId};

    fn event(event: BattleEvent) -> Event {
        Event { tick: 3, event }
    }

    #[test]
    fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut dialogue = bus.subscribe(Topic::Dialogue).unwrap();
        let mut battle = bus.subscribe(Topic::Battle).unwrap();

        bus.publish(event(BattleEvent::DialogueQueued {
            text: "A Slime approaches!".into(),
        }));
        bus.publish(event(BattleEvent::PhaseChanged {
            from: BattlePhase::BattleStart,
            to: BattlePhase::TurnStart,
        }));

        assert!(matches!(
            dialogue.try_recv().unwrap().event,
            BattleEvent::DialogueQueued { .. }
        ));
        assert!(dialogue.try_recv().is_err());
        assert!(matches!(
            battle.try_recv().unwrap().event,
            BattleEvent::PhaseChanged { .. }
        ));
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::with_capacity(1);
        let delivered = bus.publish(event(BattleEvent::PlayerDefeated {
            entity: EntityId(0),
            name: "Hero".into(),
        }));
        assert_eq!(delivered, 0);
    }

    #[test]
    fn slow_subscribers_lag_instead_of_blocking() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe(Topic::Sequence).unwrap();
        for name in ["a", "b", "c"] {
            bus.publish(event(BattleEvent::SequenceQueued { name: name.into() }));
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
    }
}
