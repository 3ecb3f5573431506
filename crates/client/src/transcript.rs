//! Prints the battle as it happens.

use std::io::Write;

use battle_core::BattleEvent;
use battle_runtime::{Event, EventBus, Topic};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// How the transcript is written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// Dialogue lines and the final result.
    #[default]
    Text,
    /// Every event as one JSON object per line.
    Json,
}

impl TranscriptFormat {
    /// Reads `HERO_TRANSCRIPT` (`text` or `json`).
    pub fn from_env() -> Self {
        match std::env::var("HERO_TRANSCRIPT").ok().as_deref() {
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Spawns a task that prints events until the bus is dropped.
pub fn spawn(bus: &EventBus, format: TranscriptFormat) -> JoinHandle<()> {
    let mut battle = bus.subscribe(Topic::Battle);
    let mut dialogue = bus.subscribe(Topic::Dialogue);
    let mut sequence = bus.subscribe(Topic::Sequence);

    tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while battle.is_some() || dialogue.is_some() || sequence.is_some() {
            let event = tokio::select! {
                event = next(&mut dialogue) => event,
                event = next(&mut battle) => event,
                event = next(&mut sequence) => event,
            };
            let Some(event) = event else {
                continue;
            };
            if let Err(err) = write_event(&mut stdout, &event, format) {
                tracing::error!(%err, "failed to write transcript");
                break;
            }
        }
    })
}

/// Next event of an open receiver. Closes the slot once the bus is gone.
async fn next(slot: &mut Option<Receiver<Event>>) -> Option<Event> {
    let Some(rx) = slot else {
        return std::future::pending().await;
    };
    let received = rx.recv().await;
    match received {
        Ok(event) => Some(event),
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "transcript fell behind");
            None
        }
        Err(RecvError::Closed) => {
            *slot = None;
            None
        }
    }
}

fn write_event(out: &mut impl Write, event: &Event, format: TranscriptFormat) -> std::io::Result<()> {
    match format {
        TranscriptFormat::Json => {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)
        }
        TranscriptFormat::Text => match &event.event {
            BattleEvent::DialogueQueued { text } => writeln!(out, "{text}"),
            BattleEvent::GameOver { outcome } => writeln!(out, "== {outcome} =="),
            _ => Ok(()),
        },
    }
}
