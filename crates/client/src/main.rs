//! `hero` - plays a battle in the terminal.
//!
//! Composition root that assembles:
//! 1. Configuration from the environment (and `.env`)
//! 2. Content from `HERO_CONTENT_DIR` or the built-in set
//! 3. The battle runtime, driven by the autopilot
//! 4. A transcript printer subscribed to the event bus
//!
//! ```bash
//! HERO_SEED=7 HERO_TICK_RATE=240 hero
//! HERO_TRANSCRIPT=json HERO_MAX_TICKS=5000 hero > battle.jsonl
//! ```

mod logging;
mod transcript;

use anyhow::{Context, Result};
use battle_content::{ContentBundle, ContentFactory, builtin};
use battle_runtime::{BattleRuntime, RuntimeConfig};
use transcript::TranscriptFormat;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    // 1. Configuration
    let config = RuntimeConfig::from_env();
    let _guard = logging::setup_logging()?;
    tracing::info!(?config, "starting hero");

    // 2. Content
    let bundle = load_content(&config)?;

    // 3. Runtime
    let mut runtime = BattleRuntime::from_bundle(bundle, config)?;

    // 4. Transcript
    let format = TranscriptFormat::from_env();
    let printer = transcript::spawn(runtime.bus(), format);

    let summary = runtime.run().await;
    // Dropping the runtime closes the bus and lets the printer finish.
    drop(runtime);
    printer.await.context("transcript printer panicked")?;

    tracing::info!(?summary, "battle finished");
    if format == TranscriptFormat::Json {
        return Ok(());
    }
    match summary.outcome {
        Some(outcome) => println!(
            "{outcome} after {} turns ({} ticks)",
            summary.turns, summary.ticks
        ),
        None => println!(
            "stopped after {} turns ({} ticks), tick budget reached",
            summary.turns, summary.ticks
        ),
    }
    Ok(())
}

fn load_content(config: &RuntimeConfig) -> Result<ContentBundle> {
    match &config.content_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "loading content");
            ContentFactory::new(dir).load()
        }
        None => builtin::load().context("built-in content is invalid"),
    }
}
