//! Clock-driven battle loop.
//!
//! [`BattleRuntime`] owns the engine, the presentation stage and the source
//! of player intent. Each [`step`](BattleRuntime::step) asks the provider for
//! any missing player commands, advances the engine by one tick and fans the
//! produced events out on the [`EventBus`]. [`run`](BattleRuntime::run)
//! repeats that on a tokio interval until the battle ends.

use std::sync::Arc;

use battle_content::ContentBundle;
use battle_core::error::report;
use battle_core::{
    BattleCommand, BattleEngine, EntityId, HeadlessStage, Outcome, PcgRng, Presentation,
};
use tokio::time::{self, MissedTickBehavior};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus};
use crate::provider::{ActionProvider, AutoPilot, PlayerView};

/// Result of a single [`BattleRuntime::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Running,
    Over(Outcome),
    /// The configured tick budget ran out first.
    BudgetExhausted,
}

/// What a finished [`BattleRuntime::run`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub turns: u32,
    /// `None` when the tick budget stopped the loop.
    pub outcome: Option<Outcome>,
}

pub struct BattleRuntime<S: Presentation = HeadlessStage> {
    engine: BattleEngine,
    stage: S,
    provider: Box<dyn ActionProvider>,
    bus: EventBus,
    config: RuntimeConfig,
    ticks: u64,
}

impl BattleRuntime<HeadlessStage> {
    /// Builds a headless battle from loaded content.
    ///
    /// The seed is resolved once and shared: the engine RNG uses it as is and
    /// the autopilot a rotated copy, so a seeded run replays exactly.
    pub fn from_bundle(bundle: ContentBundle, config: RuntimeConfig) -> Result<Self> {
        let seed = config.resolve_seed();
        tracing::info!(seed, "starting battle");

        let mut engine = BattleEngine::new(
            Arc::new(bundle.catalog),
            bundle.config,
            Box::new(PcgRng::seeded(seed)),
        );
        engine.add_player(bundle.player.template, bundle.player.loadout);
        for enemy in bundle.enemies {
            engine.add_enemy(enemy);
        }

        Ok(Self::new(engine, HeadlessStage::new(), config)?
            .with_provider(AutoPilot::seeded(seed.rotate_left(32))))
    }
}

impl<S: Presentation> BattleRuntime<S> {
    /// Wraps an engine that already has its combatants.
    ///
    /// Players are driven by an idle provider until one is installed with
    /// [`with_provider`](Self::with_provider).
    pub fn new(engine: BattleEngine, stage: S, config: RuntimeConfig) -> Result<Self> {
        if engine.players().is_empty() {
            return Err(RuntimeError::NoPlayers);
        }
        let bus = EventBus::with_capacity(config.event_capacity);
        Ok(Self {
            engine,
            stage,
            provider: Box::new(crate::provider::IdleProvider),
            bus,
            config,
            ticks: 0,
        })
    }

    pub fn with_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    /// Replaces the bus, e.g. to share one created before the runtime.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn engine(&self) -> &BattleEngine {
        &self.engine
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Submits a command on behalf of a player, bypassing the provider.
    pub fn submit(&mut self, player: EntityId, command: BattleCommand) -> Result<()> {
        self.engine
            .submit(player, command)
            .map_err(|source| RuntimeError::Command { player, source })
    }

    /// Advances the battle by one tick.
    pub fn step(&mut self) -> StepStatus {
        if let Some(outcome) = self.engine.outcome() {
            return StepStatus::Over(outcome);
        }
        if self.budget_spent() {
            return StepStatus::BudgetExhausted;
        }

        self.poll_provider();
        self.engine.tick(&mut self.stage);
        self.ticks += 1;

        let tick = self.ticks;
        for event in self.engine.drain_events() {
            self.bus.publish(Event { tick, event });
        }

        match self.engine.outcome() {
            Some(outcome) => StepStatus::Over(outcome),
            None if self.budget_spent() => StepStatus::BudgetExhausted,
            None => StepStatus::Running,
        }
    }

    /// Steps the battle at the configured tick rate until it ends.
    pub async fn run(&mut self) -> RunSummary {
        let mut interval = time::interval(self.config.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let outcome = loop {
            interval.tick().await;
            match self.step() {
                StepStatus::Running => {}
                StepStatus::Over(outcome) => break Some(outcome),
                StepStatus::BudgetExhausted => {
                    tracing::warn!(ticks = self.ticks, "tick budget exhausted");
                    break None;
                }
            }
        };

        let summary = RunSummary {
            ticks: self.ticks,
            turns: self.engine.state().turn,
            outcome,
        };
        tracing::info!(?summary, "battle loop stopped");
        summary
    }

    fn budget_spent(&self) -> bool {
        self.config.max_ticks.is_some_and(|max| self.ticks >= max)
    }

    fn poll_provider(&mut self) {
        let waiting = self.engine.awaiting_input();
        if waiting.is_empty() {
            return;
        }

        let state = self.engine.state();
        let enemies: Vec<EntityId> = self
            .engine
            .enemies()
            .iter()
            .copied()
            .filter(|&id| state.is_alive(id))
            .collect();

        let mut commands = Vec::with_capacity(waiting.len());
        for player in waiting {
            let Some(entity) = state.entity(player) else {
                continue;
            };
            let view = PlayerView {
                player: entity,
                hand: self.engine.hand(player).unwrap_or_default(),
                enemies: &enemies,
            };
            if let Some(command) = self.provider.provide(&view) {
                commands.push((player, command));
            }
        }

        for (player, command) in commands {
            if let Err(err) = self.engine.submit(player, command) {
                report(&err, "provider_command");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::QueuedProvider;
    use battle_core::{BattleConfig, BattlePhase, Catalog};

    #[test]
    fn engine_without_players_is_rejected() {
        let engine = BattleEngine::new(
            Arc::new(Catalog::default()),
            BattleConfig::default(),
            Box::new(PcgRng::seeded(1)),
        );
        let result = BattleRuntime::new(engine, HeadlessStage::new(), RuntimeConfig::default());
        assert!(matches!(result, Err(RuntimeError::NoPlayers)));
    }

    #[test]
    fn budget_stops_the_loop() {
        let bundle = battle_content::builtin::load().unwrap();
        let config = RuntimeConfig {
            seed: Some(5),
            max_ticks: Some(3),
            ..RuntimeConfig::default()
        };
        let mut runtime = BattleRuntime::from_bundle(bundle, config).unwrap();

        assert_eq!(runtime.step(), StepStatus::Running);
        assert_eq!(runtime.step(), StepStatus::Running);
        assert_eq!(runtime.step(), StepStatus::BudgetExhausted);
        assert_eq!(runtime.step(), StepStatus::BudgetExhausted);
        assert_eq!(runtime.ticks(), 3);
    }

    #[test]
    fn idle_players_hold_the_battle_at_input() {
        let bundle = battle_content::builtin::load().unwrap();
        let config = RuntimeConfig {
            seed: Some(5),
            ..RuntimeConfig::default()
        };
        let mut runtime = BattleRuntime::from_bundle(bundle, config)
            .unwrap()
            .with_provider(crate::provider::IdleProvider);

        for _ in 0..5_000 {
            runtime.step();
        }
        assert_eq!(runtime.engine().phase(), BattlePhase::AwaitingPlayerInput);
        assert_eq!(runtime.engine().state().turn, 0);
    }

    #[test]
    fn submitted_commands_outside_input_are_wrapped() {
        let bundle = battle_content::builtin::load().unwrap();
        let mut runtime = BattleRuntime::from_bundle(bundle, RuntimeConfig::default())
            .unwrap()
            .with_provider(QueuedProvider::default());
        let hero = runtime.engine().players()[0];

        let err = runtime.submit(hero, BattleCommand::Defend).unwrap_err();
        assert!(matches!(err, RuntimeError::Command { player, .. } if player == hero));
    }
}
