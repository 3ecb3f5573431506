//! Sources of player intent.
//!
//! The runtime asks a provider for a command whenever a player is waiting
//! for input. Providers answer synchronously and may decline; the runtime
//! simply asks again on the next tick, which is how an interactive frontend
//! waits for a key press without blocking the clock.

use std::collections::VecDeque;
use std::sync::Arc;

use battle_core::{BattleCommand, EntityId, EntityState, PcgRng, RandomSource, Spell};

/// Read-only view of a player that has to choose an action.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView<'a> {
    pub player: &'a EntityState,
    /// Spells dealt this turn, by hand slot.
    pub hand: &'a [Arc<Spell>],
    /// Living enemies in registration order.
    pub enemies: &'a [EntityId],
}

pub trait ActionProvider: Send {
    /// Returns the player's command, or `None` to be asked again next tick.
    fn provide(&mut self, view: &PlayerView<'_>) -> Option<BattleCommand>;
}

/// Never answers. Useful when commands arrive through
/// [`BattleRuntime::submit`](crate::BattleRuntime::submit) instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleProvider;

impl ActionProvider for IdleProvider {
    fn provide(&mut self, _view: &PlayerView<'_>) -> Option<BattleCommand> {
        None
    }
}

/// Replays a fixed list of commands, one per request.
#[derive(Clone, Debug, Default)]
pub struct QueuedProvider {
    commands: VecDeque<BattleCommand>,
}

impl QueuedProvider {
    pub fn new(commands: impl IntoIterator<Item = BattleCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    pub fn push(&mut self, command: BattleCommand) {
        self.commands.push_back(command);
    }

    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

impl ActionProvider for QueuedProvider {
    fn provide(&mut self, _view: &PlayerView<'_>) -> Option<BattleCommand> {
        self.commands.pop_front()
    }
}

/// Plays for the player with random but sensible choices.
///
/// Picks a random enemy, defends now and then when low on HP, and otherwise
/// flips between the basic attack and an affordable spell from the hand.
#[derive(Clone, Debug)]
pub struct AutoPilot {
    rng: PcgRng,
    defend_below: f32,
}

impl AutoPilot {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: PcgRng::seeded(seed),
            defend_below: 0.25,
        }
    }

    /// HP fraction under which the pilot starts to consider defending.
    pub fn defend_below(mut self, fraction: f32) -> Self {
        self.defend_below = fraction;
        self
    }
}

impl ActionProvider for AutoPilot {
    fn provide(&mut self, view: &PlayerView<'_>) -> Option<BattleCommand> {
        if view.enemies.is_empty() {
            return None;
        }
        if view.player.hp_fraction() < self.defend_below && self.rng.coin_flip() {
            return Some(BattleCommand::Defend);
        }

        let target = Some(view.enemies[self.rng.index(view.enemies.len())]);
        let affordable: Vec<usize> = view
            .hand
            .iter()
            .enumerate()
            .filter(|(_, spell)| spell.cost <= view.player.mp)
            .map(|(slot, _)| slot)
            .collect();
        if !affordable.is_empty() && self.rng.coin_flip() {
            let slot = affordable[self.rng.index(affordable.len())];
            return Some(BattleCommand::Cast { slot, target });
        }
        Some(BattleCommand::Attack { target })
    }
}
