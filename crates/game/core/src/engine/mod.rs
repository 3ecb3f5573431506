//! Turn scheduling.
//!
//! [`BattleEngine`] owns the battle state and drives it through the
//! [`BattlePhase`]s one tick at a time. Every wait (for the battle to fill
//! up, for player input, for queued sequences to finish) is a phase plus a
//! resume condition checked once per tick; nothing blocks.
//!
//! Each tick:
//!
//! 1. ticks the [`Sequencer`],
//! 2. moves newly queued sequences into it,
//! 3. advances the phase by at most one step,
//! 4. moves the sequences that step queued.
//!
//! Phases that wait on presentation never advance while the sequencer is
//! active, so every queued line and animation plays, in order, before the
//! battle logic moves on.
mod command;
mod controller;
mod events;
mod phase;

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};

pub use command::{BattleCommand, CommandError};
pub use controller::{Hand, PlayerLoadout, choose_enemy_action, deal_hand};
pub use events::{BattleEvent, BattleFeed};
pub use phase::{BattlePhase, Outcome};

use controller::PlayerSeat;

use crate::config::BattleConfig;
use crate::context::BattleContext;
use crate::effect::{Hook, exec};
use crate::env::{Catalog, Presentation, RandomSource};
use crate::error::report;
use crate::sequence::{AnimationSequence, Sequencer};
use crate::spell::{Spell, cast_spell};
use crate::state::{
    BattleState, CastId, Controller, EntityId, EntityState, EntityTemplate, turn_order,
};

/// Everything a [`BattleContext`] borrows from the engine.
struct World {
    state: BattleState,
    catalog: Arc<Catalog>,
    rng: Box<dyn RandomSource>,
    feed: BattleFeed,
    config: BattleConfig,
}

impl World {
    fn context(&mut self) -> BattleContext<'_> {
        BattleContext {
            state: &mut self.state,
            catalog: &self.catalog,
            rng: self.rng.as_mut(),
            feed: &mut self.feed,
            config: &self.config,
        }
    }
}

/// What action resolution is waiting for before the next actor moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Nothing,
    /// Cast presentation; the cast's effects activate once it finishes.
    Cast(CastId),
    /// Presentation queued by effect activation.
    Effects,
}

#[derive(Clone, Debug)]
enum Flow {
    BattleStart { introduced: bool },
    TurnStart,
    AwaitingPlayerInput,
    ActionSelection,
    ActionResolution {
        order: VecDeque<EntityId>,
        pending: Pending,
    },
    TurnEnd { effects_run: bool },
    GameOver(Outcome),
}

impl Flow {
    fn phase(&self) -> BattlePhase {
        match self {
            Flow::BattleStart { .. } => BattlePhase::BattleStart,
            Flow::TurnStart => BattlePhase::TurnStart,
            Flow::AwaitingPlayerInput => BattlePhase::AwaitingPlayerInput,
            Flow::ActionSelection => BattlePhase::ActionSelection,
            Flow::ActionResolution { .. } => BattlePhase::ActionResolution,
            Flow::TurnEnd { .. } => BattlePhase::TurnEnd,
            Flow::GameOver(_) => BattlePhase::GameOver,
        }
    }
}

/// Turn-based battle driven by an external clock.
pub struct BattleEngine {
    world: World,
    sequencer: Sequencer,
    flow: Flow,
    players: Vec<EntityId>,
    enemies: Vec<EntityId>,
    seats: BTreeMap<EntityId, PlayerSeat>,
}

impl BattleEngine {
    pub fn new(catalog: Arc<Catalog>, config: BattleConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            world: World {
                state: BattleState::new(),
                catalog,
                rng,
                feed: BattleFeed::new(),
                config,
            },
            sequencer: Sequencer::new(),
            flow: Flow::BattleStart { introduced: false },
            players: Vec::new(),
            enemies: Vec::new(),
            seats: BTreeMap::new(),
        }
    }

    // ===== registration =====

    /// Registers a player-controlled combatant.
    ///
    /// The first player registered is the primary player: the battle is lost
    /// when it falls.
    pub fn add_player(&mut self, template: Arc<EntityTemplate>, loadout: PlayerLoadout) -> EntityId {
        let id = self.spawn(Controller::Player, template);
        self.players.push(id);
        self.seats.insert(id, PlayerSeat::new(loadout));
        let name = self.world.state.name_of(id).to_owned();
        info!(entity = %id, %name, "player joined");
        self.world
            .feed
            .push(BattleEvent::PlayerInitialized { entity: id, name });
        id
    }

    pub fn add_enemy(&mut self, template: Arc<EntityTemplate>) -> EntityId {
        let id = self.spawn(Controller::Enemy, template);
        self.enemies.push(id);
        let name = self.world.state.name_of(id).to_owned();
        info!(entity = %id, %name, "enemy joined");
        self.world
            .feed
            .push(BattleEvent::EnemyInitialized { entity: id, name });
        id
    }

    fn spawn(&mut self, controller: Controller, template: Arc<EntityTemplate>) -> EntityId {
        let k = self.world.config.damage_constant;
        self.world
            .state
            .insert_entity(|id| EntityState::new(id, controller, template, k))
    }

    // ===== queries =====

    pub fn phase(&self) -> BattlePhase {
        self.flow.phase()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.flow {
            Flow::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn state(&self) -> &BattleState {
        &self.world.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.world.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.world.catalog
    }

    pub fn players(&self) -> &[EntityId] {
        &self.players
    }

    pub fn enemies(&self) -> &[EntityId] {
        &self.enemies
    }

    /// Spells dealt to a player this turn.
    pub fn hand(&self, player: EntityId) -> Option<&[Arc<Spell>]> {
        self.seats.get(&player).map(|seat| seat.hand.as_slice())
    }

    /// Living players that still have to choose an action.
    pub fn awaiting_input(&self) -> Vec<EntityId> {
        if !matches!(self.flow, Flow::AwaitingPlayerInput) {
            return Vec::new();
        }
        self.players
            .iter()
            .copied()
            .filter(|id| {
                self.world
                    .state
                    .entity(*id)
                    .is_some_and(|player| !player.dead && player.action.is_none())
            })
            .collect()
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        self.world.feed.drain_events()
    }

    // ===== input =====

    /// Sets a player's action for the current turn.
    ///
    /// A player may change its mind until the last living player has chosen.
    pub fn submit(&mut self, player: EntityId, command: BattleCommand) -> Result<(), CommandError> {
        let result = self.apply_command(player, command);
        if let Err(err) = &result {
            report(err, "engine.submit");
        }
        result
    }

    fn apply_command(&mut self, player: EntityId, command: BattleCommand) -> Result<(), CommandError> {
        if !matches!(self.flow, Flow::AwaitingPlayerInput) {
            return Err(CommandError::NotAcceptingInput {
                phase: self.phase(),
            });
        }
        let entity = self
            .world
            .state
            .entity(player)
            .ok_or(CommandError::UnknownEntity(player))?;
        if entity.dead {
            return Err(CommandError::EntityDefeated(player));
        }
        let seat = self
            .seats
            .get(&player)
            .ok_or(CommandError::NotAPlayer(player))?;

        let (spell, target) = match command {
            BattleCommand::Attack { target } => {
                (Arc::clone(&seat.loadout.attack), self.pick_target(target)?)
            }
            BattleCommand::Defend => (Arc::clone(&seat.loadout.defend), player),
            BattleCommand::Cast { slot, target } => {
                let spell = seat
                    .hand
                    .get(slot)
                    .ok_or(CommandError::HandSlotOutOfRange {
                        slot,
                        len: seat.hand.len(),
                    })?;
                (Arc::clone(spell), self.pick_target(target)?)
            }
        };

        debug!(%player, spell = %spell.name, %target, "action chosen");
        if let Some(entity) = self.world.state.entity_mut(player) {
            entity.action = Some(spell);
            entity.target = Some(target);
        }
        Ok(())
    }

    fn pick_target(&self, requested: Option<EntityId>) -> Result<EntityId, CommandError> {
        match requested {
            Some(target) => {
                let entity = self
                    .world
                    .state
                    .entity(target)
                    .ok_or(CommandError::UnknownEntity(target))?;
                if entity.dead {
                    return Err(CommandError::EntityDefeated(target));
                }
                Ok(target)
            }
            None => self
                .enemies
                .iter()
                .copied()
                .find(|enemy| self.world.state.is_alive(*enemy))
                .ok_or(CommandError::NoTarget),
        }
    }

    // ===== clock =====

    /// Advances the battle by one tick.
    pub fn tick(&mut self, stage: &mut dyn Presentation) {
        {
            let mut ctx = self.world.context();
            self.sequencer.tick(&mut ctx, stage);
        }
        self.flush_sequences();

        let flow = std::mem::replace(&mut self.flow, Flow::TurnStart);
        let next = self.advance(flow);
        self.set_flow(next);

        self.flush_sequences();
    }

    fn flush_sequences(&mut self) {
        for sequence in self.world.feed.take_sequences() {
            self.sequencer.enqueue(sequence);
        }
    }

    fn busy(&self) -> bool {
        self.sequencer.is_active() || self.world.feed.pending_sequences() > 0
    }

    fn set_flow(&mut self, next: Flow) {
        let (from, to) = (self.flow.phase(), next.phase());
        self.flow = next;
        if from != to {
            debug!(from = from.as_str(), to = to.as_str(), "phase changed");
            self.world.feed.push(BattleEvent::PhaseChanged { from, to });
        }
    }

    fn advance(&mut self, flow: Flow) -> Flow {
        match flow {
            Flow::BattleStart { introduced: false } => {
                if self.world.state.entity_count() < self.world.config.min_combatants {
                    return flow;
                }
                self.introduce_enemies();
                Flow::BattleStart { introduced: true }
            }
            Flow::BattleStart { introduced: true } => {
                if self.busy() {
                    flow
                } else {
                    Flow::TurnStart
                }
            }
            Flow::TurnStart => {
                self.start_turn();
                Flow::AwaitingPlayerInput
            }
            Flow::AwaitingPlayerInput => {
                if self.awaiting_input().is_empty() {
                    Flow::ActionSelection
                } else {
                    flow
                }
            }
            Flow::ActionSelection => Flow::ActionResolution {
                order: self.select_actions().into(),
                pending: Pending::Nothing,
            },
            Flow::ActionResolution { order, pending } => self.resolve_actions(order, pending),
            Flow::TurnEnd { effects_run: false } => {
                self.run_turn_end_effects();
                Flow::TurnEnd { effects_run: true }
            }
            Flow::TurnEnd { effects_run: true } => {
                if self.busy() {
                    flow
                } else {
                    self.conclude_turn()
                }
            }
            Flow::GameOver(_) => flow,
        }
    }

    // ===== phases =====

    fn introduce_enemies(&mut self) {
        let lines: Vec<String> = self
            .enemies
            .iter()
            .filter_map(|id| self.world.state.entity(*id))
            .filter(|enemy| !enemy.dead)
            .map(|enemy| {
                format!(
                    "{} approaches!",
                    enemy.template().params.introduction_name()
                )
            })
            .collect();
        info!(enemies = lines.len(), "battle started");
        for line in lines {
            self.world.feed.queue_dialogue(line);
        }
    }

    fn start_turn(&mut self) {
        let ids: Vec<EntityId> = self.world.state.entity_ids().collect();
        {
            let mut ctx = self.world.context();
            for id in &ids {
                if let Some(entity) = ctx.state.entity_mut(*id) {
                    entity.reset_for_turn();
                }
                if ctx.state.is_alive(*id) {
                    exec::run_turn_start(&mut ctx, *id);
                }
            }
            ctx.state.collect_garbage();
        }

        let regen = self.world.config.player_mp_per_turn;
        let hand_size = self.world.config.effective_hand_size();
        for id in self.players.clone() {
            if !self.world.state.is_alive(id) {
                continue;
            }
            if let Some(player) = self.world.state.entity_mut(id) {
                player.modify_mp(regen);
            }
            let Some(seat) = self.seats.get_mut(&id) else {
                continue;
            };
            seat.hand = deal_hand(&seat.loadout.spells, hand_size, self.world.rng.as_mut());
            let spells = seat.hand.iter().map(|spell| spell.name.clone()).collect();
            self.world
                .feed
                .push(BattleEvent::HandDealt { entity: id, spells });
        }
        debug!(turn = self.world.state.turn, "turn started");
    }

    /// Lets every enemy choose, runs move-selected effects and returns the
    /// turn order.
    fn select_actions(&mut self) -> Vec<EntityId> {
        for enemy in self.enemies.clone() {
            if !self.world.state.is_alive(enemy) {
                continue;
            }
            let choice = choose_enemy_action(
                &self.world.state,
                enemy,
                &self.players,
                self.world.rng.as_mut(),
            );
            let Some(entity) = self.world.state.entity_mut(enemy) else {
                continue;
            };
            match choice {
                Some((spell, target)) => {
                    debug!(%enemy, spell = %spell.name, %target, "enemy chose action");
                    entity.action = Some(spell);
                    entity.target = Some(target);
                }
                None => warn!(%enemy, "enemy has no move or no target"),
            }
        }

        let mut ctx = self.world.context();
        let ids: Vec<EntityId> = ctx.state.entity_ids().collect();
        for id in ids {
            if ctx.state.is_alive(id) {
                exec::run_move_selected(&mut ctx, id);
            }
        }
        turn_order(ctx.state, ctx.rng)
    }

    fn resolve_actions(&mut self, mut order: VecDeque<EntityId>, pending: Pending) -> Flow {
        match pending {
            Pending::Cast(cast) => {
                if self.busy() {
                    return Flow::ActionResolution { order, pending };
                }
                self.activate_cast_effects(cast);
                return Flow::ActionResolution {
                    order,
                    pending: Pending::Effects,
                };
            }
            Pending::Effects if self.busy() => {
                return Flow::ActionResolution { order, pending };
            }
            Pending::Effects | Pending::Nothing => {}
        }

        while let Some(actor) = order.pop_front() {
            if let Some(cast) = self.resolve_actor(actor) {
                return Flow::ActionResolution {
                    order,
                    pending: Pending::Cast(cast),
                };
            }
        }
        Flow::TurnEnd { effects_run: false }
    }

    /// Casts the actor's chosen spell, or returns `None` if it cannot act.
    fn resolve_actor(&mut self, actor: EntityId) -> Option<CastId> {
        let state = &self.world.state;
        let entity = state.entity(actor).filter(|entity| !entity.dead)?;
        let spell = Arc::clone(entity.action.as_ref()?);
        let target = entity.target.filter(|target| state.is_alive(*target))?;

        let mut ctx = self.world.context();
        let target_hp = ctx.state.entity(target).map_or(0, |t| t.hp);
        let id = cast_spell(&mut ctx, &spell, actor, target);
        let cast = ctx.state.cast(id)?;
        let (success, critical, hits) = (cast.success, cast.critical(), cast.hit_count());
        let applied = cast.damage_applied(target_hp);

        if let Some(caster) = ctx.state.entity_mut(actor) {
            caster.last_cast = Some(id);
        }
        if let Some(defender) = ctx.state.entity_mut(target) {
            defender.damage_taken += applied;
        }

        let (user_name, target_name) = (
            ctx.state.name_of(actor).to_owned(),
            ctx.state.name_of(target).to_owned(),
        );
        ctx.feed.queue_dialogue(format!(
            "{user_name} casts {} on {target_name}!",
            spell.name
        ));
        if success {
            match &spell.animation {
                Some(script) => {
                    let sequence = AnimationSequence::new(Arc::clone(script), actor, Some(target))
                        .with_cast(id, hits);
                    ctx.feed.queue_sequence(Box::new(sequence));
                }
                None => apply_hits_directly(&mut ctx, id, target, hits),
            }
        } else {
            ctx.feed.queue_dialogue("Failed!");
        }
        if applied > 0 {
            if critical {
                ctx.feed.queue_dialogue("Critical Hit!");
            }
            ctx.feed
                .queue_dialogue(format!("{target_name} takes {applied} damage!"));
        }
        ctx.feed.push(BattleEvent::CastResolved {
            user: actor,
            target,
            spell: spell.name.clone(),
            success,
            damage: applied,
            critical,
        });
        Some(id)
    }

    fn activate_cast_effects(&mut self, cast: CastId) {
        let mut ctx = self.world.context();
        let effects = ctx
            .state
            .cast(cast)
            .map(|cast| cast.effects.clone())
            .unwrap_or_default();
        for instance in effects {
            exec::fire(&mut ctx, instance, Hook::OnActivate);
        }
    }

    fn run_turn_end_effects(&mut self) {
        let mut ctx = self.world.context();
        let ids: Vec<EntityId> = ctx.state.entity_ids().collect();
        for id in ids {
            if !ctx.state.is_alive(id) {
                continue;
            }
            exec::run_remain_active_check(&mut ctx, id);
            exec::run_turn_end(&mut ctx, id);
        }
    }

    fn conclude_turn(&mut self) -> Flow {
        self.world.state.turn += 1;

        let primary_down = self
            .players
            .first()
            .is_none_or(|player| !self.world.state.is_alive(*player));
        if primary_down {
            return self.game_over(Outcome::PlayerDefeated);
        }

        let enemies_down = self
            .enemies
            .iter()
            .all(|enemy| !self.world.state.is_alive(*enemy));
        if !enemies_down {
            return Flow::TurnStart;
        }
        if self.respawn_enemies() {
            Flow::BattleStart { introduced: false }
        } else {
            self.game_over(Outcome::EnemiesExhausted)
        }
    }

    /// Refills every enemy slot from the pool.
    fn respawn_enemies(&mut self) -> bool {
        let World {
            state,
            catalog,
            rng,
            feed,
            config,
        } = &mut self.world;
        if catalog.enemy_pool.is_empty() {
            return false;
        }
        for id in &self.enemies {
            let Some(template) = catalog.enemy_pool.draw(rng.as_mut()) else {
                return false;
            };
            let Some(slot) = state.entity_mut(*id) else {
                continue;
            };
            slot.respawn(template, config.damage_constant);
            let name = slot.name().to_owned();
            info!(entity = %id, %name, "enemy respawned");
            feed.push(BattleEvent::EnemyInitialized { entity: *id, name });
        }
        true
    }

    fn game_over(&mut self, outcome: Outcome) -> Flow {
        info!(%outcome, turns = self.world.state.turn, "battle over");
        self.world.feed.push(BattleEvent::GameOver { outcome });
        Flow::GameOver(outcome)
    }
}

/// Applies every hit of a cast that has no animation to play it.
fn apply_hits_directly(ctx: &mut BattleContext<'_>, cast: CastId, target: EntityId, hits: usize) {
    for _ in 0..hits {
        let damage = ctx
            .state
            .cast_mut(cast)
            .map_or(0, |cast| cast.next_hit_damage());
        ctx.deal_damage(target, damage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Effect, EffectOp, Side};
    use crate::env::{EnemyPool, HeadlessStage, ScriptedRng};
    use crate::sequence::AnimationScript;
    use crate::spell::{EffectGroup, OffensiveParams, SpellKind};
    use crate::state::ModifierKind;
    use crate::testing::template;

    fn strike(power: f32) -> Arc<Spell> {
        Arc::new(Spell::new(
            "Strike",
            SpellKind::Offensive(OffensiveParams {
                power,
                can_critical: false,
                ..OffensiveParams::default()
            }),
        ))
    }

    fn guard() -> Arc<Spell> {
        let guarded = Arc::new(
            Effect::new("Guarded")
                .on(Hook::CheckRemainActive, EffectOp::ActiveForLessThan(1))
                .on(Hook::OnActivate, EffectOp::ApplyTo(Side::User))
                .on(
                    Hook::OnActivate,
                    EffectOp::AddModifier {
                        side: Side::User,
                        kind: ModifierKind::Defense,
                        amount: 0.5,
                        per_turn: false,
                    },
                )
                .on(
                    Hook::OnDeactivate,
                    EffectOp::RemoveModifier {
                        side: Side::User,
                        kind: ModifierKind::Defense,
                        key: None,
                    },
                ),
        );
        Arc::new(
            Spell::new("Defend", SpellKind::Flavor).with_effect(EffectGroup::always(guarded)),
        )
    }

    fn loadout() -> PlayerLoadout {
        PlayerLoadout {
            attack: strike(60.0),
            defend: guard(),
            spells: vec![strike(90.0)],
        }
    }

    fn engine(pool: EnemyPool) -> BattleEngine {
        let mut catalog = Catalog::new();
        catalog.enemy_pool = pool;
        BattleEngine::new(
            Arc::new(catalog),
            BattleConfig::default(),
            Box::new(ScriptedRng::constant(0.5)),
        )
    }

    fn run_until(
        engine: &mut BattleEngine,
        stage: &mut HeadlessStage,
        max_ticks: usize,
        done: impl Fn(&BattleEngine) -> bool,
    ) -> bool {
        for _ in 0..max_ticks {
            if done(engine) {
                return true;
            }
            engine.tick(stage);
        }
        done(engine)
    }

    #[test]
    fn waits_for_combatants_then_introduces_enemies() {
        let mut engine = engine(EnemyPool::default());
        let mut stage = HeadlessStage::new();
        engine.add_player(template("Hero", 50, 10, 50, 50, 50), loadout());
        engine.tick(&mut stage);
        engine.tick(&mut stage);
        assert_eq!(engine.phase(), BattlePhase::BattleStart);

        let mut slime = (*template("Slime", 30, 0, 30, 30, 10)).clone();
        slime.params.article = Some("a".into());
        engine.add_enemy(Arc::new(slime));

        assert!(run_until(&mut engine, &mut stage, 20, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        }));
        assert_eq!(stage.dialogue, vec!["a Slime approaches!".to_owned()]);
        assert_eq!(engine.hand(EntityId(0)).map(<[_]>::len), Some(4));
    }

    #[test]
    fn rejects_input_outside_the_input_window() {
        let mut engine = engine(EnemyPool::default());
        let hero = engine.add_player(template("Hero", 50, 10, 50, 50, 50), loadout());
        let slime = engine.add_enemy(template("Slime", 30, 0, 30, 30, 10));

        let err = engine
            .submit(hero, BattleCommand::Attack { target: None })
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::NotAcceptingInput {
                phase: BattlePhase::BattleStart
            }
        );

        let mut stage = HeadlessStage::new();
        run_until(&mut engine, &mut stage, 20, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        });
        assert_eq!(
            engine.submit(slime, BattleCommand::Defend),
            Err(CommandError::NotAPlayer(slime))
        );
        assert_eq!(
            engine.submit(hero, BattleCommand::Cast { slot: 9, target: None }),
            Err(CommandError::HandSlotOutOfRange { slot: 9, len: 4 })
        );
        assert_eq!(
            engine.submit(hero, BattleCommand::Attack { target: Some(EntityId(7)) }),
            Err(CommandError::UnknownEntity(EntityId(7)))
        );
    }

    #[test]
    fn full_turn_resolves_in_speed_order() {
        let mut engine = engine(EnemyPool::default());
        let mut stage = HeadlessStage::new();
        let hero = engine.add_player(template("Hero", 50, 10, 50, 50, 50), loadout());
        let slime = engine.add_enemy(template("Slime", 30, 0, 30, 30, 10));
        run_until(&mut engine, &mut stage, 20, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        });
        engine.drain_events();

        engine
            .submit(hero, BattleCommand::Attack { target: None })
            .unwrap();
        assert!(run_until(&mut engine, &mut stage, 100, |e| {
            e.state().turn == 1 && e.phase() == BattlePhase::AwaitingPlayerInput
        }));

        let casts: Vec<(EntityId, EntityId)> = engine
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                BattleEvent::CastResolved { user, target, .. } => Some((user, target)),
                _ => None,
            })
            .collect();
        assert_eq!(casts, vec![(hero, slime), (slime, hero)]);
        assert!(stage.dialogue.contains(&"Hero casts Strike on Slime!".to_owned()));
        assert!(stage.dialogue.iter().any(|line| line.starts_with("Slime takes ")));
        let slime_state = engine.state().entity(slime).unwrap();
        assert_eq!(slime_state.max_hp - slime_state.hp, 39);
        assert_eq!(engine.state().turn, 1);
    }

    #[test]
    fn animated_cast_applies_damage_through_the_script() {
        let mut engine = engine(EnemyPool::default());
        let mut stage = HeadlessStage::new();
        let script = Arc::new(
            AnimationScript::parse("slash", "1|ChangeUserAnimation|Attack\n2|ApplyDamage\n3|TerminateAnimation")
                .unwrap(),
        );
        let slash = Arc::new(
            Spell::new(
                "Slash",
                SpellKind::Offensive(OffensiveParams {
                    can_critical: false,
                    ..OffensiveParams::default()
                }),
            )
            .with_animation(script),
        );
        let hero = engine.add_player(
            template("Hero", 50, 10, 50, 50, 50),
            PlayerLoadout {
                attack: slash,
                defend: guard(),
                spells: Vec::new(),
            },
        );
        let slime = engine.add_enemy(template("Slime", 30, 0, 30, 30, 10));
        run_until(&mut engine, &mut stage, 20, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        });
        engine
            .submit(hero, BattleCommand::Attack { target: Some(slime) })
            .unwrap();
        run_until(&mut engine, &mut stage, 100, |e| e.state().turn == 1);

        let wounded = engine.state().entity(slime).unwrap();
        assert!(wounded.hp < wounded.max_hp);
        assert_eq!(
            stage.triggers,
            vec![(crate::env::VisualTarget::Entity(hero), "Attack".to_owned())]
        );
    }

    #[test]
    fn defend_halves_damage_for_one_turn() {
        let mut engine = engine(EnemyPool::default());
        let mut stage = HeadlessStage::new();
        let hero = engine.add_player(template("Hero", 50, 10, 50, 50, 50), loadout());
        engine.add_enemy(template("Slime", 30, 0, 30, 30, 10));
        run_until(&mut engine, &mut stage, 20, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        });

        engine.submit(hero, BattleCommand::Defend).unwrap();
        run_until(&mut engine, &mut stage, 100, |e| {
            e.phase() == BattlePhase::TurnEnd
        });
        let guarded = engine.state().entity(hero).unwrap();
        assert_eq!(guarded.modifiers.defense.get("Guarded"), Some(0.5));
        assert_eq!(guarded.effects.len(), 1);

        run_until(&mut engine, &mut stage, 100, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        });
        engine.submit(hero, BattleCommand::Attack { target: None }).unwrap();
        run_until(&mut engine, &mut stage, 100, |e| e.state().turn == 2);
        let hero_state = engine.state().entity(hero).unwrap();
        assert!(hero_state.effects.is_empty());
        assert!(hero_state.modifiers.defense.is_empty());
    }

    #[test]
    fn defeated_enemies_are_replaced_from_the_pool() {
        let mut pool = EnemyPool::default();
        pool.push(template("Bat", 20, 0, 20, 20, 5), 1);
        let mut engine = engine(pool);
        let mut stage = HeadlessStage::new();
        let hero = engine.add_player(template("Hero", 50, 10, 50, 50, 50), loadout());
        let slime = engine.add_enemy(template("Slime", 1, 0, 1, 1, 1));
        run_until(&mut engine, &mut stage, 20, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        });

        engine
            .submit(hero, BattleCommand::Attack { target: None })
            .unwrap();
        assert!(run_until(&mut engine, &mut stage, 200, |e| {
            e.state().turn == 1 && e.phase() == BattlePhase::AwaitingPlayerInput
        }));

        assert!(stage.dialogue.contains(&"Slime is defeated!".to_owned()));
        assert!(stage.dialogue.contains(&"Bat approaches!".to_owned()));
        let replaced = engine.state().entity(slime).unwrap();
        assert_eq!(replaced.name(), "Bat");
        assert!(!replaced.dead);
    }

    #[test]
    fn empty_pool_ends_the_battle() {
        let mut engine = engine(EnemyPool::default());
        let mut stage = HeadlessStage::new();
        let hero = engine.add_player(template("Hero", 50, 10, 50, 50, 50), loadout());
        engine.add_enemy(template("Slime", 1, 0, 1, 1, 1));
        run_until(&mut engine, &mut stage, 20, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        });
        engine
            .submit(hero, BattleCommand::Attack { target: None })
            .unwrap();

        assert!(run_until(&mut engine, &mut stage, 200, BattleEngine::is_over));
        assert_eq!(engine.outcome(), Some(Outcome::EnemiesExhausted));
        assert!(
            engine
                .drain_events()
                .contains(&BattleEvent::GameOver {
                    outcome: Outcome::EnemiesExhausted
                })
        );
    }

    #[test]
    fn fallen_primary_player_loses() {
        let mut engine = engine(EnemyPool::default());
        let mut stage = HeadlessStage::new();
        let hero = engine.add_player(template("Hero", 1, 10, 1, 1, 1), loadout());
        engine.add_enemy(template("Ogre", 200, 0, 200, 200, 200));
        run_until(&mut engine, &mut stage, 20, |e| {
            e.phase() == BattlePhase::AwaitingPlayerInput
        });
        engine.submit(hero, BattleCommand::Defend).unwrap();

        assert!(run_until(&mut engine, &mut stage, 200, BattleEngine::is_over));
        assert_eq!(engine.outcome(), Some(Outcome::PlayerDefeated));
        assert!(stage.dialogue.contains(&"Hero falls...".to_owned()));
    }
}
