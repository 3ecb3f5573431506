//! Hook execution against the battle state.
//!
//! Every function takes the instance by handle and re-reads it from the
//! arena, so hooks may freely add or remove effects while they run. The
//! per-entity drivers iterate a snapshot of the effect list and skip
//! instances that an earlier hook already removed; instances added during a
//! pass are picked up on the next one.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{Effect, EffectInstance, EffectOp, EffectPhase, Hook, Side};
use crate::context::BattleContext;
use crate::error::report;
use crate::sequence::AnimationSequence;
use crate::state::{BattleState, CastId, EntityId, InstanceId};

// ============================================================================
// Instances
// ============================================================================

/// Creates a pending instance of `effect` and stores it in the arena.
pub fn spawn(
    ctx: &mut BattleContext<'_>,
    effect: &Arc<Effect>,
    user: EntityId,
    target: EntityId,
    cast: Option<CastId>,
) -> InstanceId {
    let id = ctx.state.allocate_instance();
    ctx.state.insert_instance(EffectInstance::new(
        id,
        Arc::clone(effect),
        user,
        target,
        cast,
    ));
    id
}

/// Runs `CheckSuccess` and moves the instance to `Active` or `Rejected`.
pub fn check_success(ctx: &mut BattleContext<'_>, id: InstanceId) -> bool {
    let Some(effect) = ctx.state.instance(id).map(|i| Arc::clone(&i.effect)) else {
        return false;
    };
    let passed = run_check(ctx, id, &effect, Hook::CheckSuccess);
    set_phase(
        ctx.state,
        id,
        if passed {
            EffectPhase::Active
        } else {
            EffectPhase::Rejected
        },
    );
    trace!(effect = %effect.name, passed, "checked effect success");
    passed
}

/// Runs `CheckRemainActive` on an active instance.
///
/// Returns `false`, and rejects the instance, if any gate fails. An instance
/// that is not active fails without running the hook.
pub fn check_remain_active(ctx: &mut BattleContext<'_>, id: InstanceId) -> bool {
    let Some(instance) = ctx.state.instance(id) else {
        return false;
    };
    if !instance.cast_success() {
        return false;
    }
    let effect = Arc::clone(&instance.effect);
    let passed = run_check(ctx, id, &effect, Hook::CheckRemainActive);
    if !passed {
        set_phase(ctx.state, id, EffectPhase::Rejected);
        debug!(effect = %effect.name, "effect expired");
    }
    passed
}

/// Runs an action hook if the instance is active.
pub fn fire(ctx: &mut BattleContext<'_>, id: InstanceId, hook: Hook) {
    let Some(instance) = ctx.state.instance(id) else {
        return;
    };
    if !instance.cast_success() {
        return;
    }
    let effect = Arc::clone(&instance.effect);
    trace!(effect = %effect.name, %hook, "firing effect hook");
    for op in effect.hooks.ops(hook) {
        if op.is_gate() {
            continue;
        }
        perform(ctx, id, &effect, op);
    }
}

fn run_check(ctx: &mut BattleContext<'_>, id: InstanceId, effect: &Effect, hook: Hook) -> bool {
    let mut passed = true;
    for op in effect.hooks.ops(hook) {
        if op.is_gate() {
            passed = passed && evaluate_gate(ctx, id, op);
        } else {
            perform(ctx, id, effect, op);
        }
    }
    passed
}

fn set_phase(state: &mut BattleState, id: InstanceId, phase: EffectPhase) {
    if let Some(instance) = state.instance_mut(id) {
        instance.phase = phase;
    }
}

// ============================================================================
// Operations
// ============================================================================

fn evaluate_gate(ctx: &BattleContext<'_>, id: InstanceId, op: &EffectOp) -> bool {
    let state = &*ctx.state;
    let Some(instance) = state.instance(id) else {
        return false;
    };
    let user = state.entity(instance.user);

    match op {
        EffectOp::ActiveForLessThan(limit) => instance.turns_active < *limit,
        EffectOp::UserLastMoveSucceeded => user
            .and_then(|u| u.last_cast)
            .and_then(|cast| state.cast(cast))
            .is_some_and(|cast| cast.success),
        EffectOp::UserMoveIs(spell) => user
            .and_then(|u| u.action.as_ref())
            .is_some_and(|action| action.name == *spell),
        EffectOp::UserHealthAbove(fraction) => {
            user.is_some_and(|u| u.hp_fraction() > fraction.clamp(0.0, 1.0))
        }
        EffectOp::CurrentMoveIs(spell) => instance
            .cast
            .and_then(|cast| state.cast(cast))
            .is_some_and(|cast| cast.spell.name == *spell),
        _ => true,
    }
}

fn perform(ctx: &mut BattleContext<'_>, id: InstanceId, effect: &Effect, op: &EffectOp) {
    let Some(instance) = ctx.state.instance(id) else {
        return;
    };
    let (user, target, cast, turns_active) = (
        instance.user,
        instance.target,
        instance.cast,
        instance.turns_active,
    );
    let side_entity = |side: &Side| match side {
        Side::User => user,
        Side::Target => target,
    };

    match op {
        EffectOp::SendDialogue(template) => {
            let text = template
                .replace("[user]", ctx.state.name_of(user))
                .replace("[target]", ctx.state.name_of(target));
            ctx.feed.queue_dialogue(text);
        }
        EffectOp::ApplyTo(side) => {
            apply_effect(ctx, side_entity(side), id);
        }
        EffectOp::RemoveFrom(side) => {
            remove_effect(ctx, side_entity(side), id);
        }
        EffectOp::RemoveNamedFrom { side, name } => {
            remove_named_effect(ctx, side_entity(side), name);
        }
        EffectOp::GrantPropertyToUser(name) => {
            let Some(property) = ctx.catalog.effect(name).cloned() else {
                warn!(effect = %effect.name, property = %name, "unknown property effect");
                return;
            };
            let granted = spawn(ctx, &property, user, target, cast);
            if let Some(instance) = ctx.state.instance_mut(granted) {
                instance.turns_active = turns_active;
            }
            if let Some(entity) = ctx.state.entity_mut(user) {
                entity.properties.push(granted);
            }
        }
        EffectOp::ModifyMpFromDamageDealt {
            side,
            scale,
            min,
            max,
        } => {
            let dealt = cast.map_or(0, |cast| damage_applied(ctx.state, cast));
            let amount = scale_clamped(dealt, *scale, *min, *max);
            if let Some(entity) = ctx.state.entity_mut(side_entity(side)) {
                entity.modify_mp(amount);
            }
        }
        EffectOp::ModifyMpFromDamageTaken {
            side,
            scale,
            min,
            max,
        } => {
            if let Some(entity) = ctx.state.entity_mut(side_entity(side)) {
                let amount = scale_clamped(entity.damage_taken, *scale, *min, *max);
                entity.modify_mp(amount);
            }
        }
        EffectOp::AddModifier {
            side,
            kind,
            amount,
            per_turn,
        } => {
            let value = if *per_turn {
                amount.powi(turns_active as i32)
            } else {
                *amount
            };
            if let Some(entity) = ctx.state.entity_mut(side_entity(side)) {
                if let Err(err) = entity.modifiers.add(*kind, effect.name.as_str(), value) {
                    report(&err, "effect.add_modifier");
                }
            }
        }
        EffectOp::RemoveModifier { side, kind, key } => {
            let key = key.as_deref().unwrap_or(&effect.name);
            if let Some(entity) = ctx.state.entity_mut(side_entity(side)) {
                if let Err(err) = entity.modifiers.remove(*kind, key) {
                    report(&err, "effect.remove_modifier");
                }
            }
        }
        EffectOp::ModifyStage { side, stat, delta } => {
            if let Some(entity) = ctx.state.entity_mut(side_entity(side)) {
                entity.stages.adjust(*stat, *delta);
            }
        }
        EffectOp::PlayAnimation(slot) => match effect.animations.get(*slot) {
            Some(script) => {
                let sequence = AnimationSequence::new(Arc::clone(script), user, Some(target));
                ctx.feed.queue_sequence(Box::new(sequence));
            }
            None => debug!(effect = %effect.name, %slot, "effect has no animation in slot"),
        },
        EffectOp::ActiveForLessThan(_)
        | EffectOp::UserLastMoveSucceeded
        | EffectOp::UserMoveIs(_)
        | EffectOp::UserHealthAbove(_)
        | EffectOp::CurrentMoveIs(_) => {}
    }
}

fn damage_applied(state: &BattleState, cast: CastId) -> i32 {
    state.cast(cast).map_or(0, |cast| {
        let target_hp = state.entity(cast.target).map_or(0, |target| target.hp);
        cast.damage_applied(target_hp)
    })
}

/// `value * scale` truncated, then bounded below by `min` and above by `max`.
fn scale_clamped(value: i32, scale: f32, min: i32, max: i32) -> i32 {
    let scaled = (value as f32 * scale) as i32;
    if scaled < min {
        min
    } else if scaled > max {
        max
    } else {
        scaled
    }
}

// ============================================================================
// Entity effect lists
// ============================================================================

/// Adds an instance to an entity's active effects.
///
/// A non-stackable effect is ignored when the entity already carries an
/// effect of the same name. Returns whether the instance was added.
pub fn apply_effect(ctx: &mut BattleContext<'_>, entity: EntityId, id: InstanceId) -> bool {
    let state = &*ctx.state;
    let (Some(holder), Some(instance)) = (state.entity(entity), state.instance(id)) else {
        return false;
    };
    let stackable = instance.effect.stackable;
    let duplicate = holder.effects.iter().any(|held| {
        *held == id
            || (!stackable
                && state
                    .instance(*held)
                    .is_some_and(|other| other.name() == instance.name()))
    });
    if duplicate {
        trace!(effect = %instance.name(), %entity, "effect already active");
        return false;
    }

    debug!(effect = %instance.name(), %entity, "effect applied");
    if let Some(holder) = ctx.state.entity_mut(entity) {
        holder.effects.push(id);
    }
    true
}

/// Removes an instance from an entity's active effects and deactivates it.
pub fn remove_effect(ctx: &mut BattleContext<'_>, entity: EntityId, id: InstanceId) -> bool {
    let Some(holder) = ctx.state.entity_mut(entity) else {
        return false;
    };
    let Some(position) = holder.effects.iter().position(|held| *held == id) else {
        return false;
    };
    holder.effects.remove(position);
    fire(ctx, id, Hook::OnDeactivate);
    true
}

/// Removes the first active effect named `name` from an entity.
pub fn remove_named_effect(ctx: &mut BattleContext<'_>, entity: EntityId, name: &str) -> bool {
    let state = &*ctx.state;
    let found = state.entity(entity).and_then(|holder| {
        holder.effects.iter().copied().find(|held| {
            state
                .instance(*held)
                .is_some_and(|instance| instance.name() == name)
        })
    });
    match found {
        Some(id) => remove_effect(ctx, entity, id),
        None => false,
    }
}

// ============================================================================
// Per-turn drivers
// ============================================================================

fn snapshot(ctx: &BattleContext<'_>, entity: EntityId) -> Vec<InstanceId> {
    ctx.state
        .entity(entity)
        .map(|holder| holder.effects.clone())
        .unwrap_or_default()
}

fn still_held(ctx: &BattleContext<'_>, entity: EntityId, id: InstanceId) -> bool {
    ctx.state
        .entity(entity)
        .is_some_and(|holder| holder.has_effect(id))
}

/// Ages every active effect by one turn and runs `OnTurnStart`.
pub fn run_turn_start(ctx: &mut BattleContext<'_>, entity: EntityId) {
    for id in snapshot(ctx, entity) {
        if !still_held(ctx, entity, id) {
            continue;
        }
        if let Some(instance) = ctx.state.instance_mut(id) {
            instance.turns_active += 1;
        }
        fire(ctx, id, Hook::OnTurnStart);
    }
}

/// Runs `OnMoveSelected` on every active effect.
pub fn run_move_selected(ctx: &mut BattleContext<'_>, entity: EntityId) {
    for id in snapshot(ctx, entity) {
        if still_held(ctx, entity, id) {
            fire(ctx, id, Hook::OnMoveSelected);
        }
    }
}

/// Drops every effect whose `CheckRemainActive` fails.
pub fn run_remain_active_check(ctx: &mut BattleContext<'_>, entity: EntityId) {
    for id in snapshot(ctx, entity) {
        if still_held(ctx, entity, id) && !check_remain_active(ctx, id) {
            remove_effect(ctx, entity, id);
        }
    }
}

/// Runs `OnTurnEnd` on every active effect.
pub fn run_turn_end(ctx: &mut BattleContext<'_>, entity: EntityId) {
    for id in snapshot(ctx, entity) {
        if still_held(ctx, entity, id) {
            fire(ctx, id, Hook::OnTurnEnd);
        }
    }
}
