//! Cast resolution pipeline.
//!
//! ```text
//! MP check ─> eligibility ─> properties ─> hit check ─> damage + effects
//!                                │                             │
//!                                └──────── deactivate <────────┘
//! ```
//!
//! MP is debited as soon as the check passes, so a cast that later misses
//! still costs its MP. Properties are activated before the hit check and are
//! always deactivated and cleared afterwards, hit or miss.

use std::sync::Arc;

use tracing::debug;

use super::{Spell, SpellCast, SpellKind};
use crate::combat::{
    DamageProfile, check_hit_percent_scale, check_hit_unit_scale, hit_chance, hit_damage,
    roll_critical, roll_hit_count,
};
use crate::context::BattleContext;
use crate::effect::{Effect, Hook, exec};
use crate::state::{CastId, EntityId, InstanceId, ModifierKind};

/// Resolves `spell` cast by `user` on `target` and stores the outcome.
///
/// The returned handle refers to a [`SpellCast`] in the battle state. Missing
/// MP, a miss or a zero-damage cast whose effects all fail leave
/// `success == false`; none of these are errors.
pub fn cast_spell(
    ctx: &mut BattleContext<'_>,
    spell: &Arc<Spell>,
    user: EntityId,
    target: EntityId,
) -> CastId {
    let id = ctx.state.allocate_cast();
    ctx.state
        .insert_cast(SpellCast::new(id, Arc::clone(spell), user, target));

    let success = resolve(ctx, id, spell, user, target);
    if let Some(cast) = ctx.state.cast_mut(id) {
        cast.success = success;
        debug!(
            spell = %spell.name,
            %user,
            %target,
            success,
            damage = cast.total_damage(),
            hits = cast.hit_count(),
            critical = cast.critical(),
            "cast resolved"
        );
    }
    id
}

fn resolve(
    ctx: &mut BattleContext<'_>,
    id: CastId,
    spell: &Arc<Spell>,
    user: EntityId,
    target: EntityId,
) -> bool {
    if !pay_cost(ctx, user, spell.cost) {
        debug!(spell = %spell.name, %user, cost = spell.cost, "not enough MP");
        return false;
    }
    if !can_cast(ctx, spell, user, target) {
        return false;
    }

    let properties = activate_properties(ctx, id, spell, user, target);

    let mut success = check_spell_hit(ctx, spell, user, target);
    if success {
        roll_damage(ctx, id, spell, user, target);
        success = proc_or_damage(ctx, id);
    } else {
        debug!(spell = %spell.name, %user, %target, "cast missed");
    }

    for property in properties {
        exec::fire(ctx, property, Hook::OnDeactivate);
    }
    if let Some(caster) = ctx.state.entity_mut(user) {
        caster.properties.clear();
    }
    success
}

fn pay_cost(ctx: &mut BattleContext<'_>, user: EntityId, cost: i32) -> bool {
    let Some(caster) = ctx.state.entity_mut(user) else {
        return false;
    };
    if caster.mp < cost {
        return false;
    }
    caster.modify_mp(-cost);
    true
}

/// Extra requirements a spell may impose before it resolves.
fn can_cast(_ctx: &BattleContext<'_>, _spell: &Spell, _user: EntityId, _target: EntityId) -> bool {
    true
}

// ============================================================================
// Properties
// ============================================================================

/// Activates the spell's own properties, then the caster's standing ones.
///
/// A spell property already activated for this cast is skipped unless its
/// effect is stackable.
fn activate_properties(
    ctx: &mut BattleContext<'_>,
    id: CastId,
    spell: &Spell,
    user: EntityId,
    target: EntityId,
) -> Vec<InstanceId> {
    let mut activated: Vec<InstanceId> = Vec::new();

    for property in &spell.properties {
        if !property.stackable && holds_named(ctx, &activated, &property.name) {
            continue;
        }
        let instance = exec::spawn(ctx, property, user, target, Some(id));
        exec::check_success(ctx, instance);
        exec::fire(ctx, instance, Hook::OnActivate);
        activated.push(instance);
    }

    let standing = ctx
        .state
        .entity(user)
        .map(|caster| caster.properties.clone())
        .unwrap_or_default();
    for instance in standing {
        exec::check_success(ctx, instance);
        exec::fire(ctx, instance, Hook::OnActivate);
        activated.push(instance);
    }
    activated
}

fn holds_named(ctx: &BattleContext<'_>, instances: &[InstanceId], name: &str) -> bool {
    instances.iter().any(|id| {
        ctx.state
            .instance(*id)
            .is_some_and(|instance| instance.name() == name)
    })
}

// ============================================================================
// Hit check
// ============================================================================

fn check_spell_hit(
    ctx: &mut BattleContext<'_>,
    spell: &Spell,
    user: EntityId,
    target: EntityId,
) -> bool {
    let (check_accuracy, accuracy, percent_scale) = match &spell.kind {
        SpellKind::Flavor => return true,
        SpellKind::Offensive(params) => (params.check_accuracy, params.accuracy, true),
        SpellKind::Status(params) => (params.check_accuracy, params.accuracy, false),
    };
    if !check_accuracy {
        return true;
    }
    let (Some(caster), Some(defender)) = (ctx.state.entity(user), ctx.state.entity(target))
    else {
        return false;
    };
    let chance = hit_chance(
        accuracy,
        caster.accuracy(),
        defender.evasion(),
        caster.modifiers.map(ModifierKind::Accuracy).values(),
    );
    if percent_scale {
        check_hit_percent_scale(ctx.rng, chance)
    } else {
        check_hit_unit_scale(ctx.rng, chance)
    }
}

// ============================================================================
// Damage and effects
// ============================================================================

fn roll_damage(
    ctx: &mut BattleContext<'_>,
    id: CastId,
    spell: &Spell,
    user: EntityId,
    target: EntityId,
) {
    let (damage, crits) = match &spell.kind {
        SpellKind::Offensive(params) => {
            let count = roll_hit_count(
                ctx.rng,
                params.min_hits,
                params.max_hits,
                params.vary_hit_count,
            );
            let mut damage = Vec::with_capacity(count as usize);
            let mut crits = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let critical =
                    roll_critical(ctx.rng, params.can_critical, params.critical_chance);
                let Some(profile) = damage_profile(ctx, params.power, user, target) else {
                    break;
                };
                let variance = ctx
                    .rng
                    .range_f32(ctx.config.variance_min, ctx.config.variance_max);
                damage.push(hit_damage(ctx.config, &profile, critical, variance));
                crits.push(critical);
            }
            (damage, crits)
        }
        SpellKind::Flavor | SpellKind::Status(_) => (vec![0], vec![false]),
    };

    let hits = damage.len();
    if let Some(cast) = ctx.state.cast_mut(id) {
        cast.set_hits(damage, crits);
    }
    for _ in 0..hits {
        roll_effects(ctx, id, spell, user, target);
    }
}

fn damage_profile(
    ctx: &BattleContext<'_>,
    power: f32,
    user: EntityId,
    target: EntityId,
) -> Option<DamageProfile> {
    let caster = ctx.state.entity(user)?;
    let defender = ctx.state.entity(target)?;
    Some(DamageProfile {
        power,
        attack: caster.attack,
        attack_modifier: caster.attack_modifier(),
        defense: defender.defense,
        defense_modifier: defender.defense_modifier(),
        offense_modifiers: caster.modifiers.map(ModifierKind::Offense).product(),
        defense_modifiers: defender.modifiers.map(ModifierKind::Defense).product(),
    })
}

/// Rolls every effect group once and spawns the chosen effects.
fn roll_effects(
    ctx: &mut BattleContext<'_>,
    id: CastId,
    spell: &Spell,
    user: EntityId,
    target: EntityId,
) {
    for group in &spell.effects {
        let Some(effect) = group.roll(ctx.rng).map(Arc::clone) else {
            continue;
        };
        if !effect.stackable && cast_has_effect(ctx, id, &effect) {
            continue;
        }
        let instance = exec::spawn(ctx, &effect, user, target, Some(id));
        exec::check_success(ctx, instance);
        if let Some(cast) = ctx.state.cast_mut(id) {
            cast.effects.push(instance);
        }
    }
}

fn cast_has_effect(ctx: &BattleContext<'_>, id: CastId, effect: &Effect) -> bool {
    ctx.state
        .cast(id)
        .is_some_and(|cast| holds_named(ctx, &cast.effects, &effect.name))
}

/// A cast that dealt damage succeeds; otherwise it succeeds if any of its
/// effects passes a fresh success check.
fn proc_or_damage(ctx: &mut BattleContext<'_>, id: CastId) -> bool {
    let Some(cast) = ctx.state.cast(id) else {
        return false;
    };
    if cast.total_damage() != 0 {
        return true;
    }
    let effects = cast.effects.clone();
    let mut any = false;
    for instance in effects {
        any |= exec::check_success(ctx, instance);
    }
    any
}
