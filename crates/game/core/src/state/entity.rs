//! Combatant templates and live per-battle state.

use std::sync::Arc;

use super::{CastId, EntityId, InstanceId, NamedModifiers};
use crate::combat::{scale_hp, scale_stat, stat_modifier};
use crate::spell::Spell;

/// Who chooses the combatant's action each turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Controller {
    Player,
    Enemy,
}

/// Authored baseline stats of a creature, before battle scaling.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityParams {
    pub name: String,
    /// Article used in introductions ("a", "the"), if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub article: Option<String>,
    pub hp: i32,
    pub mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

impl EntityParams {
    /// Name prefixed with the article when one is set.
    pub fn introduction_name(&self) -> String {
        match self.article.as_deref().map(str::trim) {
            Some(article) if !article.is_empty() => format!("{article} {}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// A creature definition: baseline stats plus its move list.
#[derive(Clone, Debug)]
pub struct EntityTemplate {
    pub params: EntityParams,
    pub moves: Vec<Arc<Spell>>,
}

/// Stat stage counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatStages {
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub evasion: i32,
    pub accuracy: i32,
}

/// Stat addressed by a stage change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stat {
    Attack,
    Defense,
    Speed,
    Evasion,
    Accuracy,
}

impl StatStages {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::Speed => self.speed,
            Stat::Evasion => self.evasion,
            Stat::Accuracy => self.accuracy,
        }
    }

    pub fn adjust(&mut self, stat: Stat, delta: i32) {
        let slot = match stat {
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::Speed => &mut self.speed,
            Stat::Evasion => &mut self.evasion,
            Stat::Accuracy => &mut self.accuracy,
        };
        *slot = slot.saturating_add(delta);
    }
}

/// Live state of one combatant.
#[derive(Clone, Debug)]
pub struct EntityState {
    pub id: EntityId,
    pub controller: Controller,
    template: Arc<EntityTemplate>,

    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,

    pub stages: StatStages,
    pub modifiers: NamedModifiers,
    /// Active status effects, in application order.
    pub effects: Vec<InstanceId>,
    /// Transient properties consumed by the next cast.
    pub properties: Vec<InstanceId>,

    /// Spell chosen for this turn.
    pub action: Option<Arc<Spell>>,
    pub target: Option<EntityId>,
    /// Outcome of this turn's cast.
    pub last_cast: Option<CastId>,
    /// Damage received this turn.
    pub damage_taken: i32,
    pub dead: bool,
}

impl EntityState {
    /// Builds the live state from a template, scaling its stats once.
    pub fn new(
        id: EntityId,
        controller: Controller,
        template: Arc<EntityTemplate>,
        damage_constant: i32,
    ) -> Self {
        let params = &template.params;
        let max_hp = scale_hp(params.hp, damage_constant);
        let max_mp = params.mp.max(0);
        Self {
            id,
            controller,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            attack: scale_stat(params.attack, damage_constant),
            defense: scale_stat(params.defense, damage_constant),
            speed: scale_stat(params.speed, damage_constant),
            stages: StatStages::default(),
            modifiers: NamedModifiers::default(),
            effects: Vec::new(),
            properties: Vec::new(),
            action: None,
            target: None,
            last_cast: None,
            damage_taken: 0,
            dead: false,
            template,
        }
    }

    /// Replaces the combatant in this slot with a fresh one built from `template`.
    pub fn respawn(&mut self, template: Arc<EntityTemplate>, damage_constant: i32) {
        *self = Self::new(self.id, self.controller, template, damage_constant);
    }

    pub fn template(&self) -> &Arc<EntityTemplate> {
        &self.template
    }

    pub fn name(&self) -> &str {
        &self.template.params.name
    }

    pub fn is_player(&self) -> bool {
        self.controller == Controller::Player
    }

    /// Subtracts HP. Returns `true` if this hit killed the combatant.
    ///
    /// Damage against an already defeated combatant is ignored.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.dead {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Adds `delta` MP, clamped to `[0, max_mp]`.
    pub fn modify_mp(&mut self, delta: i32) {
        self.mp = self.mp.saturating_add(delta).clamp(0, self.max_mp);
    }

    /// Clears the per-turn slots.
    pub fn reset_for_turn(&mut self) {
        self.target = None;
        self.damage_taken = 0;
        self.action = None;
        self.last_cast = None;
    }

    pub fn attack_modifier(&self) -> f32 {
        stat_modifier(self.stages.attack)
    }

    pub fn defense_modifier(&self) -> f32 {
        stat_modifier(self.stages.defense)
    }

    pub fn speed_modifier(&self) -> f32 {
        stat_modifier(self.stages.speed)
    }

    pub fn accuracy(&self) -> f32 {
        stat_modifier(self.stages.accuracy)
    }

    pub fn evasion(&self) -> f32 {
        stat_modifier(self.stages.evasion)
    }

    /// Speed used for turn ordering.
    pub fn effective_speed(&self) -> f32 {
        self.speed as f32 * self.speed_modifier()
    }

    /// Current HP as a fraction of max HP.
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }

    pub fn has_effect(&self, id: InstanceId) -> bool {
        self.effects.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slime() -> Arc<EntityTemplate> {
        Arc::new(EntityTemplate {
            params: EntityParams {
                name: "Slime".into(),
                article: Some("a".into()),
                hp: 40,
                mp: 10,
                attack: 30,
                defense: 20,
                speed: 10,
            },
            moves: Vec::new(),
        })
    }

    #[test]
    fn stats_are_scaled_once_on_creation() {
        let state = EntityState::new(EntityId(0), Controller::Enemy, slime(), 50);
        assert_eq!(state.max_hp, 40 + 50 + 10);
        assert_eq!(state.hp, state.max_hp);
        assert_eq!(state.attack, 35);
        assert_eq!(state.defense, 25);
        assert_eq!(state.speed, 15);
        assert_eq!(state.max_mp, 10);
    }

    #[test]
    fn damage_kills_once() {
        let mut state = EntityState::new(EntityId(0), Controller::Enemy, slime(), 50);
        assert!(!state.apply_damage(50));
        assert!(state.apply_damage(50));
        assert!(state.dead);
        assert!(!state.apply_damage(10));
        assert_eq!(state.hp, 0);
    }

    #[test]
    fn mp_is_clamped() {
        let mut state = EntityState::new(EntityId(0), Controller::Player, slime(), 50);
        state.modify_mp(-100);
        assert_eq!(state.mp, 0);
        state.modify_mp(100);
        assert_eq!(state.mp, state.max_mp);
    }

    #[test]
    fn introduction_uses_article() {
        assert_eq!(slime().params.introduction_name(), "a Slime");
    }

    #[test]
    fn respawn_restores_fresh_state() {
        let mut state = EntityState::new(EntityId(3), Controller::Enemy, slime(), 50);
        state.apply_damage(1_000);
        state.stages.adjust(Stat::Attack, 2);
        state.respawn(slime(), 50);

        assert_eq!(state.id, EntityId(3));
        assert!(!state.dead);
        assert_eq!(state.stages, StatStages::default());
        assert_eq!(state.hp, state.max_hp);
    }
}
