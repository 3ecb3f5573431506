//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::config::BattleConfig;
use crate::context::BattleContext;
use crate::engine::BattleFeed;
use crate::env::{Catalog, ScriptedRng};
use crate::spell::{OffensiveParams, Spell, SpellKind};
use crate::state::{BattleState, Controller, EntityId, EntityParams, EntityState, EntityTemplate};

pub(crate) fn template(
    name: &str,
    hp: i32,
    mp: i32,
    attack: i32,
    defense: i32,
    speed: i32,
) -> Arc<EntityTemplate> {
    Arc::new(EntityTemplate {
        params: EntityParams {
            name: name.into(),
            article: None,
            hp,
            mp,
            attack,
            defense,
            speed,
        },
        moves: vec![Arc::new(Spell::new(
            "Tackle",
            SpellKind::Offensive(OffensiveParams {
                can_critical: false,
                ..OffensiveParams::default()
            }),
        ))],
    })
}

/// A battle state with collaborators, ready to hand out contexts.
pub(crate) struct Fixture {
    pub state: BattleState,
    pub catalog: Catalog,
    pub rng: ScriptedRng,
    pub feed: BattleFeed,
    pub config: BattleConfig,
}

impl Fixture {
    /// Hero (`#0`, player) against Slime (`#1`, enemy); every roll is 0.5.
    pub fn duel() -> Self {
        let config = BattleConfig::default();
        let mut state = BattleState::new();
        let k = config.damage_constant;
        let hero = template("Hero", 50, 10, 50, 50, 50);
        let slime = template("Slime", 30, 0, 30, 30, 10);
        state.insert_entity(|id| EntityState::new(id, Controller::Player, hero, k));
        state.insert_entity(|id| EntityState::new(id, Controller::Enemy, slime, k));
        Self {
            state,
            catalog: Catalog::new(),
            rng: ScriptedRng::constant(0.5),
            feed: BattleFeed::new(),
            config,
        }
    }

    /// Builder: replay these rolls instead.
    pub fn with_rng(mut self, values: Vec<f32>) -> Self {
        self.rng = ScriptedRng::new(values);
        self
    }

    pub fn set_mp(&mut self, id: EntityId, mp: i32, max_mp: i32) {
        if let Some(entity) = self.state.entity_mut(id) {
            entity.max_mp = max_mp;
            entity.mp = mp;
        }
    }

    pub fn context(&mut self) -> BattleContext<'_> {
        BattleContext {
            state: &mut self.state,
            catalog: &self.catalog,
            rng: &mut self.rng,
            feed: &mut self.feed,
            config: &self.config,
        }
    }
}
