//! Read-only content lookup tables.
//!
//! The catalog is built once by a loader and shared (behind an `Arc`) by the
//! engine. Effects that grant other effects resolve them here by name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::effect::Effect;
use crate::env::RandomSource;
use crate::spell::Spell;
use crate::state::EntityTemplate;

/// Enemy template with relative spawn odds.
#[derive(Clone, Debug)]
pub struct EnemyOdds {
    pub template: Arc<EntityTemplate>,
    /// Relative weight, at least 1.
    pub odds: u32,
}

/// Weighted pool enemies are drawn from when a wave is cleared.
#[derive(Clone, Debug, Default)]
pub struct EnemyPool {
    entries: Vec<EnemyOdds>,
}

impl EnemyPool {
    pub fn new(entries: Vec<EnemyOdds>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, template: Arc<EntityTemplate>, odds: u32) {
        self.entries.push(EnemyOdds {
            template,
            odds: odds.max(1),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[EnemyOdds] {
        &self.entries
    }

    /// Draws a template with probability proportional to its odds.
    ///
    /// Duplicates are allowed across draws.
    pub fn draw(&self, rng: &mut dyn RandomSource) -> Option<Arc<EntityTemplate>> {
        let total: u32 = self.entries.iter().map(|entry| entry.odds).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.range_i32(0, total as i32) as u32;
        for entry in &self.entries {
            if roll < entry.odds {
                return Some(Arc::clone(&entry.template));
            }
            roll -= entry.odds;
        }
        self.entries.last().map(|entry| Arc::clone(&entry.template))
    }
}

/// Named content shared by every battle.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    effects: HashMap<String, Arc<Effect>>,
    spells: HashMap<String, Arc<Spell>>,
    entities: HashMap<String, Arc<EntityTemplate>>,
    pub enemy_pool: EnemyPool,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_effect(&mut self, effect: Arc<Effect>) {
        self.effects.insert(effect.name.clone(), effect);
    }

    pub fn insert_spell(&mut self, spell: Arc<Spell>) {
        self.spells.insert(spell.name.clone(), spell);
    }

    pub fn insert_entity(&mut self, template: Arc<EntityTemplate>) {
        self.entities.insert(template.params.name.clone(), template);
    }

    pub fn effect(&self, name: &str) -> Option<&Arc<Effect>> {
        self.effects.get(name)
    }

    pub fn spell(&self, name: &str) -> Option<&Arc<Spell>> {
        self.spells.get(name)
    }

    pub fn entity(&self, name: &str) -> Option<&Arc<EntityTemplate>> {
        self.entities.get(name)
    }

    pub fn effects(&self) -> impl Iterator<Item = &Arc<Effect>> {
        self.effects.values()
    }

    pub fn spells(&self) -> impl Iterator<Item = &Arc<Spell>> {
        self.spells.values()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Arc<EntityTemplate>> {
        self.entities.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRng;
    use crate::state::EntityParams;

    fn template(name: &str) -> Arc<EntityTemplate> {
        Arc::new(EntityTemplate {
            params: EntityParams {
                name: name.into(),
                article: None,
                hp: 10,
                mp: 0,
                attack: 10,
                defense: 10,
                speed: 10,
            },
            moves: Vec::new(),
        })
    }

    #[test]
    fn draw_respects_weights() {
        let mut pool = EnemyPool::default();
        pool.push(template("Slime"), 1);
        pool.push(template("Bat"), 3);

        // total 4: roll 0 → Slime, rolls 1..=3 → Bat
        let slime = pool.draw(&mut ScriptedRng::constant(0.0)).unwrap();
        let bat = pool.draw(&mut ScriptedRng::constant(0.3)).unwrap();
        let bat_again = pool.draw(&mut ScriptedRng::constant(1.0)).unwrap();

        assert_eq!(slime.params.name, "Slime");
        assert_eq!(bat.params.name, "Bat");
        assert_eq!(bat_again.params.name, "Bat");
    }

    #[test]
    fn empty_pool_draws_nothing() {
        assert!(EnemyPool::default().draw(&mut ScriptedRng::constant(0.5)).is_none());
    }
}
