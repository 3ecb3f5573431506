//! Action choice for players and enemies.

use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::env::RandomSource;
use crate::spell::Spell;
use crate::state::{BattleState, EntityId};

/// Spells dealt to a player for one turn.
pub type Hand = ArrayVec<Arc<Spell>, { BattleConfig::MAX_HAND_SIZE }>;

/// What a player can choose from.
#[derive(Clone, Debug)]
pub struct PlayerLoadout {
    pub attack: Arc<Spell>,
    pub defend: Arc<Spell>,
    /// Pool the hand is dealt from.
    pub spells: Vec<Arc<Spell>>,
}

/// Per-player input state kept by the engine.
#[derive(Clone, Debug)]
pub(crate) struct PlayerSeat {
    pub loadout: PlayerLoadout,
    pub hand: Hand,
}

impl PlayerSeat {
    pub fn new(loadout: PlayerLoadout) -> Self {
        Self {
            loadout,
            hand: Hand::new(),
        }
    }
}

/// Deals `size` spells from the pool, drawing with replacement.
pub fn deal_hand(spells: &[Arc<Spell>], size: usize, rng: &mut dyn RandomSource) -> Hand {
    let mut hand = Hand::new();
    if spells.is_empty() {
        return hand;
    }
    for _ in 0..size.min(hand.capacity()) {
        hand.push(Arc::clone(&spells[rng.index(spells.len())]));
    }
    hand
}

/// Picks a random move and a random living player for an enemy.
pub fn choose_enemy_action(
    state: &BattleState,
    enemy: EntityId,
    players: &[EntityId],
    rng: &mut dyn RandomSource,
) -> Option<(Arc<Spell>, EntityId)> {
    let moves = &state.entity(enemy)?.template().moves;
    if moves.is_empty() {
        return None;
    }
    let spell = Arc::clone(&moves[rng.index(moves.len())]);

    let living: Vec<EntityId> = players
        .iter()
        .copied()
        .filter(|player| state.is_alive(*player))
        .collect();
    if living.is_empty() {
        return None;
    }
    let target = living[rng.index(living.len())];
    Some((spell, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRng;
    use crate::spell::SpellKind;
    use crate::testing::Fixture;

    #[test]
    fn hand_draws_with_replacement_up_to_capacity() {
        let pool = vec![
            Arc::new(Spell::new("Fire", SpellKind::Flavor)),
            Arc::new(Spell::new("Ice", SpellKind::Flavor)),
        ];
        let mut rng = ScriptedRng::new(vec![0.1, 0.9, 0.9, 0.1]);

        let hand = deal_hand(&pool, 4, &mut rng);
        let names: Vec<&str> = hand.iter().map(|spell| spell.name.as_str()).collect();
        assert_eq!(names, vec!["Fire", "Ice", "Ice", "Fire"]);

        let hand = deal_hand(&pool, 64, &mut rng);
        assert_eq!(hand.len(), BattleConfig::MAX_HAND_SIZE);
        assert!(deal_hand(&[], 4, &mut rng).is_empty());
    }

    #[test]
    fn enemy_targets_living_players_only() {
        let mut fx = Fixture::duel();
        let mut rng = ScriptedRng::constant(0.0);

        let (spell, target) =
            choose_enemy_action(&fx.state, EntityId(1), &[EntityId(0)], &mut rng).unwrap();
        assert_eq!(spell.name, "Tackle");
        assert_eq!(target, EntityId(0));

        fx.state.entity_mut(EntityId(0)).unwrap().apply_damage(10_000);
        assert!(choose_enemy_action(&fx.state, EntityId(1), &[EntityId(0)], &mut rng).is_none());
    }
}
