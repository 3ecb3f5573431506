//! Turn order.

use core::cmp::Ordering;

use super::{BattleState, EntityId};
use crate::env::RandomSource;

/// Orders combatants fastest first.
///
/// Equal speeds are settled by an independent coin flip for every comparison,
/// so there is no stable global tiebreak. The comparator is not a total order;
/// an insertion sort keeps every flip well-defined where `sort_by` would not.
pub fn turn_order(state: &BattleState, rng: &mut dyn RandomSource) -> Vec<EntityId> {
    let mut order: Vec<(EntityId, f32)> = state
        .entities()
        .map(|entity| (entity.id, entity.effective_speed()))
        .collect();

    for i in 1..order.len() {
        let mut j = i;
        while j > 0 && compare_speed(order[j].1, order[j - 1].1, rng) == Ordering::Less {
            order.swap(j, j - 1);
            j -= 1;
        }
    }

    order.into_iter().map(|(id, _)| id).collect()
}

/// `Less` means `a` acts before `b`.
fn compare_speed(a: f32, b: f32, rng: &mut dyn RandomSource) -> Ordering {
    if a > b {
        Ordering::Less
    } else if b > a {
        Ordering::Greater
    } else if rng.coin_flip() {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{PcgRng, ScriptedRng};
    use crate::state::{Controller, EntityParams, EntityState, EntityTemplate};

    fn with_speeds(speeds: &[i32]) -> BattleState {
        let mut state = BattleState::new();
        for (i, speed) in speeds.iter().enumerate() {
            let template = Arc::new(EntityTemplate {
                params: EntityParams {
                    name: format!("E{i}"),
                    article: None,
                    hp: 10,
                    mp: 0,
                    attack: 10,
                    defense: 10,
                    speed: *speed,
                },
                moves: Vec::new(),
            });
            state.insert_entity(|id| EntityState::new(id, Controller::Enemy, template, 50));
        }
        state
    }

    #[test]
    fn faster_entities_act_first() {
        let state = with_speeds(&[10, 20, 20]);
        let mut rng = PcgRng::seeded(11);

        for _ in 0..64 {
            let order = turn_order(&state, &mut rng);
            assert_eq!(order.len(), 3);
            assert_eq!(order[2], EntityId(0));
            let head = (order[0], order[1]);
            assert!(
                head == (EntityId(1), EntityId(2)) || head == (EntityId(2), EntityId(1)),
                "unexpected order {order:?}"
            );
        }
    }

    #[test]
    fn ties_follow_the_coin() {
        let state = with_speeds(&[10, 10]);

        let order = turn_order(&state, &mut ScriptedRng::constant(1.0));
        assert_eq!(order, vec![EntityId(1), EntityId(0)]);

        let order = turn_order(&state, &mut ScriptedRng::constant(0.0));
        assert_eq!(order, vec![EntityId(0), EntityId(1)]);
    }

    #[test]
    fn speed_stage_changes_order() {
        let mut state = with_speeds(&[10, 12]);
        if let Some(slow) = state.entity_mut(EntityId(0)) {
            slow.stages.speed = 2;
        }
        let order = turn_order(&state, &mut PcgRng::seeded(1));
        assert_eq!(order, vec![EntityId(0), EntityId(1)]);
    }
}
