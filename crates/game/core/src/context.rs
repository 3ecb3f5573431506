//! Borrowed view of everything battle logic may touch.

use tracing::info;

use crate::config::BattleConfig;
use crate::engine::{BattleEvent, BattleFeed};
use crate::env::{Catalog, RandomSource};
use crate::state::{BattleState, EntityId};

/// Mutable battle state plus the read-only collaborators it is resolved with.
///
/// Built by the engine for the duration of one tick and passed down to cast
/// resolution, effect hooks and sequences. Nothing in it outlives the tick.
pub struct BattleContext<'a> {
    pub state: &'a mut BattleState,
    pub catalog: &'a Catalog,
    pub rng: &'a mut dyn RandomSource,
    pub feed: &'a mut BattleFeed,
    pub config: &'a BattleConfig,
}

impl BattleContext<'_> {
    /// Deals damage to a combatant and announces its defeat.
    ///
    /// Returns `true` if this hit defeated the combatant.
    pub fn deal_damage(&mut self, target: EntityId, amount: i32) -> bool {
        let killed = self
            .state
            .entity_mut(target)
            .is_some_and(|entity| entity.apply_damage(amount));
        if killed {
            self.announce_defeat(target);
        }
        killed
    }

    fn announce_defeat(&mut self, id: EntityId) {
        let Some(entity) = self.state.entity(id) else {
            return;
        };
        let name = entity.name().to_owned();
        if entity.is_player() {
            info!(entity = %id, %name, "player fell");
            self.feed.queue_dialogue(format!("{name} falls..."));
            self.feed.push(BattleEvent::PlayerDefeated { entity: id, name });
        } else {
            info!(entity = %id, %name, "enemy defeated");
            self.feed.queue_dialogue(format!("{name} is defeated!"));
            self.feed.push(BattleEvent::EnemyDefeated { entity: id, name });
        }
    }
}
