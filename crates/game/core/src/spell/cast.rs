use std::sync::Arc;

use super::Spell;
use crate::state::{CastId, EntityId, InstanceId};

/// Outcome of one spell invocation.
///
/// Fixed once resolution finishes, apart from the hit cursor that animation
/// playback advances while it applies damage hit by hit.
#[derive(Clone, Debug)]
pub struct SpellCast {
    pub id: CastId,
    pub spell: Arc<Spell>,
    pub user: EntityId,
    pub target: EntityId,
    pub success: bool,
    damage: Vec<i32>,
    crits: Vec<bool>,
    total: i32,
    current_hit: usize,
    /// Effect instances spawned by the spell's effect groups.
    pub effects: Vec<InstanceId>,
}

impl SpellCast {
    pub fn new(id: CastId, spell: Arc<Spell>, user: EntityId, target: EntityId) -> Self {
        Self {
            id,
            spell,
            user,
            target,
            success: false,
            damage: Vec::new(),
            crits: Vec::new(),
            total: 0,
            current_hit: 0,
            effects: Vec::new(),
        }
    }

    pub(crate) fn set_hits(&mut self, damage: Vec<i32>, crits: Vec<bool>) {
        self.total = damage.iter().sum();
        self.damage = damage;
        self.crits = crits;
        self.current_hit = 0;
    }

    /// Total damage of every hit.
    pub fn total_damage(&self) -> i32 {
        self.total
    }

    pub fn hits(&self) -> &[i32] {
        &self.damage
    }

    pub fn hit_count(&self) -> usize {
        self.damage.len()
    }

    /// Whether any hit was critical.
    pub fn critical(&self) -> bool {
        self.crits.iter().any(|crit| *crit)
    }

    pub fn crits(&self) -> &[bool] {
        &self.crits
    }

    /// Damage of the hit under the cursor; advances the cursor, wrapping to
    /// the first hit after the last one.
    pub fn next_hit_damage(&mut self) -> i32 {
        let Some(damage) = self.damage.get(self.current_hit).copied() else {
            self.current_hit = 0;
            return 0;
        };
        self.current_hit = (self.current_hit + 1) % self.damage.len();
        damage
    }

    pub fn current_hit(&self) -> usize {
        self.current_hit
    }

    /// Damage that lands on a target with `target_hp` remaining.
    ///
    /// Sums hits in order and stops after the hit that brings the target to
    /// zero or below; later hits are not counted.
    pub fn damage_applied(&self, target_hp: i32) -> i32 {
        let mut applied = 0;
        for hit in &self.damage {
            applied += hit;
            if target_hp - applied <= 0 {
                break;
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::SpellKind;

    fn cast(hits: Vec<i32>) -> SpellCast {
        let spell = Arc::new(Spell::new("Flurry", SpellKind::Flavor));
        let mut cast = SpellCast::new(CastId(0), spell, EntityId(0), EntityId(1));
        let crits = vec![false; hits.len()];
        cast.set_hits(hits, crits);
        cast
    }

    #[test]
    fn damage_applied_stops_at_overkill_hit() {
        let cast = cast(vec![10, 10, 10]);
        assert_eq!(cast.total_damage(), 30);
        assert_eq!(cast.damage_applied(100), 30);
        assert_eq!(cast.damage_applied(15), 20);
        assert_eq!(cast.damage_applied(10), 10);
        assert!(cast.damage_applied(15) <= 15 + 10);
    }

    #[test]
    fn hit_cursor_wraps() {
        let mut cast = cast(vec![1, 2, 3]);
        let applied: Vec<i32> = (0..4).map(|_| cast.next_hit_damage()).collect();
        assert_eq!(applied, vec![1, 2, 3, 1]);
    }

    #[test]
    fn empty_cast_yields_no_damage() {
        let mut cast = cast(Vec::new());
        assert_eq!(cast.next_hit_damage(), 0);
        assert_eq!(cast.damage_applied(5), 0);
        assert!(!cast.critical());
    }
}
