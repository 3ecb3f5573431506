/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Scaling constant K used by stat scaling and the damage formula.
    pub damage_constant: i32,
    /// Script frames per second; a duration of `n` frames lasts `n / fps` seconds.
    pub frames_per_second: f32,
    /// Damage multiplier applied to critical hits.
    pub critical_multiplier: f32,
    /// Lower bound of the uniform damage variance roll.
    pub variance_min: f32,
    /// Upper bound of the uniform damage variance roll.
    pub variance_max: f32,
    /// MP regained by player-controlled entities at the start of every turn.
    pub player_mp_per_turn: i32,
    /// Number of spells dealt from the player's spell list each turn.
    pub hand_size: usize,
    /// Registered combatants required before a battle may start.
    pub min_combatants: usize,
}

impl BattleConfig {
    // ===== compile-time constants =====
    /// Fixed damage constant K.
    pub const DAMAGE_CONSTANT: i32 = 50;
    /// Upper bound for a dealt hand.
    pub const MAX_HAND_SIZE: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FRAMES_PER_SECOND: f32 = 60.0;
    pub const DEFAULT_CRITICAL_MULTIPLIER: f32 = 1.5;
    pub const DEFAULT_VARIANCE_MIN: f32 = 0.85;
    pub const DEFAULT_VARIANCE_MAX: f32 = 1.0;
    pub const DEFAULT_PLAYER_MP_PER_TURN: i32 = 5;
    pub const DEFAULT_HAND_SIZE: usize = 4;
    pub const DEFAULT_MIN_COMBATANTS: usize = 2;

    pub fn new() -> Self {
        Self {
            damage_constant: Self::DAMAGE_CONSTANT,
            frames_per_second: Self::DEFAULT_FRAMES_PER_SECOND,
            critical_multiplier: Self::DEFAULT_CRITICAL_MULTIPLIER,
            variance_min: Self::DEFAULT_VARIANCE_MIN,
            variance_max: Self::DEFAULT_VARIANCE_MAX,
            player_mp_per_turn: Self::DEFAULT_PLAYER_MP_PER_TURN,
            hand_size: Self::DEFAULT_HAND_SIZE,
            min_combatants: Self::DEFAULT_MIN_COMBATANTS,
        }
    }

    /// Converts a frame count from an animation script into seconds.
    pub fn frames_to_seconds(&self, frames: f32) -> f32 {
        if self.frames_per_second <= 0.0 {
            return 0.0;
        }
        frames / self.frames_per_second
    }

    /// Hand size clamped to the storage bound.
    pub fn effective_hand_size(&self) -> usize {
        self.hand_size.min(Self::MAX_HAND_SIZE)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
