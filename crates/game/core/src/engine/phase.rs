/// Phase of the battle flow.
///
/// ```text
/// BattleStart ─> TurnStart ─> AwaitingPlayerInput ─> ActionSelection
///      ^             ^                                      │
///      │             │                                      v
///      └───────── TurnEnd <──────────────────────── ActionResolution
///                    │
///                    v
///                 GameOver
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    BattleStart,
    TurnStart,
    AwaitingPlayerInput,
    ActionSelection,
    ActionResolution,
    TurnEnd,
    GameOver,
}

impl BattlePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattlePhase::BattleStart => "battle_start",
            BattlePhase::TurnStart => "turn_start",
            BattlePhase::AwaitingPlayerInput => "awaiting_player_input",
            BattlePhase::ActionSelection => "action_selection",
            BattlePhase::ActionResolution => "action_resolution",
            BattlePhase::TurnEnd => "turn_end",
            BattlePhase::GameOver => "game_over",
        }
    }
}

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// The primary player was defeated.
    PlayerDefeated,
    /// Every enemy was defeated and the pool has nothing left to send.
    EnemiesExhausted,
}
