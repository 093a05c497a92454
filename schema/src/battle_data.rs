use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a battle session.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BattleStatus {
    #[default]
    NotStarted,
    InProgress,
    PlayerVictory,
    PlayerDefeat,
}

impl BattleStatus {
    /// True once the battle has a winner.
    pub fn is_concluded(self) -> bool {
        matches!(self, BattleStatus::PlayerVictory | BattleStatus::PlayerDefeat)
    }
}

impl fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            BattleStatus::NotStarted => "not started",
            BattleStatus::InProgress => "in progress",
            BattleStatus::PlayerVictory => "player victory",
            BattleStatus::PlayerDefeat => "player defeat",
        };
        write!(f, "{}", display_name)
    }
}

/// Which roster a command or event refers to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Opponent => write!(f, "opponent"),
        }
    }
}
