use schema::BattleStatus;
use thiserror::Error;

/// Main error type for the Pokedex Arena battle engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleEngineError {
    /// Error raised by a creature data provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    /// Error related to invalid battle state
    #[error("Battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    /// Error related to invalid player actions
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    /// Error encoding or decoding a persisted session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    /// Error loading configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while resolving creature data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The creature does not exist upstream
    #[error("Pokemon not found: {0}")]
    NotFound(String),
    /// The provider did not answer or answered with something unusable
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
    /// The creature exists but lies beyond the supported dex range
    #[error("Pokemon #{id} is outside the supported range 1-{limit}")]
    OutOfRange { id: u16, limit: u16 },
}

/// Errors related to battle state validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    /// The operation is not allowed while the battle is in this status
    #[error("Operation not allowed while the battle is {0}")]
    InvalidState(BattleStatus),
    /// No active combatant found when one was expected
    #[error("No active combatant on the {0} side")]
    NoActiveCombatant(schema::Side),
    /// The opposing roster does not have the required number of members
    #[error("Opponent roster has {found} members, expected {expected}")]
    IncompleteOpponentRoster { expected: usize, found: usize },
    /// An opposing roster must enter the battle with every member standing
    #[error("Opponent roster member at index {0} has fainted")]
    FaintedOpponent(usize),
    /// A scripted encounter source ran out of ids
    #[error("Encounter source exhausted")]
    EncounterExhausted,
}

/// Errors related to player actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Roster index is out of bounds
    #[error("Invalid roster index: {0}")]
    InvalidIndex(usize),
    /// The targeted combatant has fainted
    #[error("Combatant at index {0} has fainted")]
    FaintedCombatant(usize),
    /// The roster is already at capacity
    #[error("Roster is full ({0} members)")]
    RosterFull(usize),
    /// The roster is too small to start a battle
    #[error("Roster needs {required} members to battle, has {found}")]
    RosterTooSmall { required: usize, found: usize },
}

/// Errors related to session persistence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Failed to encode session: {0}")]
    Encode(String),
    #[error("Failed to decode session: {0}")]
    Decode(String),
    /// The decoded session violates a data model invariant
    #[error("Corrupt session: {0}")]
    Corrupt(String),
}

/// Errors related to configuration loading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Failed to build provider: {0}")]
    Provider(String),
}

impl BattleEngineError {
    /// Rejections leave the session untouched and are shown to the user rather than logged as
    /// failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BattleEngineError::Action(_) | BattleEngineError::BattleState(BattleStateError::InvalidState(_))
        )
    }
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using ProviderError
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_display() {
        let err: BattleEngineError = ActionError::InvalidIndex(5).into();
        assert_eq!(err.to_string(), "Action error: Invalid roster index: 5");

        let err: BattleEngineError = ProviderError::OutOfRange { id: 300, limit: 251 }.into();
        assert_eq!(
            err.to_string(),
            "Provider error: Pokemon #300 is outside the supported range 1-251"
        );
    }

    #[test]
    fn test_rejections() {
        assert!(BattleEngineError::from(ActionError::RosterFull(5)).is_rejection());
        assert!(
            BattleEngineError::from(BattleStateError::InvalidState(BattleStatus::NotStarted))
                .is_rejection()
        );
        assert!(!BattleEngineError::from(ProviderError::Unavailable("timeout".into())).is_rejection());
    }
}
