//! Pokedex Arena
//!
//! A Pokédex browser and a deterministic team battle simulator. Creature data comes from a
//! pluggable provider (PokeAPI or an offline dex); battle sessions are plain values threaded
//! through the engine and persisted by the host between commands.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod errors;
pub mod interface;
pub mod player;
pub mod pokemon;
pub mod provider;
pub mod session_store;
pub mod species;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    BaseStats, BattleStatus, EvolutionStage, PokemonType, Side, SpriteRefs, DEX_LIMIT,
};

// --- From this crate's modules (`src/`) ---

// Battle engine operations and state.
pub use battle::engine::{begin_battle, new_opponent, reset, resolve_turn, start_battle, switch_active, TurnOutcome};
pub use battle::rules::BattleRules;
pub use battle::state::{BattleEvent, BattleSession, EncounterPool, EncounterRng, EventBus};

// Runtime types.
pub use player::{Roster, ROSTER_CAPACITY};
pub use pokemon::Combatant;
pub use species::{DexPage, SpeciesQuery};

// Hosts and data sources.
pub use config::{ArenaConfig, ProviderConfig};
pub use interface::{Arena, Command};
pub use provider::{CreatureProvider, MemoryProvider, PokeApiProvider};
pub use session_store::SessionStore;

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, ConfigError, ProviderError,
    ProviderResult, SessionError,
};
