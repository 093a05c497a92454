//! Sources of creature data.
//!
//! The battle engine only ever sees [`CreatureProvider`]. The PokeAPI provider is used in
//! normal play; the in-memory provider backs offline play and every test.

pub mod memory;
pub mod pokeapi;

use crate::battle::state::EncounterPool;
use crate::errors::ProviderResult;
use crate::pokemon::Combatant;
use crate::species::SpeciesQuery;
use async_trait::async_trait;
use schema::EvolutionStage;

pub use memory::MemoryProvider;
pub use pokeapi::PokeApiProvider;

#[async_trait]
pub trait CreatureProvider: Send + Sync {
    /// Resolve one creature at full health.
    async fn fetch(&self, query: &SpeciesQuery) -> ProviderResult<Combatant>;

    /// The evolution line containing `id`, in depth-first order.
    async fn fetch_evolutions(&self, _id: u16) -> ProviderResult<Vec<EvolutionStage>> {
        Ok(Vec::new())
    }

    /// Ids an opponent may be drawn from.
    fn encounter_pool(&self, dex_limit: u16) -> EncounterPool {
        EncounterPool::Range(dex_limit)
    }
}
