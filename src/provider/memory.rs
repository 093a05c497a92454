use crate::battle::state::EncounterPool;
use crate::errors::{ConfigError, ProviderError, ProviderResult};
use crate::pokemon::Combatant;
use crate::provider::CreatureProvider;
use crate::species::SpeciesQuery;
use async_trait::async_trait;
use schema::{BaseStats, EvolutionStage, PokemonType, SpriteRefs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUNDLED_DEX: &str = include_str!("../../data/creatures.ron");

/// One creature as stored in an offline dex file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub id: u16,
    pub name: String,
    pub types: Vec<PokemonType>,
    #[serde(default)]
    pub stats: BaseStats,
    #[serde(default)]
    pub sprites: SpriteRefs,
}

impl CreatureRecord {
    fn to_combatant(&self) -> Combatant {
        Combatant::new(
            self.id,
            self.name.clone(),
            self.types.clone(),
            self.stats,
            self.sprites.clone(),
        )
    }
}

impl From<&Combatant> for CreatureRecord {
    fn from(combatant: &Combatant) -> Self {
        CreatureRecord {
            id: combatant.id,
            name: combatant.name.clone(),
            types: combatant.affinities().to_vec(),
            stats: combatant.base_stats(),
            sprites: combatant.sprites.clone(),
        }
    }
}

/// File layout of an offline dex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfflineDex {
    pub creatures: Vec<CreatureRecord>,
    #[serde(default)]
    pub evolution_chains: Vec<Vec<EvolutionStage>>,
}

/// Creatures held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    creatures: BTreeMap<u16, CreatureRecord>,
    evolution_chains: Vec<Vec<EvolutionStage>>,
}

impl MemoryProvider {
    pub fn new(creatures: impl IntoIterator<Item = Combatant>) -> Self {
        Self {
            creatures: creatures
                .into_iter()
                .map(|combatant| (combatant.id, CreatureRecord::from(&combatant)))
                .collect(),
            evolution_chains: Vec::new(),
        }
    }

    pub fn with_evolutions(mut self, chain: Vec<EvolutionStage>) -> Self {
        self.evolution_chains.push(chain);
        self
    }

    pub fn from_dex(dex: OfflineDex) -> Self {
        Self {
            creatures: dex
                .creatures
                .into_iter()
                .map(|record| (record.id, record))
                .collect(),
            evolution_chains: dex.evolution_chains,
        }
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let dex: OfflineDex = ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self::from_dex(dex))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_ron_str(&source)
    }

    /// The small dex compiled into the binary.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_ron_str(BUNDLED_DEX)
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    fn lookup(&self, query: &SpeciesQuery) -> Option<&CreatureRecord> {
        match query {
            SpeciesQuery::Id(id) => self.creatures.get(id),
            SpeciesQuery::Name(name) => self
                .creatures
                .values()
                .find(|record| record.name.eq_ignore_ascii_case(name)),
        }
    }
}

#[async_trait]
impl CreatureProvider for MemoryProvider {
    async fn fetch(&self, query: &SpeciesQuery) -> ProviderResult<Combatant> {
        self.lookup(query)
            .map(CreatureRecord::to_combatant)
            .ok_or_else(|| ProviderError::NotFound(query.to_string()))
    }

    async fn fetch_evolutions(&self, id: u16) -> ProviderResult<Vec<EvolutionStage>> {
        Ok(self
            .evolution_chains
            .iter()
            .find(|chain| chain.iter().any(|stage| stage.id == id))
            .cloned()
            .unwrap_or_default())
    }

    fn encounter_pool(&self, dex_limit: u16) -> EncounterPool {
        EncounterPool::Ids(
            self.creatures
                .keys()
                .copied()
                .filter(|&id| id >= 1 && id <= dex_limit)
                .collect(),
        )
    }
}
