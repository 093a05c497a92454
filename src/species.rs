use crate::battle::rules::BattleRules;
use crate::errors::{BattleResult, ProviderError};
use crate::pokemon::Combatant;
use crate::provider::CreatureProvider;
use schema::EvolutionStage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a visitor asked for a creature: by dex number or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciesQuery {
    Id(u16),
    /// Always stored lowercase.
    Name(String),
}

impl SpeciesQuery {
    /// Digits become an id, anything else a lowercase name. Blank input means the first entry.
    pub fn parse(input: &str) -> Self {
        let input = input.trim().trim_start_matches('#');
        if input.is_empty() {
            return SpeciesQuery::default();
        }
        match input.parse::<u16>() {
            Ok(id) => SpeciesQuery::Id(id),
            Err(_) => SpeciesQuery::Name(input.to_lowercase()),
        }
    }

    /// The identifier as it appears in a provider URL.
    pub fn path_segment(&self) -> String {
        match self {
            SpeciesQuery::Id(id) => id.to_string(),
            SpeciesQuery::Name(name) => name.to_lowercase(),
        }
    }
}

impl Default for SpeciesQuery {
    fn default() -> Self {
        SpeciesQuery::Id(1)
    }
}

impl From<u16> for SpeciesQuery {
    fn from(id: u16) -> Self {
        SpeciesQuery::Id(id)
    }
}

impl fmt::Display for SpeciesQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeciesQuery::Id(id) => write!(f, "#{}", id),
            SpeciesQuery::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Ids of the previous and next dex entries, clipped to `1..=limit`.
pub fn neighbors(id: u16, limit: u16) -> (Option<u16>, Option<u16>) {
    let prev = (id > 1).then(|| (id - 1).min(limit));
    let next = (id < limit).then(|| id + 1);
    (prev, next)
}

/// One page of the dex: the creature asked for, its neighbours and its evolution line.
#[derive(Debug, Clone, PartialEq)]
pub struct DexPage {
    pub current: Combatant,
    pub prev: Option<Combatant>,
    pub next: Option<Combatant>,
    pub evolutions: Vec<EvolutionStage>,
}

async fn fetch_neighbor(provider: &dyn CreatureProvider, id: Option<u16>) -> Option<Combatant> {
    let id = id?;
    match provider.fetch(&SpeciesQuery::Id(id)).await {
        Ok(combatant) => Some(combatant),
        Err(err) => {
            tracing::warn!(id, error = %err, "neighbour lookup failed");
            None
        }
    }
}

/// Look a creature up for display. Only the current entry is required; neighbours and the
/// evolution chain are filled in when the provider can supply them.
pub async fn browse(
    provider: &dyn CreatureProvider,
    query: &SpeciesQuery,
    rules: &BattleRules,
) -> BattleResult<DexPage> {
    let current = provider.fetch(query).await?;
    if current.id == 0 || current.id > rules.dex_limit {
        return Err(ProviderError::OutOfRange {
            id: current.id,
            limit: rules.dex_limit,
        }
        .into());
    }

    let (prev_id, next_id) = neighbors(current.id, rules.dex_limit);
    let (prev, next, evolutions) = tokio::join!(
        fetch_neighbor(provider, prev_id),
        fetch_neighbor(provider, next_id),
        provider.fetch_evolutions(current.id),
    );

    let evolutions = evolutions.unwrap_or_else(|err| {
        tracing::warn!(id = current.id, error = %err, "evolution lookup failed");
        Vec::new()
    });

    Ok(DexPage {
        current,
        prev,
        next,
        evolutions,
    })
}
