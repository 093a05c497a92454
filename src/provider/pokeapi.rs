//! HTTP provider backed by the public PokeAPI.

use crate::errors::{ProviderError, ProviderResult};
use crate::pokemon::Combatant;
use crate::provider::CreatureProvider;
use crate::species::SpeciesQuery;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use schema::{BaseStats, EvolutionStage, PokemonType, SpriteRefs};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const SPRITE_BASE_URL: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Public sprite for a species id, used for evolution stages so they need no extra request.
pub fn sprite_url(id: u16) -> String {
    format!("{}/{}.png", SPRITE_BASE_URL, id)
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct StatEntry {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct TypeEntry {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
struct Artwork {
    front_default: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Option<Artwork>,
}

#[derive(Debug, Default, Deserialize)]
struct SpritesPayload {
    front_default: Option<String>,
    back_default: Option<String>,
    #[serde(default)]
    other: Option<OtherSprites>,
}

#[derive(Debug, Deserialize)]
struct PokemonPayload {
    id: u16,
    name: String,
    #[serde(default)]
    stats: Vec<StatEntry>,
    #[serde(default)]
    types: Vec<TypeEntry>,
    #[serde(default)]
    sprites: SpritesPayload,
}

impl PokemonPayload {
    fn base_stat(&self, name: &str) -> u16 {
        self.stats
            .iter()
            .find(|entry| entry.stat.name == name)
            .map(|entry| entry.base_stat)
            .unwrap_or(0)
    }

    fn into_combatant(self) -> Combatant {
        let stats = BaseStats {
            hp: self.base_stat("hp"),
            attack: self.base_stat("attack"),
            defense: self.base_stat("defense"),
            speed: self.base_stat("speed"),
        };

        let affinities = self
            .types
            .iter()
            .filter_map(|entry| PokemonType::from_str(&entry.kind.name).ok())
            .collect();

        let artwork = self
            .sprites
            .other
            .and_then(|other| other.official_artwork)
            .and_then(|artwork| artwork.front_default);
        let sprites = SpriteRefs {
            front: artwork.or(self.sprites.front_default),
            back: self.sprites.back_default,
        };

        Combatant::new(self.id, self.name, affinities, stats, sprites)
    }
}

#[derive(Debug, Deserialize)]
struct SpeciesPayload {
    evolution_chain: NamedUrl,
}

#[derive(Debug, Deserialize)]
struct NamedUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChainPayload {
    chain: ChainLink,
}

#[derive(Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    #[serde(default)]
    evolves_to: Vec<ChainLink>,
}

/// The numeric id at the end of a resource URL such as `.../pokemon-species/133/`.
fn id_from_url(url: &str) -> Option<u16> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

fn flatten_chain(link: &ChainLink, stages: &mut Vec<EvolutionStage>) {
    match id_from_url(&link.species.url) {
        Some(id) => stages.push(EvolutionStage {
            id,
            name: link.species.name.clone(),
            image: sprite_url(id),
        }),
        None => tracing::warn!(url = %link.species.url, "evolution stage without an id"),
    }
    for child in &link.evolves_to {
        flatten_chain(child, stages);
    }
}

/// Build a combatant from a `/pokemon/{id}` response body.
pub fn parse_pokemon_json(body: &str) -> ProviderResult<Combatant> {
    let payload: PokemonPayload =
        serde_json::from_str(body).map_err(|e| ProviderError::Unavailable(e.to_string()))?;
    Ok(payload.into_combatant())
}

/// Flatten an `/evolution-chain/{id}` response body depth first.
pub fn parse_evolution_chain_json(body: &str) -> ProviderResult<Vec<EvolutionStage>> {
    let payload: ChainPayload =
        serde_json::from_str(body).map_err(|e| ProviderError::Unavailable(e.to_string()))?;
    let mut stages = Vec::new();
    flatten_chain(&payload.chain, &mut stages);
    Ok(stages)
}

pub struct PokeApiProvider {
    client: Client,
    base_url: String,
}

impl PokeApiProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, subject: &str) -> ProviderResult<T> {
        tracing::debug!(%url, "provider request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ProviderError::NotFound(subject.to_string())),
            status if !status.is_success() => {
                return Err(ProviderError::Unavailable(format!(
                    "{} answered {}",
                    url, status
                )))
            }
            _ => {}
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl CreatureProvider for PokeApiProvider {
    async fn fetch(&self, query: &SpeciesQuery) -> ProviderResult<Combatant> {
        let url = format!("{}/pokemon/{}", self.base_url, query.path_segment());
        let payload: PokemonPayload = self.get_json(&url, &query.to_string()).await?;
        Ok(payload.into_combatant())
    }

    async fn fetch_evolutions(&self, id: u16) -> ProviderResult<Vec<EvolutionStage>> {
        let url = format!("{}/pokemon-species/{}", self.base_url, id);
        let species: SpeciesPayload = self.get_json(&url, &format!("#{}", id)).await?;
        let chain: ChainPayload = self
            .get_json(&species.evolution_chain.url, &format!("#{}", id))
            .await?;

        let mut stages = Vec::new();
        flatten_chain(&chain.chain, &mut stages);
        Ok(stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PIKACHU: &str = include_str!("fixtures/pikachu.json");
    const EEVEE_CHAIN: &str = include_str!("fixtures/eevee_chain.json");

    #[test]
    fn test_parse_pokemon_reads_consumed_fields() {
        let pikachu = parse_pokemon_json(PIKACHU).unwrap();

        assert_eq!(pikachu.id, 25);
        assert_eq!(pikachu.name, "pikachu");
        assert_eq!(pikachu.affinities(), [PokemonType::Electric]);
        assert_eq!(pikachu.max_hp(), 35);
        assert_eq!(pikachu.current_hp(), 35);
        assert_eq!(pikachu.attack(), 55);
        assert_eq!(pikachu.defense(), 40);
        assert_eq!(pikachu.speed(), 90);
        assert_eq!(
            pikachu.sprites.front.as_deref(),
            Some("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/25.png")
        );
        assert!(pikachu.sprites.back.unwrap().ends_with("/back/25.png"));
    }

    #[test]
    fn test_parse_pokemon_defaults_missing_fields() {
        let body = r#"{
            "id": 132,
            "name": "ditto",
            "stats": [{ "base_stat": 48, "stat": { "name": "attack" } }],
            "types": [{ "type": { "name": "shadow" } }],
            "sprites": { "front_default": "front.png", "back_default": null, "other": {} }
        }"#;

        let ditto = parse_pokemon_json(body).unwrap();
        assert_eq!(ditto.attack(), 48);
        assert_eq!(ditto.defense(), 0);
        assert_eq!(ditto.max_hp(), 1);
        assert_eq!(ditto.affinities(), [PokemonType::Typeless]);
        assert_eq!(ditto.sprites.front.as_deref(), Some("front.png"));
        assert_eq!(ditto.sprites.back, None);
    }

    #[test]
    fn test_unparseable_payload_is_unavailable() {
        assert!(matches!(
            parse_pokemon_json("<html>busy</html>"),
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn test_evolution_chain_is_depth_first() {
        let stages = parse_evolution_chain_json(EEVEE_CHAIN).unwrap();
        let names: Vec<_> = stages.iter().map(|s| (s.id, s.name.as_str())).collect();
        assert_eq!(
            names,
            vec![(133, "eevee"), (134, "vaporeon"), (135, "jolteon"), (196, "espeon")]
        );
        assert_eq!(stages[0].image, sprite_url(133));
    }

    #[test]
    fn test_id_from_url() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon-species/133/"), Some(133));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon-species/7"), Some(7));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon-species/"), None);
    }

    #[test]
    fn test_base_url_is_normalised() {
        let provider = PokeApiProvider::new("http://localhost:8080/api/v2/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(provider.base_url(), "http://localhost:8080/api/v2");
    }
}
