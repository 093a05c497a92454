use crate::battle::rules::BattleRules;
use crate::battle::state::{BattleSession, EncounterPool, EncounterRng};
use crate::errors::{BattleResult, ProviderError, ProviderResult};
use crate::player::{Roster, ROSTER_CAPACITY};
use crate::pokemon::Combatant;
use crate::provider::{CreatureProvider, MemoryProvider};
use crate::species::SpeciesQuery;
use async_trait::async_trait;
use schema::{BaseStats, BattleStatus, PokemonType, SpriteRefs};

/// A builder for creating test combatants with common defaults.
///
/// # Example
/// ```
/// let pikachu = TestCombatantBuilder::new(25, "pikachu")
///     .with_attack(55)
///     .with_hp(20)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    id: u16,
    name: String,
    types: Vec<PokemonType>,
    stats: BaseStats,
    current_hp: Option<u16>,
}

impl TestCombatantBuilder {
    /// Creates a builder with 100 hp and 50 in every other stat.
    pub fn new(id: u16, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            types: vec![PokemonType::Normal],
            stats: BaseStats {
                hp: 100,
                attack: 50,
                defense: 50,
                speed: 50,
            },
            current_hp: None,
        }
    }

    pub fn with_attack(mut self, attack: u16) -> Self {
        self.stats.attack = attack;
        self
    }

    pub fn with_defense(mut self, defense: u16) -> Self {
        self.stats.defense = defense;
        self
    }

    pub fn with_speed(mut self, speed: u16) -> Self {
        self.stats.speed = speed;
        self
    }

    pub fn with_max_hp(mut self, hp_max: u16) -> Self {
        self.stats.hp = hp_max;
        self
    }

    /// Sets the current hp. If not set, hp will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn with_types(mut self, types: Vec<PokemonType>) -> Self {
        self.types = types;
        self
    }

    pub fn build(self) -> Combatant {
        let mut combatant = Combatant::new(
            self.id,
            self.name,
            self.types,
            self.stats,
            SpriteRefs::default(),
        );
        if let Some(hp) = self.current_hp {
            combatant.set_hp(hp);
        }
        combatant
    }
}

/// Rules with the loose roster requirement, so scenarios can use small teams.
pub fn test_rules() -> BattleRules {
    BattleRules {
        require_full_roster: false,
        ..BattleRules::default()
    }
}

/// A combatant that goes down to any strike and hits for the damage floor.
pub fn fodder(id: u16) -> Combatant {
    TestCombatantBuilder::new(id, &format!("fodder{}", id))
        .with_attack(0)
        .with_defense(0)
        .with_max_hp(1)
        .build()
}

/// Pads an opponent lineup with fodder up to a full roster.
pub fn full_opponent(mut members: Vec<Combatant>) -> Vec<Combatant> {
    let mut next_id = 200;
    while members.len() < ROSTER_CAPACITY {
        members.push(fodder(next_id));
        next_id += 1;
    }
    members
}

/// A session already in progress, both rosters pointing at their first standing member.
pub fn session_in_progress(player: Vec<Combatant>, opponent: Vec<Combatant>) -> BattleSession {
    BattleSession {
        player_roster: Roster::new(player),
        opponent_roster: Roster::new(opponent),
        status: BattleStatus::InProgress,
        last_log: None,
        turn_number: 1,
    }
}

/// The same encounter ids on every call, all of them present in the bundled dex.
pub fn predictable_encounters() -> EncounterRng {
    EncounterRng::new_for_test(vec![4, 7, 25, 133, 143])
}

/// Wraps the bundled dex and fails every lookup for one id.
pub struct FailingProvider {
    inner: MemoryProvider,
    failing_id: u16,
}

impl FailingProvider {
    pub fn new(failing_id: u16) -> Self {
        Self {
            inner: MemoryProvider::bundled().expect("bundled dex should load"),
            failing_id,
        }
    }
}

#[async_trait]
impl CreatureProvider for FailingProvider {
    async fn fetch(&self, query: &SpeciesQuery) -> ProviderResult<Combatant> {
        if *query == SpeciesQuery::Id(self.failing_id) {
            return Err(ProviderError::Unavailable("connection reset".to_string()));
        }
        self.inner.fetch(query).await
    }

    fn encounter_pool(&self, dex_limit: u16) -> EncounterPool {
        self.inner.encounter_pool(dex_limit)
    }
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
