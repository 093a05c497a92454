use crate::errors::SessionError;
use schema::{BaseStats, PokemonType, SpriteRefs};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single creature's battle-relevant attributes.
///
/// Identity, affinities and the attack/defense/speed stats are fixed once the creature is
/// resolved. Only `hp` changes during a battle and it always stays within `0..=hp_max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: u16,
    pub name: String,
    pub sprites: SpriteRefs,
    affinities: Vec<PokemonType>,
    attack: u16,
    defense: u16,
    speed: u16,
    hp: u16,
    hp_max: u16,
}

impl Combatant {
    /// Create a combatant at full health.
    ///
    /// Stats the data source left out arrive here as zero. Repeated affinities collapse to their
    /// first occurrence, an empty affinity list becomes `[Typeless]` and a zero hp stat becomes
    /// an hp_max of 1, so every combatant can enter a battle.
    pub fn new(
        id: u16,
        name: impl Into<String>,
        affinities: Vec<PokemonType>,
        stats: BaseStats,
        sprites: SpriteRefs,
    ) -> Self {
        let mut unique: Vec<PokemonType> = Vec::with_capacity(affinities.len());
        for affinity in affinities {
            if !unique.contains(&affinity) {
                unique.push(affinity);
            }
        }
        let mut affinities = unique;
        if affinities.is_empty() {
            affinities.push(PokemonType::Typeless);
        }
        let hp_max = stats.hp.max(1);

        Combatant {
            id,
            name: name.into(),
            sprites,
            affinities,
            attack: stats.attack,
            defense: stats.defense,
            speed: stats.speed,
            hp: hp_max,
            hp_max,
        }
    }

    pub fn affinities(&self) -> &[PokemonType] {
        &self.affinities
    }

    pub fn attack(&self) -> u16 {
        self.attack
    }

    pub fn defense(&self) -> u16 {
        self.defense
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn current_hp(&self) -> u16 {
        self.hp
    }

    pub fn max_hp(&self) -> u16 {
        self.hp_max
    }

    /// Set hp directly, clamped to `0..=hp_max`.
    pub fn set_hp(&mut self, hp: u16) {
        self.hp = hp.min(self.hp_max);
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// Apply damage, clamping at zero. Returns true if this hit knocked the combatant out.
    pub fn take_damage(&mut self, amount: u16) -> bool {
        let was_standing = !self.is_fainted();
        self.hp = self.hp.saturating_sub(amount);
        was_standing && self.is_fainted()
    }

    pub fn heal_to_max(&mut self) {
        self.hp = self.hp_max;
    }

    /// Base stats view, used when re-serializing a creature for the offline dex.
    pub fn base_stats(&self) -> BaseStats {
        BaseStats {
            hp: self.hp_max,
            attack: self.attack,
            defense: self.defense,
            speed: self.speed,
        }
    }

    /// Check the data model invariants on a value that came from outside the engine.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.hp_max == 0 {
            return Err(SessionError::Corrupt(format!("{} has an hp_max of 0", self.name)));
        }
        if self.hp > self.hp_max {
            return Err(SessionError::Corrupt(format!(
                "{} has {} hp, above its maximum of {}",
                self.name, self.hp, self.hp_max
            )));
        }
        if self.affinities.is_empty() {
            return Err(SessionError::Corrupt(format!("{} has no affinities", self.name)));
        }
        for (i, affinity) in self.affinities.iter().enumerate() {
            if self.affinities[..i].contains(affinity) {
                return Err(SessionError::Corrupt(format!(
                    "{} lists the {} affinity twice",
                    self.name, affinity
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Combatant {
    /// `{}` prints a one-line summary, `{:#}` adds a second line with the stat block.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = self
            .affinities
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("/");
        write!(
            f,
            "#{:03} {} [{}] HP {}/{}",
            self.id, self.name, types, self.hp, self.hp_max
        )?;
        if f.alternate() {
            write!(
                f,
                "\n    ATK {} / DEF {} / SPD {}",
                self.attack, self.defense, self.speed
            )?;
        }
        Ok(())
    }
}
