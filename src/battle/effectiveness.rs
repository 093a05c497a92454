//! Optional elemental damage multipliers.
//!
//! The table is off by default. When enabled through [`crate::battle::rules::BattleRules`], the
//! composed multiplier scales the base damage before the minimum-damage floor is applied.

use schema::PokemonType;
use serde::{Deserialize, Serialize};

/// Which matchup chart the table uses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChart {
    /// Fire, water and grass only: each doubles against the next and halves against the
    /// previous. Everything else is neutral.
    Starter,
    /// The full chart, immunities included.
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectivenessTable {
    chart: TypeChart,
}

impl EffectivenessTable {
    pub fn new(chart: TypeChart) -> Self {
        Self { chart }
    }

    pub fn chart(&self) -> TypeChart {
        self.chart
    }

    /// Multiplier for a single attacking affinity against a single defending affinity.
    pub fn multiplier(&self, attacking: PokemonType, defending: PokemonType) -> f32 {
        match self.chart {
            TypeChart::Starter => starter_multiplier(attacking, defending),
            TypeChart::Standard => PokemonType::type_effectiveness(attacking, defending),
        }
    }

    /// Product of the multipliers over every (attacking, defending) affinity pair.
    pub fn composed(&self, attacking: &[PokemonType], defending: &[PokemonType]) -> f32 {
        attacking
            .iter()
            .flat_map(|&a| defending.iter().map(move |&d| (a, d)))
            .map(|(a, d)| self.multiplier(a, d))
            .product()
    }
}

fn starter_multiplier(attacking: PokemonType, defending: PokemonType) -> f32 {
    use PokemonType::*;

    match (attacking, defending) {
        (Fire, Grass) | (Water, Fire) | (Grass, Water) => 2.0,
        (Fire, Water) | (Water, Grass) | (Grass, Fire) => 0.5,
        _ => 1.0,
    }
}
