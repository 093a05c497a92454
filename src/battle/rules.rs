use crate::battle::effectiveness::{EffectivenessTable, TypeChart};
use crate::errors::ConfigError;
use schema::DEX_LIMIT;
use serde::{Deserialize, Serialize};

/// Damage floor: every strike deals at least this much.
pub const MIN_DAMAGE: u16 = 10;

/// Tunable battle rules. The defaults are the canonical rule set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BattleRules {
    pub min_damage: u16,
    /// Highest dex id that may be fetched, added to a team or drawn as an opponent.
    pub dex_limit: u16,
    /// Strict variant: the player needs a full roster to start a battle.
    pub require_full_roster: bool,
    /// Elemental multipliers; `None` keeps damage purely stat based.
    pub type_chart: Option<TypeChart>,
    /// Seed for reproducible opponent generation.
    pub encounter_seed: Option<u64>,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            min_damage: MIN_DAMAGE,
            dex_limit: DEX_LIMIT,
            require_full_roster: true,
            type_chart: None,
            encounter_seed: None,
        }
    }
}

impl BattleRules {
    pub fn effectiveness(&self) -> Option<EffectivenessTable> {
        self.type_chart.map(EffectivenessTable::new)
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_canonical() {
        let rules = BattleRules::default();
        assert_eq!(rules.min_damage, 10);
        assert_eq!(rules.dex_limit, 251);
        assert!(rules.require_full_roster);
        assert!(rules.effectiveness().is_none());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let rules = BattleRules::from_ron_str("(type_chart: Some(Starter), encounter_seed: Some(7))")
            .expect("rules should parse");
        assert_eq!(rules.type_chart, Some(TypeChart::Starter));
        assert_eq!(rules.encounter_seed, Some(7));
        assert_eq!(rules.min_damage, MIN_DAMAGE);
    }

    #[test]
    fn test_bad_ron_is_a_parse_error() {
        assert!(matches!(
            BattleRules::from_ron_str("(min_damage: \"ten\")"),
            Err(ConfigError::Parse(_))
        ));
    }
}
