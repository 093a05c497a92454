use serde::{Deserialize, Serialize};

/// Highest national dex number the arena supports (the first two generations).
pub const DEX_LIMIT: u16 = 251;

/// Base stats consumed by the battle engine. Any stat the data source omits is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub speed: u16,
}

/// Image references for a creature. Either may be missing upstream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpriteRefs {
    /// High resolution front artwork.
    pub front: Option<String>,
    /// Back sprite, shown for the player's side of a battle.
    pub back: Option<String>,
}

/// One species in an evolution chain, in depth-first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionStage {
    pub id: u16,
    pub name: String,
    pub image: String,
}
