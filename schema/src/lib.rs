// Pokedex Arena Schema - Shared type definitions
// This crate contains the plain data enums and records shared between the
// battle engine, the creature providers and the host binaries.

// Re-export the main types
pub use battle_data::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod pokemon_types;
pub mod species_data;
