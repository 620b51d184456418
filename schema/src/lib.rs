// Pokemon League Schema - Shared type definitions
// This crate contains the core enums and data types shared between the
// engine crate and anything that stores or transports its results.

// Re-export the main types
pub use battle_data::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod pokemon_types;
pub mod species_data;
