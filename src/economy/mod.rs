pub mod loot;
pub mod packs;

pub use loot::{LootEntry, LootGenerator, PackOpening};
pub use packs::{PackCatalog, PackConfig};
