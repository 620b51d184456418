//! Shop pack definitions.

use crate::errors::{ConfigError, EconomyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The draw contract for one kind of pack.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PackConfig {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub min_count: u32,
    pub max_count: u32,
    pub shiny_chance: f64,
    pub legendary_chance: f64,
    #[serde(default)]
    pub mega_pack_chance: f64,
    #[serde(default)]
    pub mega_pack_size: u32,
    #[serde(default)]
    pub guaranteed_rare: bool,
    #[serde(default = "default_guaranteed_rare_count")]
    pub guaranteed_rare_count: u32,
    #[serde(default)]
    pub guaranteed_shiny_or_legendaries: bool,
    #[serde(default)]
    pub guaranteed_legendary_count: u32,
}

fn default_guaranteed_rare_count() -> u32 {
    1
}

impl PackConfig {
    /// A plain pack: no mega upgrade and no guarantees.
    pub fn simple(id: &str, min_count: u32, max_count: u32) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            price: 0,
            min_count,
            max_count,
            shiny_chance: 0.0,
            legendary_chance: 0.0,
            mega_pack_chance: 0.0,
            mega_pack_size: 0,
            guaranteed_rare: false,
            guaranteed_rare_count: 1,
            guaranteed_shiny_or_legendaries: false,
            guaranteed_legendary_count: 0,
        }
    }
}

/// The shop's pack lineup, keyed by pack id.
#[derive(Debug, Clone, PartialEq)]
pub struct PackCatalog {
    packs: BTreeMap<String, PackConfig>,
}

impl PackCatalog {
    pub fn from_packs(packs: Vec<PackConfig>) -> Self {
        Self {
            packs: packs.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let packs: Vec<PackConfig> =
            ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self::from_packs(packs))
    }

    pub fn get(&self, id: &str) -> Result<&PackConfig, EconomyError> {
        self.packs
            .get(id)
            .ok_or_else(|| EconomyError::UnknownPack(id.to_string()))
    }

    /// Packs ordered by price, cheapest first.
    pub fn listing(&self) -> Vec<&PackConfig> {
        let mut packs: Vec<&PackConfig> = self.packs.values().collect();
        packs.sort_by_key(|p| p.price);
        packs
    }
}

impl Default for PackCatalog {
    fn default() -> Self {
        Self::from_packs(vec![
            PackConfig {
                name: "Basic Pack".to_string(),
                price: 100,
                shiny_chance: 0.0001,
                legendary_chance: 0.05,
                ..PackConfig::simple("basic", 3, 5)
            },
            PackConfig {
                name: "Booster Pack".to_string(),
                price: 250,
                shiny_chance: 0.0005,
                legendary_chance: 0.10,
                mega_pack_chance: 0.15,
                mega_pack_size: 12,
                ..PackConfig::simple("booster", 5, 8)
            },
            PackConfig {
                name: "Premium Pack".to_string(),
                price: 500,
                shiny_chance: 0.001,
                legendary_chance: 0.20,
                mega_pack_chance: 0.25,
                mega_pack_size: 15,
                guaranteed_rare: true,
                ..PackConfig::simple("premium", 8, 12)
            },
            PackConfig {
                name: "Elite Trainer Pack".to_string(),
                price: 1000,
                shiny_chance: 0.005,
                legendary_chance: 0.40,
                mega_pack_chance: 0.35,
                mega_pack_size: 20,
                guaranteed_rare: true,
                guaranteed_rare_count: 3,
                ..PackConfig::simple("elite_trainer", 12, 18)
            },
            PackConfig {
                name: "Master Collection".to_string(),
                price: 2500,
                shiny_chance: 0.01,
                legendary_chance: 0.60,
                mega_pack_chance: 0.5,
                mega_pack_size: 30,
                guaranteed_shiny_or_legendaries: true,
                guaranteed_legendary_count: 3,
                ..PackConfig::simple("master_collection", 20, 25)
            },
        ])
    }
}
