use super::packs::PackConfig;
use crate::catalog::CatalogProvider;
use crate::rng::RngSource;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use schema::{RarityTier, SpeciesId};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootEntry {
    pub species: SpeciesId,
    pub shiny: bool,
    /// Drawn from the legendary pool.
    pub is_legendary: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackOpening {
    pub pack_id: String,
    pub entries: Vec<LootEntry>,
    pub is_mega: bool,
    pub opened_at: DateTime<Utc>,
}

impl PackOpening {
    pub fn legendary_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_legendary).count()
    }

    pub fn shiny_count(&self) -> usize {
        self.entries.iter().filter(|e| e.shiny).count()
    }
}

/// Resolves a pack into creatures, honouring the pack's rarity guarantees.
#[derive(Debug, Clone)]
pub struct LootGenerator {
    standard_pool: Vec<SpeciesId>,
    legendary_pool: Vec<SpeciesId>,
}

impl LootGenerator {
    pub fn new(standard_pool: Vec<SpeciesId>, legendary_pool: Vec<SpeciesId>) -> Self {
        Self {
            standard_pool,
            legendary_pool,
        }
    }

    pub fn from_catalog(catalog: &dyn CatalogProvider) -> Self {
        Self::new(
            catalog.species_pool(RarityTier::Standard),
            catalog.species_pool(RarityTier::Legendary),
        )
    }

    pub fn open(
        &self,
        config: &PackConfig,
        now: DateTime<Utc>,
        rng: &mut dyn RngSource,
    ) -> PackOpening {
        let mut count = rng.range_inclusive(config.min_count, config.max_count, "pack size");
        let is_mega = config.mega_pack_chance > 0.0 && rng.chance(config.mega_pack_chance, "mega pack");
        if is_mega {
            count = config.mega_pack_size;
        }

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let wants_legendary = rng.chance(config.legendary_chance, "legendary slot");
            let (species, is_legendary) = self.draw_species(wants_legendary, rng);
            let shiny = rng.chance(config.shiny_chance, "shiny");
            if let Some(species) = species {
                entries.push(LootEntry {
                    species,
                    shiny,
                    is_legendary,
                });
            }
        }

        if config.guaranteed_rare {
            self.enforce_rare_count(&mut entries, config.guaranteed_rare_count, rng);
        }
        if config.guaranteed_shiny_or_legendaries {
            self.enforce_shiny_or_legendaries(&mut entries, config.guaranteed_legendary_count, rng);
        }

        debug!(
            "Opened {} ({} creatures, mega: {})",
            config.id,
            entries.len(),
            is_mega
        );
        PackOpening {
            pack_id: config.id.clone(),
            entries,
            is_mega,
            opened_at: now,
        }
    }

    /// Pick a species from the requested pool. An empty legendary pool falls
    /// back to the standard one (and vice versa).
    fn draw_species(&self, legendary: bool, rng: &mut dyn RngSource) -> (Option<SpeciesId>, bool) {
        let use_legendary = if legendary {
            !self.legendary_pool.is_empty()
        } else {
            self.standard_pool.is_empty() && !self.legendary_pool.is_empty()
        };
        let pool = if use_legendary {
            &self.legendary_pool
        } else {
            &self.standard_pool
        };
        if pool.is_empty() {
            warn!("Both species pools are empty; slot left unfilled");
            return (None, false);
        }
        let index = rng.pick_index(pool.len(), "species");
        (Some(pool[index]), use_legendary)
    }

    /// Re-roll the lowest-index non-legendary slots from the legendary pool
    /// until `required` legendaries are present. Shiny flags are kept.
    fn enforce_rare_count(&self, entries: &mut [LootEntry], required: u32, rng: &mut dyn RngSource) {
        if self.legendary_pool.is_empty() {
            warn!("Guaranteed rare requested but the legendary pool is empty");
            return;
        }
        let present = entries.iter().filter(|e| e.is_legendary).count();
        let mut missing = (required as usize).saturating_sub(present);
        for entry in entries.iter_mut() {
            if missing == 0 {
                break;
            }
            if !entry.is_legendary {
                self.force_legendary(entry, rng);
                missing -= 1;
            }
        }
    }

    /// With no shiny present, force the last `count` slots into the legendary pool.
    fn enforce_shiny_or_legendaries(
        &self,
        entries: &mut [LootEntry],
        count: u32,
        rng: &mut dyn RngSource,
    ) {
        if entries.iter().any(|e| e.shiny) {
            return;
        }
        if self.legendary_pool.is_empty() {
            warn!("Shiny-or-legendary guarantee requested but the legendary pool is empty");
            return;
        }
        let start = entries.len().saturating_sub(count as usize);
        for entry in entries[start..].iter_mut().filter(|e| !e.is_legendary) {
            self.force_legendary(entry, rng);
        }
    }

    fn force_legendary(&self, entry: &mut LootEntry, rng: &mut dyn RngSource) {
        let index = rng.pick_index(self.legendary_pool.len(), "guaranteed legendary");
        entry.species = self.legendary_pool[index];
        entry.is_legendary = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::rng::{ScriptedRng, SeededRng};

    const TRIALS: usize = 10_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn generator() -> LootGenerator {
        LootGenerator::new(
            vec![SpeciesId(1), SpeciesId(4), SpeciesId(7), SpeciesId(25)],
            vec![SpeciesId(144), SpeciesId(150)],
        )
    }

    #[test]
    fn test_sizes_stay_in_bounds_unless_mega() {
        let config = PackConfig {
            mega_pack_chance: 0.2,
            mega_pack_size: 10,
            shiny_chance: 0.1,
            legendary_chance: 0.05,
            ..PackConfig::simple("test", 3, 5)
        };
        let loot = generator();
        let mut rng = SeededRng::new(2024);
        let mut megas = 0;
        let mut shinies = 0;
        let mut slots = 0;

        for _ in 0..TRIALS {
            let opening = loot.open(&config, now(), &mut rng);
            if opening.is_mega {
                megas += 1;
                assert_eq!(opening.entries.len(), 10);
            } else {
                assert!((3..=5).contains(&opening.entries.len()));
            }
            shinies += opening.shiny_count();
            slots += opening.entries.len();
        }

        let mega_rate = megas as f64 / TRIALS as f64;
        assert!((mega_rate - 0.2).abs() < 0.02, "mega rate {mega_rate}");
        let shiny_rate = shinies as f64 / slots as f64;
        assert!((shiny_rate - 0.1).abs() < 0.01, "shiny rate {shiny_rate}");
    }

    #[test]
    fn test_guaranteed_rare_count_always_met() {
        let config = PackConfig {
            guaranteed_rare: true,
            guaranteed_rare_count: 3,
            ..PackConfig::simple("elite", 3, 6)
        };
        let loot = generator();
        let mut rng = SeededRng::new(9);
        for _ in 0..TRIALS {
            let opening = loot.open(&config, now(), &mut rng);
            assert!(opening.legendary_count() >= 3);
            for entry in &opening.entries {
                if entry.is_legendary {
                    assert!([SpeciesId(144), SpeciesId(150)].contains(&entry.species));
                }
            }
        }
    }

    #[test]
    fn test_guaranteed_rare_rerolls_lowest_index_first() {
        let config = PackConfig {
            legendary_chance: 0.5,
            shiny_chance: 0.5,
            guaranteed_rare: true,
            guaranteed_rare_count: 2,
            ..PackConfig::simple("premium", 4, 4)
        };
        // Per slot: legendary draw, species draw, shiny draw.
        let mut rng = ScriptedRng::new(vec![
            0.9, 0.0, 0.1, // slot 0: standard, shiny
            0.1, 0.0, 0.9, // slot 1: legendary
            0.9, 0.5, 0.9, // slot 2: standard
            0.9, 0.99, 0.9, // slot 3: standard
            0.99, // re-roll of slot 0
        ]);
        let opening = generator().open(&config, now(), &mut rng);

        assert_eq!(rng.consumed(), 13);
        assert_eq!(
            opening.entries,
            vec![
                LootEntry { species: SpeciesId(150), shiny: true, is_legendary: true },
                LootEntry { species: SpeciesId(144), shiny: false, is_legendary: true },
                LootEntry { species: SpeciesId(7), shiny: false, is_legendary: false },
                LootEntry { species: SpeciesId(25), shiny: false, is_legendary: false },
            ]
        );
    }

    #[test]
    fn test_shiny_or_legendary_forces_last_slots() {
        let config = PackConfig {
            guaranteed_shiny_or_legendaries: true,
            guaranteed_legendary_count: 2,
            ..PackConfig::simple("master", 4, 4)
        };
        let loot = generator();
        let mut rng = SeededRng::new(5);
        let opening = loot.open(&config, now(), &mut rng);
        let flags: Vec<bool> = opening.entries.iter().map(|e| e.is_legendary).collect();
        assert_eq!(flags, vec![false, false, true, true]);

        // Any shiny means no forcing
        let shiny_config = PackConfig {
            shiny_chance: 1.0,
            ..config
        };
        let opening = loot.open(&shiny_config, now(), &mut rng);
        assert_eq!(opening.legendary_count(), 0);
        assert_eq!(opening.shiny_count(), 4);
    }

    #[test]
    fn test_empty_legendary_pool_falls_back_to_standard() {
        let loot = LootGenerator::new(vec![SpeciesId(19)], vec![]);
        let config = PackConfig {
            legendary_chance: 1.0,
            guaranteed_rare: true,
            guaranteed_rare_count: 2,
            guaranteed_shiny_or_legendaries: true,
            guaranteed_legendary_count: 2,
            ..PackConfig::simple("basic", 3, 3)
        };
        let opening = loot.open(&config, now(), &mut SeededRng::new(1));
        assert_eq!(opening.entries.len(), 3);
        assert!(opening.entries.iter().all(|e| e.species == SpeciesId(19) && !e.is_legendary));
    }

    #[test]
    fn test_kanto_catalog_pools() {
        let catalog = StaticCatalog::kanto();
        let loot = LootGenerator::from_catalog(&catalog);
        let config = PackConfig {
            legendary_chance: 1.0,
            ..PackConfig::simple("all-legendary", 5, 5)
        };
        let opening = loot.open(&config, now(), &mut SeededRng::new(3));
        assert_eq!(opening.legendary_count(), 5);
        assert!(opening
            .entries
            .iter()
            .all(|e| catalog.get_rarity_tier(e.species) == Ok(RarityTier::Legendary)));
    }
}
