//! what comes up on the line, plus a running tally of catches
use std::collections::HashMap;
use std::fmt;

use rand::Rng;

use crate::config::CatchOdds;
use crate::population::FishPopulation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Treasure,
    Junk,
    Fish(Rarity),
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemCategory::Treasure => f.write_str("treasure"),
            ItemCategory::Junk => f.write_str("junk"),
            ItemCategory::Fish(Rarity::Common) => f.write_str("common fish"),
            ItemCategory::Fish(Rarity::Uncommon) => f.write_str("uncommon fish"),
            ItemCategory::Fish(Rarity::Rare) => f.write_str("rare fish"),
        }
    }
}

/// One resolved catch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaughtItem {
    pub item_type: String,
    pub category: ItemCategory,
}

const GENERIC_TREASURE: &[&str] = &["treasure_chest", "gold_coin"];
const GENERIC_JUNK: &[&str] = &["old_boot", "tin_can", "seaweed"];
const GENERIC_COMMON: &[&str] = &["small_fish"];
const GENERIC_UNCOMMON: &[&str] = &["medium_fish"];
const GENERIC_RARE: &[&str] = &["large_fish"];

fn pick<R: Rng + ?Sized>(rng: &mut R, names: &[String], fallback: &[&str]) -> String {
    if names.is_empty() {
        fallback[rng.gen_range(0..fallback.len())].to_string()
    } else {
        names[rng.gen_range(0..names.len())].clone()
    }
}

/// Roll what was hooked. First draw picks treasure / junk / fish; a second
/// draw picks the fish tier. Names come from `population` when there is one.
pub fn determine_caught_item<R: Rng + ?Sized>(
    rng: &mut R,
    population: Option<&FishPopulation>,
    odds: &CatchOdds,
) -> CaughtItem {
    let empty: &[String] = &[];
    let roll: f64 = rng.gen();

    if roll < odds.treasure {
        let names = population.map_or(empty, |p| p.special_items.as_slice());
        return CaughtItem {
            item_type: pick(rng, names, GENERIC_TREASURE),
            category: ItemCategory::Treasure,
        };
    }
    if roll < odds.treasure + odds.junk {
        return CaughtItem {
            item_type: pick(rng, empty, GENERIC_JUNK),
            category: ItemCategory::Junk,
        };
    }

    let tier: f64 = rng.gen();
    let (rarity, names, fallback) = if tier < odds.common {
        (Rarity::Common, population.map_or(empty, |p| p.common.as_slice()), GENERIC_COMMON)
    } else if tier < odds.common + odds.uncommon {
        (Rarity::Uncommon, population.map_or(empty, |p| p.uncommon.as_slice()), GENERIC_UNCOMMON)
    } else {
        (Rarity::Rare, population.map_or(empty, |p| p.rare.as_slice()), GENERIC_RARE)
    };
    CaughtItem {
        item_type: pick(rng, names, fallback),
        category: ItemCategory::Fish(rarity),
    }
}

/// In-memory tally of everything landed this run.
#[derive(Debug, Default, Clone)]
pub struct CatchLog {
    by_item: HashMap<String, u32>,
    by_category: HashMap<ItemCategory, u32>,
    total: u32,
}

impl CatchLog {
    pub fn record(&mut self, item: &CaughtItem) {
        *self.by_item.entry(item.item_type.clone()).or_default() += 1;
        *self.by_category.entry(item.category).or_default() += 1;
        self.total += 1;
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn count_of(&self, item_type: &str) -> u32 {
        self.by_item.get(item_type).copied().unwrap_or(0)
    }

    pub fn count_in(&self, category: ItemCategory) -> u32 {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    pub fn species_caught(&self) -> usize {
        self.by_item.len()
    }
}
