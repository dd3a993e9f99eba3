//! per-biome fish tables
use std::fmt;

/// Kind of body of water.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneType {
    Lake,
    River,
    Ocean,
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZoneType::Lake => "lake",
            ZoneType::River => "river",
            ZoneType::Ocean => "ocean",
        };
        f.write_str(name)
    }
}

/// Catchables living in one water zone, grouped by rarity tier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FishPopulation {
    pub common: Vec<String>,
    pub uncommon: Vec<String>,
    pub rare: Vec<String>,
    pub special_items: Vec<String>,
}

struct SpeciesTable {
    common: &'static [&'static str],
    uncommon: &'static [&'static str],
    rare: &'static [&'static str],
    special: &'static [&'static str],
    legendary: &'static str,
}

const LAKE: SpeciesTable = SpeciesTable {
    common: &["perch", "bluegill", "carp"],
    uncommon: &["largemouth_bass", "catfish"],
    rare: &["pike", "sturgeon"],
    special: &["lost_ring", "message_bottle"],
    legendary: "lake_leviathan",
};

const RIVER: SpeciesTable = SpeciesTable {
    common: &["minnow", "dace", "brook_trout"],
    uncommon: &["salmon", "grayling"],
    rare: &["golden_trout"],
    special: &["gold_nugget"],
    legendary: "river_king",
};

const OCEAN: SpeciesTable = SpeciesTable {
    common: &["sardine", "mackerel", "herring"],
    uncommon: &["tuna", "red_snapper"],
    rare: &["swordfish", "marlin"],
    special: &["pearl", "ancient_coin"],
    legendary: "abyssal_eel",
};

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl FishPopulation {
    /// Species list for `kind`; `legendary` appends the biome's legend to the
    /// rare tier.
    pub fn for_zone(kind: ZoneType, legendary: bool) -> Self {
        let table = match kind {
            ZoneType::Lake => &LAKE,
            ZoneType::River => &RIVER,
            ZoneType::Ocean => &OCEAN,
        };
        let mut rare = owned(table.rare);
        if legendary {
            rare.push(table.legendary.to_string());
        }
        Self {
            common: owned(table.common),
            uncommon: owned(table.uncommon),
            rare,
            special_items: owned(table.special),
        }
    }

    pub fn has_legendary(&self, kind: ZoneType) -> bool {
        let legend = match kind {
            ZoneType::Lake => LAKE.legendary,
            ZoneType::River => RIVER.legendary,
            ZoneType::Ocean => OCEAN.legendary,
        };
        self.rare.iter().any(|f| f == legend)
    }
}
