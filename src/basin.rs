//! where water goes: per-chunk water decisions and the basin dug for it
//!
//! Both generators own a [`BasinLayout`] built from the same seed. Terrain
//! lowers the columns under a basin, water fills it up to the lower bank, so
//! neither side has to look at the other's streamed state.
use bevy::prelude::*;

use crate::config::{TerrainSettings, WaterSettings};
use crate::constants::*;
use crate::noise_field::NoiseSource;
use crate::population::ZoneType;
use crate::terrain::natural_height;

/* ---------- per-biome shape ---------- */
struct ZoneShape {
    width: (f32, f32),
    depth: (f32, f32),
}

const LAKE_SHAPE: ZoneShape = ZoneShape {
    width: (240.0, 400.0),
    depth: (64.0, 112.0),
};
const RIVER_SHAPE: ZoneShape = ZoneShape {
    width: (96.0, 160.0),
    depth: (128.0, 176.0),
};
const OCEAN_SHAPE: ZoneShape = ZoneShape {
    width: (400.0, 496.0),
    depth: (192.0, 256.0),
};

fn shape_of(kind: ZoneType) -> &'static ZoneShape {
    match kind {
        ZoneType::Lake => &LAKE_SHAPE,
        ZoneType::River => &RIVER_SHAPE,
        ZoneType::Ocean => &OCEAN_SHAPE,
    }
}

#[inline]
fn lerp(range: (f32, f32), t: f64) -> f32 {
    range.0 + (range.1 - range.0) * t as f32
}

/// One chunk's water hole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basin {
    pub chunk_index: i32,
    pub kind: ZoneType,
    pub left: f32,
    pub right: f32,
    /// water surface, level with the lower bank
    pub surface: f32,
    /// water bottom
    pub bed: f32,
    /// column height (blocks) under the water
    pub floor_blocks: u32,
}

impl Basin {
    pub fn area(&self) -> Rect {
        Rect::new(self.left, self.bed, self.right, self.surface)
    }

    /// Whether the tile column starting at `x` reaches under the water.
    pub fn covers_column(&self, x: f32, tile: f32) -> bool {
        x + tile > self.left && x < self.right
    }
}

/// Pure `(seed, chunk index)` water decisions.
pub struct BasinLayout {
    water: WaterSettings,
    terrain: TerrainSettings,
    seed: u32,
    noise: Box<dyn NoiseSource>,
}

impl BasinLayout {
    pub fn new(
        water: WaterSettings,
        terrain: TerrainSettings,
        seed: u32,
        noise: Box<dyn NoiseSource>,
    ) -> Self {
        Self {
            water,
            terrain,
            seed,
            noise,
        }
    }

    pub fn water_settings(&self) -> &WaterSettings {
        &self.water
    }

    #[inline]
    fn sample(&self, index: i32, lane: f64, offset: u32) -> f64 {
        self.noise.noise(
            index as f64 * 0.731 + 0.29,
            lane,
            self.seed.wrapping_add(offset),
        )
    }

    pub fn determine_zone_type(&self, index: i32) -> ZoneType {
        if index == 0 {
            return ZoneType::Lake;
        }
        let distance = index.saturating_abs();
        if distance > self.water.ocean_bias_distance {
            let chance = (OCEAN_BIAS_BASE
                + (distance - self.water.ocean_bias_distance) as f64 * OCEAN_BIAS_PER_CHUNK)
                .min(OCEAN_BIAS_MAX);
            if self.sample(index, 0.13, OCEAN_BIAS_OFFSET) < chance {
                return ZoneType::Ocean;
            }
        }
        let v = self.sample(index, 0.47, ZONE_TYPE_OFFSET);
        if v < LAKE_BAND {
            ZoneType::Lake
        } else if v < LAKE_BAND + RIVER_BAND {
            ZoneType::River
        } else {
            ZoneType::Ocean
        }
    }

    pub fn has_water(&self, index: i32) -> bool {
        index == 0 || self.sample(index, 0.93, ZONE_PRESENCE_OFFSET) < self.water.spawn_chance
    }

    pub fn has_legendary(&self, index: i32) -> bool {
        self.sample(index, 0.71, LEGENDARY_SEED_OFFSET) > self.water.legendary_threshold
    }

    /// Basin for chunk `index`, or `None` when the chunk is dry.
    pub fn basin(&self, index: i32) -> Option<Basin> {
        if !self.has_water(index) {
            return None;
        }
        let kind = self.determine_zone_type(index);
        let shape = shape_of(kind);
        let tile = self.terrain.tile_size;
        let floor = self.terrain.floor_y;
        let margin = self.water.terrain_margin;

        // keep one whole bank column inside the chunk on each side
        let start = index as f32 * self.terrain.chunk_width();
        let room = (self.terrain.chunk_width() - 2.0 * tile).max(0.0);
        let width = lerp(shape.width, self.sample(index, 0.11, ZONE_SHAPE_OFFSET)).min(room);
        let left = start + tile + (room - width) * self.sample(index, 0.57, ZONE_SHAPE_OFFSET) as f32;
        let right = left + width;

        let left_bank = (left / tile).floor() * tile - tile;
        let right_bank = (right / tile).ceil() * tile;
        let bank = natural_height(&*self.noise, &self.terrain, self.seed, left_bank)
            .min(natural_height(&*self.noise, &self.terrain, self.seed, right_bank));
        let surface = floor + bank as f32 * tile;

        let depth = lerp(shape.depth, self.sample(index, 0.83, ZONE_SHAPE_OFFSET));
        let lowest_bed = floor + self.water.bed_blocks as f32 * tile + margin;
        let bed = (surface - depth).max(lowest_bed).min(surface);
        let floor_blocks = (((bed - margin - floor) / tile).floor().max(0.0) as u32).max(1);

        Some(Basin {
            chunk_index: index,
            kind,
            left,
            right,
            surface,
            bed,
            floor_blocks,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::noise_field::PerlinField;

    pub(crate) fn layout(seed: u32) -> BasinLayout {
        let cfg = WorldConfig::with_seed(seed);
        BasinLayout::new(cfg.water, cfg.terrain, seed, Box::new(PerlinField::new(seed)))
    }

    #[test]
    fn banks_stay_inside_the_chunk() {
        let tile = TILE_SIZE;
        for seed in 0..10 {
            let layout = layout(seed);
            for index in -12..=12 {
                let Some(b) = layout.basin(index) else { continue };
                let start = index as f32 * CHUNK_WIDTH;
                assert!(b.left >= start + tile - 1e-3);
                assert!(b.right <= start + CHUNK_WIDTH - tile + 1e-3);
                assert!(!b.covers_column(start, tile));
                assert!(!b.covers_column(start + CHUNK_WIDTH - tile, tile));
            }
        }
    }

    #[test]
    fn water_surface_is_level_with_the_lower_bank() {
        let layout = layout(6);
        let cfg = WorldConfig::with_seed(6);
        let noise = PerlinField::new(6);
        for index in -8..=8 {
            let Some(b) = layout.basin(index) else { continue };
            let left_bank = (b.left / TILE_SIZE).floor() * TILE_SIZE - TILE_SIZE;
            let right_bank = (b.right / TILE_SIZE).ceil() * TILE_SIZE;
            let low = natural_height(&noise, &cfg.terrain, 6, left_bank)
                .min(natural_height(&noise, &cfg.terrain, 6, right_bank));
            assert_eq!(b.surface, low as f32 * TILE_SIZE);
        }
    }

    #[test]
    fn bed_clears_the_dug_floor() {
        for seed in 0..10 {
            let layout = layout(seed);
            for index in -10..=10 {
                let Some(b) = layout.basin(index) else { continue };
                let floor_top = b.floor_blocks as f32 * TILE_SIZE;
                assert!(b.floor_blocks >= 1);
                assert!(floor_top + WATER_TERRAIN_MARGIN <= b.bed + 1e-3, "{b:?}");
                assert!(b.surface - b.bed >= MIN_WATER_HEIGHT);
            }
        }
    }

    #[test]
    fn basins_are_deterministic() {
        let a = layout(31);
        let b = layout(31);
        for index in -6..=6 {
            assert_eq!(a.basin(index), b.basin(index));
        }
    }
}
