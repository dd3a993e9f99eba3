//! tunables grouped into resources; defaults come from `constants`
use std::time::Duration;

use bevy::prelude::*;

use crate::constants::*;
use crate::error::{WorldError, WorldResult};

/// Window and hysteresis for one chunk streamer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSettings {
    /// Width of one chunk in world pixels.
    pub chunk_width: f32,
    /// Chunks within this distance of the centre are generated.
    pub load_radius: i32,
    /// Chunks further than this from the centre are evicted.
    pub unload_distance: i32,
    /// Minimum centre-chunk movement before a pass does any work.
    pub update_threshold: i32,
}

impl StreamSettings {
    pub fn validate(&self) -> WorldResult<()> {
        if self.chunk_width <= 0.0 {
            return Err(WorldError::InvalidConfig("chunk width must be positive".into()));
        }
        if self.load_radius < 0 {
            return Err(WorldError::InvalidConfig("load radius must not be negative".into()));
        }
        if self.unload_distance <= self.load_radius {
            return Err(WorldError::InvalidConfig(format!(
                "unload distance {} must exceed load radius {}",
                self.unload_distance, self.load_radius
            )));
        }
        Ok(())
    }
}

/// Column shape for the terrain generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSettings {
    pub tile_size: f32,
    pub chunk_columns: usize,
    pub floor_y: f32,
    pub min_height: u32,
    pub max_variation: u32,
    pub subsoil_depth: u32,
}

impl TerrainSettings {
    pub fn chunk_width(&self) -> f32 {
        self.tile_size * self.chunk_columns as f32
    }

    /// Highest possible terrain surface in world y.
    pub fn ceiling_y(&self) -> f32 {
        self.floor_y + (self.min_height + self.max_variation) as f32 * self.tile_size
    }
}

/// Water zone placement knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterSettings {
    pub spawn_chance: f64,
    pub ocean_bias_distance: i32,
    pub legendary_threshold: f64,
    pub terrain_margin: f32,
    pub min_height: f32,
    /// terrain blocks kept under a basin
    pub bed_blocks: u32,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub seed: u32,
    pub terrain: TerrainSettings,
    pub terrain_stream: StreamSettings,
    pub water: WaterSettings,
    pub water_stream: StreamSettings,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            terrain: TerrainSettings {
                tile_size: TILE_SIZE,
                chunk_columns: CHUNK_COLUMNS,
                floor_y: WORLD_FLOOR_Y,
                min_height: TERRAIN_MIN_HEIGHT,
                max_variation: TERRAIN_MAX_VARIATION,
                subsoil_depth: SUBSOIL_DEPTH,
            },
            terrain_stream: StreamSettings {
                chunk_width: CHUNK_WIDTH,
                load_radius: TERRAIN_LOAD_RADIUS,
                unload_distance: TERRAIN_UNLOAD_DISTANCE,
                update_threshold: STREAM_UPDATE_THRESHOLD,
            },
            water: WaterSettings {
                spawn_chance: WATER_SPAWN_CHANCE,
                ocean_bias_distance: OCEAN_BIAS_DISTANCE,
                legendary_threshold: LEGENDARY_THRESHOLD,
                terrain_margin: WATER_TERRAIN_MARGIN,
                min_height: MIN_WATER_HEIGHT,
                bed_blocks: BASIN_BED_BLOCKS,
            },
            water_stream: StreamSettings {
                chunk_width: CHUNK_WIDTH,
                load_radius: WATER_LOAD_RADIUS,
                unload_distance: WATER_UNLOAD_DISTANCE,
                update_threshold: STREAM_UPDATE_THRESHOLD,
            },
        }
    }
}

impl WorldConfig {
    pub fn with_seed(seed: u32) -> Self {
        Self { seed, ..default() }
    }

    pub fn validate(&self) -> WorldResult<()> {
        self.terrain_stream.validate()?;
        self.water_stream.validate()?;
        if (self.terrain.chunk_width() - self.terrain_stream.chunk_width).abs() > f32::EPSILON {
            return Err(WorldError::InvalidConfig(
                "terrain stream chunk width must match the column layout".into(),
            ));
        }
        // water adjustment reads terrain, so the water window must sit inside it
        if self.water_stream.load_radius as f32 * self.water_stream.chunk_width
            > self.terrain_stream.load_radius as f32 * self.terrain_stream.chunk_width
        {
            return Err(WorldError::InvalidConfig(
                "water load window must not reach past loaded terrain".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.water.spawn_chance) {
            return Err(WorldError::InvalidConfig("water spawn chance must be in [0,1]".into()));
        }
        if self.terrain.min_height == 0 {
            return Err(WorldError::InvalidConfig("terrain needs at least one block".into()));
        }
        if self.water.bed_blocks == 0 || self.water.bed_blocks >= self.terrain.min_height {
            return Err(WorldError::InvalidConfig(
                "basin bed must keep at least one block and stay below the lowest bank".into(),
            ));
        }
        let shallowest_bank = self.terrain.min_height as f32 * self.terrain.tile_size;
        let bed = self.water.bed_blocks as f32 * self.terrain.tile_size + self.water.terrain_margin;
        if shallowest_bank - bed < self.water.min_height {
            return Err(WorldError::InvalidConfig("terrain too low to hold any water".into()));
        }
        Ok(())
    }
}

/// Outcome bands for [`crate::catch::determine_caught_item`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchOdds {
    pub treasure: f64,
    pub junk: f64,
    /// share of fish catches that are common
    pub common: f64,
    /// share of fish catches that are uncommon; rare takes the rest
    pub uncommon: f64,
}

impl Default for CatchOdds {
    fn default() -> Self {
        Self {
            treasure: TREASURE_CHANCE,
            junk: JUNK_CHANCE,
            common: COMMON_SHARE,
            uncommon: UNCOMMON_SHARE,
        }
    }
}

impl CatchOdds {
    pub fn validate(&self) -> WorldResult<()> {
        let all = [self.treasure, self.junk, self.common, self.uncommon];
        if all.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(WorldError::InvalidConfig("catch odds must be probabilities".into()));
        }
        if self.treasure + self.junk > 1.0 {
            return Err(WorldError::InvalidConfig("treasure + junk exceed 1".into()));
        }
        if self.common + self.uncommon > 1.0 {
            return Err(WorldError::InvalidConfig("common + uncommon exceed 1".into()));
        }
        Ok(())
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct FishingConfig {
    pub rod_tip_offset: Vec2,
    pub max_cast_distance: f32,
    pub distance_multiplier: f32,
    pub max_downward: f32,
    pub fallback_upward: f32,
    pub cast_sync_delay: Duration,
    pub auto_retract_enabled: bool,
    pub settle_grace: Duration,
    pub settle_delay: Duration,
    pub settle_movement_threshold: f32,
    pub bite_delay_min: Duration,
    pub bite_delay_max: Duration,
    pub bite_window: Duration,
    pub reel_duration: Duration,
    pub catch_display: Duration,
    pub odds: CatchOdds,
}

impl Default for FishingConfig {
    fn default() -> Self {
        Self {
            rod_tip_offset: ROD_TIP_OFFSET,
            max_cast_distance: MAX_CAST_DISTANCE,
            distance_multiplier: CAST_DISTANCE_MULTIPLIER,
            max_downward: MAX_CAST_DOWNWARD,
            fallback_upward: FALLBACK_CAST_UPWARD,
            cast_sync_delay: Duration::from_millis(CAST_SYNC_DELAY_MS),
            auto_retract_enabled: true,
            settle_grace: Duration::from_millis(SETTLE_GRACE_MS),
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
            settle_movement_threshold: SETTLE_MOVEMENT_THRESHOLD,
            bite_delay_min: Duration::from_millis(BITE_DELAY_MIN_MS),
            bite_delay_max: Duration::from_millis(BITE_DELAY_MAX_MS),
            bite_window: Duration::from_millis(BITE_WINDOW_MS),
            reel_duration: Duration::from_millis(REEL_DURATION_MS),
            catch_display: Duration::from_millis(CATCH_DISPLAY_MS),
            odds: CatchOdds::default(),
        }
    }
}

impl FishingConfig {
    pub fn validate(&self) -> WorldResult<()> {
        if self.bite_delay_min > self.bite_delay_max {
            return Err(WorldError::InvalidConfig("bite delay range is inverted".into()));
        }
        if !(0.0..=1.0).contains(&self.max_downward) {
            return Err(WorldError::InvalidConfig("max downward must be in [0,1]".into()));
        }
        if self.max_cast_distance <= 0.0 || self.distance_multiplier <= 0.0 {
            return Err(WorldError::InvalidConfig("cast distance tuning must be positive".into()));
        }
        self.odds.validate()
    }
}
