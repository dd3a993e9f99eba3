use bevy::prelude::*;

/// -------- tiles & world size --------
pub const TILE_SIZE: f32      = 32.0;
pub const CHUNK_COLUMNS: usize = 16;
pub const CHUNK_WIDTH: f32    = TILE_SIZE * CHUNK_COLUMNS as f32;
pub const WORLD_FLOOR_Y: f32  = 0.0;
pub const DEFAULT_SEED: u32   = 20_240_611;

/// -------- terrain shape --------
pub const TERRAIN_MIN_HEIGHT: u32    = 10;
pub const TERRAIN_MAX_VARIATION: u32 = 6;
pub const SUBSOIL_DEPTH: u32         = 2;
pub const HEIGHT_FREQUENCY: f64      = 0.0025;
pub const DETAIL_FREQUENCY: f64      = 0.021;
pub const DETAIL_WEIGHT: f64         = 0.3;

/// -------- streaming windows (in chunks) --------
pub const TERRAIN_LOAD_RADIUS: i32     = 3;
pub const TERRAIN_UNLOAD_DISTANCE: i32 = 5;
pub const WATER_LOAD_RADIUS: i32       = 2;
pub const WATER_UNLOAD_DISTANCE: i32   = 4;
pub const STREAM_UPDATE_THRESHOLD: i32 = 1;

/// -------- noise seed offsets (one per independent field) --------
pub const HEIGHT_SEED_OFFSET: u32    = 0;
pub const DETAIL_SEED_OFFSET: u32    = 101;
pub const ZONE_PRESENCE_OFFSET: u32  = 211;
pub const ZONE_TYPE_OFFSET: u32      = 307;
pub const ZONE_SHAPE_OFFSET: u32     = 401;
pub const LEGENDARY_SEED_OFFSET: u32 = 503;
pub const OCEAN_BIAS_OFFSET: u32     = 601;

/// maps raw perlin output (clustered near 0) onto a usable [0,1] spread
pub const NOISE_CONTRAST: f64 = 1.8;

/// -------- water zones --------
pub const WATER_SPAWN_CHANCE: f64      = 0.55;
pub const OCEAN_BIAS_DISTANCE: i32     = 8;
pub const OCEAN_BIAS_BASE: f64         = 0.3;
pub const OCEAN_BIAS_PER_CHUNK: f64    = 0.05;
pub const OCEAN_BIAS_MAX: f64          = 0.8;
pub const LAKE_BAND: f64               = 0.4;
pub const RIVER_BAND: f64              = 0.3;
pub const LEGENDARY_THRESHOLD: f64     = 0.85;
pub const WATER_TERRAIN_MARGIN: f32    = 4.0;
pub const MIN_WATER_HEIGHT: f32        = 24.0;
/// blocks left standing under the deepest basin
pub const BASIN_BED_BLOCKS: u32        = 1;

/// -------- fishing: casting --------
pub const ROD_TIP_OFFSET: Vec2           = Vec2::new(20.0, 28.0);
pub const MAX_CAST_DISTANCE: f32         = 400.0;
pub const CAST_DISTANCE_MULTIPLIER: f32  = 2.2;
pub const MAX_CAST_DOWNWARD: f32         = 0.7;
pub const FALLBACK_CAST_UPWARD: f32      = 0.5;
pub const CAST_SYNC_DELAY_MS: u64        = 150;

/// -------- fishing: hook settle / auto‑retract --------
pub const SETTLE_GRACE_MS: u64           = 500;
pub const SETTLE_DELAY_MS: u64           = 800;
pub const SETTLE_MOVEMENT_THRESHOLD: f32 = 0.5;

/// -------- fishing: bite & reel --------
pub const BITE_DELAY_MIN_MS: u64  = 1_000;
pub const BITE_DELAY_MAX_MS: u64  = 4_000;
pub const BITE_WINDOW_MS: u64     = 1_500;
pub const REEL_DURATION_MS: u64   = 1_200;
pub const CATCH_DISPLAY_MS: u64   = 1_000;

/// -------- catch odds --------
pub const TREASURE_CHANCE: f64  = 0.10;
pub const JUNK_CHANCE: f64      = 0.20;
pub const COMMON_SHARE: f64     = 0.60;
pub const UNCOMMON_SHARE: f64   = 0.30;

/// -------- player & hook bodies --------
pub const PIXELS_PER_METER: f32 = 100.0;
pub const PLAYER_WIDTH: f32     = 20.0;
pub const PLAYER_HEIGHT: f32    = 44.0;
pub const WALK_SPEED: f32       = 200.0;
pub const JUMP_SPEED: f32       = 420.0;
pub const HOOK_RADIUS: f32      = 4.0;
pub const SWIM_GRAVITY_SCALE: f32 = 0.35;
/// spawn drop above the terrain ceiling
pub const PLAYER_SPAWN_CLEARANCE: f32 = 64.0;

/// -------- bite marker --------
pub const BITE_MARK_SIZE: f32      = 8.0;
pub const BITE_MARK_LIFT: f32      = 14.0;
pub const BITE_BOB_AMPLITUDE: f32  = 4.0;
pub const BITE_BOB_SPEED: f32      = 12.0;

/// -------- colours --------
pub const SKY_COLOR: Color       = Color::srgb(0.53, 0.81, 0.98);
pub const TOPSOIL_COLOR: Color   = Color::srgb(0.30, 0.62, 0.18);
pub const SUBSOIL_COLOR: Color   = Color::srgb(0.55, 0.27, 0.07);
pub const BEDROCK_COLOR: Color   = Color::srgb(0.42, 0.42, 0.45);
pub const LAKE_COLOR: Color      = Color::srgba(0.20, 0.55, 0.85, 0.55);
pub const RIVER_COLOR: Color     = Color::srgba(0.25, 0.70, 0.80, 0.55);
pub const OCEAN_COLOR: Color     = Color::srgba(0.05, 0.25, 0.60, 0.60);
pub const HOOK_COLOR: Color      = Color::srgb(0.90, 0.15, 0.15);
pub const PLAYER_COLOR: Color    = Color::srgb(0.95, 0.80, 0.55);
pub const BITE_MARK_COLOR: Color = Color::srgb(1.00, 0.90, 0.10);
