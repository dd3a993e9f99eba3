use bevy::prelude::*;

use crate::hook::Facing;

/* ===========================================================
   player
   =========================================================== */
#[derive(Component, Default)]
pub struct Player {
    pub grounded: bool,
    /// inside a water zone
    pub swimming: bool,
    pub facing: Facing,
}

/* ===========================================================
   hook
   =========================================================== */
#[derive(Component)]
pub struct HookBody;

/// Open contacts with terrain, maintained from collision events.
#[derive(Component, Default)]
pub struct GroundContacts(pub u32);

/// Yellow bobber drawn over the hook while a fish nibbles.
#[derive(Component, Default)]
pub struct BiteIndicator {
    pub phase: f32,
}

/* ===========================================================
   world content
   =========================================================== */
#[derive(Component)]
pub struct TerrainBlock;

#[derive(Component)]
pub struct WaterZoneSprite;

/* ===========================================================
   camera
   =========================================================== */
#[derive(Component)]
pub struct MainCamera;
