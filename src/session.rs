//! one frame of the game: stream terrain, then water, then fish
use bevy::prelude::*;

use crate::basin::BasinLayout;
use crate::chunk_stream::{ChunkStreamer, StreamReport};
use crate::config::{FishingConfig, WorldConfig};
use crate::error::WorldResult;
use crate::fishing::{FishingEvent, FishingStateMachine, FrameInput};
use crate::hook::HookPhysics;
use crate::noise_field::PerlinField;
use crate::population::{FishPopulation, ZoneType};
use crate::terrain::{CollidableFactory, SurfaceQuery, TerrainGenerator, TerrainPass};
use crate::water::{WaterPass, WaterQuery, WaterZone, WaterZoneGenerator, ZoneRenderer};

/// Both generators and their streamers.
pub struct FishingWorld {
    pub terrain: TerrainGenerator,
    pub terrain_stream: ChunkStreamer,
    pub water: WaterZoneGenerator,
    pub water_stream: ChunkStreamer,
}

impl FishingWorld {
    pub fn new(cfg: &WorldConfig) -> WorldResult<Self> {
        cfg.validate()?;
        Ok(Self {
            terrain: TerrainGenerator::new(cfg.terrain, cfg.seed, Box::new(PerlinField::new(cfg.seed)))
                .with_basins(BasinLayout::new(
                    cfg.water,
                    cfg.terrain,
                    cfg.seed,
                    Box::new(PerlinField::new(cfg.seed)),
                )),
            terrain_stream: ChunkStreamer::new("terrain", cfg.terrain_stream),
            water: WaterZoneGenerator::new(
                cfg.water,
                cfg.terrain,
                cfg.seed,
                Box::new(PerlinField::new(cfg.seed)),
            ),
            water_stream: ChunkStreamer::new("water", cfg.water_stream),
        })
    }

    /// Terrain first so water fitting sees the ground it sits on.
    pub fn stream<B>(&mut self, focal_x: f32, backend: &mut B) -> (StreamReport, StreamReport)
    where
        B: CollidableFactory + ZoneRenderer,
    {
        let terrain_report = self.terrain_stream.update(
            focal_x,
            &mut TerrainPass {
                terrain: &mut self.terrain,
                factory: &mut *backend,
            },
        );
        let water_report = self.water_stream.update(
            focal_x,
            &mut WaterPass {
                water: &mut self.water,
                terrain: Some(&self.terrain as &dyn SurfaceQuery),
                renderer: &mut *backend,
            },
        );
        (terrain_report, water_report)
    }
}

/// What one session frame did.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub terrain: StreamReport,
    pub water: StreamReport,
    pub events: Vec<FishingEvent>,
}

#[derive(Resource)]
pub struct FishingSession {
    pub world: FishingWorld,
    pub fishing: FishingStateMachine,
}

impl FishingSession {
    pub fn new(world: &WorldConfig, fishing: FishingConfig) -> WorldResult<Self> {
        fishing.validate()?;
        Ok(Self {
            world: FishingWorld::new(world)?,
            fishing: FishingStateMachine::new(fishing, world.seed as u64),
        })
    }

    pub fn update<B>(
        &mut self,
        frame: &FrameInput,
        focal_x: f32,
        backend: &mut B,
        hook: &mut dyn HookPhysics,
    ) -> FrameReport
    where
        B: CollidableFactory + ZoneRenderer,
    {
        let (terrain, water) = self.world.stream(focal_x, backend);
        let events = self.fishing.update(frame, &self.world.water, hook);
        FrameReport {
            terrain,
            water,
            events,
        }
    }

    pub fn water_type_at(&self, point: Vec2) -> Option<ZoneType> {
        self.world.water.water_type_at(point)
    }

    pub fn is_in_water(&self, point: Vec2) -> bool {
        self.world.water.is_in_water(point)
    }

    pub fn fish_population_at(&self, point: Vec2) -> Option<&FishPopulation> {
        self.world.water.fish_population_at(point)
    }

    pub fn active_zones(&self) -> &[WaterZone] {
        self.world.water.active_zones()
    }
}
