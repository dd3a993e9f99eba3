//! water zones: terrain fitting, streaming & lookups
//!
//! Every decision about a chunk (whether it has water, which biome, its
//! shape and whether it hosts a legendary fish) comes from the
//! [`BasinLayout`] and depends on `(seed, chunk index)` only. Evicted zones are cached the same
//! way terrain is, so revisiting a chunk gives back the exact zone the
//! player fished before even if the terrain around it streamed differently.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::basin::BasinLayout;
use crate::chunk_stream::ChunkSource;
use crate::config::{TerrainSettings, WaterSettings};
use crate::error::WorldResult;
use crate::noise_field::NoiseSource;
use crate::population::{FishPopulation, ZoneType};
use crate::terrain::SurfaceQuery;

/// Opaque engine handle for a drawn zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ZoneHandle(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct WaterZone {
    pub chunk_index: i32,
    pub kind: ZoneType,
    pub area: Rect,
    pub population: FishPopulation,
    pub handle: Option<ZoneHandle>,
}

impl WaterZone {
    pub fn contains(&self, point: Vec2) -> bool {
        self.area.contains(point)
    }
}

/// Engine capability for showing zones.
pub trait ZoneRenderer {
    fn show_zone(&mut self, zone: &WaterZone) -> WorldResult<ZoneHandle>;
    fn release_zone(&mut self, handle: ZoneHandle);
}

/// Read-only lookups used by the fishing state machine.
pub trait WaterQuery {
    fn zone_at(&self, point: Vec2) -> Option<&WaterZone>;

    fn water_type_at(&self, point: Vec2) -> Option<ZoneType> {
        self.zone_at(point).map(|z| z.kind)
    }

    fn is_in_water(&self, point: Vec2) -> bool {
        self.zone_at(point).is_some()
    }

    fn fish_population_at(&self, point: Vec2) -> Option<&FishPopulation> {
        self.zone_at(point).map(|z| &z.population)
    }
}

/// Replace an unusable rectangle with a zero-area one at the origin.
fn sanitize(area: Rect, index: i32) -> Rect {
    let finite = area.min.is_finite() && area.max.is_finite();
    if finite && area.width() >= 0.0 && area.height() >= 0.0 {
        area
    } else {
        warn!("water chunk {index}: degenerate area {area:?}, using empty zone");
        Rect::from_corners(Vec2::ZERO, Vec2::ZERO)
    }
}

pub struct WaterZoneGenerator {
    layout: BasinLayout,
    active: Vec<WaterZone>,
    cache: HashMap<i32, Option<WaterZone>>,
}

impl WaterZoneGenerator {
    pub fn new(
        settings: WaterSettings,
        terrain: TerrainSettings,
        seed: u32,
        noise: Box<dyn NoiseSource>,
    ) -> Self {
        Self {
            layout: BasinLayout::new(settings, terrain, seed, noise),
            active: Vec::new(),
            cache: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &BasinLayout {
        &self.layout
    }

    /* ---------- per-chunk decisions ---------- */

    pub fn determine_zone_type(&self, index: i32) -> ZoneType {
        self.layout.determine_zone_type(index)
    }

    pub fn has_water(&self, index: i32) -> bool {
        self.layout.has_water(index)
    }

    pub fn has_legendary(&self, index: i32) -> bool {
        self.layout.has_legendary(index)
    }

    /// Raise the zone bottom above any overlapping terrain (plus margin).
    /// Keeps the original bounds when what is left would be too shallow.
    pub fn adjust_water_for_terrain(&self, area: Rect, terrain: Option<&dyn SurfaceQuery>) -> Rect {
        let Some(terrain) = terrain else {
            return area;
        };
        let Some(surface) = terrain.highest_surface_in_span(area.min.x, area.max.x) else {
            return area;
        };
        let settings = self.layout.water_settings();
        let bottom = surface + settings.terrain_margin;
        if bottom <= area.min.y {
            return area;
        }
        if area.max.y - bottom < settings.min_height {
            debug!("water fit skipped: only {} px left above terrain", area.max.y - bottom);
            return area;
        }
        Rect::new(area.min.x, bottom, area.max.x, area.max.y)
    }

    /// Zone for chunk `index`, or `None` when this chunk is dry.
    pub fn build_zone(&self, index: i32, terrain: Option<&dyn SurfaceQuery>) -> Option<WaterZone> {
        let basin = self.layout.basin(index)?;
        let area = sanitize(self.adjust_water_for_terrain(basin.area(), terrain), index);
        Some(WaterZone {
            chunk_index: index,
            kind: basin.kind,
            area,
            population: FishPopulation::for_zone(basin.kind, self.has_legendary(index)),
            handle: None,
        })
    }

    /* ---------- streaming ---------- */

    /// Bring chunk `index` into the active list, from cache when visited before.
    pub fn generate_water_zone_chunk(
        &mut self,
        index: i32,
        terrain: Option<&dyn SurfaceQuery>,
        renderer: &mut dyn ZoneRenderer,
    ) -> WorldResult<()> {
        let zone = match self.cache.get(&index) {
            Some(cached) => cached.clone(),
            None => {
                let built = self.build_zone(index, terrain);
                self.cache.insert(index, built.clone());
                built
            }
        };
        let Some(mut zone) = zone else {
            return Ok(());
        };
        zone.handle = Some(renderer.show_zone(&zone)?);
        debug!("water chunk {index}: {} {:?}", zone.kind, zone.area);
        self.active.push(zone);
        Ok(())
    }

    pub fn unload_chunk(&mut self, index: i32, renderer: &mut dyn ZoneRenderer) {
        let mut kept = Vec::with_capacity(self.active.len());
        for zone in self.active.drain(..) {
            if zone.chunk_index == index {
                if let Some(handle) = zone.handle {
                    renderer.release_zone(handle);
                }
            } else {
                kept.push(zone);
            }
        }
        self.active = kept;
    }

    pub fn active_zones(&self) -> &[WaterZone] {
        &self.active
    }

    pub fn cached_chunk_count(&self) -> usize {
        self.cache.len()
    }
}

impl WaterQuery for WaterZoneGenerator {
    /// First active zone containing `point`; overlaps resolve by activation order.
    fn zone_at(&self, point: Vec2) -> Option<&WaterZone> {
        self.active.iter().find(|z| z.contains(point))
    }
}

/// Binds the generator to terrain and a renderer for one streaming pass.
pub struct WaterPass<'a> {
    pub water: &'a mut WaterZoneGenerator,
    pub terrain: Option<&'a dyn SurfaceQuery>,
    pub renderer: &'a mut dyn ZoneRenderer,
}

impl ChunkSource for WaterPass<'_> {
    fn generate_chunk(&mut self, index: i32) -> WorldResult<()> {
        self.water
            .generate_water_zone_chunk(index, self.terrain, self.renderer)
    }

    fn unload_chunk(&mut self, index: i32) -> WorldResult<()> {
        self.water.unload_chunk(index, self.renderer);
        Ok(())
    }
}
