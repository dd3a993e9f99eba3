//! chunked terrain columns, block spawning & the eviction cache
use std::collections::{BTreeMap, HashMap, HashSet};

use bevy::prelude::*;

use crate::basin::BasinLayout;
use crate::chunk_stream::ChunkSource;
use crate::config::TerrainSettings;
use crate::constants::*;
use crate::error::{WorldError, WorldResult};
use crate::noise_field::NoiseSource;

/// -------- materials --------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    Topsoil,
    Subsoil,
    Bedrock,
}

impl Material {
    /// classify by depth below the top of the column (0 = surface)
    pub fn for_depth(depth: u32, subsoil_depth: u32) -> Self {
        match depth {
            0 => Material::Topsoil,
            d if d <= subsoil_depth => Material::Subsoil,
            _ => Material::Bedrock,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Material::Topsoil => TOPSOIL_COLOR,
            Material::Subsoil => SUBSOIL_COLOR,
            Material::Bedrock => BEDROCK_COLOR,
        }
    }
}

/// One tile-wide stack; `materials[0]` is the bottom block.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub x: f32,
    pub height: u32,
    pub materials: Vec<Material>,
}

/// Opaque engine handle for a spawned collidable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockHandle(pub u64);

/// What the engine needs to spawn a block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockSpec {
    pub center: Vec2,
    pub size: f32,
    pub material: Material,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    pub center: Vec2,
    pub half_size: f32,
    pub material: Material,
    pub handle: BlockHandle,
}

impl Block {
    pub fn top(&self) -> f32 {
        self.center.y + self.half_size
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_size
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_size
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_size
    }
}

/// Engine capability for solid, collidable blocks.
pub trait CollidableFactory {
    fn spawn_block(&mut self, spec: &BlockSpec) -> WorldResult<BlockHandle>;
    /// remove from the collidable set but keep the object around
    fn deactivate_block(&mut self, handle: BlockHandle);
    /// put a previously deactivated block back into the collidable set
    fn reactivate_block(&mut self, handle: BlockHandle);
    /// destroy for good
    fn release_block(&mut self, handle: BlockHandle);
}

/// Read-only surface query used by the water generator.
pub trait SurfaceQuery {
    /// Highest solid top among blocks horizontally overlapping `[left, right)`.
    fn highest_surface_in_span(&self, left: f32, right: f32) -> Option<f32>;
}

/// Undug column height in blocks at world x; never below `min_height`.
pub fn natural_height(
    noise: &dyn NoiseSource,
    settings: &TerrainSettings,
    seed: u32,
    world_x: f32,
) -> u32 {
    let x = world_x as f64;
    let broad = noise.noise(x * HEIGHT_FREQUENCY, 0.37, seed.wrapping_add(HEIGHT_SEED_OFFSET));
    let detail = noise.noise(x * DETAIL_FREQUENCY, 0.61, seed.wrapping_add(DETAIL_SEED_OFFSET));
    let n = (broad * (1.0 - DETAIL_WEIGHT) + detail * DETAIL_WEIGHT).clamp(0.0, 1.0);
    let extra = (n * settings.max_variation as f64).round() as u32;
    (settings.min_height + extra).max(settings.min_height)
}

#[derive(Clone, Debug)]
struct CachedChunk {
    blocks: Vec<Block>,
    columns: Vec<Column>,
}

/// Terrain generator + active collidable set.
pub struct TerrainGenerator {
    settings: TerrainSettings,
    seed: u32,
    noise: Box<dyn NoiseSource>,
    basins: Option<BasinLayout>,
    active: Vec<Block>,
    columns: BTreeMap<i32, Vec<Column>>,
    cache: HashMap<i32, CachedChunk>,
}

impl TerrainGenerator {
    pub fn new(settings: TerrainSettings, seed: u32, noise: Box<dyn NoiseSource>) -> Self {
        Self {
            settings,
            seed,
            noise,
            basins: None,
            active: Vec::new(),
            columns: BTreeMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Dig the water basins of `layout` into the generated columns.
    pub fn with_basins(mut self, layout: BasinLayout) -> Self {
        self.basins = Some(layout);
        self
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    fn chunk_span(&self, index: i32) -> (f32, f32) {
        let w = self.settings.chunk_width();
        (index as f32 * w, (index + 1) as f32 * w)
    }

    /* ---------- pure column maths ---------- */

    /// Undug column height in blocks at world x.
    pub fn column_height(&self, world_x: f32) -> u32 {
        natural_height(&*self.noise, &self.settings, self.seed, world_x)
    }

    /// Column layout for chunk `index`; a pure function of seed and index.
    pub fn build_columns(&self, index: i32) -> Vec<Column> {
        let (start, _) = self.chunk_span(index);
        let tile = self.settings.tile_size;
        let basin = self.basins.as_ref().and_then(|layout| layout.basin(index));
        (0..self.settings.chunk_columns)
            .map(|slot| {
                let x = start + slot as f32 * tile;
                let mut height = self.column_height(x);
                if let Some(b) = basin.filter(|b| b.covers_column(x, tile)) {
                    height = height.min(b.floor_blocks);
                }
                let materials = (0..height)
                    .map(|row| Material::for_depth(height - 1 - row, self.settings.subsoil_depth))
                    .collect();
                Column { x, height, materials }
            })
            .collect()
    }

    /* ---------- streaming ---------- */

    /// Spawn the blocks for chunk `index`, or restore them from the cache.
    pub fn generate_chunk(
        &mut self,
        index: i32,
        factory: &mut dyn CollidableFactory,
    ) -> WorldResult<usize> {
        if let Some(cached) = self.cache.get(&index).filter(|c| !c.blocks.is_empty()) {
            for block in &cached.blocks {
                factory.reactivate_block(block.handle);
            }
            self.active.extend(cached.blocks.iter().copied());
            self.columns.insert(index, cached.columns.clone());
            return Ok(cached.blocks.len());
        }

        let columns = self.build_columns(index);
        let tile = self.settings.tile_size;
        let mut spawned: Vec<Block> = Vec::new();

        for column in &columns {
            for (row, material) in column.materials.iter().enumerate() {
                let spec = BlockSpec {
                    center: Vec2::new(
                        column.x + tile * 0.5,
                        self.settings.floor_y + (row as f32 + 0.5) * tile,
                    ),
                    size: tile,
                    material: *material,
                };
                match factory.spawn_block(&spec) {
                    Ok(handle) => spawned.push(Block {
                        center: spec.center,
                        half_size: tile * 0.5,
                        material: spec.material,
                        handle,
                    }),
                    Err(err) => {
                        // roll back so the chunk can be retried cleanly
                        for block in &spawned {
                            factory.release_block(block.handle);
                        }
                        return Err(WorldError::GenerationFailed {
                            index,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        let count = spawned.len();
        self.active.extend(spawned);
        self.columns.insert(index, columns);
        Ok(count)
    }

    /// Move chunk `index` out of the collidable set into the cache.
    pub fn unload_chunk(&mut self, index: i32, factory: &mut dyn CollidableFactory) -> usize {
        let (start, end) = self.chunk_span(index);
        let (evicted, kept): (Vec<Block>, Vec<Block>) = self
            .active
            .drain(..)
            .partition(|b| b.center.x >= start && b.center.x < end);
        self.active = kept;

        for block in &evicted {
            factory.deactivate_block(block.handle);
        }
        let columns = self.columns.remove(&index).unwrap_or_default();

        let count = evicted.len();
        match self.cache.get(&index) {
            None => {
                self.cache.insert(index, CachedChunk { blocks: evicted, columns });
            }
            Some(existing) => {
                // the first cached set stays canonical; strays are destroyed
                let canonical: HashSet<BlockHandle> =
                    existing.blocks.iter().map(|b| b.handle).collect();
                for block in evicted.iter().filter(|b| !canonical.contains(&b.handle)) {
                    factory.release_block(block.handle);
                }
            }
        }
        count
    }

    /* ---------- queries ---------- */

    pub fn loaded_block_count(&self) -> usize {
        self.active.len()
    }

    pub fn cached_chunk_count(&self) -> usize {
        self.cache.len()
    }

    pub fn active_blocks(&self) -> &[Block] {
        &self.active
    }

    pub fn columns(&self, index: i32) -> Option<&[Column]> {
        self.columns.get(&index).map(Vec::as_slice)
    }

    /// Blocks whose horizontal extent overlaps `[left, right)`.
    pub fn blocks_in_span(&self, left: f32, right: f32) -> impl Iterator<Item = &Block> {
        self.active
            .iter()
            .filter(move |b| b.right() > left && b.left() < right)
    }

    /// Top of the column containing `x`, if that chunk is loaded.
    pub fn surface_top_at(&self, x: f32) -> Option<f32> {
        let tile = self.settings.tile_size;
        let index = (x / self.settings.chunk_width()).floor() as i32;
        let column = self
            .columns
            .get(&index)?
            .iter()
            .find(|c| x >= c.x && x < c.x + tile)?;
        Some(self.settings.floor_y + column.height as f32 * tile)
    }

    pub fn is_solid_at(&self, x: f32, y: f32) -> bool {
        self.surface_top_at(x)
            .is_some_and(|top| y >= self.settings.floor_y && y < top)
    }
}

impl SurfaceQuery for TerrainGenerator {
    fn highest_surface_in_span(&self, left: f32, right: f32) -> Option<f32> {
        self.blocks_in_span(left, right)
            .map(Block::top)
            .fold(None, |acc: Option<f32>, top| Some(acc.map_or(top, |a| a.max(top))))
    }
}

/// Binds the generator to an engine factory for one streaming pass.
pub struct TerrainPass<'a> {
    pub terrain: &'a mut TerrainGenerator,
    pub factory: &'a mut dyn CollidableFactory,
}

impl ChunkSource for TerrainPass<'_> {
    fn generate_chunk(&mut self, index: i32) -> WorldResult<()> {
        self.terrain.generate_chunk(index, self.factory).map(|_| ())
    }

    fn unload_chunk(&mut self, index: i32) -> WorldResult<()> {
        self.terrain.unload_chunk(index, self.factory);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::noise_field::PerlinField;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts every sample taken through it.
    pub(crate) struct CountingNoise {
        inner: PerlinField,
        pub calls: Arc<AtomicUsize>,
    }

    impl CountingNoise {
        pub(crate) fn new(seed: u32) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    inner: PerlinField::new(seed),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl NoiseSource for CountingNoise {
        fn noise(&self, a: f64, b: f64, seed: u32) -> f64 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.noise(a, b, seed)
        }
    }

    /// In-memory collidable set.
    #[derive(Default)]
    pub(crate) struct FakeBlocks {
        next: u64,
        pub live: HashMap<BlockHandle, (BlockSpec, bool)>,
        pub fail_after: Option<usize>,
        pub spawn_calls: usize,
    }

    impl FakeBlocks {
        pub(crate) fn active_count(&self) -> usize {
            self.live.values().filter(|(_, on)| *on).count()
        }
    }

    impl CollidableFactory for FakeBlocks {
        fn spawn_block(&mut self, spec: &BlockSpec) -> WorldResult<BlockHandle> {
            if self.fail_after.is_some_and(|n| self.spawn_calls >= n) {
                return Err(WorldError::GenerationFailed {
                    index: 0,
                    reason: "factory refused".into(),
                });
            }
            self.spawn_calls += 1;
            self.next += 1;
            let handle = BlockHandle(self.next);
            self.live.insert(handle, (*spec, true));
            Ok(handle)
        }

        fn deactivate_block(&mut self, handle: BlockHandle) {
            if let Some(entry) = self.live.get_mut(&handle) {
                entry.1 = false;
            }
        }

        fn reactivate_block(&mut self, handle: BlockHandle) {
            if let Some(entry) = self.live.get_mut(&handle) {
                entry.1 = true;
            }
        }

        fn release_block(&mut self, handle: BlockHandle) {
            self.live.remove(&handle);
        }
    }

    pub(crate) fn generator(seed: u32) -> TerrainGenerator {
        TerrainGenerator::new(
            WorldConfig::default().terrain,
            seed,
            Box::new(PerlinField::new(seed)),
        )
    }

    #[test]
    fn material_by_depth() {
        assert_eq!(Material::for_depth(0, 2), Material::Topsoil);
        assert_eq!(Material::for_depth(1, 2), Material::Subsoil);
        assert_eq!(Material::for_depth(2, 2), Material::Subsoil);
        assert_eq!(Material::for_depth(3, 2), Material::Bedrock);
    }

    #[test]
    fn columns_are_deterministic() {
        let a = generator(99);
        let b = generator(99);
        for index in [-4, 0, 7, 123] {
            assert_eq!(a.build_columns(index), b.build_columns(index));
        }
    }

    #[test]
    fn regenerating_after_cache_clear_matches() {
        let mut terrain = generator(5);
        let mut blocks = FakeBlocks::default();
        terrain.generate_chunk(2, &mut blocks).unwrap();
        let first = terrain.columns(2).unwrap().to_vec();

        let mut fresh = generator(5);
        fresh.generate_chunk(2, &mut blocks).unwrap();
        assert_eq!(fresh.columns(2).unwrap(), first.as_slice());
    }

    #[test]
    fn column_shape_and_materials() {
        let terrain = generator(11);
        let settings = *terrain.settings();
        let columns = terrain.build_columns(0);
        assert_eq!(columns.len(), settings.chunk_columns);
        for column in &columns {
            assert!(column.height >= settings.min_height);
            assert!(column.height <= settings.min_height + settings.max_variation);
            assert_eq!(column.materials.len() as u32, column.height);
            assert_eq!(*column.materials.last().unwrap(), Material::Topsoil);
            assert_eq!(column.materials[0], Material::Bedrock);
        }
    }

    #[test]
    fn basins_are_dug_into_their_chunk() {
        let seed = 4;
        let dug = generator(seed).with_basins(crate::basin::tests::layout(seed));
        let plain = generator(seed);
        let basin = crate::basin::tests::layout(seed).basin(0).unwrap();
        let tile = dug.settings().tile_size;

        let mut under_water = 0;
        for (column, undug) in dug.build_columns(0).iter().zip(plain.build_columns(0)) {
            if basin.covers_column(column.x, tile) {
                under_water += 1;
                assert!(column.height <= basin.floor_blocks);
                assert!(column.height >= 1);
                assert_eq!(*column.materials.last().unwrap(), Material::Topsoil);
            } else {
                assert_eq!(column.height, undug.height);
            }
        }
        assert!(under_water > 0);
    }

    #[test]
    fn blocks_sit_on_half_tile_grid() {
        let mut terrain = generator(3);
        let mut blocks = FakeBlocks::default();
        terrain.generate_chunk(-1, &mut blocks).unwrap();
        let tile = terrain.settings().tile_size;
        for block in terrain.active_blocks() {
            let gx = block.center.x / tile - 0.5;
            let gy = block.center.y / tile - 0.5;
            assert!((gx - gx.round()).abs() < 1e-4);
            assert!((gy - gy.round()).abs() < 1e-4);
            assert!(block.center.x >= -terrain.settings().chunk_width());
            assert!(block.center.x < 0.0);
        }
    }

    #[test]
    fn unload_then_reload_restores_without_sampling_noise() {
        let (noise, calls) = CountingNoise::new(8);
        let mut terrain = TerrainGenerator::new(WorldConfig::default().terrain, 8, Box::new(noise));
        let mut blocks = FakeBlocks::default();

        let spawned = terrain.generate_chunk(4, &mut blocks).unwrap();
        let before: Vec<Block> = terrain.active_blocks().to_vec();
        let samples = calls.load(Ordering::SeqCst);
        assert!(samples > 0);

        assert_eq!(terrain.unload_chunk(4, &mut blocks), spawned);
        assert_eq!(terrain.loaded_block_count(), 0);
        assert_eq!(blocks.active_count(), 0);

        let restored = terrain.generate_chunk(4, &mut blocks).unwrap();
        assert_eq!(restored, spawned);
        assert_eq!(calls.load(Ordering::SeqCst), samples);
        assert_eq!(terrain.active_blocks(), before.as_slice());
        assert_eq!(blocks.spawn_calls, spawned);
        assert_eq!(blocks.active_count(), spawned);
    }

    #[test]
    fn unload_only_touches_its_chunk() {
        let mut terrain = generator(21);
        let mut blocks = FakeBlocks::default();
        let a = terrain.generate_chunk(0, &mut blocks).unwrap();
        let b = terrain.generate_chunk(1, &mut blocks).unwrap();
        terrain.unload_chunk(0, &mut blocks);
        assert_eq!(terrain.loaded_block_count(), b);
        assert_eq!(blocks.active_count(), b);
        assert_eq!(blocks.live.len(), a + b);
        assert!(terrain.surface_top_at(10.0).is_none());
        assert!(terrain.surface_top_at(terrain.settings().chunk_width() + 10.0).is_some());
    }

    #[test]
    fn repeated_cycles_keep_first_cache_entry() {
        let mut terrain = generator(2);
        let mut blocks = FakeBlocks::default();
        terrain.generate_chunk(0, &mut blocks).unwrap();
        let handles: Vec<BlockHandle> = terrain.active_blocks().iter().map(|b| b.handle).collect();
        for _ in 0..3 {
            terrain.unload_chunk(0, &mut blocks);
            terrain.generate_chunk(0, &mut blocks).unwrap();
        }
        let now: Vec<BlockHandle> = terrain.active_blocks().iter().map(|b| b.handle).collect();
        assert_eq!(handles, now);
        assert_eq!(terrain.cached_chunk_count(), 1);
        assert_eq!(blocks.live.len(), handles.len());
    }

    #[test]
    fn factory_failure_rolls_back_partial_chunk() {
        let mut terrain = generator(1);
        let mut blocks = FakeBlocks {
            fail_after: Some(10),
            ..Default::default()
        };
        let err = terrain.generate_chunk(3, &mut blocks).unwrap_err();
        assert!(matches!(err, WorldError::GenerationFailed { index: 3, .. }));
        assert_eq!(terrain.loaded_block_count(), 0);
        assert!(blocks.live.is_empty());
        assert!(terrain.columns(3).is_none());
    }

    #[test]
    fn surface_queries() {
        let mut terrain = generator(17);
        let mut blocks = FakeBlocks::default();
        terrain.generate_chunk(0, &mut blocks).unwrap();
        let tile = terrain.settings().tile_size;
        let column = terrain.columns(0).unwrap()[2].clone();
        let x = column.x + tile * 0.5;
        let top = column.height as f32 * tile;

        assert_eq!(terrain.surface_top_at(x), Some(top));
        assert!(terrain.is_solid_at(x, top - 1.0));
        assert!(!terrain.is_solid_at(x, top + 1.0));
        assert_eq!(
            terrain.highest_surface_in_span(column.x, column.x + tile),
            Some(top)
        );
        assert_eq!(terrain.highest_surface_in_span(-500.0, -400.0), None);
    }
}
