//! camera-driven chunk window shared by the terrain and water generators
//!
//! The streamer only does bookkeeping: which chunk indices must exist around
//! the focal point and which have drifted far enough away to be evicted. The
//! actual content lives behind a [`ChunkSource`].

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::config::StreamSettings;
use crate::error::{WorldError, WorldResult};

/// Content side of a streamer.
pub trait ChunkSource {
    fn generate_chunk(&mut self, index: i32) -> WorldResult<()>;
    fn unload_chunk(&mut self, index: i32) -> WorldResult<()>;
}

/// Horizontal chunk index containing `world_x`.
#[inline]
pub fn chunk_index(world_x: f32, chunk_width: f32) -> i32 {
    (world_x / chunk_width).floor() as i32
}

/// What one [`ChunkStreamer::update`] pass did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StreamReport {
    pub center: i32,
    pub skipped: bool,
    pub generated: Vec<i32>,
    pub evicted: Vec<i32>,
    pub failures: Vec<WorldError>,
}

impl StreamReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ChunkStreamer {
    label: &'static str,
    settings: StreamSettings,
    loaded: BTreeSet<i32>,
    last_center: Option<i32>,
    retry_pending: bool,
}

impl ChunkStreamer {
    pub fn new(label: &'static str, settings: StreamSettings) -> Self {
        Self {
            label,
            settings,
            loaded: BTreeSet::new(),
            last_center: None,
            retry_pending: false,
        }
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn is_loaded(&self, index: i32) -> bool {
        self.loaded.contains(&index)
    }

    /// Loaded chunk indices in ascending order.
    pub fn loaded(&self) -> impl Iterator<Item = i32> + '_ {
        self.loaded.iter().copied()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Load the window around `focal_x` and evict anything past the unload
    /// distance. A failing chunk is logged and reported; the rest of the pass
    /// still runs.
    pub fn update(&mut self, focal_x: f32, source: &mut dyn ChunkSource) -> StreamReport {
        let center = chunk_index(focal_x, self.settings.chunk_width);
        let mut report = StreamReport {
            center,
            ..default()
        };

        if let Some(last) = self.last_center {
            let moved = center.abs_diff(last);
            if moved < self.settings.update_threshold.max(0) as u32
                && !self.loaded.is_empty()
                && !self.retry_pending
            {
                report.skipped = true;
                return report;
            }
        }
        self.last_center = Some(center);

        /* load window, ascending ------------------------------------------ */
        // saturating: far focal points clamp the window at the i32 edge
        let radius = self.settings.load_radius;
        for index in center.saturating_sub(radius)..=center.saturating_add(radius) {
            if self.loaded.contains(&index) {
                continue;
            }
            match source.generate_chunk(index) {
                Ok(()) => {
                    self.loaded.insert(index);
                    report.generated.push(index);
                }
                Err(err) => {
                    warn!("{} chunk {index}: {err}", self.label);
                    report.failures.push(err);
                }
            }
        }

        /* evict past the hysteresis band ---------------------------------- */
        let far: Vec<i32> = self
            .loaded
            .iter()
            .copied()
            .filter(|&index| index.abs_diff(center) > self.settings.unload_distance.max(0) as u32)
            .collect();
        for index in far {
            match source.unload_chunk(index) {
                Ok(()) => {
                    self.loaded.remove(&index);
                    report.evicted.push(index);
                }
                Err(err) => {
                    warn!("{} chunk {index} eviction: {err}", self.label);
                    report.failures.push(err);
                }
            }
        }

        self.retry_pending = !report.failures.is_empty();
        if !report.generated.is_empty() || !report.evicted.is_empty() {
            debug!(
                "{} stream @{center}: +{:?} -{:?}",
                self.label, report.generated, report.evicted
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Recorder {
        generated: Vec<i32>,
        unloaded: Vec<i32>,
        fail_generate: HashSet<i32>,
        fail_unload: HashSet<i32>,
    }

    impl ChunkSource for Recorder {
        fn generate_chunk(&mut self, index: i32) -> WorldResult<()> {
            if self.fail_generate.contains(&index) {
                return Err(WorldError::GenerationFailed {
                    index,
                    reason: "boom".into(),
                });
            }
            self.generated.push(index);
            Ok(())
        }

        fn unload_chunk(&mut self, index: i32) -> WorldResult<()> {
            if self.fail_unload.contains(&index) {
                return Err(WorldError::EvictionFailed {
                    index,
                    reason: "stuck".into(),
                });
            }
            self.unloaded.push(index);
            Ok(())
        }
    }

    fn settings() -> StreamSettings {
        StreamSettings {
            chunk_width: 100.0,
            load_radius: 3,
            unload_distance: 5,
            update_threshold: 1,
        }
    }

    #[test]
    fn chunk_index_floors_negative_positions() {
        assert_eq!(chunk_index(0.0, 100.0), 0);
        assert_eq!(chunk_index(99.9, 100.0), 0);
        assert_eq!(chunk_index(100.0, 100.0), 1);
        assert_eq!(chunk_index(-0.1, 100.0), -1);
        assert_eq!(chunk_index(-100.0, 100.0), -1);
        assert_eq!(chunk_index(-100.5, 100.0), -2);
    }

    #[test]
    fn first_update_loads_exact_window_in_order() {
        let mut streamer = ChunkStreamer::new("test", settings());
        let mut src = Recorder::default();
        let report = streamer.update(50.0, &mut src);

        assert_eq!(report.center, 0);
        assert_eq!(src.generated, vec![-3, -2, -1, 0, 1, 2, 3]);
        assert_eq!(streamer.loaded().collect::<Vec<_>>(), (-3..=3).collect::<Vec<_>>());
        assert!(report.evicted.is_empty());
    }

    #[test]
    fn same_center_is_skipped() {
        let mut streamer = ChunkStreamer::new("test", settings());
        let mut src = Recorder::default();
        streamer.update(10.0, &mut src);
        let report = streamer.update(90.0, &mut src);
        assert!(report.skipped);
        assert_eq!(src.generated.len(), 7);
    }

    #[test]
    fn first_call_proceeds_even_without_movement() {
        let mut streamer = ChunkStreamer::new(
            "test",
            StreamSettings {
                update_threshold: 10,
                ..settings()
            },
        );
        let mut src = Recorder::default();
        let report = streamer.update(0.0, &mut src);
        assert!(!report.skipped);
        assert_eq!(streamer.loaded_count(), 7);
    }

    #[test]
    fn hysteresis_keeps_near_chunks_and_drops_far_ones() {
        let mut streamer = ChunkStreamer::new("test", settings());
        let mut src = Recorder::default();
        streamer.update(0.0, &mut src); // -3..=3

        // centre 1: chunk -3 now sits at radius + 1 and must stay
        streamer.update(150.0, &mut src);
        assert!(streamer.is_loaded(-3));
        assert!(src.unloaded.is_empty());

        // centre 3: -3 at 6 > unload distance, -2 at 5 == unload distance
        let report = streamer.update(350.0, &mut src);
        assert_eq!(report.evicted, vec![-3]);
        assert!(streamer.is_loaded(-2));
        assert!(!streamer.is_loaded(-3));
    }

    #[test]
    fn loaded_set_stays_between_window_and_unload_band() {
        let mut streamer = ChunkStreamer::new("test", settings());
        let mut src = Recorder::default();
        for step in 0..40 {
            let x = (step as f32 * 73.0).sin() * 2_000.0;
            let report = streamer.update(x, &mut src);
            if report.skipped {
                continue;
            }
            let c = report.center;
            for i in c - 3..=c + 3 {
                assert!(streamer.is_loaded(i), "window chunk {i} missing at centre {c}");
            }
            for i in streamer.loaded() {
                assert!((i - c).abs() <= 5, "chunk {i} outlived the unload band at {c}");
            }
        }
    }

    #[test]
    fn window_clamps_at_the_ends_of_the_index_range() {
        let mut streamer = ChunkStreamer::new("test", settings());
        let mut src = Recorder::default();

        let report = streamer.update(f32::MAX, &mut src);
        assert_eq!(report.center, i32::MAX);
        assert_eq!(report.generated, (i32::MAX - 3..=i32::MAX).collect::<Vec<_>>());

        let report = streamer.update(f32::MIN, &mut src);
        assert_eq!(report.center, i32::MIN);
        assert_eq!(report.generated, (i32::MIN..=i32::MIN + 3).collect::<Vec<_>>());
        assert_eq!(report.evicted, (i32::MAX - 3..=i32::MAX).collect::<Vec<_>>());
        assert_eq!(streamer.loaded_count(), 4);
    }

    #[test]
    fn one_failing_chunk_does_not_stop_the_pass() {
        let mut streamer = ChunkStreamer::new("test", settings());
        let mut src = Recorder {
            fail_generate: HashSet::from([0]),
            ..Default::default()
        };
        let report = streamer.update(0.0, &mut src);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.generated, vec![-3, -2, -1, 1, 2, 3]);
        assert!(!streamer.is_loaded(0));
    }

    #[test]
    fn failed_chunk_is_retried_on_next_pass() {
        let mut streamer = ChunkStreamer::new("test", settings());
        let mut src = Recorder {
            fail_generate: HashSet::from([2]),
            ..Default::default()
        };
        streamer.update(0.0, &mut src);
        src.fail_generate.clear();

        let report = streamer.update(0.0, &mut src);
        assert!(!report.skipped);
        assert_eq!(report.generated, vec![2]);
        assert!(streamer.is_loaded(2));
    }

    #[test]
    fn failed_eviction_keeps_chunk_loaded() {
        let mut streamer = ChunkStreamer::new("test", settings());
        let mut src = Recorder {
            fail_unload: HashSet::from([-3]),
            ..Default::default()
        };
        streamer.update(0.0, &mut src);
        let report = streamer.update(1_000.0, &mut src);

        assert!(streamer.is_loaded(-3));
        assert!(!streamer.is_loaded(-2));
        assert_eq!(report.failures.len(), 1);
    }
}
