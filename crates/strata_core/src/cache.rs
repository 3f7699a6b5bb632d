//! # Chunk Cache
//!
//! A growable, sparse 2D array of grids indexed by signed chunk coordinates.
//!
//! ## Growth
//!
//! The cache covers a bounding rectangle `[min_x, max_x) x [min_y, max_y)`.
//! A request outside it grows the rectangle past the violated bound by a fixed
//! margin. Growth never drops an entry and the cache never shrinks or evicts:
//! memory stays bounded by the box of visited chunks. A request that would
//! push the box past the `i32` range or beyond [`MAX_CACHE_SLOTS`] is refused
//! with `ChunkOutOfRange`.
//!
//! ## Thread Safety
//!
//! `ChunkCache` itself is a plain data structure. `SyncChunkCache` wraps it in
//! a mutex and adds one in-flight slot per coordinate, so concurrent requests
//! for the same chunk run its computation once while requests for different
//! chunks proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{TerrainError, TerrainResult};
use crate::grid::{ChunkCoord, Grid};
use crate::options::GenerationOptions;

/// Largest number of slots a single cache will allocate.
pub const MAX_CACHE_SLOTS: usize = 1 << 24;

/// Bounding rectangle of a cache, in chunks. Max bounds are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheBounds {
    /// Smallest cached X (inclusive).
    pub min_x: i32,
    /// Smallest cached Y (inclusive).
    pub min_y: i32,
    /// Largest cached X (exclusive).
    pub max_x: i32,
    /// Largest cached Y (exclusive).
    pub max_y: i32,
}

impl CacheBounds {
    /// Rectangle of `width` x `height` chunks centred on the origin.
    #[must_use]
    pub const fn centered(width: i32, height: i32) -> Self {
        let min_x = -width / 2;
        let min_y = -height / 2;
        Self {
            min_x,
            min_y,
            max_x: min_x + width,
            max_y: min_y + height,
        }
    }

    /// Width in chunks.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.max_x.abs_diff(self.min_x) as usize
    }

    /// Height in chunks.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.max_y.abs_diff(self.min_y) as usize
    }

    /// True iff `min_x <= x < max_x` and `min_y <= y < max_y`.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && y >= self.min_y && x < self.max_x && y < self.max_y
    }
}

/// Sparse 2D cache of grids.
#[derive(Clone, Debug)]
pub struct ChunkCache {
    bounds: CacheBounds,
    margin: i32,
    /// Row-major slots over `bounds`.
    slots: Vec<Option<Grid>>,
}

impl ChunkCache {
    /// Creates a cache of `width` x `height` chunks centred on the origin.
    #[must_use]
    pub fn new(width: usize, height: usize, margin: usize) -> Self {
        Self::with_bounds(CacheBounds::centered(width as i32, height as i32), margin)
    }

    /// Creates an empty cache covering `bounds`.
    #[must_use]
    pub fn with_bounds(bounds: CacheBounds, margin: usize) -> Self {
        Self {
            bounds,
            margin: i32::try_from(margin).unwrap_or(i32::MAX),
            slots: vec![None; bounds.width() * bounds.height()],
        }
    }

    /// Creates a cache sized from generator options.
    #[must_use]
    pub fn from_options(options: &GenerationOptions) -> Self {
        Self::new(
            options.initial_width,
            options.initial_height,
            options.cache_expand_margin,
        )
    }

    /// Current bounding rectangle.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> CacheBounds {
        self.bounds
    }

    /// Expansion margin in chunks.
    #[inline]
    #[must_use]
    pub const fn margin(&self) -> usize {
        self.margin as usize
    }

    /// True iff `(x, y)` lies inside the current bounds.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(x, y)
    }

    /// Number of cached grids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Returns a copy of the grid cached at `(x, y)`, if any.
    #[must_use]
    pub fn try_get(&self, x: i32, y: i32) -> Option<Grid> {
        self.slot_index(x, y)
            .and_then(|index| self.slots[index].clone())
    }

    /// Stores a copy of `grid` at `(x, y)`.
    ///
    /// Returns `false` and stores nothing if the coordinate is out of bounds;
    /// callers expand first.
    pub fn put(&mut self, grid: &Grid, x: i32, y: i32) -> bool {
        match self.slot_index(x, y) {
            Some(index) => {
                self.slots[index] = Some(grid.clone());
                true
            }
            None => false,
        }
    }

    /// Grows the bounds so `(x, y)` is inside, leaving `margin` spare chunks
    /// beyond each violated bound (fewer at the edge of the `i32` range).
    /// Bounds that already cover the coordinate are left untouched, and every
    /// cached grid keeps its coordinate.
    ///
    /// # Errors
    ///
    /// Returns `ChunkOutOfRange` if `x` or `y` is `i32::MAX` (the exclusive
    /// upper bound cannot be represented) or the grown box would exceed
    /// [`MAX_CACHE_SLOTS`]. The cache is unchanged in that case.
    pub fn expand(&mut self, x: i32, y: i32) -> TerrainResult<()> {
        if self.in_bounds(x, y) {
            return Ok(());
        }

        let out_of_range = || TerrainError::ChunkOutOfRange { x, y };
        let old = self.bounds;
        let mut new = old;

        if x < old.min_x {
            new.min_x = x.saturating_sub(self.margin);
        } else if x >= old.max_x {
            new.max_x = x.checked_add(1).ok_or_else(out_of_range)?.saturating_add(self.margin);
        }

        if y < old.min_y {
            new.min_y = y.saturating_sub(self.margin);
        } else if y >= old.max_y {
            new.max_y = y.checked_add(1).ok_or_else(out_of_range)?.saturating_add(self.margin);
        }

        let new_width = new.width();
        let area = new_width
            .checked_mul(new.height())
            .filter(|&area| area <= MAX_CACHE_SLOTS)
            .ok_or_else(out_of_range)?;
        let mut slots = vec![None; area];

        let x_offset = old.min_x.abs_diff(new.min_x) as usize;
        let y_offset = old.min_y.abs_diff(new.min_y) as usize;
        let old_width = old.width();

        for (old_index, slot) in self.slots.drain(..).enumerate() {
            if slot.is_some() {
                let old_x = old_index % old_width;
                let old_y = old_index / old_width;
                slots[(old_y + y_offset) * new_width + old_x + x_offset] = slot;
            }
        }

        tracing::trace!(
            "chunk cache expanded for [{},{}]: x {}..{} -> {}..{}, y {}..{} -> {}..{}",
            x,
            y,
            old.min_x,
            old.max_x,
            new.min_x,
            new.max_x,
            old.min_y,
            old.max_y,
            new.min_y,
            new.max_y
        );

        self.bounds = new;
        self.slots = slots;
        Ok(())
    }

    fn slot_index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let local_x = x.abs_diff(self.bounds.min_x) as usize;
        let local_y = y.abs_diff(self.bounds.min_y) as usize;
        Some(local_y * self.bounds.width() + local_x)
    }
}

/// A `ChunkCache` guarded for shared use, with per-coordinate in-flight slots.
#[derive(Debug)]
pub struct SyncChunkCache {
    cache: Mutex<ChunkCache>,
    in_flight: Mutex<HashMap<ChunkCoord, Arc<Mutex<()>>>>,
}

impl SyncChunkCache {
    /// Wraps an existing cache.
    #[must_use]
    pub fn new(cache: ChunkCache) -> Self {
        Self {
            cache: Mutex::new(cache),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an empty cache sized from generator options.
    #[must_use]
    pub fn from_options(options: &GenerationOptions) -> Self {
        Self::new(ChunkCache::from_options(options))
    }

    /// Copy of the cached grid at `coord`, if any.
    #[must_use]
    pub fn try_get(&self, coord: ChunkCoord) -> Option<Grid> {
        self.cache.lock().try_get(coord.x, coord.y)
    }

    /// Current bounds of the underlying cache.
    #[must_use]
    pub fn bounds(&self) -> CacheBounds {
        self.cache.lock().bounds()
    }

    /// Number of cached grids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Returns the cached grid at `coord`, or runs `compute` once, caches its
    /// result and returns it.
    ///
    /// Callers racing on the same coordinate queue on one in-flight slot, so
    /// at most one computation for a coordinate runs at a time. After a
    /// success the queued callers read the cached grid. A failed computation
    /// caches nothing and the next queued caller retries it.
    ///
    /// # Errors
    ///
    /// Returns `ChunkOutOfRange` if the cache cannot cover `coord`, otherwise
    /// propagates the error returned by `compute`.
    pub fn get_or_compute<F>(&self, coord: ChunkCoord, compute: F) -> TerrainResult<Grid>
    where
        F: FnOnce() -> TerrainResult<Grid>,
    {
        if let Some(grid) = self.try_get(coord) {
            return Ok(grid);
        }

        let slot = Arc::clone(self.in_flight.lock().entry(coord).or_default());
        let result = {
            let _computing = slot.lock();
            self.compute_in_slot(coord, compute)
        };
        self.release_slot(coord, slot);
        result
    }

    fn compute_in_slot<F>(&self, coord: ChunkCoord, compute: F) -> TerrainResult<Grid>
    where
        F: FnOnce() -> TerrainResult<Grid>,
    {
        // Someone else may have finished while we waited for the slot.
        if let Some(grid) = self.try_get(coord) {
            return Ok(grid);
        }

        self.cache.lock().expand(coord.x, coord.y)?;
        let grid = compute()?;
        self.cache.lock().put(&grid, coord.x, coord.y);
        Ok(grid)
    }

    /// Drops the in-flight entry once no other caller holds the slot.
    fn release_slot(&self, coord: ChunkCoord, slot: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock();
        // Clones are taken and dropped only under this lock: one for the
        // map, one for us.
        if Arc::strong_count(&slot) == 2 {
            in_flight.remove(&coord);
        }
        drop(slot);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    fn marker(value: f32) -> Grid {
        Grid::filled(2, 2, value)
    }

    #[test]
    fn test_initial_bounds_centered() {
        let cache = ChunkCache::new(4, 3, 2);
        assert_eq!(
            cache.bounds(),
            CacheBounds {
                min_x: -2,
                min_y: -1,
                max_x: 2,
                max_y: 2
            }
        );
        assert!(cache.in_bounds(-2, -1));
        assert!(cache.in_bounds(1, 1));
        assert!(!cache.in_bounds(2, 0));
        assert!(!cache.in_bounds(0, -2));
    }

    #[test]
    fn test_put_and_get_copy() {
        let mut cache = ChunkCache::new(2, 2, 1);
        let mut grid = marker(1.0);

        assert!(cache.put(&grid, 0, 0));
        grid.set(0, 0, 9.0);

        let cached = cache.try_get(0, 0).unwrap();
        assert_eq!(cached, marker(1.0), "Cache must hold its own copy");
        assert_eq!(cache.try_get(-1, -1), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_out_of_bounds_is_refused() {
        let mut cache = ChunkCache::new(2, 2, 1);
        assert!(!cache.put(&marker(1.0), 5, 5));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expand_high_side() {
        let mut cache = ChunkCache::new(2, 2, 3);
        cache.put(&marker(1.0), -1, 0);

        cache.expand(4, 0).unwrap();

        let bounds = cache.bounds();
        assert_eq!((bounds.min_x, bounds.max_x), (-1, 8));
        assert_eq!((bounds.min_y, bounds.max_y), (-1, 1), "Y untouched");
        assert_eq!(cache.try_get(-1, 0), Some(marker(1.0)));
    }

    #[test]
    fn test_expand_low_side_both_axes() {
        let mut cache = ChunkCache::new(2, 2, 2);
        cache.put(&marker(1.0), 0, 0);
        cache.put(&marker(2.0), -1, -1);

        cache.expand(-5, -3).unwrap();

        let bounds = cache.bounds();
        assert_eq!((bounds.min_x, bounds.max_x), (-7, 1));
        assert_eq!((bounds.min_y, bounds.max_y), (-5, 1));
        assert_eq!(cache.try_get(0, 0), Some(marker(1.0)));
        assert_eq!(cache.try_get(-1, -1), Some(marker(2.0)));
        assert_eq!(cache.try_get(-5, -3), None);
        assert!(cache.in_bounds(-5, -3));
    }

    #[test]
    fn test_zero_margin_still_accommodates() {
        let mut cache = ChunkCache::new(0, 0, 0);
        assert!(!cache.in_bounds(0, 0));

        cache.expand(0, 0).unwrap();
        assert!(cache.in_bounds(0, 0));
        assert!(cache.put(&marker(3.0), 0, 0));
        assert_eq!(cache.try_get(0, 0), Some(marker(3.0)));
    }

    #[test]
    fn test_expand_in_bounds_is_noop() {
        let mut cache = ChunkCache::new(4, 4, 8);
        let before = cache.bounds();
        cache.expand(1, 1).unwrap();
        assert_eq!(cache.bounds(), before);
    }

    #[test]
    fn test_get_or_compute_caches() {
        let cache = SyncChunkCache::new(ChunkCache::new(0, 0, 1));
        let calls = AtomicUsize::new(0);
        let coord = ChunkCoord::new(3, -2);

        for _ in 0..3 {
            let grid = cache
                .get_or_compute(coord, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(marker(7.0))
                })
                .unwrap();
            assert_eq!(grid, marker(7.0));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.bounds().contains(3, -2));
    }

    #[test]
    fn test_failed_compute_is_not_cached() {
        let cache = SyncChunkCache::new(ChunkCache::new(2, 2, 1));
        let coord = ChunkCoord::new(0, 0);

        let err = cache.get_or_compute(coord, || {
            Err(crate::TerrainError::InvalidConfiguration("boom".into()))
        });
        assert!(err.is_err());
        assert!(cache.is_empty());

        let grid = cache.get_or_compute(coord, || Ok(marker(1.0))).unwrap();
        assert_eq!(grid, marker(1.0));
    }

    #[test]
    fn test_concurrent_requests_compute_once() {
        let cache = Arc::new(SyncChunkCache::new(ChunkCache::new(0, 0, 2)));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache
                        .get_or_compute(ChunkCoord::new(5, 5), || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(20));
                            Ok(marker(5.0))
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), marker(5.0));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1, "Same coordinate computed once");
    }

    #[test]
    fn test_expand_near_i32_max_saturates() {
        let near_max = CacheBounds {
            min_x: i32::MAX - 8,
            min_y: 0,
            max_x: i32::MAX - 4,
            max_y: 1,
        };
        let mut cache = ChunkCache::with_bounds(near_max, 4);

        cache.expand(i32::MAX - 2, 0).unwrap();
        assert_eq!(cache.bounds().max_x, i32::MAX);
        assert!(cache.put(&marker(1.0), i32::MAX - 2, 0));
        assert_eq!(cache.try_get(i32::MAX - 2, 0), Some(marker(1.0)));

        let before = cache.bounds();
        assert_eq!(
            cache.expand(i32::MAX, 0),
            Err(TerrainError::ChunkOutOfRange { x: i32::MAX, y: 0 })
        );
        assert_eq!(cache.bounds(), before, "Refused expansion leaves the cache alone");
    }

    #[test]
    fn test_expand_near_i32_min_saturates() {
        let near_min = CacheBounds {
            min_x: 0,
            min_y: i32::MIN + 4,
            max_x: 1,
            max_y: i32::MIN + 8,
        };
        let mut cache = ChunkCache::with_bounds(near_min, 16);
        cache.put(&marker(2.0), 0, i32::MIN + 5);

        cache.expand(0, i32::MIN + 1).unwrap();
        assert_eq!(cache.bounds().min_y, i32::MIN);
        assert_eq!(cache.bounds().height(), 8);
        assert_eq!(cache.try_get(0, i32::MIN + 5), Some(marker(2.0)));
        assert!(cache.put(&marker(3.0), 0, i32::MIN));
    }

    #[test]
    fn test_expand_refuses_oversized_box() {
        let mut cache = ChunkCache::new(8, 8, 4);
        assert!(matches!(
            cache.expand(i32::MAX - 2, 0),
            Err(TerrainError::ChunkOutOfRange { .. })
        ));
        assert_eq!(cache.bounds(), CacheBounds::centered(8, 8));
    }

    #[test]
    fn test_get_or_compute_out_of_range_skips_compute() {
        let cache = SyncChunkCache::new(ChunkCache::new(8, 8, 4));
        let result = cache.get_or_compute(ChunkCoord::new(i32::MAX - 2, 0), || {
            panic!("compute must not run for an uncacheable chunk")
        });
        assert!(matches!(result, Err(TerrainError::ChunkOutOfRange { .. })));
        assert!(cache.in_flight.lock().is_empty());
    }

    #[test]
    fn test_failed_computations_never_overlap() {
        let cache = SyncChunkCache::new(ChunkCache::new(2, 2, 1));
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let calls = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let result = cache.get_or_compute(ChunkCoord::new(0, 0), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(5));
                        active.fetch_sub(1, Ordering::SeqCst);
                        Err(TerrainError::InvalidConfiguration("unavailable".into()))
                    });
                    assert!(result.is_err());
                });
            }
        });

        assert_eq!(peak.load(Ordering::SeqCst), 1, "Retries run one at a time");
        assert!(calls.load(Ordering::SeqCst) >= 1);
        assert!(cache.is_empty());
        assert!(cache.in_flight.lock().is_empty(), "Slot released after the last caller");
    }
}
