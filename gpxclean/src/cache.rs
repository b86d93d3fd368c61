//! Cache of open tile handles.
//!
//! [`TileCache`] opens each tile at most once per run and keeps the handle
//! until [`TileCache::close_all`] (or drop). Tiles that fail to open, or whose
//! size matches neither SRTM format, are remembered as unavailable and
//! reported only once.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use moka::sync::Cache;
use tracing::{debug, warn};

use crate::error::SrtmError;
use crate::filename::TileId;
use crate::source::TileSource;
use crate::tile::{read_sample, SrtmResolution};

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of tiles currently in the cache, including unavailable ones.
    pub entry_count: u64,
    /// Number of cache hits (requests served from cache).
    pub hit_count: u64,
    /// Number of cache misses (tiles opened from the source).
    pub miss_count: u64,
    /// Number of tiles that could not be used.
    pub open_failures: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// One cached tile: its resolution and the open handle, or nothing if the
/// tile is unavailable.
pub struct TileSlot<H> {
    resolution: Option<SrtmResolution>,
    handle: Mutex<Option<H>>,
}

impl<H: io::Read + io::Seek> TileSlot<H> {
    fn open(resolution: SrtmResolution, handle: H) -> Self {
        Self {
            resolution: Some(resolution),
            handle: Mutex::new(Some(handle)),
        }
    }

    fn unavailable() -> Self {
        Self {
            resolution: None,
            handle: Mutex::new(None),
        }
    }

    /// Resolution detected when the tile was opened.
    pub fn resolution(&self) -> Option<SrtmResolution> {
        self.resolution
    }

    /// Whether the tile still holds an open handle.
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Decode the sample nearest to the given offsets.
    ///
    /// Returns `None` when the tile is unavailable or already closed.
    pub fn sample(&self, lat_arcsec: f64, lon_arcsec: f64) -> Option<io::Result<i16>> {
        let resolution = self.resolution?;
        let mut handle = self.lock();
        let reader = handle.as_mut()?;
        Some(read_sample(reader, resolution, lat_arcsec, lon_arcsec))
    }

    /// Drop the handle. Returns `true` if this call closed it.
    fn close(&self) -> bool {
        self.lock().take().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<H>> {
        self.handle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Tile handles keyed by [`TileId`].
///
/// The cache is unbounded: a handle, once opened, stays open until
/// shutdown. Concurrent first lookups of the same tile open it once.
pub struct TileCache<S: TileSource> {
    source: S,
    tiles: Cache<TileId, Arc<TileSlot<S::Handle>>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    open_failures: AtomicU64,
    closed: AtomicBool,
}

impl<S: TileSource> TileCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tiles: Cache::builder().build(),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            open_failures: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// The source tiles are opened from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the slot for `tile`, opening it on first use.
    ///
    /// After [`close_all`](Self::close_all) every tile is reported as
    /// unavailable and nothing is opened.
    pub fn open(&self, tile: &TileId) -> Arc<TileSlot<S::Handle>> {
        if self.closed.load(Ordering::Acquire) {
            return Arc::new(TileSlot::unavailable());
        }

        // Check cache first
        if let Some(slot) = self.tiles.get(tile) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return slot;
        }

        let mut loaded = false;
        let slot = self.tiles.get_with(*tile, || {
            loaded = true;
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            Arc::new(self.load(tile))
        });

        // Lost a first-open race to another thread
        if !loaded {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
        }

        slot
    }

    fn load(&self, tile: &TileId) -> TileSlot<S::Handle> {
        let opened = self
            .source
            .open(tile)
            .map_err(SrtmError::from)
            .and_then(|(handle, len)| {
                SrtmResolution::from_file_size(len).map(|resolution| (handle, resolution))
            });

        match opened {
            Ok((handle, resolution)) => {
                debug!(tile = %tile, ?resolution, "opened tile");
                TileSlot::open(resolution, handle)
            }
            Err(e) => {
                self.open_failures.fetch_add(1, Ordering::Relaxed);
                let err = e.for_tile(self.source.describe(tile));
                warn!("{err}");
                TileSlot::unavailable()
            }
        }
    }

    /// Close every open handle. Returns the number of handles closed.
    ///
    /// Safe to call more than once; a handle is only ever closed once.
    pub fn close_all(&self) -> usize {
        self.closed.store(true, Ordering::Release);
        let closed = self
            .tiles
            .iter()
            .filter(|(_, slot)| slot.close())
            .count();
        if closed > 0 {
            debug!(closed, "closed tiles");
        }
        closed
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.tiles.run_pending_tasks();
        CacheStats {
            entry_count: self.tiles.entry_count(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            open_failures: self.open_failures.load(Ordering::Relaxed),
        }
    }
}

impl<S: TileSource> Drop for TileCache<S> {
    fn drop(&mut self) {
        self.close_all();
    }
}
