//! SRTM elevation service.
//!
//! [`ElevationService`] ties together tile resolution, the tile cache and
//! sample decoding. Lookups never fail: anything that goes wrong is logged
//! and answered with [`VOID_VALUE`].
//!
//! ```ignore
//! use gpxclean::ElevationServiceBuilder;
//!
//! let service = ElevationServiceBuilder::new("/data/srtm").build();
//! let elevation = service.get_elevation(47.3, 11.2);
//! service.shutdown();
//! ```

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::cache::{CacheStats, TileCache};
use crate::error::{Result, SrtmError};
use crate::filename::resolve;
use crate::source::{HgtDirectory, TileSource};
use crate::tile::VOID_VALUE;
use crate::track::ElevationModel;

/// Environment variable naming the tile directory.
pub const DATA_DIR_ENV: &str = "GPXCLEAN_SRTM_DIR";

/// Elevation lookups backed by a cache of open SRTM tiles.
///
/// Handles stay open for the lifetime of the service and are closed by
/// [`shutdown`](Self::shutdown) or when the service is dropped.
pub struct ElevationService<S: TileSource = HgtDirectory> {
    cache: TileCache<S>,
}

impl ElevationService<HgtDirectory> {
    /// Create a service reading tiles from `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        ElevationServiceBuilder::new(data_dir).build()
    }

    /// Directory containing the `.hgt` files.
    pub fn data_dir(&self) -> &Path {
        self.cache.source().data_dir()
    }
}

impl<S: TileSource> ElevationService<S> {
    /// Create a service over an arbitrary tile source.
    pub fn with_source(source: S) -> Self {
        Self {
            cache: TileCache::new(source),
        }
    }

    /// The source tiles are read from.
    pub fn source(&self) -> &S {
        self.cache.source()
    }

    /// Get the elevation in meters at the given coordinates.
    ///
    /// Uses the nearest grid sample. Returns [`VOID_VALUE`] if the tile is
    /// missing, has an unknown size, or the sample cannot be read.
    pub fn get_elevation(&self, lat: f64, lon: f64) -> i16 {
        let location = resolve(lat, lon);
        let slot = self.cache.open(&location.tile);

        match slot.sample(location.lat_arcsec, location.lon_arcsec) {
            Some(Ok(elevation)) => elevation,
            Some(Err(e)) => {
                let tile = self.cache.source().describe(&location.tile);
                warn!(lat, lon, "{}", SrtmError::from(e).for_tile(tile));
                VOID_VALUE
            }
            None => VOID_VALUE,
        }
    }

    /// Get elevations for a batch of coordinates, in input order.
    pub fn get_elevations_batch(&self, coords: &[(f64, f64)]) -> Vec<i16> {
        coords
            .iter()
            .map(|&(lat, lon)| self.get_elevation(lat, lon))
            .collect()
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Close every tile handle opened by this service.
    ///
    /// Returns the number of handles closed.
    pub fn shutdown(self) -> usize {
        self.cache.close_all()
    }
}

impl<S: TileSource> ElevationModel for ElevationService<S> {
    fn elevation(&self, lat: f64, lon: f64) -> i16 {
        self.get_elevation(lat, lon)
    }
}

/// Builder for [`ElevationService`].
///
/// ```ignore
/// use gpxclean::ElevationServiceBuilder;
///
/// let service = ElevationServiceBuilder::from_env()?.build();
/// ```
pub struct ElevationServiceBuilder {
    data_dir: PathBuf,
}

impl ElevationServiceBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Create a builder configured from the environment.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `GPXCLEAN_SRTM_DIR` | Directory containing .hgt files | Required |
    ///
    /// # Errors
    ///
    /// Returns [`SrtmError::MissingDataDir`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Ok(Self::new(dir)),
            _ => Err(SrtmError::MissingDataDir),
        }
    }

    /// Set the data directory.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Build the [`ElevationService`].
    pub fn build(self) -> ElevationService<HgtDirectory> {
        ElevationService::with_source(HgtDirectory::new(self.data_dir))
    }
}
