//! # gpxclean - SRTM elevation lookup for GPS tracks
//!
//! Looks up ground elevation for track points from SRTM (Shuttle Radar
//! Topography Mission) `.hgt` tiles and writes it back onto the points.
//!
//! ## Features
//!
//! - **Lazy**: tiles are opened on first use and kept open for the run
//! - **Automatic Detection**: tile resolution (SRTM1/SRTM3) comes from file size
//! - **Forgiving**: missing or broken tiles yield [`VOID_VALUE`] instead of errors
//!
//! ## Quick Start
//!
//! ```ignore
//! use gpxclean::{ElevationService, Track};
//!
//! let service = ElevationService::new("/data/srtm");
//! let elevation = service.get_elevation(47.3, 11.2);
//!
//! track.apply_elevation(&service);
//! service.shutdown();
//! ```
//!
//! ## SRTM Data Format
//!
//! SRTM files contain elevation data in a simple binary format:
//!
//! - **SRTM1**: 3601×3601 samples, 1 arc-second (~30m) resolution
//! - **SRTM3**: 1201×1201 samples, 3 arc-second (~90m) resolution
//!
//! Each sample is a 16-bit big-endian signed integer representing elevation in meters.
//! The special value -32768 indicates void (no data).

pub mod cache;
pub mod error;
pub mod filename;
pub mod service;
pub mod source;
pub mod tile;
pub mod track;

// Re-export main types at crate root for convenience
pub use cache::CacheStats;
pub use error::{Result, SrtmError};
pub use filename::{resolve, TileId};
pub use service::{ElevationService, ElevationServiceBuilder};
pub use source::{HgtDirectory, TileSource};
pub use tile::{SrtmResolution, VOID_VALUE};
pub use track::{augment, AugmentStats, Author, ElevationModel, Track, TrackPoint, TrackSegment};
