//! Error types for the gpxclean library.

use thiserror::Error;

/// Errors that can occur when working with SRTM data.
#[derive(Error, Debug)]
pub enum SrtmError {
    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File size doesn't match SRTM1 or SRTM3 format.
    #[error("Unknown SRTM file format: {size} bytes (expected 25934402 for SRTM1 or 2884802 for SRTM3)")]
    InvalidFileSize { size: u64 },

    /// A tile could not be opened or sampled.
    #[error("Unable to read {tile}: {source}")]
    TileUnavailable {
        tile: String,
        #[source]
        source: Box<SrtmError>,
    },

    /// No tile directory was configured.
    #[error("GPXCLEAN_SRTM_DIR environment variable not set")]
    MissingDataDir,
}

impl SrtmError {
    /// Wrap `self` with the name of the tile file it concerns.
    pub(crate) fn for_tile(self, tile: impl Into<String>) -> Self {
        SrtmError::TileUnavailable {
            tile: tile.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias using [`SrtmError`].
pub type Result<T> = std::result::Result<T, SrtmError>;
