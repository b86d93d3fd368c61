//! SRTM tile resolution detection and sample decoding.
//!
//! Tiles are row-major grids of big-endian 16-bit samples stored north to
//! south, west to east. Row and column indices here are 1-based: column 1
//! is the west edge and row 1 the north edge.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Result, SrtmError};

/// File size for SRTM1 (1 arc-second, ~30m resolution): 3601 × 3601 × 2 bytes
const SRTM1_SIZE: u64 = 3601 * 3601 * 2; // 25,934,402 bytes

/// File size for SRTM3 (3 arc-second, ~90m resolution): 1201 × 1201 × 2 bytes
const SRTM3_SIZE: u64 = 1201 * 1201 * 2; // 2,884,802 bytes

const BYTES_PER_SAMPLE: u64 = 2;

const ARCSEC_PER_DEG: u32 = 3600;

/// Value indicating no data (void) in SRTM files, and the value returned
/// for any lookup that could not be served.
pub const VOID_VALUE: i16 = -32768;

/// Resolution type of an SRTM tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrtmResolution {
    /// SRTM1: 1 arc-second (~30m) resolution
    Srtm1,
    /// SRTM3: 3 arc-second (~90m) resolution
    Srtm3,
}

impl SrtmResolution {
    /// Detect the resolution from a tile's total byte length.
    pub fn from_file_size(size: u64) -> Result<Self> {
        [SrtmResolution::Srtm1, SrtmResolution::Srtm3]
            .into_iter()
            .find(|resolution| resolution.file_size() == size)
            .ok_or(SrtmError::InvalidFileSize { size })
    }

    /// Arc-seconds between neighbouring samples.
    pub fn step(&self) -> u32 {
        match self {
            SrtmResolution::Srtm1 => 1,
            SrtmResolution::Srtm3 => 3,
        }
    }

    /// Returns the number of samples per row/column for this resolution.
    pub fn samples(&self) -> u32 {
        ARCSEC_PER_DEG / self.step() + 1
    }

    /// Expected file size in bytes.
    pub fn file_size(&self) -> u64 {
        match self {
            SrtmResolution::Srtm1 => SRTM1_SIZE,
            SrtmResolution::Srtm3 => SRTM3_SIZE,
        }
    }
}

/// 1-based position of a sample in the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndex {
    /// Row, 1 at the north edge.
    pub row: u32,
    /// Column, 1 at the west edge.
    pub col: u32,
}

/// Map arc-second offsets inside a tile to the nearest grid sample.
///
/// Rounding is half away from zero.
pub fn grid_index(resolution: SrtmResolution, lat_arcsec: f64, lon_arcsec: f64) -> GridIndex {
    let step = f64::from(resolution.step());
    let samples = resolution.samples();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (lat_steps, lon_steps) = (
        (lat_arcsec / step).round() as u32,
        (lon_arcsec / step).round() as u32,
    );

    GridIndex {
        row: samples.saturating_sub(lat_steps),
        col: lon_steps + 1,
    }
}

/// Byte offset of a grid sample from the start of the tile file.
pub fn byte_offset(resolution: SrtmResolution, index: GridIndex) -> u64 {
    let samples = u64::from(resolution.samples());
    let row = u64::from(index.row.saturating_sub(1));
    let col = u64::from(index.col.saturating_sub(1));
    (row * samples + col) * BYTES_PER_SAMPLE
}

/// Seek to the sample nearest to the given offsets and decode it.
///
/// The sample is read as a big-endian signed 16-bit integer. A short read
/// is an error.
pub fn read_sample<R: Read + Seek>(
    reader: &mut R,
    resolution: SrtmResolution,
    lat_arcsec: f64,
    lon_arcsec: f64,
) -> std::io::Result<i16> {
    let index = grid_index(resolution, lat_arcsec, lon_arcsec);
    reader.seek(SeekFrom::Start(byte_offset(resolution, index)))?;
    reader.read_i16::<BigEndian>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, ErrorKind};

    const SRTM3_SAMPLES: usize = 1201;

    /// Create SRTM3 data with known elevation values
    fn srtm3_data() -> Vec<u8> {
        let mut data = vec![0u8; SRTM3_SIZE as usize];

        // Row 1, Col 1 (northwest corner) = 1000m
        data[0] = 0x03;
        data[1] = 0xE8;

        // Row 601, Col 601 (center) = 500m
        let center = (600 * SRTM3_SAMPLES + 600) * 2;
        data[center..center + 2].copy_from_slice(&500i16.to_be_bytes());

        // Row 1201, Col 1 (southwest corner) = 100m
        let sw = (1200 * SRTM3_SAMPLES) * 2;
        data[sw..sw + 2].copy_from_slice(&100i16.to_be_bytes());

        // Row 1, Col 1201 (northeast corner) = -12m
        let ne = 1200 * 2;
        data[ne..ne + 2].copy_from_slice(&(-12i16).to_be_bytes());

        data
    }

    #[test]
    fn test_resolution_from_size() {
        assert_eq!(
            SrtmResolution::from_file_size(3601 * 3601 * 2).unwrap(),
            SrtmResolution::Srtm1
        );
        assert_eq!(
            SrtmResolution::from_file_size(1201 * 1201 * 2).unwrap(),
            SrtmResolution::Srtm3
        );

        match SrtmResolution::from_file_size(1000) {
            Err(SrtmError::InvalidFileSize { size }) => assert_eq!(size, 1000),
            other => panic!("Expected InvalidFileSize error, got {other:?}"),
        }
        assert!(SrtmResolution::from_file_size(0).is_err());
        assert!(SrtmResolution::from_file_size(SRTM3_SIZE + 2).is_err());
    }

    #[test]
    fn test_resolution_info() {
        assert_eq!(SrtmResolution::Srtm1.samples(), 3601);
        assert_eq!(SrtmResolution::Srtm3.samples(), 1201);
        assert_eq!(SrtmResolution::Srtm1.step(), 1);
        assert_eq!(SrtmResolution::Srtm3.step(), 3);
        assert_eq!(SrtmResolution::Srtm1.file_size(), 25_934_402);
        assert_eq!(SrtmResolution::Srtm3.file_size(), 2_884_802);
    }

    #[test]
    fn test_grid_index_corners() {
        let sw = grid_index(SrtmResolution::Srtm3, 0.0, 0.0);
        assert_eq!(sw, GridIndex { row: 1201, col: 1 });

        let ne = grid_index(SrtmResolution::Srtm3, 3600.0, 3600.0);
        assert_eq!(ne, GridIndex { row: 1, col: 1201 });

        let ne = grid_index(SrtmResolution::Srtm1, 3600.0, 3600.0);
        assert_eq!(ne, GridIndex { row: 1, col: 3601 });
    }

    #[test]
    fn test_grid_index_rounding() {
        // 4.5 / 3 = 1.5 rounds away from zero
        let idx = grid_index(SrtmResolution::Srtm3, 4.5, 4.5);
        assert_eq!(idx, GridIndex { row: 1199, col: 3 });

        // 4.4 / 3 = 1.47 rounds down
        let idx = grid_index(SrtmResolution::Srtm3, 4.4, 4.4);
        assert_eq!(idx, GridIndex { row: 1200, col: 2 });

        // SRTM1 half arc-second
        let idx = grid_index(SrtmResolution::Srtm1, 0.5, 0.5);
        assert_eq!(idx, GridIndex { row: 3600, col: 2 });
    }

    #[test]
    fn test_byte_offset() {
        let res = SrtmResolution::Srtm3;
        assert_eq!(byte_offset(res, GridIndex { row: 1, col: 1 }), 0);
        assert_eq!(byte_offset(res, GridIndex { row: 1, col: 2 }), 2);
        assert_eq!(byte_offset(res, GridIndex { row: 2, col: 1 }), 1201 * 2);
        assert_eq!(
            byte_offset(res, GridIndex { row: 1201, col: 1201 }),
            SRTM3_SIZE - 2
        );
    }

    #[test]
    fn test_read_sample() {
        let mut reader = Cursor::new(srtm3_data());
        let res = SrtmResolution::Srtm3;

        assert_eq!(read_sample(&mut reader, res, 3600.0, 0.0).unwrap(), 1000);
        assert_eq!(read_sample(&mut reader, res, 1800.0, 1800.0).unwrap(), 500);
        assert_eq!(read_sample(&mut reader, res, 0.0, 0.0).unwrap(), 100);
        assert_eq!(read_sample(&mut reader, res, 0.0, 0.5).unwrap(), 100);
    }

    #[test]
    fn test_read_sample_sign_extends() {
        let mut reader = Cursor::new(srtm3_data());
        let sample = read_sample(&mut reader, SrtmResolution::Srtm3, 3600.0, 3600.0).unwrap();
        assert_eq!(sample, -12);
    }

    #[test]
    fn test_read_sample_repeatable() {
        let mut reader = Cursor::new(srtm3_data());
        let res = SrtmResolution::Srtm3;
        let first = read_sample(&mut reader, res, 1800.0, 1800.0).unwrap();
        let _ = read_sample(&mut reader, res, 0.0, 0.0).unwrap();
        let second = read_sample(&mut reader, res, 1800.0, 1800.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_read_is_error() {
        // Only one byte past the last sample's start
        let mut reader = Cursor::new(vec![0u8; SRTM3_SIZE as usize - 1]);
        let err = read_sample(&mut reader, SrtmResolution::Srtm3, 0.0, 3600.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }
}
