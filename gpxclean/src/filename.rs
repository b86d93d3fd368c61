//! Tile identifiers and coordinate resolution.
//!
//! SRTM files follow the naming convention `{N|S}{lat}{E|W}{lon}.hgt`:
//!
//! - Latitude: 2 digits with N/S prefix (e.g., N35, S12)
//! - Longitude: 3 digits with E/W prefix (e.g., E138, W077)
//!
//! The degree digits are the whole part of the coordinate's absolute value
//! and the prefix is taken from its sign, so `-33.9, 18.4` resolves to
//! `S33E018`. Fractional offsets inside the tile are measured the same way,
//! in arc-seconds from the whole-degree line.

use std::fmt;

const ARCSEC_PER_DEG: f64 = 3600.0;

/// Identifier of a 1° × 1° tile, e.g. `N47E011`.
///
/// This is the cache key for open tiles. Paths are only derived from it
/// when a tile is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    south: bool,
    lat: u16,
    west: bool,
    lon: u16,
}

impl TileId {
    /// Create an identifier from hemisphere flags and whole degrees.
    pub fn new(south: bool, lat: u16, west: bool, lon: u16) -> Self {
        Self {
            south,
            lat,
            west,
            lon,
        }
    }

    /// The `.hgt` file name for this tile (e.g., "N47E011.hgt").
    pub fn file_name(&self) -> String {
        format!("{self}.hgt")
    }

    /// Parse a tile name such as `N35E138`, `n35e138.hgt` or
    /// `/path/to/S12W077.hgt`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gpxclean::filename::TileId;
    ///
    /// let tile = TileId::parse("S12W077.hgt").unwrap();
    /// assert_eq!(tile.to_string(), "S12W077");
    /// assert!(TileId::parse("invalid").is_none());
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        // Extract just the filename if a path is given
        let name = name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(name);

        let name = name
            .strip_suffix(".hgt")
            .or_else(|| name.strip_suffix(".HGT"))
            .unwrap_or(name);

        // Must be exactly 7 characters: N00E000
        if name.len() != 7 || !name.is_ascii() {
            return None;
        }

        let bytes = name.as_bytes();
        let south = match bytes[0] {
            b'N' | b'n' => false,
            b'S' | b's' => true,
            _ => return None,
        };
        let west = match bytes[3] {
            b'E' | b'e' => false,
            b'W' | b'w' => true,
            _ => return None,
        };

        let lat = digits(&name[1..3])?;
        let lon = digits(&name[4..7])?;

        Some(Self::new(south, lat, west, lon))
    }
}

fn digits(s: &str) -> Option<u16> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}{}{:03}",
            if self.south { 'S' } else { 'N' },
            self.lat,
            if self.west { 'W' } else { 'E' },
            self.lon
        )
    }
}

/// A coordinate resolved to its tile and position inside the tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLocation {
    /// Tile covering the coordinate.
    pub tile: TileId,
    /// Latitude offset from the tile's whole-degree line, in arc-seconds.
    pub lat_arcsec: f64,
    /// Longitude offset from the tile's whole-degree line, in arc-seconds.
    pub lon_arcsec: f64,
}

/// Resolve a coordinate to its tile and fractional arc-second offsets.
///
/// No rounding happens here; the decoder rounds to the grid.
///
/// # Examples
///
/// ```
/// use gpxclean::filename::resolve;
///
/// assert_eq!(resolve(47.3, 11.2).tile.to_string(), "N47E011");
/// assert_eq!(resolve(-33.9, 18.4).tile.to_string(), "S33E018");
/// assert_eq!(resolve(12.0, -122.5).tile.to_string(), "N12W122");
/// ```
pub fn resolve(lat: f64, lon: f64) -> TileLocation {
    let (lat_deg, lat_arcsec) = split_degrees(lat);
    let (lon_deg, lon_arcsec) = split_degrees(lon);

    TileLocation {
        tile: TileId::new(lat < 0.0, lat_deg, lon < 0.0, lon_deg),
        lat_arcsec,
        lon_arcsec,
    }
}

fn split_degrees(value: f64) -> (u16, f64) {
    let abs = value.abs();
    let whole = abs.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let degrees = whole as u16;
    (degrees, (abs - whole) * ARCSEC_PER_DEG)
}
