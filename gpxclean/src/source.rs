//! Where tile bytes come from.

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use crate::filename::TileId;

/// Opens tiles by identifier.
///
/// The cache calls [`TileSource::open`] at most once per tile and owns the
/// returned handle until shutdown. Dropping the handle closes it.
pub trait TileSource: Send + Sync {
    /// Readable, seekable tile contents.
    type Handle: Read + Seek + Send + 'static;

    /// Open a tile, returning the handle and its total length in bytes.
    fn open(&self, tile: &TileId) -> io::Result<(Self::Handle, u64)>;

    /// Human-readable location of a tile, used in diagnostics.
    fn describe(&self, tile: &TileId) -> String {
        tile.file_name()
    }
}

/// A directory of `.hgt` files.
#[derive(Debug, Clone)]
pub struct HgtDirectory {
    data_dir: PathBuf,
}

impl HgtDirectory {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Directory containing the `.hgt` files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path a tile is expected at.
    pub fn tile_path(&self, tile: &TileId) -> PathBuf {
        self.data_dir.join(tile.file_name())
    }

    /// Scan the data directory for files named like tiles.
    ///
    /// Returns a sorted list of identifiers. Unreadable directories yield
    /// an empty list.
    pub fn scan(&self) -> Vec<TileId> {
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut tiles: Vec<TileId> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if name.ends_with(".hgt") {
                    TileId::parse(&name)
                } else {
                    None
                }
            })
            .collect();

        tiles.sort_by_key(|tile| tile.to_string());
        tiles
    }
}

impl TileSource for HgtDirectory {
    type Handle = File;

    fn open(&self, tile: &TileId) -> io::Result<(File, u64)> {
        let file = File::open(self.tile_path(tile))?;
        let len = file.metadata()?.len();
        Ok((file, len))
    }

    fn describe(&self, tile: &TileId) -> String {
        self.tile_path(tile).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_reports_length() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("N47E011.hgt"), vec![0u8; 42]).unwrap();

        let source = HgtDirectory::new(temp_dir.path());
        let (_, len) = source.open(&TileId::new(false, 47, false, 11)).unwrap();
        assert_eq!(len, 42);
    }

    #[test]
    fn test_open_missing() {
        let temp_dir = TempDir::new().unwrap();
        let source = HgtDirectory::new(temp_dir.path());

        let err = source.open(&TileId::new(false, 47, false, 11)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_describe_names_path() {
        let source = HgtDirectory::new("/data/srtm");
        let desc = source.describe(&TileId::new(true, 33, false, 18));
        assert!(desc.ends_with("S33E018.hgt"));
        assert!(desc.starts_with("/data/srtm"));
    }

    #[test]
    fn test_scan() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("N47E011.hgt"), b"").unwrap();
        fs::write(temp_dir.path().join("S33E018.hgt"), b"").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"").unwrap();
        fs::write(temp_dir.path().join("bogus.hgt"), b"").unwrap();

        let tiles = HgtDirectory::new(temp_dir.path()).scan();
        let names: Vec<String> = tiles.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["N47E011", "S33E018"]);
    }

    #[test]
    fn test_scan_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let source = HgtDirectory::new(temp_dir.path().join("nope"));
        assert!(source.scan().is_empty());
    }
}
