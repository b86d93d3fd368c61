use std::fs;
use std::path::Path;

use gpxclean::{
    ElevationService, SrtmResolution, Track, TrackPoint, TrackSegment, VOID_VALUE,
};
use tempfile::TempDir;

/// Write an SRTM3 tile where every sample is `row * 10 + col`, rows and
/// columns 1-based, wrapped into the i16 range.
fn write_gradient_tile(dir: &Path, filename: &str) {
    let n = SrtmResolution::Srtm3.samples() as usize;
    let mut data = Vec::with_capacity(n * n * 2);
    for row in 1..=n {
        for col in 1..=n {
            let v = ((row * 10 + col) % 30000) as i16;
            data.extend_from_slice(&v.to_be_bytes());
        }
    }
    fs::write(dir.join(filename), data).unwrap();
}

fn expected(row: usize, col: usize) -> i16 {
    ((row * 10 + col) % 30000) as i16
}

fn two_point_track(a: (f64, f64), b: (f64, f64)) -> Track {
    Track {
        name: "test".into(),
        segments: vec![TrackSegment {
            points: vec![TrackPoint::new(a.0, a.1), TrackPoint::new(b.0, b.1)],
        }],
        ..Track::default()
    }
}

#[test]
fn missing_tile_yields_void_for_every_point() {
    let temp_dir = TempDir::new().unwrap();
    let service = ElevationService::new(temp_dir.path());

    let mut track = two_point_track((47.3, 11.2), (47.4, 11.3));
    let stats = track.apply_elevation(&service);

    let points = &track.segments[0].points;
    assert_eq!(points[0].elevation, Some(f64::from(VOID_VALUE)));
    assert_eq!(points[1].elevation, Some(f64::from(VOID_VALUE)));
    assert_eq!(stats.void, 2);
    assert_eq!(service.cache_stats().open_failures, 1);

    service.shutdown();
}

#[test]
fn corner_samples() {
    let temp_dir = TempDir::new().unwrap();
    write_gradient_tile(temp_dir.path(), "N47E011.hgt");
    let service = ElevationService::new(temp_dir.path());

    // Southwest corner: row 1201, col 1
    assert_eq!(service.get_elevation(47.0, 11.0), expected(1201, 1));

    // Just below the northeast corner rounds to row 1, col 1201
    assert_eq!(
        service.get_elevation(47.0 + 3599.0 / 3600.0, 11.0 + 3599.0 / 3600.0),
        expected(1, 1201)
    );

    // Center
    assert_eq!(service.get_elevation(47.5, 11.5), expected(601, 601));

    service.shutdown();
}

#[test]
fn augment_mixed_tiles() {
    let temp_dir = TempDir::new().unwrap();
    write_gradient_tile(temp_dir.path(), "N47E011.hgt");
    fs::write(temp_dir.path().join("N48E011.hgt"), vec![0u8; 10]).unwrap();
    let service = ElevationService::new(temp_dir.path());

    let mut track = Track {
        segments: vec![
            TrackSegment {
                points: vec![
                    TrackPoint::new(47.5, 11.5).with_elevation(1.0),
                    TrackPoint::new(48.5, 11.5),
                ],
            },
            TrackSegment {
                points: vec![TrackPoint::new(47.0, 11.0)],
            },
        ],
        ..Track::default()
    };

    let stats = track.apply_elevation(&service);
    assert_eq!(stats.points, 3);
    assert_eq!(stats.void, 1);

    assert_eq!(
        track.segments[0].points[0].elevation,
        Some(f64::from(expected(601, 601)))
    );
    assert_eq!(
        track.segments[0].points[1].elevation,
        Some(f64::from(VOID_VALUE))
    );
    assert_eq!(
        track.segments[1].points[0].elevation,
        Some(f64::from(expected(1201, 1)))
    );

    let stats = service.cache_stats();
    assert_eq!(stats.miss_count, 2);
    assert_eq!(stats.open_failures, 1);

    assert_eq!(service.shutdown(), 1);
}

#[test]
fn repeated_lookups_are_stable() {
    let temp_dir = TempDir::new().unwrap();
    write_gradient_tile(temp_dir.path(), "N47E011.hgt");
    let service = ElevationService::new(temp_dir.path());

    let coords: Vec<(f64, f64)> = (0..200)
        .map(|i| {
            let frac = f64::from(i) / 200.0;
            (47.0 + frac, 11.0 + frac)
        })
        .collect();

    let first = service.get_elevations_batch(&coords);
    let second = service.get_elevations_batch(&coords);
    assert_eq!(first, second);
    assert!(first.iter().all(|&v| v != VOID_VALUE));
}
