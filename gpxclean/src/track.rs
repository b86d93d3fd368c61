//! In-memory track model and elevation augmentation.
//!
//! Tracks are grouped into segments of points. Augmentation walks the
//! points in order and overwrites each point's elevation with the value
//! returned by an [`ElevationModel`], including [`VOID_VALUE`] for points
//! without data.

use crate::tile::VOID_VALUE;

/// Anything that can answer elevation queries.
pub trait ElevationModel {
    /// Elevation in meters at the coordinate, or [`VOID_VALUE`].
    fn elevation(&self, lat: f64, lon: f64) -> i16;
}

/// A single track point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            elevation: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

/// A contiguous run of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
}

/// Author information attached to a track. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub link: String,
}

impl Author {
    /// Whether no author field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.link.is_empty()
    }

    /// Replace each field of `self` with the matching non-empty field of
    /// `other`.
    pub fn override_with(&mut self, other: &Author) {
        if !other.name.is_empty() {
            self.name = other.name.clone();
        }
        if !other.email.is_empty() {
            self.email = other.email.clone();
        }
        if !other.link.is_empty() {
            self.link = other.link.clone();
        }
    }
}

/// A named track made of segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub name: String,
    pub author: Author,
    pub segments: Vec<TrackSegment>,
}

impl Track {
    /// Total number of points across all segments.
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }

    /// Overwrite the elevation of every point, segment by segment, in order.
    pub fn apply_elevation<M: ElevationModel + ?Sized>(&mut self, model: &M) -> AugmentStats {
        self.apply_elevation_with(model, |_| {})
    }

    /// Like [`apply_elevation`](Self::apply_elevation), calling `progress`
    /// with the number of points finished after each segment.
    pub fn apply_elevation_with<M, F>(&mut self, model: &M, mut progress: F) -> AugmentStats
    where
        M: ElevationModel + ?Sized,
        F: FnMut(usize),
    {
        let mut stats = AugmentStats::default();
        for segment in &mut self.segments {
            let segment_stats = augment(&mut segment.points, model);
            progress(segment_stats.points);
            stats += segment_stats;
        }
        stats
    }
}

/// Counts from an augmentation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AugmentStats {
    /// Points visited.
    pub points: usize,
    /// Points that received [`VOID_VALUE`].
    pub void: usize,
}

impl std::ops::AddAssign for AugmentStats {
    fn add_assign(&mut self, rhs: Self) {
        self.points += rhs.points;
        self.void += rhs.void;
    }
}

/// Overwrite the elevation of each point with the model's answer, in order.
pub fn augment<M: ElevationModel + ?Sized>(points: &mut [TrackPoint], model: &M) -> AugmentStats {
    let mut stats = AugmentStats::default();
    for point in points.iter_mut() {
        let elevation = model.elevation(point.lat, point.lon);
        if elevation == VOID_VALUE {
            stats.void += 1;
        }
        point.elevation = Some(f64::from(elevation));
        stats.points += 1;
    }
    stats
}
