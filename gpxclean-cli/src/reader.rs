//! GPX input, converted into the library's track model.

use anyhow::{anyhow, Context, Result};
use gpx::Gpx;
use gpxclean::{Author, Track, TrackPoint, TrackSegment};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read every `<trk>` of a GPX file.
pub fn read_tracks(path: &Path) -> Result<Vec<Track>> {
    let file =
        File::open(path).with_context(|| format!("Unable to read {}", path.display()))?;
    let gpx = gpx::read(BufReader::new(file))
        .map_err(|e| anyhow!("Unable to read {}: {e}", path.display()))?;
    Ok(tracks_from_gpx(&gpx))
}

/// Convert a parsed document into tracks.
///
/// The track's own name wins over the document name. Author details come
/// from the document metadata and are shared by all tracks.
pub fn tracks_from_gpx(gpx: &Gpx) -> Vec<Track> {
    let metadata = gpx.metadata.as_ref();
    let document_name = metadata.and_then(|m| m.name.clone()).unwrap_or_default();

    let author = metadata
        .and_then(|m| m.author.as_ref())
        .map(|person| Author {
            name: person.name.clone().unwrap_or_default(),
            email: person.email.clone().unwrap_or_default(),
            link: person
                .link
                .as_ref()
                .map(|link| link.href.clone())
                .unwrap_or_default(),
        })
        .unwrap_or_default();

    gpx.tracks
        .iter()
        .map(|trk| Track {
            name: trk.name.clone().unwrap_or_else(|| document_name.clone()),
            author: author.clone(),
            segments: trk
                .segments
                .iter()
                .map(|seg| TrackSegment {
                    points: seg
                        .points
                        .iter()
                        .map(|wpt| {
                            let point = wpt.point();
                            TrackPoint {
                                lat: point.y(),
                                lon: point.x(),
                                elevation: wpt.elevation,
                            }
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
