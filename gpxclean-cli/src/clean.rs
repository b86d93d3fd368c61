use anyhow::{bail, Result};
use gpxclean::{Author, ElevationService, ElevationServiceBuilder, Track};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::{reader, writer};

/// Split a `NAME;EMAIL;LINK` argument. Missing or empty parts stay unset.
pub fn parse_author(arg: &str) -> Author {
    let mut parts = arg.split(';').map(str::to_string);
    Author {
        name: parts.next().unwrap_or_default(),
        email: parts.next().unwrap_or_default(),
        link: parts.next().unwrap_or_default(),
    }
}

pub fn run(
    input: &Path,
    author: Option<&Author>,
    srtm_dir: Option<&Path>,
    output_dir: &Path,
) -> Result<()> {
    if !input.exists() {
        bail!("{} does not exist.", input.display());
    }

    let service = match srtm_dir {
        Some(dir) => Some(open_service(dir)?),
        None => None,
    };

    let tracks = reader::read_tracks(input)?;
    if tracks.is_empty() {
        warn!(input = %input.display(), "no tracks found");
    }

    let default_name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    for mut track in tracks {
        // use file name as track name if there is no name within the file
        if track.name.is_empty() {
            track.name = default_name.clone();
        }

        if let Some(author) = author {
            track.author.override_with(author);
        }

        if let Some(service) = &service {
            apply_elevation(&mut track, service)?;
        }

        match writer::write_track_file(&track, output_dir) {
            Ok(path) => info!(track = %track.name, output = %path.display(), "wrote track"),
            Err(e) => error!("{e:#}"),
        }
    }

    if let Some(service) = service {
        let stats = service.cache_stats();
        debug!(
            tiles = stats.entry_count,
            unavailable = stats.open_failures,
            hit_rate = stats.hit_rate(),
            "tile cache"
        );
        service.shutdown();
    }

    Ok(())
}

fn open_service(dir: &Path) -> Result<ElevationService> {
    if !dir.is_dir() {
        bail!("{} does not exist.", dir.display());
    }

    let service = ElevationServiceBuilder::new(dir).build();
    let tiles = service.source().scan();
    if tiles.is_empty() {
        warn!(srtm_dir = %dir.display(), "no .hgt tiles found");
    } else {
        debug!(srtm_dir = %dir.display(), tiles = tiles.len(), "found tiles");
    }
    Ok(service)
}

fn apply_elevation(track: &mut Track, service: &ElevationService) -> Result<()> {
    let pb = ProgressBar::new(track.point_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let stats = track.apply_elevation_with(service, |n| pb.inc(n as u64));
    pb.finish_and_clear();

    if stats.void > 0 {
        warn!(
            track = %track.name,
            points = stats.points,
            void = stats.void,
            "some points have no elevation data"
        );
    }
    Ok(())
}
