//! Normalized GPX 1.1 output.

use anyhow::{bail, Context, Result};
use gpxclean::{Author, Track, TrackPoint};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";
const CREATOR: &str = "gpxclean";

/// Write `track` to `{output_dir}/{name}.gpx`.
///
/// An existing file is renamed to `{name}.gpx.bak` first. If that backup
/// already exists nothing is written and an error is returned.
pub fn write_track_file(track: &Track, output_dir: &Path) -> Result<PathBuf> {
    let stem = file_stem(&track.name);
    let path = output_dir.join(format!("{stem}.gpx"));

    if path.exists() {
        let backup = output_dir.join(format!("{stem}.gpx.bak"));
        if backup.exists() {
            bail!(
                "Unable to back up {}: {} already exists",
                path.display(),
                backup.display()
            );
        }
        fs::rename(&path, &backup)
            .with_context(|| format!("Unable to create {}", backup.display()))?;
    }

    let file =
        File::create(&path).with_context(|| format!("Unable to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_track(track, &mut out)
        .and_then(|()| out.flush().map_err(Into::into))
        .with_context(|| format!("Unable to write {}", path.display()))?;

    Ok(path)
}

/// Serialize one track as a standalone GPX document.
pub fn write_track<W: Write>(track: &Track, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b'\t', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("gpx").with_attributes([
        ("xmlns", GPX_NAMESPACE),
        ("version", "1.1"),
        ("xmlns:xsi", XSI_NAMESPACE),
        ("xsi:schemaLocation", SCHEMA_LOCATION),
        ("creator", CREATOR),
    ])))?;

    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_text(&mut writer, "name", &track.name)?;
    if !track.author.is_empty() {
        write_author(&mut writer, &track.author)?;
    }
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    writer.write_event(Event::Start(BytesStart::new("trk")))?;
    write_text(&mut writer, "name", &track.name)?;
    for segment in &track.segments {
        writer.write_event(Event::Start(BytesStart::new("trkseg")))?;
        for point in &segment.points {
            write_point(&mut writer, point)?;
        }
        writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("trk")))?;

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_author<W: Write>(writer: &mut Writer<W>, author: &Author) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("author")))?;
    if !author.name.is_empty() {
        write_text(writer, "name", &author.name)?;
    }
    if !author.email.is_empty() {
        // GPX 1.1 stores addresses split into id and domain
        match author.email.split_once('@') {
            Some((id, domain)) => writer.write_event(Event::Empty(
                BytesStart::new("email").with_attributes([("id", id), ("domain", domain)]),
            ))?,
            None => warn!(email = %author.email, "skipping author email without '@'"),
        }
    }
    if !author.link.is_empty() {
        writer.write_event(Event::Empty(
            BytesStart::new("link").with_attributes([("href", author.link.as_str())]),
        ))?;
    }
    writer.write_event(Event::End(BytesEnd::new("author")))?;
    Ok(())
}

fn write_point<W: Write>(writer: &mut Writer<W>, point: &TrackPoint) -> Result<()> {
    let lat = point.lat.to_string();
    let lon = point.lon.to_string();
    let start =
        BytesStart::new("trkpt").with_attributes([("lat", lat.as_str()), ("lon", lon.as_str())]);

    match point.elevation {
        Some(elevation) => {
            writer.write_event(Event::Start(start))?;
            write_text(writer, "ele", &elevation.to_string())?;
            writer.write_event(Event::End(BytesEnd::new("trkpt")))?;
        }
        None => writer.write_event(Event::Empty(start))?,
    }
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Track names become file names; path separators and characters most
/// filesystems reject are replaced.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}
