//! GPX file input.
//!
//! Thin wrapper over the `gpx` crate that converts parsed GPX documents into
//! this crate's [`Track`] model. Waypoint timestamps are normalized to
//! `chrono::DateTime<Utc>`; fixes without a `<time>` element simply carry no
//! timestamp and are handled downstream by the statistics pass.

use crate::{GpxStatsError, Track, TrackPoint, TrackSegment};
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Load tracks from a GPX file.
///
/// `max_tracks` caps the number of tracks returned (in file order);
/// `None` loads them all.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or is not valid GPX.
pub fn load_tracks(path: &Path, max_tracks: Option<usize>) -> Result<Vec<Track>, GpxStatsError> {
    let file = File::open(path).map_err(|source| GpxStatsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tracks = parse_tracks(BufReader::new(file))?;

    info!("{}: found {} tracks", path.display(), tracks.len());

    if let Some(max) = max_tracks {
        if tracks.len() > max {
            info!("limiting to first {max} tracks");
            tracks.truncate(max);
        }
    }

    Ok(tracks)
}

/// Parse tracks from any GPX reader.
pub fn parse_tracks<R: Read>(reader: R) -> Result<Vec<Track>, GpxStatsError> {
    let gpx = gpx::read(reader)?;
    Ok(gpx.tracks.iter().map(convert_track).collect())
}

fn convert_track(track: &gpx::Track) -> Track {
    Track {
        name: track.name.clone(),
        description: track.description.clone(),
        segments: track
            .segments
            .iter()
            .map(|segment| TrackSegment {
                points: segment.points.iter().map(convert_point).collect(),
            })
            .collect(),
    }
}

fn convert_point(waypoint: &gpx::Waypoint) -> TrackPoint {
    let point = waypoint.point();

    let time = waypoint.time.and_then(|t| {
        let odt: time::OffsetDateTime = t.into();
        let converted =
            chrono::DateTime::from_timestamp(odt.unix_timestamp(), odt.nanosecond());
        if converted.is_none() {
            warn!(
                "dropping out-of-range timestamp at ({:.4}, {:.4})",
                point.y(),
                point.x()
            );
        }
        converted
    });

    TrackPoint {
        latitude: point.y(),
        longitude: point.x(),
        time,
        elevation: waypoint.elevation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="gpx-stats-tests" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Morning ride</name>
    <desc>Loop around the park</desc>
    <trkseg>
      <trkpt lat="51.5074" lon="-0.1278">
        <ele>11.0</ele>
        <time>2023-06-01T08:00:00Z</time>
      </trkpt>
      <trkpt lat="51.5080" lon="-0.1290">
        <time>2023-06-01T08:01:00Z</time>
      </trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="51.5090" lon="-0.1300"/>
    </trkseg>
  </trk>
  <trk>
    <name>Second track</name>
    <trkseg>
      <trkpt lat="48.8566" lon="2.3522"/>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_parse_tracks() {
        let tracks = parse_tracks(Cursor::new(SAMPLE_GPX)).unwrap();
        assert_eq!(tracks.len(), 2);

        let first = &tracks[0];
        assert_eq!(first.name.as_deref(), Some("Morning ride"));
        assert_eq!(first.description.as_deref(), Some("Loop around the park"));
        assert_eq!(first.segments.len(), 2);
        assert_eq!(first.point_count(), 3);

        let p0 = &first.segments[0].points[0];
        assert!((p0.latitude - 51.5074).abs() < 1e-9);
        assert!((p0.longitude + 0.1278).abs() < 1e-9);
        assert_eq!(p0.elevation, Some(11.0));
        assert_eq!(
            p0.time,
            Some(Utc.with_ymd_and_hms(2023, 6, 1, 8, 0, 0).unwrap())
        );

        // Point without a <time> element has no timestamp
        assert!(first.segments[1].points[0].time.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_tracks(Cursor::new("not xml at all")).is_err());
    }

    #[test]
    fn test_load_tracks_missing_file() {
        let err = load_tracks(Path::new("/nonexistent/file.gpx"), None).unwrap_err();
        assert!(matches!(err, GpxStatsError::Io { .. }));
    }
}
