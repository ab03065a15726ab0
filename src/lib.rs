//! # GPX Stats
//!
//! GPS track statistics and analysis for GPX files.
//!
//! This library provides:
//! - Per-track statistics: distance, moving time, average speed, bounds
//! - Aggregate statistics across all tracks in a file
//! - Text, CSV and HTML report generation
//! - Optional reverse geocoding of start/end locations
//!
//! ## Features
//!
//! - **`geocode`** - Enable reverse geocoding via Nominatim
//! - **`cli`** - Enable the `gpx-stats` command-line binary (default)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use gpx_stats::{Track, TrackSegment, TrackPoint, TrackStats};
//!
//! let track = Track {
//!     name: Some("Morning ride".to_string()),
//!     description: None,
//!     segments: vec![TrackSegment {
//!         points: vec![
//!             TrackPoint::new(51.5074, -0.1278),
//!             TrackPoint::new(51.5080, -0.1290),
//!             TrackPoint::new(51.5090, -0.1300),
//!         ],
//!     }],
//! };
//!
//! let stats = TrackStats::from_track(&track);
//! println!("{:.2} km over {} points", stats.total_distance_km, stats.point_count);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

// Geographic math: haversine distance, unit conversion, bounding boxes
pub mod geo_utils;
pub use geo_utils::{Bounds, DistanceBreakdown, SpeedBreakdown};

// Per-track moving statistics
pub mod stats;
pub use stats::TrackStats;

// Aggregation of per-track statistics into a file-level summary
pub mod summary;
pub use summary::SummaryStats;

// GPX file input
pub mod gpx_file;
pub use gpx_file::load_tracks;

// Text/CSV/HTML report rendering
pub mod report;
pub use report::{TrackReport, write_csv, write_html, write_text_summary};

// Reverse geocoding against Nominatim
#[cfg(feature = "geocode")]
pub mod geocode;

#[cfg(feature = "geocode")]
pub use geocode::{PlaceResolver, resolve_track_places_sync};

// ============================================================================
// Core Types
// ============================================================================

/// A single recorded GPS fix with optional timestamp and elevation.
///
/// # Example
/// ```
/// use gpx_stats::TrackPoint;
/// let point = TrackPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Recorded UTC instant, if the fix carried one.
    pub time: Option<DateTime<Utc>>,
    /// Elevation in meters, if the fix carried one.
    pub elevation: Option<f64>,
}

impl TrackPoint {
    /// Create a new track point without timestamp or elevation.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            time: None,
            elevation: None,
        }
    }

    /// Create a track point with a recorded timestamp.
    pub fn with_time(latitude: f64, longitude: f64, time: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            time: Some(time),
            elevation: None,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// An ordered run of track points. Recording order is significant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
}

/// A single track from a GPX file: name, optional description, and its
/// ordered segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub name: Option<String>,
    pub description: Option<String>,
    pub segments: Vec<TrackSegment>,
}

impl Track {
    /// Iterate over all points of the track in recorded order,
    /// segment by segment.
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.segments.iter().flat_map(|s| s.points.iter())
    }

    /// Total number of points across all segments.
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}

/// Errors raised by the I/O layers. The statistics core itself never fails;
/// undefined values are reported as `None`.
#[derive(Debug, Error)]
pub enum GpxStatsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse GPX: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "geocode")]
    #[error("geocoding client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_track_point_validation() {
        assert!(TrackPoint::new(51.5074, -0.1278).is_valid());
        assert!(!TrackPoint::new(91.0, 0.0).is_valid());
        assert!(!TrackPoint::new(0.0, 181.0).is_valid());
        assert!(!TrackPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_points_walk_preserves_segment_order() {
        let track = Track {
            name: None,
            description: None,
            segments: vec![
                TrackSegment {
                    points: vec![TrackPoint::new(0.0, 0.0), TrackPoint::new(0.0, 1.0)],
                },
                TrackSegment {
                    points: vec![TrackPoint::new(0.0, 2.0)],
                },
            ],
        };

        let longitudes: Vec<f64> = track.points().map(|p| p.longitude).collect();
        assert_eq!(longitudes, vec![0.0, 1.0, 2.0]);
        assert_eq!(track.point_count(), 3);
    }

    #[test]
    fn test_with_time_sets_timestamp() {
        let t = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        let p = TrackPoint::with_time(51.5, -0.12, t);
        assert_eq!(p.time, Some(t));
        assert!(p.elevation.is_none());
    }
}
