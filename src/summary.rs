//! Aggregation of per-track statistics into a file-level summary.
//!
//! [`SummaryStats::from_track_stats`] consumes the per-track records in their
//! original file order and produces totals, the overall time span, and the
//! extreme tracks (longest/shortest by distance, fastest/slowest by average
//! moving speed). Extremes are reported as indices into the input slice; ties
//! go to the earliest track.

use crate::geo_utils::{DistanceBreakdown, SpeedBreakdown};
use crate::stats::TrackStats;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregate statistics over all tracks of a run.
///
/// Sums are order-independent; the extreme indices depend on input order
/// only for tie-breaking. Owned by the report generation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_tracks: usize,
    pub total_segments: usize,
    pub total_points: usize,
    /// Number of tracks with at least one timestamped point.
    pub tracks_with_time: usize,
    pub total_distance_km: f64,
    pub total_moving_time_hours: f64,
    /// `total_distance_km / total_moving_time_hours`, absent when no track
    /// accumulated moving time.
    pub overall_avg_speed_kmh: Option<f64>,
    /// Earliest start timestamp across all tracks.
    pub earliest_start: Option<DateTime<Utc>>,
    /// Latest end timestamp across all tracks.
    pub latest_end: Option<DateTime<Utc>>,
    /// Mean track distance, absent when there are no tracks.
    pub mean_track_distance_km: Option<f64>,
    /// Index of the longest track by distance.
    pub longest_track: Option<usize>,
    /// Index of the shortest track by distance.
    pub shortest_track: Option<usize>,
    /// Index of the fastest track among those with a defined average speed.
    pub fastest_track: Option<usize>,
    /// Index of the slowest track among those with a defined average speed.
    pub slowest_track: Option<usize>,
}

impl SummaryStats {
    /// Aggregate per-track statistics, preserving input order for
    /// tie-breaking.
    ///
    /// An empty input yields zero totals with every optional field absent.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gpx_stats::SummaryStats;
    ///
    /// let summary = SummaryStats::from_track_stats(&[]);
    /// assert_eq!(summary.total_tracks, 0);
    /// assert!(summary.longest_track.is_none());
    /// assert!(summary.overall_avg_speed_kmh.is_none());
    /// ```
    pub fn from_track_stats(stats: &[TrackStats]) -> Self {
        let mut summary = Self {
            total_tracks: stats.len(),
            total_segments: 0,
            total_points: 0,
            tracks_with_time: 0,
            total_distance_km: 0.0,
            total_moving_time_hours: 0.0,
            overall_avg_speed_kmh: None,
            earliest_start: None,
            latest_end: None,
            mean_track_distance_km: None,
            longest_track: None,
            shortest_track: None,
            fastest_track: None,
            slowest_track: None,
        };

        for (i, track) in stats.iter().enumerate() {
            summary.total_segments += track.segment_count;
            summary.total_points += track.point_count;
            summary.total_distance_km += track.total_distance_km;
            summary.total_moving_time_hours += track.moving_time_hours;

            if track.start_time.is_some() || track.end_time.is_some() {
                summary.tracks_with_time += 1;
            }
            if let Some(start) = track.start_time {
                if summary.earliest_start.map_or(true, |e| start < e) {
                    summary.earliest_start = Some(start);
                }
            }
            if let Some(end) = track.end_time {
                if summary.latest_end.map_or(true, |l| end > l) {
                    summary.latest_end = Some(end);
                }
            }

            // Strict comparisons keep the earliest track on ties
            match summary.longest_track {
                Some(j) if track.total_distance_km <= stats[j].total_distance_km => {}
                _ => summary.longest_track = Some(i),
            }
            match summary.shortest_track {
                Some(j) if track.total_distance_km >= stats[j].total_distance_km => {}
                _ => summary.shortest_track = Some(i),
            }

            if let Some(speed) = track.avg_speed_kmh {
                match summary.fastest_track {
                    Some(j) if speed <= stats[j].avg_speed_kmh.unwrap_or(f64::MIN) => {}
                    _ => summary.fastest_track = Some(i),
                }
                match summary.slowest_track {
                    Some(j) if speed >= stats[j].avg_speed_kmh.unwrap_or(f64::MAX) => {}
                    _ => summary.slowest_track = Some(i),
                }
            }
        }

        if summary.total_moving_time_hours > 0.0 {
            summary.overall_avg_speed_kmh =
                Some(summary.total_distance_km / summary.total_moving_time_hours);
        }
        if summary.total_tracks > 0 {
            summary.mean_track_distance_km =
                Some(summary.total_distance_km / summary.total_tracks as f64);
        }

        summary
    }

    /// Total elapsed wall-clock time between the earliest start and the
    /// latest end, in hours. Absent when no track carries timestamps.
    pub fn total_elapsed_hours(&self) -> Option<f64> {
        match (self.earliest_start, self.latest_end) {
            (Some(start), Some(end)) => {
                Some((end - start).num_milliseconds() as f64 / 3_600_000.0)
            }
            _ => None,
        }
    }

    /// Total distance expanded into km, miles and nautical miles.
    pub fn distance(&self) -> DistanceBreakdown {
        DistanceBreakdown::from_km(self.total_distance_km)
    }

    /// Overall average speed expanded into km/h, mph and knots, if defined.
    pub fn overall_avg_speed(&self) -> Option<SpeedBreakdown> {
        self.overall_avg_speed_kmh.map(SpeedBreakdown::from_kmh)
    }
}
