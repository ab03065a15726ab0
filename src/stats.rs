//! Per-track moving statistics.
//!
//! [`TrackStats::from_track`] walks every point of a track in recorded order
//! (segment boundaries do not reset the walk) and accumulates distance,
//! moving time, bounds and endpoints in a single pass.
//!
//! Moving time deliberately excludes two kinds of point pairs:
//!
//! - **Stationary pairs** closer than [`STATIONARY_THRESHOLD_KM`]: GPS jitter
//!   while standing still would otherwise dilute the average speed.
//! - **Gap pairs** further apart in time than [`MAX_MOVING_GAP_SECONDS`]:
//!   a paused or powered-off recorder, not actual movement.
//!
//! The distance of such pairs still counts toward the track total; only their
//! time is dropped. Average speed is therefore a *moving* average, and is
//! absent (`None`) for tracks with no qualifying pairs.

use crate::geo_utils::{self, Bounds, DistanceBreakdown, SpeedBreakdown};
use crate::{Track, TrackPoint};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pairs closer than this (km) are treated as stationary noise.
pub const STATIONARY_THRESHOLD_KM: f64 = 0.01;

/// Pairs further apart in time than this (seconds) are treated as a
/// recording gap.
pub const MAX_MOVING_GAP_SECONDS: f64 = 3600.0;

/// Derived statistics for a single track. Never mutated after creation;
/// recompute from the track if the inputs change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackStats {
    /// Sum of great-circle distances over all consecutive point pairs, in km.
    pub total_distance_km: f64,
    /// Accumulated time of qualifying moving pairs, in hours.
    pub moving_time_hours: f64,
    /// `total_distance_km / moving_time_hours`, absent when no moving time
    /// was accumulated.
    pub avg_speed_kmh: Option<f64>,
    /// First point of the walk, absent for an empty track.
    pub start_point: Option<TrackPoint>,
    /// Last point of the walk, absent for an empty track.
    pub end_point: Option<TrackPoint>,
    /// Bounding box over all points, absent for an empty track.
    pub bounds: Option<Bounds>,
    pub segment_count: usize,
    pub point_count: usize,
    /// Timestamp of the first point that has one.
    pub start_time: Option<DateTime<Utc>>,
    /// Timestamp of the last point that has one.
    pub end_time: Option<DateTime<Utc>>,
}

impl TrackStats {
    /// Compute statistics for a track in a single sequential pass.
    ///
    /// Distance accumulates unconditionally over all consecutive pairs. A
    /// pair contributes to moving time only when both points carry
    /// timestamps, the elapsed time is positive and at most
    /// [`MAX_MOVING_GAP_SECONDS`], and the pair covered at least
    /// [`STATIONARY_THRESHOLD_KM`].
    ///
    /// An empty track yields zero distance/time/counts with all optional
    /// fields absent; a single-point track additionally has bounds and
    /// endpoints equal to that point.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gpx_stats::{Track, TrackSegment, TrackPoint, TrackStats};
    ///
    /// let track = Track {
    ///     name: None,
    ///     description: None,
    ///     segments: vec![TrackSegment {
    ///         points: vec![TrackPoint::new(0.0, 0.0), TrackPoint::new(0.0, 0.1)],
    ///     }],
    /// };
    ///
    /// let stats = TrackStats::from_track(&track);
    /// assert!(stats.total_distance_km > 11.0);
    /// // No timestamps, so no moving time and no average speed
    /// assert_eq!(stats.moving_time_hours, 0.0);
    /// assert!(stats.avg_speed_kmh.is_none());
    /// ```
    pub fn from_track(track: &Track) -> Self {
        let mut total_distance_km = 0.0;
        let mut moving_time_hours = 0.0;
        let mut bounds: Option<Bounds> = None;
        let mut start_point: Option<TrackPoint> = None;
        let mut end_point: Option<TrackPoint> = None;
        let mut start_time: Option<DateTime<Utc>> = None;
        let mut end_time: Option<DateTime<Utc>> = None;
        let mut point_count = 0usize;
        let mut prev: Option<&TrackPoint> = None;

        for p in track.points() {
            point_count += 1;

            if start_point.is_none() {
                start_point = Some(*p);
            }
            end_point = Some(*p);

            if let Some(t) = p.time {
                if start_time.is_none() {
                    start_time = Some(t);
                }
                end_time = Some(t);
            }

            match bounds.as_mut() {
                Some(b) => b.extend(p),
                None => bounds = Some(Bounds::of_point(p)),
            }

            if let Some(prev) = prev {
                let leg_km = geo_utils::haversine_distance(prev, p);
                total_distance_km += leg_km;

                // Pairs missing either timestamp contribute distance only
                if let (Some(t0), Some(t1)) = (prev.time, p.time) {
                    let elapsed_s = (t1 - t0).num_milliseconds() as f64 / 1000.0;
                    if leg_km >= STATIONARY_THRESHOLD_KM
                        && elapsed_s > 0.0
                        && elapsed_s <= MAX_MOVING_GAP_SECONDS
                    {
                        moving_time_hours += elapsed_s / 3600.0;
                    }
                }
            }

            prev = Some(p);
        }

        let avg_speed_kmh =
            (moving_time_hours > 0.0).then(|| total_distance_km / moving_time_hours);

        Self {
            total_distance_km,
            moving_time_hours,
            avg_speed_kmh,
            start_point,
            end_point,
            bounds,
            segment_count: track.segments.len(),
            point_count,
            start_time,
            end_time,
        }
    }

    /// Total distance expanded into km, miles and nautical miles.
    pub fn distance(&self) -> DistanceBreakdown {
        DistanceBreakdown::from_km(self.total_distance_km)
    }

    /// Average moving speed expanded into km/h, mph and knots, if defined.
    pub fn avg_speed(&self) -> Option<SpeedBreakdown> {
        self.avg_speed_kmh.map(SpeedBreakdown::from_kmh)
    }

    /// Wall-clock duration between the first and last timestamped points,
    /// in hours. Absent when no point carries a timestamp.
    pub fn duration_hours(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                Some((end - start).num_milliseconds() as f64 / 3_600_000.0)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackSegment;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, 8, 0, 0).unwrap()
    }

    fn single_segment(points: Vec<TrackPoint>) -> Track {
        Track {
            name: None,
            description: None,
            segments: vec![TrackSegment { points }],
        }
    }

    #[test]
    fn test_empty_track() {
        let stats = TrackStats::from_track(&Track::default());
        assert_eq!(stats.total_distance_km, 0.0);
        assert_eq!(stats.moving_time_hours, 0.0);
        assert_eq!(stats.point_count, 0);
        assert_eq!(stats.segment_count, 0);
        assert!(stats.avg_speed_kmh.is_none());
        assert!(stats.bounds.is_none());
        assert!(stats.start_point.is_none());
        assert!(stats.start_time.is_none());
        assert!(stats.end_time.is_none());
    }

    #[test]
    fn test_single_point_track() {
        let p = TrackPoint::with_time(51.5, -0.12, t0());
        let stats = TrackStats::from_track(&single_segment(vec![p]));

        assert_eq!(stats.total_distance_km, 0.0);
        assert_eq!(stats.moving_time_hours, 0.0);
        assert_eq!(stats.point_count, 1);
        assert!(stats.avg_speed_kmh.is_none());

        let bounds = stats.bounds.unwrap();
        assert_eq!(bounds.min_lat, 51.5);
        assert_eq!(bounds.max_lat, 51.5);
        assert_eq!(stats.start_point, Some(p));
        assert_eq!(stats.end_point, Some(p));
        assert_eq!(stats.start_time, Some(t0()));
        assert_eq!(stats.end_time, Some(t0()));
    }

    #[test]
    fn test_stationary_track_has_no_moving_time() {
        // Four fixes within a few meters of each other, a minute apart
        let points: Vec<TrackPoint> = (0..4)
            .map(|i| {
                TrackPoint::with_time(
                    51.5 + i as f64 * 0.00001, // ~1.1 m per step
                    -0.12,
                    t0() + Duration::seconds(60 * i),
                )
            })
            .collect();

        let stats = TrackStats::from_track(&single_segment(points));
        assert!(stats.total_distance_km > 0.0);
        assert_eq!(stats.moving_time_hours, 0.0);
        assert!(stats.avg_speed_kmh.is_none());
    }

    #[test]
    fn test_gap_filter_excludes_long_pauses() {
        // ~111 m per 0.001 degree of longitude at the equator
        let points = vec![
            TrackPoint::with_time(0.0, 0.0, t0()),
            TrackPoint::with_time(0.0, 0.001, t0() + Duration::seconds(60)),
            // Recorder pause: next fix more than an hour later
            TrackPoint::with_time(0.0, 0.002, t0() + Duration::seconds(60 + 3661)),
        ];

        let stats = TrackStats::from_track(&single_segment(points));

        let step_km = geo_utils::haversine_distance(
            &TrackPoint::new(0.0, 0.0),
            &TrackPoint::new(0.0, 0.001),
        );

        // Both legs count toward distance, only the first toward moving time
        assert!((stats.total_distance_km - 2.0 * step_km).abs() < 1e-6);
        assert!((stats.moving_time_hours - 60.0 / 3600.0).abs() < 1e-9);

        let expected_speed = stats.total_distance_km / (60.0 / 3600.0);
        assert!((stats.avg_speed_kmh.unwrap() - expected_speed).abs() < 1e-9);
    }

    #[test]
    fn test_missing_timestamps_still_count_distance() {
        let points = vec![
            TrackPoint::with_time(0.0, 0.0, t0()),
            TrackPoint::new(0.0, 0.001), // no timestamp
            TrackPoint::with_time(0.0, 0.002, t0() + Duration::seconds(120)),
        ];

        let stats = TrackStats::from_track(&single_segment(points));
        assert!(stats.total_distance_km > 0.2);
        // Neither pair has both timestamps, so no moving time
        assert_eq!(stats.moving_time_hours, 0.0);
        assert!(stats.avg_speed_kmh.is_none());
        // But start/end timestamps come from the timestamped points
        assert_eq!(stats.start_time, Some(t0()));
        assert_eq!(stats.end_time, Some(t0() + Duration::seconds(120)));
    }

    #[test]
    fn test_walk_spans_segment_boundaries() {
        // The pair straddling the segment boundary still contributes
        let track = Track {
            name: None,
            description: None,
            segments: vec![
                TrackSegment {
                    points: vec![
                        TrackPoint::with_time(0.0, 0.0, t0()),
                        TrackPoint::with_time(0.0, 0.001, t0() + Duration::seconds(30)),
                    ],
                },
                TrackSegment {
                    points: vec![TrackPoint::with_time(
                        0.0,
                        0.002,
                        t0() + Duration::seconds(60),
                    )],
                },
            ],
        };

        let stats = TrackStats::from_track(&track);
        assert_eq!(stats.segment_count, 2);
        assert_eq!(stats.point_count, 3);
        assert!((stats.moving_time_hours - 60.0 / 3600.0).abs() < 1e-9);
        assert_eq!(stats.end_point.unwrap().longitude, 0.002);
    }

    #[test]
    fn test_backwards_timestamps_do_not_accumulate_time() {
        let points = vec![
            TrackPoint::with_time(0.0, 0.0, t0() + Duration::seconds(60)),
            TrackPoint::with_time(0.0, 0.001, t0()), // earlier than predecessor
        ];

        let stats = TrackStats::from_track(&single_segment(points));
        assert!(stats.total_distance_km > 0.0);
        assert_eq!(stats.moving_time_hours, 0.0);
        assert!(stats.moving_time_hours >= 0.0);
    }

    #[test]
    fn test_duration_and_breakdowns() {
        let points = vec![
            TrackPoint::with_time(0.0, 0.0, t0()),
            TrackPoint::with_time(0.0, 0.01, t0() + Duration::seconds(600)),
        ];

        let stats = TrackStats::from_track(&single_segment(points));
        assert!((stats.duration_hours().unwrap() - 600.0 / 3600.0).abs() < 1e-9);

        let d = stats.distance();
        assert!((d.miles - stats.total_distance_km * 0.621371).abs() < 1e-9);
        let s = stats.avg_speed().unwrap();
        assert!((s.kmh - stats.avg_speed_kmh.unwrap()).abs() < 1e-12);
    }
}
