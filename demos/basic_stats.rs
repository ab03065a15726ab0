//! Basic example of computing statistics for a GPS track.
//!
//! Run with: cargo run --example basic_stats

use chrono::{Duration, TimeZone, Utc};
use gpx_stats::{SummaryStats, Track, TrackPoint, TrackSegment, TrackStats};

fn main() {
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 8, 0, 0).unwrap();

    // A short ride: one fix per minute, ~1.1 km apart (London area)
    let ride = Track {
        name: Some("Morning ride".to_string()),
        description: None,
        segments: vec![TrackSegment {
            points: (0..10)
                .map(|i| {
                    TrackPoint::with_time(
                        51.5074 + i as f64 * 0.01,
                        -0.1278,
                        start + Duration::seconds(60 * i),
                    )
                })
                .collect(),
        }],
    };

    // A stationary recording: jitter within a few meters
    let lunch_break = Track {
        name: Some("Lunch break".to_string()),
        description: None,
        segments: vec![TrackSegment {
            points: (0..5)
                .map(|i| {
                    TrackPoint::with_time(
                        51.6074 + i as f64 * 0.00001,
                        -0.1278,
                        start + Duration::minutes(30 + i),
                    )
                })
                .collect(),
        }],
    };

    println!("Per-track statistics\n");

    let stats: Vec<TrackStats> = [&ride, &lunch_break]
        .iter()
        .map(|t| TrackStats::from_track(t))
        .collect();

    for (track, s) in [&ride, &lunch_break].iter().zip(&stats) {
        println!("{}:", track.name.as_deref().unwrap_or("?"));
        println!("   Distance: {:.2} km", s.total_distance_km);
        println!("   Moving time: {:.2} hours", s.moving_time_hours);
        match s.avg_speed_kmh {
            Some(speed) => println!("   Average speed: {speed:.1} km/h"),
            None => println!("   Average speed: undefined (no movement)"),
        }
        println!();
    }

    let summary = SummaryStats::from_track_stats(&stats);
    println!("Summary:");
    println!("   Tracks: {}", summary.total_tracks);
    println!("   Total distance: {:.2} km", summary.total_distance_km);
    if let Some(i) = summary.longest_track {
        println!(
            "   Longest: {:.2} km",
            stats[i].total_distance_km
        );
    }
    if let Some(speed) = summary.overall_avg_speed_kmh {
        println!("   Overall average speed: {speed:.1} km/h");
    }
}
