//! Render a full text report for a GPX file.
//!
//! Run with: cargo run --example file_report -- path/to/file.gpx

use gpx_stats::{SummaryStats, TrackReport, TrackStats};
use std::path::Path;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("usage: file_report <file.gpx>");
        std::process::exit(2);
    });

    let tracks = match gpx_stats::load_tracks(Path::new(&path), None) {
        Ok(tracks) => tracks,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let reports: Vec<TrackReport> = tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackReport::new(i + 1, t, TrackStats::from_track(t)))
        .collect();

    let stats: Vec<TrackStats> = reports.iter().map(|r| r.stats.clone()).collect();
    let summary = SummaryStats::from_track_stats(&stats);

    let mut stdout = std::io::stdout();
    gpx_stats::write_text_summary(&mut stdout, &reports, &summary).unwrap();
}
