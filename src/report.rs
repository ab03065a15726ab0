//! Report rendering: text summary, CSV export and HTML export.
//!
//! All renderers consume [`TrackReport`] records, which pair a track's
//! metadata and [`TrackStats`] with optional geocoded place names. Place
//! names are display-only and never feed back into the statistics. The text
//! layout and the CSV column set follow the classic `track_list.txt` /
//! `tracks.csv` output of GPX analyzers.

use crate::stats::TrackStats;
use crate::summary::SummaryStats;
use crate::{GpxStatsError, Track};
use chrono::{DateTime, Utc};
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;

/// Everything the renderers need to know about one track.
#[derive(Debug, Clone)]
pub struct TrackReport {
    /// 1-based position of the track in the file.
    pub index: usize,
    pub name: String,
    pub description: Option<String>,
    pub stats: TrackStats,
    /// Geocoded place name of the start location, display only.
    pub start_place: Option<String>,
    /// Geocoded place name of the end location, display only.
    pub end_place: Option<String>,
}

impl TrackReport {
    /// Build a report record from a track and its computed statistics.
    /// Unnamed tracks get a positional fallback name.
    pub fn new(index: usize, track: &Track, stats: TrackStats) -> Self {
        Self {
            index,
            name: track
                .name
                .clone()
                .unwrap_or_else(|| format!("Unnamed Track {index}")),
            description: track.description.clone(),
            stats,
            start_place: None,
            end_place: None,
        }
    }

    /// Friendly route name: `"Start - End"`, collapsed to a single place
    /// when both ends resolve to the same name. Absent without geocoding.
    pub fn route_name(&self) -> Option<String> {
        match (&self.start_place, &self.end_place) {
            (Some(start), Some(end)) if start == end => Some(start.clone()),
            (Some(start), Some(end)) => Some(format!("{start} - {end}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

fn fmt_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============================================================================
// Text Summary
// ============================================================================

/// Write the human-readable track summary.
///
/// Per-track blocks come first; a `SUMMARY STATISTICS` section follows when
/// the file holds more than one track.
pub fn write_text_summary<W: Write>(
    w: &mut W,
    reports: &[TrackReport],
    summary: &SummaryStats,
) -> io::Result<()> {
    if reports.is_empty() {
        writeln!(w, "No tracks found in the GPX file.")?;
        return Ok(());
    }

    let rule = "=".repeat(RULE_WIDTH);

    writeln!(w)?;
    writeln!(w, "{rule}")?;
    writeln!(w, "GPX FILE SUMMARY")?;
    writeln!(w, "{rule}")?;
    writeln!(w, "Total number of tracks: {}", summary.total_tracks)?;
    writeln!(w, "{rule}")?;

    for report in reports {
        write_track_block(w, report)?;
    }

    if reports.len() > 1 {
        write_summary_block(w, reports, summary)?;
    }

    writeln!(w)
}

fn write_track_block<W: Write>(w: &mut W, report: &TrackReport) -> io::Result<()> {
    let stats = &report.stats;

    writeln!(w)?;
    writeln!(w, "Track #{}", report.index)?;
    writeln!(w, "  Name: {}", report.name)?;
    if let Some(route) = report.route_name() {
        writeln!(w, "  Route: {route}")?;
    }
    if let Some(desc) = &report.description {
        if !desc.is_empty() {
            writeln!(w, "  Description: {desc}")?;
        }
    }
    writeln!(w, "  Segments: {}", stats.segment_count)?;
    writeln!(w, "  Total Points: {}", stats.point_count)?;

    if let (Some(start), Some(end)) = (stats.start_time, stats.end_time) {
        writeln!(w, "  Time Range: {} to {}", fmt_time(&start), fmt_time(&end))?;
        if let Some(hours) = stats.duration_hours() {
            writeln!(w, "  Duration: {hours:.2} hours")?;
        }
    }

    if stats.total_distance_km > 0.0 {
        let d = stats.distance();
        writeln!(
            w,
            "  Distance: {:.2} km ({:.2} miles, {:.2} nm)",
            d.km, d.miles, d.nautical_miles
        )?;
        writeln!(w, "  Moving Time: {:.2} hours", stats.moving_time_hours)?;
        if let Some(s) = stats.avg_speed() {
            writeln!(
                w,
                "  Average Speed: {:.2} km/h ({:.2} mph, {:.2} knots)",
                s.kmh, s.mph, s.knots
            )?;
        }
    }

    if let Some(place) = &report.start_place {
        writeln!(w, "  Start: {place}")?;
    }
    match (&report.start_place, &report.end_place) {
        (start, Some(end)) if start.as_ref() != Some(end) => {
            writeln!(w, "  End: {end}")?;
        }
        _ => {}
    }

    if let Some(b) = &stats.bounds {
        writeln!(
            w,
            "  Bounds: ({:.6}, {:.6}) to ({:.6}, {:.6})",
            b.min_lat, b.min_lon, b.max_lat, b.max_lon
        )?;
    }

    writeln!(w, "  {}", "-".repeat(70))
}

fn write_summary_block<W: Write>(
    w: &mut W,
    reports: &[TrackReport],
    summary: &SummaryStats,
) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(w)?;
    writeln!(w, "{rule}")?;
    writeln!(w, "SUMMARY STATISTICS")?;
    writeln!(w, "{rule}")?;

    writeln!(w, "Total Tracks: {}", summary.total_tracks)?;
    writeln!(w, "Total Segments: {}", summary.total_segments)?;
    writeln!(w, "Total Points: {}", summary.total_points)?;

    if let (Some(start), Some(end)) = (summary.earliest_start, summary.latest_end) {
        writeln!(w, "Time Span: {} to {}", fmt_time(&start), fmt_time(&end))?;
        if let Some(elapsed) = summary.total_elapsed_hours() {
            writeln!(w, "Total Elapsed Time: {elapsed:.2} hours")?;
        }
        writeln!(w, "Tracks with Timestamps: {}", summary.tracks_with_time)?;
    }

    if summary.total_distance_km > 0.0 {
        let d = summary.distance();
        writeln!(
            w,
            "Total Distance: {:.2} km ({:.2} miles, {:.2} nm)",
            d.km, d.miles, d.nautical_miles
        )?;
        writeln!(
            w,
            "Total Moving Time: {:.2} hours",
            summary.total_moving_time_hours
        )?;
        if let Some(s) = summary.overall_avg_speed() {
            writeln!(
                w,
                "Overall Average Speed: {:.2} km/h ({:.2} mph, {:.2} knots)",
                s.kmh, s.mph, s.knots
            )?;
        }
    }

    if let Some(i) = summary.longest_track {
        writeln!(
            w,
            "Longest Track: {:.2} km ({})",
            reports[i].stats.total_distance_km, reports[i].name
        )?;
    }
    if let Some(i) = summary.shortest_track {
        writeln!(
            w,
            "Shortest Track: {:.2} km ({})",
            reports[i].stats.total_distance_km, reports[i].name
        )?;
    }
    if let Some(km) = summary.mean_track_distance_km {
        writeln!(w, "Average Track Length: {km:.2} km")?;
    }
    if let Some(i) = summary.fastest_track {
        if let Some(speed) = reports[i].stats.avg_speed_kmh {
            writeln!(
                w,
                "Fastest Average Speed: {:.2} km/h ({})",
                speed, reports[i].name
            )?;
        }
    }
    if let Some(i) = summary.slowest_track {
        if let Some(speed) = reports[i].stats.avg_speed_kmh {
            writeln!(
                w,
                "Slowest Average Speed: {:.2} km/h ({})",
                speed, reports[i].name
            )?;
        }
    }

    writeln!(w, "{rule}")
}

// ============================================================================
// CSV Export
// ============================================================================

const CSV_HEADERS: [&str; 21] = [
    "Track_Number",
    "Track_Name",
    "Route_Description",
    "Start_Location",
    "End_Location",
    "Segments",
    "Total_Points",
    "Start_Time",
    "End_Time",
    "Duration_Hours",
    "Distance_KM",
    "Distance_Miles",
    "Distance_Nautical_Miles",
    "Moving_Time_Hours",
    "Average_Speed_KMH",
    "Average_Speed_MPH",
    "Average_Speed_Knots",
    "Min_Latitude",
    "Max_Latitude",
    "Min_Longitude",
    "Max_Longitude",
];

/// Export per-track data as CSV.
///
/// One row per track; undefined values (missing timestamps, absent average
/// speed, empty bounds) render as empty fields.
pub fn write_csv<W: Write>(w: W, reports: &[TrackReport]) -> Result<(), GpxStatsError> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(CSV_HEADERS)?;

    for report in reports {
        let stats = &report.stats;
        let d = stats.distance();
        let speed = stats.avg_speed();

        let end_location = match (&report.start_place, &report.end_place) {
            (start, Some(end)) if start.as_ref() != Some(end) => end.clone(),
            _ => String::new(),
        };

        writer.write_record([
            report.index.to_string(),
            report.name.clone(),
            report.route_name().unwrap_or_default(),
            report.start_place.clone().unwrap_or_default(),
            end_location,
            stats.segment_count.to_string(),
            stats.point_count.to_string(),
            stats.start_time.map(|t| fmt_time(&t)).unwrap_or_default(),
            stats.end_time.map(|t| fmt_time(&t)).unwrap_or_default(),
            stats
                .duration_hours()
                .map(|h| format!("{h:.2}"))
                .unwrap_or_default(),
            format!("{:.2}", d.km),
            format!("{:.2}", d.miles),
            format!("{:.2}", d.nautical_miles),
            format!("{:.2}", stats.moving_time_hours),
            speed.map(|s| format!("{:.2}", s.kmh)).unwrap_or_default(),
            speed.map(|s| format!("{:.2}", s.mph)).unwrap_or_default(),
            speed.map(|s| format!("{:.2}", s.knots)).unwrap_or_default(),
            stats
                .bounds
                .map(|b| format!("{:.6}", b.min_lat))
                .unwrap_or_default(),
            stats
                .bounds
                .map(|b| format!("{:.6}", b.max_lat))
                .unwrap_or_default(),
            stats
                .bounds
                .map(|b| format!("{:.6}", b.min_lon))
                .unwrap_or_default(),
            stats
                .bounds
                .map(|b| format!("{:.6}", b.max_lon))
                .unwrap_or_default(),
        ])?;
    }

    writer.flush().map_err(|e| GpxStatsError::Csv(e.into()))?;
    Ok(())
}

// ============================================================================
// HTML Export
// ============================================================================

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Export the analysis as a standalone HTML page with a summary section and
/// one table row per track.
pub fn write_html<W: Write>(
    w: &mut W,
    reports: &[TrackReport],
    summary: &SummaryStats,
) -> io::Result<()> {
    writeln!(w, "<!DOCTYPE html>")?;
    writeln!(w, "<html lang=\"en\">")?;
    writeln!(w, "<head>")?;
    writeln!(w, "<meta charset=\"utf-8\">")?;
    writeln!(w, "<title>GPX Track Analysis</title>")?;
    writeln!(
        w,
        "<style>body{{font-family:sans-serif;margin:2em}}table{{border-collapse:collapse}}\
         th,td{{border:1px solid #999;padding:0.3em 0.6em;text-align:right}}\
         th{{background:#eee}}td.name{{text-align:left}}</style>"
    )?;
    writeln!(w, "</head>")?;
    writeln!(w, "<body>")?;
    writeln!(w, "<h1>GPX Track Analysis</h1>")?;

    writeln!(w, "<h2>Summary</h2>")?;
    writeln!(w, "<ul>")?;
    writeln!(w, "<li>Total tracks: {}</li>", summary.total_tracks)?;
    writeln!(w, "<li>Total points: {}</li>", summary.total_points)?;
    writeln!(
        w,
        "<li>Total distance: {:.2} km</li>",
        summary.total_distance_km
    )?;
    writeln!(
        w,
        "<li>Total moving time: {:.2} hours</li>",
        summary.total_moving_time_hours
    )?;
    if let Some(speed) = summary.overall_avg_speed_kmh {
        writeln!(w, "<li>Overall average speed: {speed:.2} km/h</li>")?;
    }
    if let (Some(start), Some(end)) = (summary.earliest_start, summary.latest_end) {
        writeln!(
            w,
            "<li>Time span: {} to {}</li>",
            fmt_time(&start),
            fmt_time(&end)
        )?;
    }
    writeln!(w, "</ul>")?;

    writeln!(w, "<h2>Tracks</h2>")?;
    writeln!(w, "<table>")?;
    writeln!(
        w,
        "<tr><th>#</th><th>Name</th><th>Route</th><th>Points</th>\
         <th>Distance (km)</th><th>Moving time (h)</th><th>Avg speed (km/h)</th></tr>"
    )?;

    for report in reports {
        let stats = &report.stats;
        writeln!(
            w,
            "<tr><td>{}</td><td class=\"name\">{}</td><td class=\"name\">{}</td>\
             <td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>",
            report.index,
            escape_html(&report.name),
            escape_html(&report.route_name().unwrap_or_default()),
            stats.point_count,
            stats.total_distance_km,
            stats.moving_time_hours,
            stats
                .avg_speed_kmh
                .map(|s| format!("{s:.2}"))
                .unwrap_or_else(|| "-".to_string()),
        )?;
    }

    writeln!(w, "</table>")?;
    writeln!(w, "</body>")?;
    writeln!(w, "</html>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TrackPoint, TrackSegment};
    use chrono::{Duration, TimeZone};

    fn sample_reports() -> Vec<TrackReport> {
        let t0 = Utc.with_ymd_and_hms(2023, 6, 1, 8, 0, 0).unwrap();

        let make = |name: &str, legs: usize, start: DateTime<Utc>| {
            let points: Vec<TrackPoint> = (0..=legs)
                .map(|i| {
                    TrackPoint::with_time(
                        0.0,
                        i as f64 * 0.01,
                        start + Duration::seconds(60 * i as i64),
                    )
                })
                .collect();
            Track {
                name: Some(name.to_string()),
                description: None,
                segments: vec![TrackSegment { points }],
            }
        };

        let tracks = [make("Short", 2, t0), make("Long", 6, t0 + Duration::hours(5))];
        tracks
            .iter()
            .enumerate()
            .map(|(i, t)| TrackReport::new(i + 1, t, TrackStats::from_track(t)))
            .collect()
    }

    fn render_text(reports: &[TrackReport]) -> String {
        let stats: Vec<TrackStats> = reports.iter().map(|r| r.stats.clone()).collect();
        let summary = SummaryStats::from_track_stats(&stats);
        let mut buf = Vec::new();
        write_text_summary(&mut buf, reports, &summary).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_summary_layout() {
        let reports = sample_reports();
        let text = render_text(&reports);

        assert!(text.contains("GPX FILE SUMMARY"));
        assert!(text.contains("Total number of tracks: 2"));
        assert!(text.contains("Track #1"));
        assert!(text.contains("  Name: Short"));
        assert!(text.contains("SUMMARY STATISTICS"));
        assert!(text.contains("Longest Track:"));
        assert!(text.contains("(Long)"));
        assert!(text.contains("Tracks with Timestamps: 2"));
    }

    #[test]
    fn test_text_summary_empty() {
        let summary = SummaryStats::from_track_stats(&[]);
        let mut buf = Vec::new();
        write_text_summary(&mut buf, &[], &summary).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("No tracks found"));
    }

    #[test]
    fn test_single_track_has_no_summary_block() {
        let reports = sample_reports();
        let text = render_text(&reports[..1]);
        assert!(text.contains("Track #1"));
        assert!(!text.contains("SUMMARY STATISTICS"));
    }

    #[test]
    fn test_route_name_collapses_identical_places() {
        let mut report = sample_reports().remove(0);
        report.start_place = Some("London, UK".to_string());
        report.end_place = Some("London, UK".to_string());
        assert_eq!(report.route_name().as_deref(), Some("London, UK"));

        report.end_place = Some("Brighton, UK".to_string());
        assert_eq!(
            report.route_name().as_deref(),
            Some("London, UK - Brighton, UK")
        );
    }

    #[test]
    fn test_csv_roundtrip() {
        let reports = sample_reports();
        let mut buf = Vec::new();
        write_csv(&mut buf, &reports).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), CSV_HEADERS.len());
        assert_eq!(&headers[0], "Track_Number");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Short");
        assert_eq!(&rows[1][1], "Long");
        // Average speed column is populated for timed tracks
        assert!(!rows[0][14].is_empty());
    }

    #[test]
    fn test_html_escapes_names() {
        let mut reports = sample_reports();
        reports[0].name = "A <b>bold</b> & dangerous name".to_string();

        let stats: Vec<TrackStats> = reports.iter().map(|r| r.stats.clone()).collect();
        let summary = SummaryStats::from_track_stats(&stats);

        let mut buf = Vec::new();
        write_html(&mut buf, &reports, &summary).unwrap();
        let html = String::from_utf8(buf).unwrap();

        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; dangerous"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("<table>"));
    }
}
