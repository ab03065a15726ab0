//! `gpx-stats` command-line tool.
//!
//! Parses a GPX file, computes per-track and aggregate statistics, and
//! writes a text summary (to stdout and a file), plus optional CSV and HTML
//! exports.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use gpx_stats::{SummaryStats, TrackReport, TrackStats};
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Parse GPX files and extract track statistics.
#[derive(Debug, Parser)]
#[command(name = "gpx-stats", version, about)]
struct Cli {
    /// GPX file to parse
    gpx_file: PathBuf,

    /// Maximum number of tracks to process
    #[arg(long, value_name = "N")]
    max_tracks: Option<usize>,

    /// Text summary output file
    #[arg(long, value_name = "FILE", default_value = "track_list.txt")]
    output: PathBuf,

    /// Export per-track data to a CSV file
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Export the analysis as an HTML page
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Resolve start/end place names via Nominatim
    #[arg(long)]
    geocode: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let tracks = gpx_stats::load_tracks(&cli.gpx_file, cli.max_tracks)
        .with_context(|| format!("could not load {}", cli.gpx_file.display()))?;

    let mut reports: Vec<TrackReport> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| TrackReport::new(i + 1, track, TrackStats::from_track(track)))
        .collect();

    if cli.geocode {
        geocode_reports(&mut reports);
    }

    let stats: Vec<TrackStats> = reports.iter().map(|r| r.stats.clone()).collect();
    let summary = SummaryStats::from_track_stats(&stats);

    let mut text = Vec::new();
    writeln!(
        text,
        "GPX Track Analysis - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(text, "Source file: {}", cli.gpx_file.display())?;
    gpx_stats::write_text_summary(&mut text, &reports, &summary)?;

    // The summary goes to the console and the output file simultaneously
    std::io::stdout().write_all(&text)?;
    std::fs::write(&cli.output, &text)
        .with_context(|| format!("could not write {}", cli.output.display()))?;
    info!("track summary written to {}", cli.output.display());

    if let Some(csv_path) = &cli.csv {
        let file = File::create(csv_path)
            .with_context(|| format!("could not create {}", csv_path.display()))?;
        gpx_stats::write_csv(file, &reports)?;
        info!("CSV data exported to {}", csv_path.display());
    }

    if let Some(html_path) = &cli.html {
        let mut file = File::create(html_path)
            .with_context(|| format!("could not create {}", html_path.display()))?;
        gpx_stats::write_html(&mut file, &reports, &summary)?;
        info!("HTML report exported to {}", html_path.display());
    }

    Ok(())
}

#[cfg(feature = "geocode")]
fn geocode_reports(reports: &mut [TrackReport]) {
    gpx_stats::resolve_track_places_sync(reports);
}

#[cfg(not(feature = "geocode"))]
fn geocode_reports(_reports: &mut [TrackReport]) {
    log::warn!("--geocode requested, but this build lacks the `geocode` feature");
}
