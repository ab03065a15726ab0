//! Reverse geocoding against the Nominatim API.
//!
//! This module resolves track start/end coordinates to human-readable place
//! names for display. It is deliberately kept outside the statistics core:
//! place names never feed back into any computation.
//!
//! - Dispatch rate limiting (Nominatim usage policy allows 1 request/second)
//! - Automatic retry with exponential backoff on 429 and transport errors
//! - A quantized-coordinate cache so nearby points reuse results
//! - Lookup failures degrade to a formatted coordinate pair, never an error

use crate::geo_utils::haversine_distance;
use crate::report::TrackReport;
use crate::GpxStatsError;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const USER_AGENT: &str = concat!("gpx-stats/", env!("CARGO_PKG_VERSION"));

// Nominatim usage policy: at most 1 request per second
const DISPATCH_INTERVAL_MS: u64 = 1000;
const MAX_RETRIES: u32 = 3;

/// Cache cell edge in degrees (~1.1 km at the equator). Coordinates in the
/// same cell share one geocoding result.
const CACHE_CELL_DEG: f64 = 0.01;

/// End locations within this distance of the start reuse the start's place
/// name without a second lookup.
const REUSE_RADIUS_KM: f64 = 0.5;

/// Spaces out request starts so we never exceed the Nominatim rate limit.
struct DispatchRateLimiter {
    next_dispatch: Mutex<Instant>,
}

impl DispatchRateLimiter {
    fn new() -> Self {
        Self {
            next_dispatch: Mutex::new(Instant::now()),
        }
    }

    /// Wait for our dispatch slot. Each caller gets a unique slot spaced
    /// `DISPATCH_INTERVAL_MS` apart.
    async fn wait_for_dispatch_slot(&self) {
        let wait_duration = {
            let mut next = self.next_dispatch.lock().await;
            let now = Instant::now();
            let dispatch_at = if *next > now { *next } else { now };
            *next = dispatch_at + Duration::from_millis(DISPATCH_INTERVAL_MS);
            dispatch_at.saturating_duration_since(now)
        };

        // Wait outside the lock
        if wait_duration > Duration::from_millis(5) {
            debug!("waiting {wait_duration:?} for geocode dispatch slot");
            tokio::time::sleep(wait_duration).await;
        }
    }
}

/// Relevant fields of a Nominatim reverse-geocoding response.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    state: Option<String>,
    province: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

impl Address {
    /// Build a friendly place name: locality, then state (abbreviated for
    /// the US), then country (omitted for the US).
    fn place_name(&self) -> Option<String> {
        let locality = self
            .city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.village.as_deref())
            .or(self.hamlet.as_deref())
            .or(self.suburb.as_deref())
            .or(self.neighbourhood.as_deref());

        let state = self
            .state
            .as_deref()
            .or(self.province.as_deref())
            .or(self.region.as_deref());

        let is_us = self.country.as_deref() == Some("United States");

        let mut parts: Vec<&str> = Vec::new();
        if let Some(locality) = locality {
            parts.push(locality);
        }
        if let Some(state) = state {
            if is_us {
                parts.push(us_state_abbreviation(state));
            } else {
                parts.push(state);
            }
        }
        if let Some(country) = self.country.as_deref() {
            if !is_us {
                parts.push(country);
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

fn us_state_abbreviation(state: &str) -> &str {
    const STATES: [(&str, &str); 50] = [
        ("Alabama", "AL"),
        ("Alaska", "AK"),
        ("Arizona", "AZ"),
        ("Arkansas", "AR"),
        ("California", "CA"),
        ("Colorado", "CO"),
        ("Connecticut", "CT"),
        ("Delaware", "DE"),
        ("Florida", "FL"),
        ("Georgia", "GA"),
        ("Hawaii", "HI"),
        ("Idaho", "ID"),
        ("Illinois", "IL"),
        ("Indiana", "IN"),
        ("Iowa", "IA"),
        ("Kansas", "KS"),
        ("Kentucky", "KY"),
        ("Louisiana", "LA"),
        ("Maine", "ME"),
        ("Maryland", "MD"),
        ("Massachusetts", "MA"),
        ("Michigan", "MI"),
        ("Minnesota", "MN"),
        ("Mississippi", "MS"),
        ("Missouri", "MO"),
        ("Montana", "MT"),
        ("Nebraska", "NE"),
        ("Nevada", "NV"),
        ("New Hampshire", "NH"),
        ("New Jersey", "NJ"),
        ("New Mexico", "NM"),
        ("New York", "NY"),
        ("North Carolina", "NC"),
        ("North Dakota", "ND"),
        ("Ohio", "OH"),
        ("Oklahoma", "OK"),
        ("Oregon", "OR"),
        ("Pennsylvania", "PA"),
        ("Rhode Island", "RI"),
        ("South Carolina", "SC"),
        ("South Dakota", "SD"),
        ("Tennessee", "TN"),
        ("Texas", "TX"),
        ("Utah", "UT"),
        ("Vermont", "VT"),
        ("Virginia", "VA"),
        ("Washington", "WA"),
        ("West Virginia", "WV"),
        ("Wisconsin", "WI"),
        ("Wyoming", "WY"),
    ];

    STATES
        .iter()
        .find(|(name, _)| *name == state)
        .map(|(_, abbrev)| *abbrev)
        .unwrap_or(state)
}

/// Fallback when geocoding fails or yields no usable address.
fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("({lat:.4}, {lon:.4})")
}

fn cache_key(lat: f64, lon: f64) -> (i64, i64) {
    (
        (lat / CACHE_CELL_DEG).round() as i64,
        (lon / CACHE_CELL_DEG).round() as i64,
    )
}

/// Rate-limited, caching reverse geocoder.
pub struct PlaceResolver {
    client: Client,
    rate_limiter: DispatchRateLimiter,
    cache: HashMap<(i64, i64), String>,
}

impl PlaceResolver {
    /// Create a resolver with a pooled HTTP client.
    pub fn new() -> Result<Self, GpxStatsError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: DispatchRateLimiter::new(),
            cache: HashMap::new(),
        })
    }

    /// Resolve a coordinate to a place name.
    ///
    /// Consults the quantized-coordinate cache first; on any failure after
    /// retries, returns the formatted coordinates instead.
    pub async fn resolve(&mut self, lat: f64, lon: f64) -> String {
        let key = cache_key(lat, lon);
        if let Some(place) = self.cache.get(&key) {
            debug!("geocode cache hit for ({lat:.4}, {lon:.4})");
            return place.clone();
        }

        let place = self
            .fetch_place(lat, lon)
            .await
            .unwrap_or_else(|| coordinate_label(lat, lon));

        self.cache.insert(key, place.clone());
        place
    }

    /// Attach place names to every report's start/end points.
    ///
    /// When a track's end lies within [`REUSE_RADIUS_KM`] of its start, the
    /// start's place name is reused without a second lookup.
    pub async fn resolve_track_places(&mut self, reports: &mut [TrackReport]) {
        let total = reports.len();
        info!("resolving place names for {total} tracks");

        for (done, report) in reports.iter_mut().enumerate() {
            let (start, end) = match (report.stats.start_point, report.stats.end_point) {
                (Some(start), Some(end)) => (start, end),
                _ => continue, // empty track, nothing to resolve
            };

            let start_place = self.resolve(start.latitude, start.longitude).await;

            let end_place = if haversine_distance(&start, &end) <= REUSE_RADIUS_KM {
                start_place.clone()
            } else {
                self.resolve(end.latitude, end.longitude).await
            };

            report.start_place = Some(start_place);
            report.end_place = Some(end_place);
            debug!("geocoded track {}/{total}", done + 1);
        }
    }

    async fn fetch_place(&self, lat: f64, lon: f64) -> Option<String> {
        let mut retries = 0;

        loop {
            self.rate_limiter.wait_for_dispatch_slot().await;

            let response = self
                .client
                .get(NOMINATIM_URL)
                .query(&[
                    ("format", "jsonv2"),
                    ("lat", &lat.to_string()),
                    ("lon", &lon.to_string()),
                ])
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        retries += 1;
                        if retries > MAX_RETRIES {
                            warn!("geocoding ({lat:.4}, {lon:.4}): max retries exceeded (429)");
                            return None;
                        }
                        let wait = Duration::from_millis(500 * (1 << retries.min(3)));
                        warn!("geocoding 429, retry {retries} after {wait:?}");
                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    if !status.is_success() {
                        warn!("geocoding ({lat:.4}, {lon:.4}): HTTP {status}");
                        return None;
                    }

                    let bytes = match resp.bytes().await {
                        Ok(b) => b,
                        Err(e) => {
                            warn!("geocoding body download error: {e}");
                            return None;
                        }
                    };

                    let data: ReverseResponse = match serde_json::from_slice(&bytes) {
                        Ok(d) => d,
                        Err(e) => {
                            warn!("geocoding JSON parse error: {e}");
                            return None;
                        }
                    };

                    return data.address.and_then(|a| a.place_name());
                }
                Err(e) => {
                    retries += 1;
                    if retries > MAX_RETRIES {
                        warn!("geocoding ({lat:.4}, {lon:.4}) failed after {MAX_RETRIES} retries: {e}");
                        return None;
                    }
                    let wait = Duration::from_millis(200 * (1 << retries));
                    warn!("geocoding error: {e}, retry {retries} after {wait:?}");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

/// Synchronous wrapper for callers without an async runtime. Runs
/// [`PlaceResolver::resolve_track_places`] on a fresh single-threaded tokio
/// runtime; on any setup failure the reports are left without place names.
pub fn resolve_track_places_sync(reports: &mut [TrackReport]) {
    use tokio::runtime::Builder;

    let rt = match Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            warn!("failed to create tokio runtime for geocoding: {e}");
            return;
        }
    };

    let mut resolver = match PlaceResolver::new() {
        Ok(r) => r,
        Err(e) => {
            warn!("failed to create geocoding client: {e}");
            return;
        }
    };

    rt.block_on(resolver.resolve_track_places(reports));
}
