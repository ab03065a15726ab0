//! # Geographic Utilities
//!
//! Core geographic computation utilities for GPS track analysis.
//!
//! ## Overview
//!
//! | Item | Description |
//! |------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two track points, in km |
//! | [`DistanceBreakdown`] | A distance expressed in km, miles and nautical miles |
//! | [`SpeedBreakdown`] | A speed expressed in km/h, mph and knots |
//! | [`Bounds`] | Bounding box of a set of track points |
//!
//! ## Example
//!
//! ```rust
//! use gpx_stats::{TrackPoint, geo_utils};
//!
//! let london = TrackPoint::new(51.5074, -0.1278);
//! let paris = TrackPoint::new(48.8566, 2.3522);
//!
//! let km = geo_utils::haversine_distance(&london, &paris);
//! assert!((km - 343.5).abs() < 1.0); // ~344 km
//!
//! let breakdown = geo_utils::DistanceBreakdown::from_km(km);
//! println!("{:.1} km = {:.1} miles = {:.1} nm", breakdown.km, breakdown.miles, breakdown.nautical_miles);
//! ```
//!
//! ## Algorithm Notes
//!
//! Distances use the haversine formula on a spherical Earth with mean radius
//! 6371.0088 km (the `geo` crate's [`Haversine`] metric), the standard method
//! for GPS distance calculation, accurate to within 0.3% for most practical
//! applications. All inputs are WGS84 latitude/longitude in degrees.

use crate::TrackPoint;
use geo::{Distance, Haversine, Point};
use serde::Serialize;

/// Miles per kilometer.
pub const MILES_PER_KM: f64 = 0.621371;

/// Nautical miles per kilometer.
pub const NAUTICAL_MILES_PER_KM: f64 = 0.539957;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two track points using the
/// haversine formula.
///
/// Returns the distance in kilometers along the Earth's surface. Coincident
/// points yield 0. Valid coordinates are a precondition of the caller; the
/// function itself has no error conditions.
///
/// # Example
///
/// ```rust
/// use gpx_stats::{TrackPoint, geo_utils};
///
/// let p = TrackPoint::new(51.5074, -0.1278);
/// assert_eq!(geo_utils::haversine_distance(&p, &p), 0.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2) / 1000.0
}

// =============================================================================
// Unit Conversion
// =============================================================================

/// A distance expressed in kilometers, miles and nautical miles.
///
/// The kilometer value is canonical; the other units are derived with fixed
/// factors (miles = km × 0.621371, nautical miles = km × 0.539957).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceBreakdown {
    pub km: f64,
    pub miles: f64,
    pub nautical_miles: f64,
}

impl DistanceBreakdown {
    /// Expand a distance in kilometers into all supported units.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gpx_stats::geo_utils::DistanceBreakdown;
    ///
    /// let d = DistanceBreakdown::from_km(100.0);
    /// assert_eq!(d.km, 100.0);
    /// assert!((d.miles - 62.1371).abs() < 1e-9);
    /// assert!((d.nautical_miles - 53.9957).abs() < 1e-9);
    /// ```
    pub fn from_km(km: f64) -> Self {
        Self {
            km,
            miles: km * MILES_PER_KM,
            nautical_miles: km * NAUTICAL_MILES_PER_KM,
        }
    }
}

/// A speed expressed in km/h, mph and knots.
///
/// Uses the same fixed factors as [`DistanceBreakdown`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedBreakdown {
    pub kmh: f64,
    pub mph: f64,
    pub knots: f64,
}

impl SpeedBreakdown {
    /// Expand a speed in km/h into all supported units.
    pub fn from_kmh(kmh: f64) -> Self {
        Self {
            kmh,
            mph: kmh * MILES_PER_KM,
            knots: kmh * NAUTICAL_MILES_PER_KM,
        }
    }
}

// =============================================================================
// Bounding Box
// =============================================================================

/// Bounding box enclosing a set of track points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Bounds of a single point.
    pub fn of_point(p: &TrackPoint) -> Self {
        Self {
            min_lat: p.latitude,
            max_lat: p.latitude,
            min_lon: p.longitude,
            max_lon: p.longitude,
        }
    }

    /// Extend the bounds to include another point.
    pub fn extend(&mut self, p: &TrackPoint) {
        self.min_lat = self.min_lat.min(p.latitude);
        self.max_lat = self.max_lat.max(p.latitude);
        self.min_lon = self.min_lon.min(p.longitude);
        self.max_lon = self.max_lon.max(p.longitude);
    }

    /// Compute the bounding box of a sequence of points.
    ///
    /// Returns `None` for an empty sequence.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gpx_stats::{TrackPoint, geo_utils::Bounds};
    ///
    /// let track = vec![
    ///     TrackPoint::new(51.5000, -0.1300),
    ///     TrackPoint::new(51.5100, -0.1200),
    ///     TrackPoint::new(51.5050, -0.1250),
    /// ];
    ///
    /// let bounds = Bounds::from_points(track.iter()).unwrap();
    /// assert_eq!(bounds.min_lat, 51.5000);
    /// assert_eq!(bounds.max_lat, 51.5100);
    /// assert_eq!(bounds.min_lon, -0.1300);
    /// assert_eq!(bounds.max_lon, -0.1200);
    /// ```
    pub fn from_points<'a>(points: impl Iterator<Item = &'a TrackPoint>) -> Option<Self> {
        let mut bounds: Option<Bounds> = None;
        for p in points {
            match bounds.as_mut() {
                Some(b) => b.extend(p),
                None => bounds = Some(Bounds::of_point(p)),
            }
        }
        bounds
    }
}
