//! Geographic helpers
//!
//! Provides the coordinate pair type shared by beacons and the landing
//! reference, and great-circle distance on a spherical Earth.

mod types;

pub use types::{Coordinates, EARTH_RADIUS_KM};

/// Great-circle distance between two points in kilometers (haversine).
///
/// Inputs are decimal degrees. NaN or infinite inputs propagate through the
/// arithmetic unchanged.
///
/// # Example
///
/// ```
/// use glidertrack::coord::distance_km;
///
/// let d = distance_km(0.0, 0.0, 0.0, 90.0);
/// assert!((d - 10007.5).abs() < 0.1);
/// ```
#[inline]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests;
