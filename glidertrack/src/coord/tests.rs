//! Tests for distance computation

use super::*;

#[test]
fn test_same_point_is_zero() {
    for (lat, lon) in [(0.0, 0.0), (46.5, 6.6), (-33.9, 151.2), (89.9, -179.9)] {
        assert_eq!(distance_km(lat, lon, lat, lon), 0.0);
    }
}

#[test]
fn test_quarter_great_circle() {
    // 0°N 0°E to 0°N 90°E is a quarter of the equator
    let d = distance_km(0.0, 0.0, 0.0, 90.0);
    assert!((d - 10007.543).abs() < 0.01, "got {d}");
}

#[test]
fn test_symmetry() {
    let ab = distance_km(46.5, 6.6, 46.0, 6.0);
    let ba = distance_km(46.0, 6.0, 46.5, 6.6);
    assert_eq!(ab, ba);
}

#[test]
fn test_known_distance_lake_geneva() {
    // 46.5,6.6 → 46.0,6.0 is roughly 72.2 km
    let d = distance_km(46.5, 6.6, 46.0, 6.0);
    assert!((d - 72.246).abs() < 0.01, "got {d}");
}

#[test]
fn test_nan_propagates() {
    assert!(distance_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
}

#[test]
fn test_coordinates_distance_matches_free_function() {
    let a = Coordinates::new(46.5, 6.6);
    let b = Coordinates::new(46.0, 6.0);
    assert_eq!(a.distance_km(&b), distance_km(46.5, 6.6, 46.0, 6.0));
}

#[test]
fn test_coordinates_display() {
    let c = Coordinates::new(46.5, -6.25);
    assert_eq!(c.to_string(), "46.50000, -6.25000");
}
