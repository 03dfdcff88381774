//! Great-circle distance on a spherical Earth
//!
//! Haversine formula in the atan2 form. `a` is clamped to [0, 1] so rounding
//! cannot produce NaN for identical or near-antipodal points.

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const METERS_PER_KM: f64 = 1000.0;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Distance between two points, in kilometers
///
/// a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)
/// c = 2 · atan2(√a, √(1−a))
/// d = R · c
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push a marginally outside [0, 1]
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance as (km, meters); meters is always exactly km × 1000
pub fn distance_km_and_meters(from: GeoPoint, to: GeoPoint) -> (f64, f64) {
    let km = haversine_km(from, to);
    (km, km * METERS_PER_KM)
}
