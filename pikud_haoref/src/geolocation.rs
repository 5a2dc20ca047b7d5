use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const ZERO: Coordinates = Coordinates { lat: 0.0, lng: 0.0 };

    /// Zero on either axis means the location was never resolved.
    pub fn is_resolved(&self) -> bool {
        self.lat != 0.0 && self.lng != 0.0
    }
}

/// Great-circle distance in kilometers.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn is_within_radius(center: Coordinates, radius_km: f64, location: Coordinates) -> bool {
    distance_km(center, location) <= radius_km
}
