//! Geographic coordinates

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Base location given to new worker applicants until they pick one (Seongju-gun).
    pub const WORKER_DEFAULT: Coordinates = Coordinates {
        lat: 35.919069,
        lng: 128.283038,
    };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `(0, 0)` is what an untouched location picker reports.
    pub fn is_unset(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_and_range_checks() {
        assert!(Coordinates::new(0.0, 0.0).is_unset());
        assert!(!Coordinates::WORKER_DEFAULT.is_unset());
        assert!(Coordinates::WORKER_DEFAULT.is_valid());
        assert!(!Coordinates::new(91.0, 10.0).is_valid());
        assert!(!Coordinates::new(10.0, f64::NAN).is_valid());
    }
}
