//! Coordinates and the cache key built from them.

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use weatherdash::LatLon;
///
/// let montreal = LatLon(45.5, -73.6);
/// assert_eq!(montreal.0, 45.5); // Latitude
/// assert_eq!(montreal.to_string(), "(45.50, -73.60)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

/// Formats the coordinate rounded to two decimals, as shown in listings and file names.
impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Coordinates must be finite numbers, got lat={lat}, lon={lon}")]
pub struct InvalidCoordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Identifies a unique query: the (latitude, longitude, date) triple.
///
/// Coordinates compare exactly, without rounding. `0.0` and `-0.0` are the
/// same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    lat: OrderedFloat<f64>,
    lon: OrderedFloat<f64>,
    date: NaiveDate,
}

impl QueryKey {
    /// Builds a key, rejecting NaN and infinite coordinates.
    pub fn new(location: LatLon, date: NaiveDate) -> Result<Self, InvalidCoordinate> {
        let LatLon(lat, lon) = location;
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinate { lat, lon });
        }
        Ok(Self {
            // Fold -0.0 into 0.0 so the derived Ord agrees with Eq.
            lat: OrderedFloat(lat + 0.0),
            lon: OrderedFloat(lon + 0.0),
            date,
        })
    }

    pub fn location(&self) -> LatLon {
        LatLon(self.lat.into_inner(), self.lon.into_inner())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.location(), self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_keys_compare_exactly() {
        let a = QueryKey::new(LatLon(45.5, -73.6), date()).unwrap();
        let b = QueryKey::new(LatLon(45.5, -73.6), date()).unwrap();
        let c = QueryKey::new(LatLon(45.500001, -73.6), date()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_negative_zero_is_same_key() {
        let mut keys = HashSet::new();
        keys.insert(QueryKey::new(LatLon(0.0, 10.0), date()).unwrap());
        keys.insert(QueryKey::new(LatLon(-0.0, 10.0), date()).unwrap());
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_date_is_part_of_key() {
        let other_day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let a = QueryKey::new(LatLon(1.0, 2.0), date()).unwrap();
        let b = QueryKey::new(LatLon(1.0, 2.0), other_day).unwrap();
        assert_ne!(a, b);
        assert_eq!(b.date(), other_day);
        assert_eq!(b.location(), LatLon(1.0, 2.0));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        assert!(QueryKey::new(LatLon(f64::NAN, 0.0), date()).is_err());
        assert!(QueryKey::new(LatLon(0.0, f64::INFINITY), date()).is_err());
    }

    #[test]
    fn test_display() {
        let key = QueryKey::new(LatLon(45.5, -73.6), date()).unwrap();
        assert_eq!(key.to_string(), "(45.50, -73.60) on 2025-01-01");
    }
}
