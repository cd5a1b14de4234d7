use crate::types::location::{InvalidCoordinate, LatLon, QueryKey};
use crate::types::metric::MetricType;
use crate::types::weather_data::WeatherData;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A saved query result, one per (lat, lon, date) triple.
///
/// `id` is assigned on first insert and survives later overwrites of the
/// same triple. `timestamp` is the capture time of the latest write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedQuery {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub date: NaiveDate,
    pub selected_types: Vec<MetricType>,
    pub data: WeatherData,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl CachedQuery {
    pub fn location(&self) -> LatLon {
        LatLon(self.lat, self.lon)
    }

    pub fn key(&self) -> Result<QueryKey, InvalidCoordinate> {
        QueryKey::new(self.location(), self.date)
    }

    /// One-line description used when listing saved queries.
    pub fn summary(&self) -> String {
        let types = self
            .selected_types
            .iter()
            .map(MetricType::request_name)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "#{} {} — {} [{}] {}",
            self.id,
            self.location(),
            self.date,
            types,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
