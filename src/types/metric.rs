//! Defines the `MetricType` enum, the set of weather variables that can be
//! requested from the weather endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named weather variable with an hourly series.
///
/// The variant name is what the endpoint expects in the request's `types`
/// list (e.g. `"Temperature"`); the endpoint answers with the lower-case
/// [`MetricType::response_key`] (e.g. `"temperature"`).
///
/// Variants are ordered the way they are offered to the user, and that
/// order is also the column order of exported CSV files.
///
/// # Examples
///
/// ```
/// use weatherdash::MetricType;
///
/// let metric: MetricType = "rainfall".parse().unwrap();
/// assert_eq!(metric, MetricType::Rainfall);
/// assert_eq!(metric.unit(), "mm");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricType {
    /// Air temperature two metres above ground, in degrees Celsius.
    Temperature,
    /// Total precipitation, in millimetres per hour.
    Rainfall,
    /// Snowfall, in centimetres.
    Snowfall,
    /// Dust surface mass concentration, in micrograms per cubic metre.
    Dust,
    /// Wind speed, in metres per second.
    Wind,
}

/// Returned when a string does not name any [`MetricType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown metric type '{0}' (expected one of: Temperature, Rainfall, Snowfall, Dust, Wind)")]
pub struct UnknownMetric(pub String);

impl MetricType {
    /// Every metric, in selector order.
    pub const ALL: [MetricType; 5] = [
        MetricType::Temperature,
        MetricType::Rainfall,
        MetricType::Snowfall,
        MetricType::Dust,
        MetricType::Wind,
    ];

    /// Name used in the request body's `types` list.
    pub fn request_name(&self) -> &'static str {
        match self {
            MetricType::Temperature => "Temperature",
            MetricType::Rainfall => "Rainfall",
            MetricType::Snowfall => "Snowfall",
            MetricType::Dust => "Dust",
            MetricType::Wind => "Wind",
        }
    }

    /// Key the endpoint uses for this metric in its response, also used as
    /// the CSV column header.
    pub fn response_key(&self) -> &'static str {
        match self {
            MetricType::Temperature => "temperature",
            MetricType::Rainfall => "rainfall",
            MetricType::Snowfall => "snowfall",
            MetricType::Dust => "dust",
            MetricType::Wind => "wind",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricType::Temperature => "°C",
            MetricType::Rainfall => "mm",
            MetricType::Snowfall => "cm",
            MetricType::Dust => "µg/m³",
            MetricType::Wind => "m/s",
        }
    }

    /// Line colour used when charting this metric, as `#rrggbb`.
    pub fn color_hex(&self) -> &'static str {
        match self {
            MetricType::Temperature => "#ff2222",
            MetricType::Rainfall => "#2196f3",
            MetricType::Snowfall => "#bfd9ee",
            MetricType::Dust => "#f39821",
            MetricType::Wind => "#4caf50",
        }
    }

    /// Line colour as an `(r, g, b)` triple.
    pub fn color_rgb(&self) -> (u8, u8, u8) {
        let hex = &self.color_hex()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }

    /// Maps a response key (e.g. `"wind"`) back to its metric.
    pub fn from_response_key(key: &str) -> Option<MetricType> {
        MetricType::ALL
            .into_iter()
            .find(|metric| metric.response_key() == key)
    }
}

impl FromStr for MetricType {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MetricType::from_response_key(&wanted).ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.request_name())
    }
}
