//! Hourly series and the per-metric bundle returned by the weather endpoint.

use crate::types::metric::MetricType;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of hourly readings in a full day.
pub const HOURS_PER_DAY: usize = 24;

/// An ordered sequence of readings, one per hour of the selected date.
///
/// The series is kept exactly as the endpoint sent it. A full day has
/// [`HOURS_PER_DAY`] values, but shorter or longer series are not rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlySeries(Vec<f64>);

impl HourlySeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Reading for `hour` (0-based), if the series is long enough.
    pub fn value_at(&self, hour: usize) -> Option<f64> {
        self.0.get(hour).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of the series rounded to `decimals` places, for display.
    pub fn rounded(&self, decimals: u32) -> Vec<f64> {
        let factor = 10f64.powi(decimals as i32);
        // `+ 0.0` turns -0.0 into 0.0.
        self.0
            .iter()
            .map(|v| (v * factor).round() / factor + 0.0)
            .collect()
    }
}

impl From<Vec<f64>> for HourlySeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Hourly series per metric, as answered by the weather endpoint.
///
/// Iteration follows [`MetricType`] order, independent of the order the
/// endpoint listed its keys in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    series: BTreeMap<MetricType, HourlySeries>,
}

impl WeatherData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds weather data from the endpoint's raw response map, keyed by
    /// lower-case response keys. Keys that name no known metric are skipped.
    pub fn from_response_map(raw: HashMap<String, Vec<f64>>) -> Self {
        let mut data = WeatherData::new();
        for (key, values) in raw {
            match MetricType::from_response_key(&key) {
                Some(metric) => data.insert(metric, HourlySeries::new(values)),
                None => warn!("Ignoring unknown metric '{}' in weather response", key),
            }
        }
        data
    }

    pub fn insert(&mut self, metric: MetricType, series: HourlySeries) {
        self.series.insert(metric, series);
    }

    pub fn get(&self, metric: MetricType) -> Option<&HourlySeries> {
        self.series.get(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricType, &HourlySeries)> {
        self.series.iter().map(|(metric, series)| (*metric, series))
    }

    pub fn metrics(&self) -> impl Iterator<Item = MetricType> + '_ {
        self.series.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// True if every metric in `wanted` has a series.
    pub fn covers(&self, wanted: &[MetricType]) -> bool {
        wanted.iter().all(|metric| self.series.contains_key(metric))
    }

    /// Every metric with data: those in `preferred` first, in that order,
    /// then the rest in [`MetricType`] order.
    pub fn ordered_metrics(&self, preferred: &[MetricType]) -> Vec<MetricType> {
        let mut ordered: Vec<MetricType> = Vec::with_capacity(self.len());
        for metric in preferred.iter().copied().chain(self.metrics()) {
            if self.series.contains_key(&metric) && !ordered.contains(&metric) {
                ordered.push(metric);
            }
        }
        ordered
    }

    /// The metrics of `selected` that have data, in `selected` order.
    pub fn displayable(&self, selected: &[MetricType]) -> Vec<MetricType> {
        selected
            .iter()
            .copied()
            .filter(|metric| self.series.contains_key(metric))
            .collect()
    }
}
