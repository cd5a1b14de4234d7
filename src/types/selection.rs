//! Transient selection state: the picked point, date and metrics.

use crate::types::location::{InvalidCoordinate, LatLon, QueryKey};
use crate::types::metric::MetricType;
use chrono::NaiveDate;

/// What the user currently has selected. Never persisted on its own.
///
/// A fresh selection points at (45.5, -73.6) on 2025-01-01 with no metrics
/// chosen. Metrics keep the order they were toggled on in.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    location: LatLon,
    date: NaiveDate,
    types: Vec<MetricType>,
}

pub const DEFAULT_LOCATION: LatLon = LatLon(45.5, -73.6);

pub fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION,
            date: default_date(),
            types: Vec::new(),
        }
    }
}

impl Selection {
    pub fn new(location: LatLon, date: NaiveDate) -> Self {
        Self {
            location,
            date,
            types: Vec::new(),
        }
    }

    /// Moves the selection to a picked point, e.g. a click on a map.
    pub fn set_location(&mut self, location: LatLon) {
        self.location = location;
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Flips `metric` in or out of the selection. Returns whether it is now selected.
    pub fn toggle(&mut self, metric: MetricType) -> bool {
        if let Some(pos) = self.types.iter().position(|m| *m == metric) {
            self.types.remove(pos);
            false
        } else {
            self.types.push(metric);
            true
        }
    }

    /// Adds `metric` if it is not already selected.
    pub fn select(&mut self, metric: MetricType) {
        if !self.types.contains(&metric) {
            self.types.push(metric);
        }
    }

    pub fn location(&self) -> LatLon {
        self.location
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn selected(&self) -> &[MetricType] {
        &self.types
    }

    /// A fetch needs at least one metric.
    pub fn can_fetch(&self) -> bool {
        !self.types.is_empty()
    }

    pub fn key(&self) -> Result<QueryKey, InvalidCoordinate> {
        QueryKey::new(self.location, self.date)
    }
}
