//! CSV export of hourly weather data.
//!
//! The table has an `Hour` column (0 to 23) followed by one column per
//! metric, headed by the metric's response key. Metric columns follow the
//! order they were selected in. Hours a series does not cover are left
//! empty. Readings are written in their shortest form, so `3.0` becomes `3`.

use crate::export::error::ExportError;
use crate::types::location::LatLon;
use crate::types::metric::MetricType;
use crate::types::weather_data::{WeatherData, HOURS_PER_DAY};
use chrono::NaiveDate;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Builds the export table for `data`, with the metrics of `selected` first.
/// Metrics with data that `selected` does not name come after them.
pub fn weather_frame(
    data: &WeatherData,
    selected: &[MetricType],
) -> Result<DataFrame, ExportError> {
    if data.is_empty() {
        return Err(ExportError::NoData);
    }

    let hours: Vec<i32> = (0..HOURS_PER_DAY as i32).collect();
    let mut columns: Vec<Column> = vec![Series::new("Hour".into(), hours).into()];
    for metric in data.ordered_metrics(selected) {
        let Some(series) = data.get(metric) else {
            continue;
        };
        let values: Vec<Option<String>> = (0..HOURS_PER_DAY)
            .map(|h| series.value_at(h).map(|v| (v + 0.0).to_string()))
            .collect();
        columns.push(Series::new(metric.response_key().into(), values).into());
    }

    Ok(DataFrame::new(columns)?)
}

/// Renders `data` as CSV text, rows separated by `\n` with no trailing newline.
///
/// # Examples
///
/// ```
/// use weatherdash::{export, HourlySeries, MetricType, WeatherData};
///
/// let mut data = WeatherData::new();
/// data.insert(MetricType::Temperature, HourlySeries::new(vec![3.0; 24]));
/// data.insert(MetricType::Wind, HourlySeries::new(vec![2.5; 24]));
/// let csv = export::to_csv(&data, &[MetricType::Wind, MetricType::Temperature]).unwrap();
/// assert!(csv.starts_with("Hour,wind,temperature\n0,2.5,3\n"));
/// ```
pub fn to_csv(data: &WeatherData, selected: &[MetricType]) -> Result<String, ExportError> {
    let mut frame = weather_frame(data, selected)?;
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut frame)?;

    let mut text = String::from_utf8(buffer)?;
    let trimmed_len = text.trim_end_matches(['\n', '\r']).len();
    text.truncate(trimmed_len);
    Ok(text)
}

/// File name used when exporting a query, e.g.
/// `Weather_Report_(45.50, -73.60)_2025-01-01.csv`.
pub fn default_file_name(location: LatLon, date: NaiveDate) -> String {
    format!("Weather_Report_{}_{}.csv", location, date)
}

/// Writes `data` as CSV to `target`. When `target` is an existing directory
/// the file goes inside it under [`default_file_name`]. Returns the path written.
pub fn write_csv(
    data: &WeatherData,
    selected: &[MetricType],
    location: LatLon,
    date: NaiveDate,
    target: &Path,
) -> Result<PathBuf, ExportError> {
    let path = if target.is_dir() {
        target.join(default_file_name(location, date))
    } else {
        target.to_path_buf()
    };
    let text = to_csv(data, selected)?;
    std::fs::write(&path, text).map_err(|e| ExportError::Write(path.clone(), e))?;
    info!("Exported {} metrics to {}", data.len(), path.display());
    Ok(path)
}
