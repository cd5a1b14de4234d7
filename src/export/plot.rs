//! Interactive line plots, shown in the browser through plotlars.
//!
//! Enabled with the `plotting` feature.

use crate::export::chart::DISPLAY_DECIMALS;
use crate::export::error::ExportError;
use crate::types::metric::MetricType;
use crate::types::weather_data::HourlySeries;
use plotlars::{Line, LinePlot, Plot, Rgb, Text};
use polars::prelude::*;

/// Opens a line plot of `series` in the metric's colour.
pub fn plot_series(metric: MetricType, series: &HourlySeries) -> Result<(), ExportError> {
    if series.is_empty() {
        return Err(ExportError::NoData);
    }
    let hours: Vec<i32> = (0..series.len() as i32).collect();
    let frame = df!(
        "hour" => hours,
        "value" => series.rounded(DISPLAY_DECIMALS),
    )?;
    let (r, g, b) = metric.color_rgb();

    LinePlot::builder()
        .data(&frame)
        .x("hour")
        .y("value")
        .color(Rgb(r, g, b))
        .line(Line::Solid)
        .plot_title(Text::from(metric.request_name()).size(18))
        .x_title("Hour")
        .y_title(metric.unit())
        .build()
        .plot();
    Ok(())
}
