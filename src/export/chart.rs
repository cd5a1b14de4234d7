//! Text line charts for hourly series, one chart per metric.

use crate::types::metric::MetricType;
use crate::types::weather_data::{HourlySeries, WeatherData};

/// Number of value rows in a rendered chart.
pub const CHART_HEIGHT: usize = 8;
/// Values are rounded to this many decimals before plotting.
pub const DISPLAY_DECIMALS: u32 = 1;

const TICK_EVERY: usize = 6;

/// Renders `series` as a small text line chart titled with the metric name
/// and unit. Hours run left to right, two columns per hour.
///
/// Returns `None` for an empty series. Non-finite readings are left out.
pub fn render_chart(metric: MetricType, series: &HourlySeries) -> Option<String> {
    if series.is_empty() {
        return None;
    }

    let values = series.rounded(DISPLAY_DECIMALS);
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (mut min, mut max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        (min, max) = (0.0, 0.0);
    }
    let span = if max > min { max - min } else { 1.0 };
    let top = CHART_HEIGHT - 1;

    let rows: Vec<Option<usize>> = values
        .iter()
        .map(|v| {
            v.is_finite()
                .then(|| (((v - min) / span) * top as f64).round() as usize)
        })
        .collect();

    let label_for = |row: usize| -> Option<String> {
        if row == top || row == 0 || row == top / 2 {
            Some(format!("{:.1}", min + span * row as f64 / top as f64))
        } else {
            None
        }
    };
    let label_width = (0..CHART_HEIGHT)
        .filter_map(label_for)
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{} ({})\n", metric.request_name(), metric.unit());
    for row in (0..CHART_HEIGHT).rev() {
        let (label, axis) = match label_for(row) {
            Some(label) => (label, '┤'),
            None => (String::new(), '│'),
        };
        let mut line = format!("{:>width$} {}", label, axis, width = label_width);
        for cell in &rows {
            line.push_str(if *cell == Some(row) { " •" } else { "  " });
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let hours = values.len();
    let pad = " ".repeat(label_width + 1);
    out.push_str(&format!("{}└{}\n", pad, "─".repeat(hours * 2)));
    out.push_str(&format!("{} {}\n", pad, hour_ticks(hours).trim_end()));
    out.push_str(&format!("{}{:^width$}", pad, "Hour", width = hours * 2 + 1));
    Some(out.trim_end().to_string())
}

// Labels every TICK_EVERY hours plus the last hour, aligned under the points.
fn hour_ticks(hours: usize) -> String {
    let mut ticks = vec![' '; hours * 2 + 2];
    let last = hours.saturating_sub(1);
    let marks = (0..hours).step_by(TICK_EVERY).chain(std::iter::once(last));
    for hour in marks {
        let label: Vec<char> = hour.to_string().chars().collect();
        let start = hour * 2 + 1;
        let end = start + label.len();
        let clear_before = ticks[start - 1] == ' ';
        if end <= ticks.len() && clear_before && ticks[start..end].iter().all(|c| *c == ' ') {
            ticks[start..end].copy_from_slice(&label);
        }
    }
    ticks.into_iter().collect()
}

/// Charts for each metric of `metrics` that has data, separated by blank lines.
pub fn render_charts(data: &WeatherData, metrics: &[MetricType]) -> String {
    metrics
        .iter()
        .filter_map(|metric| data.get(*metric).and_then(|s| render_chart(*metric, s)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
