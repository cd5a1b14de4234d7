use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::warn;
use std::error::Error;
use std::path::PathBuf;
use weatherdash::export::{render_charts, write_csv};
use weatherdash::{
    default_date, DashboardConfig, DataOrigin, LatLon, MetricType, Selection, WeatherDashboard,
    WeatherData, DEFAULT_LOCATION,
};

/// Hourly weather for a point and date, with saved queries.
#[derive(Parser, Debug)]
#[command(name = "weatherdash", version, about)]
struct Cli {
    /// Config file (TOML). Defaults to $WEATHERDASH_CONFIG or the platform config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the weather endpoint URL.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Override where saved queries are stored.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch weather for a point and date (served from the cache when possible).
    Fetch {
        #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_LOCATION.0)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_LOCATION.1)]
        lon: f64,

        /// Date as YYYY-MM-DD.
        #[arg(long, default_value_t = default_date())]
        date: NaiveDate,

        /// Metric to fetch; repeat or comma-separate for several.
        #[arg(short, long = "metric", value_delimiter = ',', required = true)]
        metrics: Vec<MetricType>,

        /// Write the result as CSV to this file or directory.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Open interactive plots (needs the `plotting` feature).
        #[arg(long)]
        plot: bool,
    },
    /// List saved queries, newest first.
    Saved,
    /// Show a saved query by id.
    Load {
        id: u64,

        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Remove every saved query.
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = Some(cache_dir);
    }
    config.validate()?;

    let dashboard = WeatherDashboard::from_config(&config).await?;

    match cli.command {
        Command::Fetch {
            lat,
            lon,
            date,
            metrics,
            csv,
            plot,
        } => {
            let mut selection = Selection::new(LatLon(lat, lon), date);
            for metric in metrics {
                selection.select(metric);
            }
            let outcome = dashboard.fetch_selection(&selection).await?;

            match outcome.origin {
                DataOrigin::Cache => println!("Loaded from cache (#{})", outcome.record_id),
                DataOrigin::Network => println!(
                    "Fetched from {} (saved as #{})",
                    dashboard.endpoint(),
                    outcome.record_id
                ),
            }
            let shown = outcome.displayable();
            show(&outcome.data, &shown, plot);

            if let Some(target) = csv {
                let path = write_csv(
                    &outcome.data,
                    &outcome.selected,
                    outcome.location,
                    outcome.date,
                    &target,
                )?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Saved => {
            let saved = dashboard.saved_queries().await;
            if saved.is_empty() {
                println!("No saved weather data yet.");
            }
            for record in saved {
                println!("{}", record.summary());
            }
        }
        Command::Load { id, csv } => {
            let record = dashboard.load_saved(id).await?;
            println!("{}", record.summary());
            let metrics = record.data.ordered_metrics(&record.selected_types);
            show(&record.data, &metrics, false);

            if let Some(target) = csv {
                let path = write_csv(
                    &record.data,
                    &record.selected_types,
                    record.location(),
                    record.date,
                    &target,
                )?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Clear => {
            dashboard.clear_cache().await?;
            println!("Cleared saved queries.");
        }
    }

    Ok(())
}

fn show(data: &WeatherData, metrics: &[MetricType], plot: bool) {
    if metrics.is_empty() {
        println!("No data for the selected metrics.");
        return;
    }
    println!("\n{}", render_charts(data, metrics));

    if plot {
        open_plots(data, metrics);
    }
}

#[cfg(feature = "plotting")]
fn open_plots(data: &WeatherData, metrics: &[MetricType]) {
    for metric in metrics {
        if let Some(series) = data.get(*metric) {
            if let Err(e) = weatherdash::export::plot_series(*metric, series) {
                warn!("Could not plot {}: {}", metric, e);
            }
        }
    }
}

#[cfg(not(feature = "plotting"))]
fn open_plots(_data: &WeatherData, _metrics: &[MetricType]) {
    warn!("--plot needs the `plotting` feature; showing text charts only");
}
