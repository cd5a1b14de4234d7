mod api;
mod cache;
mod config;
mod dashboard;
mod error;
pub mod export;
mod types;
mod utils;

pub use error::DashboardError;
pub use dashboard::*;

pub use api::client::{WeatherApiClient, WeatherRequest};
pub use api::error::ApiError;

pub use cache::error::CacheError;
pub use cache::query_cache::{QueryCache, UpsertKind, UpsertOutcome, SCHEMA_VERSION};

pub use config::{ConfigError, DashboardConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

pub use types::cached_query::CachedQuery;
pub use types::location::{InvalidCoordinate, LatLon, QueryKey};
pub use types::metric::{MetricType, UnknownMetric};
pub use types::selection::{default_date, Selection, DEFAULT_LOCATION};
pub use types::weather_data::{HourlySeries, WeatherData, HOURS_PER_DAY};
