//! The main entry point: fetches weather for a point and date, serving
//! repeated queries from the local query cache.

use crate::api::client::{WeatherApiClient, WeatherRequest};
use crate::cache::query_cache::{QueryCache, UpsertKind};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::types::cached_query::CachedQuery;
use crate::types::location::{LatLon, QueryKey};
use crate::types::metric::MetricType;
use crate::types::selection::Selection;
use crate::types::weather_data::WeatherData;
use bon::bon;
use chrono::NaiveDate;
use log::{info, warn};
use std::path::Path;
use tokio::sync::Mutex;

/// Where the data of a [`FetchOutcome`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Cache,
    Network,
}

/// Result of [`WeatherDashboard::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub origin: DataOrigin,
    /// Id of the saved query holding `data`.
    pub record_id: u64,
    pub location: LatLon,
    pub date: NaiveDate,
    /// Metrics that were asked for, in request order.
    pub selected: Vec<MetricType>,
    pub data: WeatherData,
}

impl FetchOutcome {
    /// The selected metrics that have data, in selection order.
    pub fn displayable(&self) -> Vec<MetricType> {
        self.data.displayable(&self.selected)
    }

    pub fn from_cache(&self) -> bool {
        self.origin == DataOrigin::Cache
    }
}

/// Fetches hourly weather and keeps every answer in a [`QueryCache`].
///
/// # Examples
///
/// ```rust,no_run
/// # use weatherdash::{WeatherDashboard, DashboardError, LatLon, MetricType};
/// # use chrono::NaiveDate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), DashboardError> {
/// let dashboard = WeatherDashboard::new().await?;
/// let outcome = dashboard
///     .fetch()
///     .location(LatLon(45.5, -73.6))
///     .date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
///     .types(vec![MetricType::Temperature, MetricType::Wind])
///     .call()
///     .await?;
/// println!("{:?} from {:?}", outcome.displayable(), outcome.origin);
/// # Ok(())
/// # }
/// ```
pub struct WeatherDashboard {
    api: WeatherApiClient,
    cache: Mutex<QueryCache>,
}

#[bon]
impl WeatherDashboard {
    /// Uses the default endpoint, timeout and platform cache directory.
    pub async fn new() -> Result<Self, DashboardError> {
        Self::from_config(&DashboardConfig::default()).await
    }

    pub async fn from_config(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let cache_dir = config.resolve_cache_dir()?;
        let api = WeatherApiClient::new(config.endpoint.clone(), config.timeout())?;
        Self::with_parts(api, &cache_dir).await
    }

    /// Builds a dashboard from an existing client, opening the cache in `cache_dir`.
    pub async fn with_parts(
        api: WeatherApiClient,
        cache_dir: &Path,
    ) -> Result<Self, DashboardError> {
        let cache = QueryCache::open(cache_dir).await?;
        Ok(Self {
            api,
            cache: Mutex::new(cache),
        })
    }

    /// Gets weather for `location` on `date`.
    ///
    /// A saved query for the same point and date whose data covers every
    /// requested metric is returned without touching the network. Otherwise
    /// the endpoint is queried and the answer saved, replacing any older
    /// record for the key.
    ///
    /// # Errors
    ///
    /// [`DashboardError::NoMetricsSelected`] if `types` is empty,
    /// [`DashboardError::InvalidCoordinate`] for NaN or infinite
    /// coordinates, and API or cache errors from the lookup itself.
    #[builder]
    pub async fn fetch(
        &self,
        location: LatLon,
        date: NaiveDate,
        types: Vec<MetricType>,
    ) -> Result<FetchOutcome, DashboardError> {
        let mut selected: Vec<MetricType> = Vec::with_capacity(types.len());
        for metric in types {
            if !selected.contains(&metric) {
                selected.push(metric);
            }
        }
        if selected.is_empty() {
            return Err(DashboardError::NoMetricsSelected);
        }
        let key = QueryKey::new(location, date)?;

        {
            let cache = self.cache.lock().await;
            match cache.find(&key) {
                Some(record) if record.data.covers(&selected) => {
                    info!("Cache hit for {} (#{})", key, record.id);
                    return Ok(FetchOutcome {
                        origin: DataOrigin::Cache,
                        record_id: record.id,
                        location,
                        date,
                        selected,
                        data: record.data.clone(),
                    });
                }
                Some(record) => warn!(
                    "Saved query #{} for {} lacks some of {:?}, refetching",
                    record.id, key, selected
                ),
                None => warn!("Cache miss for {}", key),
            }
        }

        let request = WeatherRequest::new(location, date, selected.clone());
        let data = self.api.get_weather(&request).await?;

        let upsert = self
            .cache
            .lock()
            .await
            .upsert(key, selected.clone(), data.clone())
            .await?;
        match upsert.kind {
            UpsertKind::Inserted => info!("Cached new weather query #{} for {}", upsert.id, key),
            UpsertKind::Updated => {
                info!("Updated existing cached query #{} for {}", upsert.id, key)
            }
        }

        Ok(FetchOutcome {
            origin: DataOrigin::Network,
            record_id: upsert.id,
            location,
            date,
            selected,
            data,
        })
    }

    /// Fetches whatever `selection` currently points at.
    pub async fn fetch_selection(
        &self,
        selection: &Selection,
    ) -> Result<FetchOutcome, DashboardError> {
        self.fetch()
            .location(selection.location())
            .date(selection.date())
            .types(selection.selected().to_vec())
            .call()
            .await
    }

    /// Every saved query, newest first.
    pub async fn saved_queries(&self) -> Vec<CachedQuery> {
        self.cache.lock().await.recent().cloned().collect()
    }

    pub async fn load_saved(&self, id: u64) -> Result<CachedQuery, DashboardError> {
        self.cache
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or(DashboardError::SavedQueryNotFound(id))
    }

    pub async fn clear_cache(&self) -> Result<(), DashboardError> {
        self.cache.lock().await.clear().await?;
        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        self.api.endpoint()
    }
}
