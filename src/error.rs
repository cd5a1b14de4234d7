use crate::api::error::ApiError;
use crate::cache::error::CacheError;
use crate::config::ConfigError;
use crate::export::error::ExportError;
use crate::types::location::InvalidCoordinate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    #[error("Select at least one weather type before fetching")]
    NoMetricsSelected,

    #[error("No saved query with id {0}")]
    SavedQueryNotFound(u64),
}
