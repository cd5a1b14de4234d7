use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No weather data to export")]
    NoData,

    #[error("Failed building the export table")]
    DataFrame(#[from] PolarsError),

    #[error("Export output was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Failed to write export file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),
}
