pub mod chart;
pub mod csv;
pub mod error;
#[cfg(feature = "plotting")]
pub mod plot;

pub use chart::{render_chart, render_charts};
pub use csv::{default_file_name, to_csv, weather_frame, write_csv};
pub use error::ExportError;
#[cfg(feature = "plotting")]
pub use plot::plot_series;
