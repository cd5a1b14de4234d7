pub mod cached_query;
pub mod location;
pub mod metric;
pub mod selection;
pub mod weather_data;
