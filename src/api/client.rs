//! HTTP client for the remote weather endpoint.
//!
//! The endpoint takes a single JSON POST naming a point, a date and the
//! wanted metrics, and answers with one hourly series per metric.

use crate::api::error::ApiError;
use crate::types::location::LatLon;
use crate::types::metric::MetricType;
use crate::types::weather_data::WeatherData;
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Body of a weather request.
///
/// Serializes as `{"lat": .., "lon": .., "date": "YYYY-MM-DD", "types": ["Temperature", ..]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRequest {
    pub lat: f64,
    pub lon: f64,
    pub date: NaiveDate,
    pub types: Vec<MetricType>,
}

impl WeatherRequest {
    pub fn new(location: LatLon, date: NaiveDate, types: Vec<MetricType>) -> Self {
        Self {
            lat: location.0,
            lon: location.1,
            date,
            types,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Client,
    endpoint: String,
}

impl WeatherApiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `request` to the endpoint and parses the per-metric series.
    ///
    /// One attempt only; a non-2xx status is returned as [`ApiError::HttpStatus`].
    pub async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherData, ApiError> {
        info!(
            "Requesting {:?} for ({}, {}) on {} from {}",
            request.types, request.lat, request.lon, request.date, self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::NetworkRequest(self.endpoint.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", self.endpoint, e);
                return Err(match e.status() {
                    Some(status) => ApiError::HttpStatus {
                        url: self.endpoint.clone(),
                        status,
                        source: e,
                    },
                    None => ApiError::NetworkRequest(self.endpoint.clone(), e),
                });
            }
        };

        let raw: HashMap<String, Vec<f64>> = response
            .json()
            .await
            .map_err(|e| ApiError::ResponseDecode(self.endpoint.clone(), e))?;
        debug!("Received {} series from {}", raw.len(), self.endpoint);

        Ok(WeatherData::from_response_map(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> WeatherRequest {
        WeatherRequest::new(
            LatLon(45.5, -73.6),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            vec![MetricType::Temperature, MetricType::Wind],
        )
    }

    fn client_for(server: &MockServer) -> WeatherApiClient {
        WeatherApiClient::new(
            format!("{}/get_weather", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "lat": 45.5,
                "lon": -73.6,
                "date": "2025-01-01",
                "types": ["Temperature", "Wind"]
            })
        );
    }

    #[tokio::test]
    async fn test_get_weather_success() {
        let mock_server = MockServer::start().await;
        let temps: Vec<f64> = (0..24).map(|h| -12.0 + h as f64 * 0.5).collect();
        let winds: Vec<f64> = vec![3.2; 24];

        Mock::given(method("POST"))
            .and(path("/get_weather"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "lat": 45.5,
                "lon": -73.6,
                "date": "2025-01-01",
                "types": ["Temperature", "Wind"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "temperature": temps,
                "wind": winds,
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let data = client_for(&mock_server).get_weather(&request()).await.unwrap();

        assert_eq!(data.len(), 2);
        let temperature = data.get(MetricType::Temperature).unwrap();
        assert_eq!(temperature.len(), 24);
        assert_eq!(temperature.value_at(0), Some(-12.0));
        assert_eq!(temperature.value_at(23), Some(-0.5));
        assert_eq!(data.get(MetricType::Wind).unwrap().value_at(10), Some(3.2));
    }

    #[tokio::test]
    async fn test_get_weather_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/get_weather"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).get_weather(&request()).await;

        match result {
            Err(ApiError::HttpStatus { status, url, .. }) => {
                assert_eq!(status.as_u16(), 500);
                assert!(url.ends_with("/get_weather"));
            }
            other => panic!("expected HttpStatus error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_weather_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/get_weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).get_weather(&request()).await;
        assert!(matches!(result, Err(ApiError::ResponseDecode(_, _))));
    }

    #[tokio::test]
    async fn test_get_weather_unreachable() {
        let client =
            WeatherApiClient::new("http://127.0.0.1:1/get_weather", Duration::from_secs(2))
                .unwrap();
        let result = client.get_weather(&request()).await;
        assert!(matches!(result, Err(ApiError::NetworkRequest(_, _))));
    }
}
