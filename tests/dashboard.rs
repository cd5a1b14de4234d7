use chrono::NaiveDate;
use std::error::Error;
use std::path::Path;
use weatherdash::{
    DashboardConfig, DashboardError, DataOrigin, LatLon, MetricType, Selection, WeatherDashboard,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn day(start: f64) -> Vec<f64> {
    (0..24).map(|h| start + h as f64).collect()
}

fn london_request(types: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "lat": 51.5,
        "lon": -0.12,
        "date": "2025-01-01",
        "types": types,
    })
}

async fn dashboard_for(server: &MockServer, cache_dir: &Path) -> WeatherDashboard {
    let config = DashboardConfig {
        endpoint: format!("{}/get_weather", server.uri()),
        cache_dir: Some(cache_dir.to_path_buf()),
        request_timeout_secs: 5,
    };
    WeatherDashboard::from_config(&config).await.unwrap()
}

#[tokio::test]
async fn test_second_fetch_is_served_from_cache() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir()?;

    Mock::given(method("POST"))
        .and(path("/get_weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "temperature": day(-10.0),
            "wind": day(1.0),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server, cache_dir.path()).await;
    let types = vec![MetricType::Wind, MetricType::Temperature];

    let first = dashboard
        .fetch()
        .location(LatLon(45.5, -73.6))
        .date(date())
        .types(types.clone())
        .call()
        .await?;
    assert_eq!(first.origin, DataOrigin::Network);
    assert_eq!(first.displayable(), types);

    let second = dashboard
        .fetch()
        .location(LatLon(45.5, -73.6))
        .date(date())
        .types(types)
        .call()
        .await?;
    assert_eq!(second.origin, DataOrigin::Cache);
    assert_eq!(second.record_id, first.record_id);
    assert_eq!(second.data, first.data);
    Ok(())
}

#[tokio::test]
async fn test_cache_survives_restart() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir()?;

    Mock::given(method("POST"))
        .and(path("/get_weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "dust": day(0.0) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut selection = Selection::default();
    selection.toggle(MetricType::Dust);
    {
        let dashboard = dashboard_for(&server, cache_dir.path()).await;
        let outcome = dashboard.fetch_selection(&selection).await?;
        assert_eq!(outcome.origin, DataOrigin::Network);
    }

    let reopened = dashboard_for(&server, cache_dir.path()).await;
    let outcome = reopened.fetch_selection(&selection).await?;
    assert_eq!(outcome.origin, DataOrigin::Cache);
    Ok(())
}

#[tokio::test]
async fn test_wider_selection_refetches_and_updates_record() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir()?;

    Mock::given(method("POST"))
        .and(path("/get_weather"))
        .and(body_json(london_request(&["Wind"])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "wind": day(2.0) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/get_weather"))
        .and(body_json(london_request(&["Wind", "Rainfall"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "wind": day(2.0),
            "rainfall": day(0.0),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server, cache_dir.path()).await;
    let narrow = dashboard
        .fetch()
        .location(LatLon(51.5, -0.12))
        .date(date())
        .types(vec![MetricType::Wind])
        .call()
        .await?;
    let wide = dashboard
        .fetch()
        .location(LatLon(51.5, -0.12))
        .date(date())
        .types(vec![MetricType::Wind, MetricType::Rainfall])
        .call()
        .await?;

    assert_eq!(wide.origin, DataOrigin::Network);
    assert_eq!(wide.record_id, narrow.record_id);

    let saved = dashboard.saved_queries().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(
        saved[0].selected_types,
        vec![MetricType::Wind, MetricType::Rainfall]
    );
    Ok(())
}

#[tokio::test]
async fn test_saved_queries_newest_first() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir()?;

    Mock::given(method("POST"))
        .and(path("/get_weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "snowfall": day(0.0) })),
        )
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server, cache_dir.path()).await;
    let mut ids = Vec::new();
    for lat in [10.0, 20.0, 30.0] {
        let outcome = dashboard
            .fetch()
            .location(LatLon(lat, 5.0))
            .date(date())
            .types(vec![MetricType::Snowfall])
            .call()
            .await?;
        ids.push(outcome.record_id);
    }

    let listed: Vec<u64> = dashboard.saved_queries().await.iter().map(|r| r.id).collect();
    ids.reverse();
    assert_eq!(listed, ids);

    let oldest = dashboard.load_saved(ids[2]).await?;
    assert_eq!(oldest.location(), LatLon(10.0, 5.0));
    assert!(matches!(
        dashboard.load_saved(999).await,
        Err(DashboardError::SavedQueryNotFound(999))
    ));

    dashboard.clear_cache().await?;
    assert!(dashboard.saved_queries().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_server_error_saves_nothing() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir()?;

    Mock::given(method("POST"))
        .and(path("/get_weather"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server, cache_dir.path()).await;
    let result = dashboard
        .fetch()
        .location(LatLon(45.5, -73.6))
        .date(date())
        .types(vec![MetricType::Temperature])
        .call()
        .await;

    assert!(matches!(result, Err(DashboardError::Api(_))));
    assert!(dashboard.saved_queries().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unreadable_cache_file_does_not_block_startup() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir()?;
    std::fs::write(cache_dir.path().join("queries.bin"), [0u8, 1])?;

    Mock::given(method("POST"))
        .and(path("/get_weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "wind": day(0.0) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server, cache_dir.path()).await;
    assert!(dashboard.saved_queries().await.is_empty());
    assert!(cache_dir.path().join("queries.bin.corrupt").exists());

    let outcome = dashboard
        .fetch()
        .location(LatLon(45.5, -73.6))
        .date(date())
        .types(vec![MetricType::Wind])
        .call()
        .await?;
    assert_eq!(outcome.origin, DataOrigin::Network);

    dashboard.clear_cache().await?;
    assert!(dashboard.saved_queries().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_save_is_not_served_later() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    let root = tempfile::tempdir()?;
    let cache_dir = root.path().join("cache");

    Mock::given(method("POST"))
        .and(path("/get_weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "wind": day(0.0) })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server, &cache_dir).await;
    std::fs::remove_dir_all(&cache_dir)?;

    for _ in 0..2 {
        let result = dashboard
            .fetch()
            .location(LatLon(45.5, -73.6))
            .date(date())
            .types(vec![MetricType::Wind])
            .call()
            .await;
        assert!(matches!(result, Err(DashboardError::Cache(_))));
    }
    assert!(dashboard.saved_queries().await.is_empty());
    Ok(())
}
