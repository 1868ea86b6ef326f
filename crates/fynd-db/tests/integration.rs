//! Offline unit tests for fynd-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use fynd_core::{AppConfig, PipelineConfig};
use fynd_db::{PoolConfig, WatchRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        log_level: "info".to_string(),
        exports_dir: PathBuf::from("./exports"),
        openai_api_key: None,
        openai_base_url: "https://api.openai.com/v1".to_string(),
        openai_model: "gpt-4o-mini".to_string(),
        blocket_base_url: "https://api.blocket.se".to_string(),
        blocket_request_timeout_secs: 30,
        blocket_user_agent: "ua".to_string(),
        blocket_max_retries: 3,
        blocket_retry_backoff_base_ms: 500,
        blocket_max_pages: 20,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        pipeline: PipelineConfig::default(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`WatchRow`] has all expected
/// fields with the correct types, and that well-formed `jsonb` columns
/// decode into a [`fynd_core::Watch`]. No database required.
#[test]
fn watch_row_decodes_into_watch() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = WatchRow {
        id: Uuid::new_v4(),
        name: Some("iphone hunt".to_string()),
        query: "iphone 13".to_string(),
        filters: serde_json::json!({
            "locations": ["stockholm"],
            "category": null,
            "sort_order": "price_asc"
        }),
        preferences: serde_json::json!({}),
        created_at: Utc::now(),
    };

    let id = row.id;
    let watch = row.into_watch().unwrap();
    assert_eq!(watch.id, id);
    assert_eq!(watch.name.as_deref(), Some("iphone hunt"));
    assert_eq!(watch.query, "iphone 13");
    assert_eq!(watch.filters.locations, vec!["stockholm".to_string()]);
    assert!(watch.preferences.soft_criteria.is_empty());
}

#[test]
fn watch_row_with_corrupt_filters_reports_the_field() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = WatchRow {
        id: Uuid::new_v4(),
        name: None,
        query: "iphone 13".to_string(),
        filters: serde_json::json!("not an object"),
        preferences: serde_json::json!({}),
        created_at: Utc::now(),
    };

    let err = row.into_watch().unwrap_err();
    assert!(err.to_string().contains("filters"));
}
