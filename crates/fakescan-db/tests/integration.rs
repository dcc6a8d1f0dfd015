//! Offline tests for fakescan-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use fakescan_core::{AppConfig, Environment};
use fakescan_db::{AccountRow, PoolConfig};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        genuine_dataset_path: PathBuf::from("./data/users.csv"),
        fake_dataset_path: PathBuf::from("./data/fusers.csv"),
        model_seed: 42,
        staleness_window_secs: 10_800,
        twitter_bearer_tokens: vec!["t".to_string()],
        twitter_api_base_url: "https://api.twitter.com/2/".to_string(),
        twitter_timeout_secs: 10,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`AccountRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn account_row_has_expected_fields() {
    let row = AccountRow {
        username: "alice".to_string(),
        followers_count: Some(1_000_i64),
        friends_count: None,
        statuses_count: Some(0),
        listed_count: Some(3),
        created_at: "unknown".to_string(),
        verified: false,
        description: String::new(),
        fetched_at: "2026-01-02 03:04:05".to_string(),
    };

    assert_eq!(row.username, "alice");
    assert!(row.friends_count.is_none());
    assert!(row.fetched_at().is_some());
}
