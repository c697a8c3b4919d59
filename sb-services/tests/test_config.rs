//! Integration tests for application configuration.
//!
//! Tests config files as the services consume them: saving and reloading,
//! ConfigHandle shared access, derived channel settings, the token file
//! location, and platform directories.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use sb_core::config::{AppConfig, ConfigHandle};
use sb_core::platform::Platform;
use sb_models::TokenPair;
use sb_services::event_bus::{AppEvent, EventBus};
use sb_services::TokenStore;
use sb_socket::ChannelConfig;
use tempfile::TempDir;

// ---- File save and load ----

#[test]
fn config_save_and_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.server.address = "https://book.example.com".into();
    config.server.api_timeout_ms = 10_000;
    config.realtime.reconnect_interval_ms = 1_000;
    config.logging.json_output = true;
    config.save_to_file(&path).unwrap();
    assert!(path.exists(), "config file should be created");

    let loaded = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.server.address, "https://book.example.com");
    assert_eq!(loaded.server.api_timeout_ms, 10_000);
    assert_eq!(loaded.realtime.reconnect_interval(), Duration::from_secs(1));
    assert!(loaded.logging.json_output);
}

#[test]
fn config_load_nonexistent_file_returns_error() {
    let dir = TempDir::new().unwrap();
    let result = AppConfig::load_from_file(&dir.path().join("missing.toml"));
    assert!(result.is_err(), "loading nonexistent file should fail");
}

#[test]
fn config_load_invalid_toml_returns_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.toml");
    std::fs::write(&path, "this is not valid {{ toml }}").unwrap();

    let result = AppConfig::load_from_file(&path);
    assert!(result.is_err(), "loading invalid TOML should fail");
}

// ---- ConfigHandle async access ----

#[tokio::test]
async fn config_handle_clone_shares_state() {
    let handle1 = ConfigHandle::new(AppConfig::default());
    let handle2 = handle1.clone();

    {
        let mut config = handle1.write().await;
        config.server.address = "https://shared.example.com".into();
    }

    let config = handle2.read().await;
    assert_eq!(
        config.server.address, "https://shared.example.com",
        "cloned ConfigHandle should share the same underlying state"
    );
}

#[tokio::test]
async fn config_handle_concurrent_reads_do_not_block() {
    let handle = ConfigHandle::new(AppConfig::default());
    let h1 = handle.clone();
    let h2 = handle.clone();

    let (r1, r2) = tokio::join!(
        async { h1.read().await.realtime.event_capacity },
        async { h2.read().await.realtime.event_capacity },
    );

    assert_eq!(r1, 256);
    assert_eq!(r2, 256);
}

// ---- Derived settings ----

#[test]
fn channel_config_follows_server_address() {
    let mut config = AppConfig::default();
    config.server.address = "https://book.example.com".into();
    config.realtime.reconnect_interval_ms = 750;

    let channel = ChannelConfig::from_app_config(&config).unwrap();
    assert_eq!(channel.url, "wss://book.example.com/ws/bookings/");
    assert_eq!(channel.reconnect_interval, Duration::from_millis(750));
}

#[test]
fn channel_config_needs_a_server() {
    let mut config = AppConfig::default();
    config.server.address = String::new();
    assert!(ChannelConfig::from_app_config(&config).is_err());
}

#[test]
fn channel_config_rejects_zero_event_capacity() {
    let mut config = AppConfig::default();
    config.realtime.event_capacity = 0;
    assert!(ChannelConfig::from_app_config(&config).is_err());
}

#[tokio::test]
async fn event_bus_tolerates_zero_capacity() {
    let bus = EventBus::new(0);
    let mut rx = bus.subscribe();
    bus.emit(AppEvent::BoardChanged { pending: 1, active: 0 });
    assert!(matches!(
        rx.recv().await,
        Ok(AppEvent::BoardChanged { pending: 1, active: 0 })
    ));
}

#[test]
fn token_store_uses_configured_path() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.session.token_file = dir.path().join("tokens.json").display().to_string();

    let path = config.effective_token_file().unwrap();
    assert_eq!(path, dir.path().join("tokens.json"));

    let store = TokenStore::new(path);
    store
        .save(&TokenPair {
            access: "a".into(),
            refresh: "r".into(),
        })
        .unwrap();
    assert!(dir.path().join("tokens.json").exists());
}

#[test]
fn effective_paths_default_to_data_dir() {
    let config = AppConfig::default();
    let data_dir = Platform::data_dir().unwrap();
    assert_eq!(config.effective_token_file().unwrap(), data_dir.join("session.json"));
    assert_eq!(config.effective_log_dir().unwrap(), data_dir.join("logs"));
}

#[test]
fn effective_log_dir_uses_custom_when_set() {
    let mut config = AppConfig::default();
    config.logging.directory = "/custom/logs".into();
    assert_eq!(config.effective_log_dir().unwrap(), PathBuf::from("/custom/logs"));
}

// ---- Platform detection ----

#[test]
fn platform_dirs_are_app_scoped() {
    assert!(Platform::data_dir().unwrap().ends_with("ServiceBook"));
    assert!(Platform::config_dir().unwrap().ends_with("ServiceBook"));
    assert!(AppConfig::default_config_path()
        .unwrap()
        .ends_with("ServiceBook/config.toml"));
}

#[test]
fn platform_display_matches_name() {
    let platform = Platform::current();
    assert_eq!(platform.to_string(), platform.name());
}
