//! CLI command implementations.

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod availability;
pub mod bookings;
pub mod complaints;
pub mod config;
pub mod provider;
pub mod services;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use sb_api::ApiClient;
use sb_core::config::ConfigHandle;
use sb_core::error::{SbError, SbResult};
use sb_models::User;
use sb_services::{EventBus, SessionService, SessionState, TokenStore};

/// Helper to create an API client from config.
pub async fn create_api_client(config: &ConfigHandle) -> SbResult<ApiClient> {
    let server_config = config.read().await.server.clone();
    ApiClient::new(&server_config)
}

/// Build a session service over the configured token file.
pub async fn open_session(config: &ConfigHandle) -> SbResult<SessionService> {
    let bus = EventBus::new(config.read().await.realtime.event_capacity);
    session_with_bus(config, bus).await
}

/// Build a session service that reports on an existing event bus.
pub async fn session_with_bus(config: &ConfigHandle, bus: EventBus) -> SbResult<SessionService> {
    let api = create_api_client(config).await?;
    let store = TokenStore::new(config.read().await.effective_token_file()?);
    Ok(SessionService::new(api, store, bus))
}

/// Restore the stored session, failing when nobody is signed in.
pub async fn require_session(config: &ConfigHandle) -> SbResult<(SessionService, User)> {
    let session = open_session(config).await?;
    match session.restore().await? {
        SessionState::Authenticated { user } => Ok((session, user)),
        SessionState::Anonymous => Err(SbError::NotAuthenticated),
    }
}

/// Map a prompt failure into SbError.
pub fn prompt_error(e: dialoguer::Error) -> SbError {
    SbError::Internal(format!("prompt failed: {e}"))
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> SbResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A table with the CLI's standard look.
pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Render an optional value, `-` when absent or empty.
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Display text for a loosely-typed JSON reference (id, name, or object).
pub fn json_label(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Object(map)) => map
            .get("username")
            .or_else(|| map.get("name"))
            .or_else(|| map.get("email"))
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| map.get("id").map(|id| id.to_string()))
            .unwrap_or_else(|| "-".to_string()),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer string", 10), "a much ...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_json_label() {
        assert_eq!(json_label(Some(&serde_json::json!({"id": 4, "username": "ravi"}))), "ravi");
        assert_eq!(json_label(Some(&serde_json::json!({"id": 4}))), "4");
        assert_eq!(json_label(Some(&serde_json::json!(12))), "12");
        assert_eq!(json_label(None), "-");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("x")), "x");
        assert_eq!(or_dash(None), "-");
    }
}
