//! Config commands - inspect and edit the client configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;

use sb_core::config::{AppConfig, ConfigHandle};
use sb_core::error::SbResult;
use sb_core::platform::Platform;

use super::print_json;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the configuration file path.
    Path,
    /// Set the backend address (e.g. https://api.example.com).
    SetServer { address: String },
    /// Set an explicit realtime channel URL; empty derives it from the server.
    SetRealtimeUrl { url: String },
}

pub async fn run(
    config: ConfigHandle,
    config_path: Option<PathBuf>,
    action: ConfigAction,
    format: OutputFormat,
) -> SbResult<()> {
    let path = match config_path {
        Some(path) => path,
        None => AppConfig::default_config_path()?,
    };

    match action {
        ConfigAction::Show => {
            let cfg = config.read().await;
            let realtime = cfg.realtime_url().unwrap_or_else(|e| format!("({e})"));
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "platform": Platform::current().name(),
                    "config_file": path.display().to_string(),
                    "server_address": cfg.server.address,
                    "realtime_url": realtime,
                    "api_timeout_ms": cfg.server.api_timeout_ms,
                    "reconnect_interval_ms": cfg.realtime.reconnect_interval_ms,
                    "token_file": cfg.effective_token_file()?.display().to_string(),
                    "log_dir": cfg.effective_log_dir()?.display().to_string(),
                }))?,
                OutputFormat::Text => {
                    println!("{}", style("ServiceBook configuration").bold());
                    println!("  Platform:       {}", Platform::current());
                    println!("  Config file:    {}", path.display());
                    println!("  Server:         {}", cfg.server.address);
                    println!("  Realtime URL:   {realtime}");
                    println!("  API timeout:    {} ms", cfg.server.api_timeout_ms);
                    println!("  Reconnect:      every {} ms", cfg.realtime.reconnect_interval_ms);
                    println!("  Token file:     {}", cfg.effective_token_file()?.display());
                    println!("  Log directory:  {}", cfg.effective_log_dir()?.display());
                }
            }
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::SetServer { address } => {
            let mut cfg = config.write().await;
            cfg.server.address = AppConfig::sanitize_server_address(&address);
            cfg.save_to_file(&path)?;
            println!("{} {}", style("Server set to").green(), cfg.server.address);
        }
        ConfigAction::SetRealtimeUrl { url } => {
            let mut cfg = config.write().await;
            cfg.server.realtime_url = url.trim().to_string();
            cfg.save_to_file(&path)?;
            println!("{} {}", style("Realtime URL:").green(), cfg.realtime_url()?);
        }
    }
    Ok(())
}
