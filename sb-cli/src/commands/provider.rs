//! Provider commands - the live offer dashboard.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use sb_core::config::ConfigHandle;
use sb_core::error::{SbError, SbResult};
use sb_models::BookingOffer;
use sb_services::{AppEvent, EventBus, NoticeLevel, ProviderDashboard, SessionState};
use sb_socket::{ChannelConfig, OfferChannel};

use super::{new_table, or_dash, print_json, require_session, session_with_bus};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ProviderAction {
    /// Watch for booking offers and accept or reject them interactively.
    Watch,
    /// Show pending offers and active bookings once.
    Bookings,
}

pub async fn run(config: ConfigHandle, action: ProviderAction, format: OutputFormat) -> SbResult<()> {
    match action {
        ProviderAction::Watch => watch(config, format).await,
        ProviderAction::Bookings => bookings(config, format).await,
    }
}

async fn bookings(config: ConfigHandle, format: OutputFormat) -> SbResult<()> {
    let (session, _user) = require_session(&config).await?;
    let bookings = session.api().provider_bookings().await?;

    let mut board = sb_services::OfferBoard::new();
    board.replace_from_server(&bookings);
    print_board(board.pending(), board.active(), format)
}

/// Lines accepted on stdin while watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchCommand {
    Accept(i64),
    Reject(i64),
    List,
    Refresh,
    Status,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<WatchCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let mut booking_id = || -> Result<i64, String> {
        let raw = parts
            .next()
            .ok_or_else(|| format!("usage: {verb} <booking-id>"))?;
        raw.parse()
            .map_err(|_| format!("not a booking id: {raw}"))
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "accept" | "a" => WatchCommand::Accept(booking_id()?),
        "reject" | "r" => WatchCommand::Reject(booking_id()?),
        "list" | "ls" | "l" => WatchCommand::List,
        "refresh" => WatchCommand::Refresh,
        "status" => WatchCommand::Status,
        "help" | "?" => WatchCommand::Help,
        "quit" | "exit" | "q" => WatchCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

async fn watch(config: ConfigHandle, format: OutputFormat) -> SbResult<()> {
    let bus = EventBus::new(config.read().await.realtime.event_capacity);
    let session = session_with_bus(&config, bus.clone()).await?;

    let user = match session.restore().await? {
        SessionState::Authenticated { user } => user,
        SessionState::Anonymous => return Err(SbError::NotAuthenticated),
    };
    if !user.is_provider() {
        println!(
            "{} signed in as a {} account; booking offers are only sent to providers",
            style("warning:").yellow().bold(),
            user.user_type
        );
    }
    let token = session
        .access_token()
        .await
        .ok_or(SbError::NotAuthenticated)?;

    let channel = OfferChannel::new(ChannelConfig::from_app_config(&*config.read().await)?);
    let dashboard = Arc::new(ProviderDashboard::new(
        Arc::new(session.api().clone()),
        Arc::new(channel.clone()),
        bus.clone(),
    ));

    let mut events = bus.subscribe();
    let feed = dashboard.attach(&channel);
    let runner = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.run(feed).await })
    };

    channel.connect(&token).await?;
    info!("provider dashboard started for {}", user.username);

    // A failed initial load is reported through the bus.
    let _ = dashboard.refresh().await;

    if let OutputFormat::Text = format {
        println!(
            "{} {} (type {} for commands)",
            style("Watching for booking offers as").green(),
            style(user.display_name()).bold(),
            style("help").cyan()
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(WatchCommand::Quit)) => break,
                    Ok(Some(command)) => execute(command, &dashboard, &channel, format).await?,
                    Ok(None) => {}
                    Err(message) => eprintln!("{}", style(message).red()),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("stdin closed: {e}");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(AppEvent::SessionExpired) => {
                    session.expire().await?;
                    println!("{}", style("Session expired, please sign in again.").red().bold());
                    break;
                }
                Ok(event) => print_event(&event, &dashboard, format).await?,
                Err(RecvError::Lagged(n)) => warn!("missed {n} dashboard events"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dashboard.detach(&channel).await;
    if tokio::time::timeout(Duration::from_secs(2), runner).await.is_err() {
        warn!("dashboard did not stop in time");
    }
    info!("provider dashboard stopped");
    Ok(())
}

async fn execute(
    command: WatchCommand,
    dashboard: &ProviderDashboard,
    channel: &OfferChannel,
    format: OutputFormat,
) -> SbResult<()> {
    match command {
        WatchCommand::Accept(id) => {
            if dashboard.accept(id).await {
                println!("{} {id}", style("Accepted booking").green());
            }
        }
        WatchCommand::Reject(id) => {
            if dashboard.reject(id).await {
                println!("{} {id}", style("Rejected booking").yellow());
            }
        }
        WatchCommand::List => {
            let board = dashboard.snapshot().await;
            print_board(board.pending(), board.active(), format)?;
        }
        WatchCommand::Refresh => {
            if dashboard.refresh().await.is_ok() {
                let board = dashboard.snapshot().await;
                println!(
                    "{} {} pending, {} active",
                    style("Refreshed:").green(),
                    board.pending().len(),
                    board.active().len()
                );
            }
        }
        WatchCommand::Status => println!("Channel: {}", channel.state()),
        WatchCommand::Help => {
            println!("  accept <id>   accept a pending offer");
            println!("  reject <id>   reject a pending offer");
            println!("  list          show pending offers and active bookings");
            println!("  refresh       reload bookings from the server");
            println!("  status        show the channel connection state");
            println!("  quit          stop watching");
        }
        WatchCommand::Quit => {}
    }
    Ok(())
}

async fn print_event(event: &AppEvent, dashboard: &ProviderDashboard, format: OutputFormat) -> SbResult<()> {
    if let OutputFormat::Json = format {
        if let Some(json) = event_json(event) {
            println!("{}", serde_json::to_string(&json)?);
        }
        return Ok(());
    }

    match event {
        AppEvent::OfferReceived { booking_id } => {
            let board = dashboard.snapshot().await;
            if let Some(offer) = board.find_pending(*booking_id) {
                print_offer(offer);
            }
        }
        AppEvent::OfferConfirmed { booking_id } => {
            println!("{} booking {booking_id} is now active", style("✔").green());
        }
        AppEvent::ConnectionStateChanged { connected } => {
            if *connected {
                println!("{}", style("● connected").green());
            } else {
                println!("{}", style("○ disconnected, retrying").yellow());
            }
        }
        AppEvent::Notice { level, message } => {
            let text = match level {
                NoticeLevel::Info => style(message.as_str()).cyan(),
                NoticeLevel::Success => style(message.as_str()).green(),
                NoticeLevel::Warning => style(message.as_str()).yellow(),
                NoticeLevel::Error => style(message.as_str()).red(),
            };
            println!("{text}");
        }
        // Closed offers are announced through their notice.
        AppEvent::OfferClosed { .. }
        | AppEvent::BoardChanged { .. }
        | AppEvent::SessionChanged { .. }
        | AppEvent::SessionExpired => {}
    }
    Ok(())
}

fn event_json(event: &AppEvent) -> Option<serde_json::Value> {
    let json = match event {
        AppEvent::OfferReceived { booking_id } => {
            serde_json::json!({ "event": "offer_received", "booking_id": booking_id })
        }
        AppEvent::OfferConfirmed { booking_id } => {
            serde_json::json!({ "event": "offer_confirmed", "booking_id": booking_id })
        }
        AppEvent::OfferClosed { booking_id, message } => {
            serde_json::json!({ "event": "offer_closed", "booking_id": booking_id, "message": message })
        }
        AppEvent::BoardChanged { pending, active } => {
            serde_json::json!({ "event": "board_changed", "pending": pending, "active": active })
        }
        AppEvent::ConnectionStateChanged { connected } => {
            serde_json::json!({ "event": "connection", "connected": connected })
        }
        AppEvent::Notice { level, message } => {
            serde_json::json!({ "event": "notice", "level": level.to_string(), "message": message })
        }
        AppEvent::SessionChanged { .. } | AppEvent::SessionExpired => return None,
    };
    Some(json)
}

fn print_offer(offer: &BookingOffer) {
    println!(
        "{} #{} {}",
        style("New booking request").cyan().bold(),
        offer.id,
        style(&offer.service).bold()
    );
    println!("  Customer: {}", or_dash(Some(offer.customer_name.as_str())));
    println!("  Address:  {}", or_dash(Some(offer.address.as_str())));
    println!("  When:     {} {}", offer.scheduled_date, offer.scheduled_time);
    if let Some(notes) = &offer.notes {
        println!("  Notes:    {notes}");
    }
    println!(
        "  {} or {}",
        style(format!("accept {}", offer.id)).green(),
        style(format!("reject {}", offer.id)).red()
    );
}

fn print_board(pending: &[BookingOffer], active: &[BookingOffer], format: OutputFormat) -> SbResult<()> {
    match format {
        OutputFormat::Json => {
            print_json(&serde_json::json!({ "pending": pending, "active": active }))?;
        }
        OutputFormat::Text => {
            for (title, offers) in [("Pending offers", pending), ("Active bookings", active)] {
                println!("{}", style(title).bold());
                if offers.is_empty() {
                    println!("  {}", style("none").dim());
                    continue;
                }
                let mut table = new_table(vec!["ID", "Service", "Customer", "Date", "Time", "Address", "Status"]);
                for offer in offers {
                    table.add_row(vec![
                        offer.id.to_string(),
                        offer.service.clone(),
                        offer.customer_name.clone(),
                        offer.scheduled_date.clone(),
                        offer.scheduled_time.clone(),
                        super::truncate(&offer.address, 30),
                        offer.status.to_string(),
                    ]);
                }
                println!("{table}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_commands() {
        assert_eq!(parse_command("accept 12"), Ok(Some(WatchCommand::Accept(12))));
        assert_eq!(parse_command("  R 7 "), Ok(Some(WatchCommand::Reject(7))));
        assert_eq!(parse_command("list"), Ok(Some(WatchCommand::List)));
        assert_eq!(parse_command("quit"), Ok(Some(WatchCommand::Quit)));
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_parse_watch_command_errors() {
        assert!(parse_command("accept").is_err());
        assert!(parse_command("reject abc").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_event_json() {
        let json = event_json(&AppEvent::OfferClosed {
            booking_id: 4,
            message: Some("Taken".into()),
        })
        .unwrap();
        assert_eq!(json["event"], "offer_closed");
        assert_eq!(json["booking_id"], 4);
        assert!(event_json(&AppEvent::SessionExpired).is_none());
    }
}
