//! ServiceBook CLI - command-line client for the ServiceBook marketplace.
//!
//! Covers account management, customer bookings, the provider's live
//! offer dashboard, and the admin back office from the terminal.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use sb_core::config::{AppConfig, ConfigHandle};
use sb_core::error::SbResult;
use sb_core::logging;

/// ServiceBook - book local services, or take bookings as a provider.
#[derive(Parser)]
#[command(
    name = "servicebook",
    version,
    about = "ServiceBook marketplace client CLI",
    long_about = "A command-line client for the ServiceBook service marketplace.\n\
                  Sign in as a customer, provider, or admin and work with the\n\
                  backend from any terminal."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session.
    Login {
        /// Username (prompted if omitted).
        #[arg(short, long)]
        username: Option<String>,
        /// Sign in with a Google access token instead of a password.
        #[arg(long, conflicts_with = "username")]
        google_token: Option<String>,
    },
    /// Create an account and sign in with it.
    Register {
        /// Username (prompted if omitted).
        #[arg(short, long)]
        username: Option<String>,
        /// Email address (prompted if omitted).
        #[arg(short, long)]
        email: Option<String>,
        /// Optional phone number.
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Change the signed-in user's password.
    Passwd,
    /// Provider dashboard: live booking offers.
    Provider {
        #[command(subcommand)]
        action: commands::provider::ProviderAction,
    },
    /// View and edit the provider's weekly availability.
    Availability {
        #[command(subcommand)]
        action: commands::availability::AvailabilityAction,
    },
    /// Browse the service catalog.
    Services {
        #[command(subcommand)]
        action: commands::services::ServicesAction,
    },
    /// Customer bookings.
    Bookings {
        #[command(subcommand)]
        action: commands::bookings::BookingsAction,
    },
    /// Saved customer addresses.
    Addresses {
        #[command(subcommand)]
        action: commands::addresses::AddressesAction,
    },
    /// File and list complaints.
    Complaints {
        #[command(subcommand)]
        action: commands::complaints::ComplaintsAction,
    },
    /// Admin back office.
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
    /// View and modify client configuration.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> SbResult<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(PathBuf::from);
    let config = match &config_path {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_default()?,
    };

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let _guard = match config.effective_log_dir() {
        Ok(dir) => init_file_logging(&log_level, &dir, config.logging.json_output),
        Err(e) => {
            logging::init_console_logging(&log_level);
            warn!("file logging disabled: {e}");
            None
        }
    };

    let config_handle = ConfigHandle::new(config);

    info!("ServiceBook CLI v{}", sb_core::constants::APP_VERSION);

    // Dispatch to command handlers
    match cli.command {
        Commands::Login { username, google_token } => {
            commands::auth::login(config_handle, username, google_token, cli.format).await
        }
        Commands::Register { username, email, phone } => {
            commands::auth::register(config_handle, username, email, phone, cli.format).await
        }
        Commands::Logout => commands::auth::logout(config_handle).await,
        Commands::Whoami => commands::auth::whoami(config_handle, cli.format).await,
        Commands::Passwd => commands::auth::change_password(config_handle).await,
        Commands::Provider { action } => {
            commands::provider::run(config_handle, action, cli.format).await
        }
        Commands::Availability { action } => {
            commands::availability::run(config_handle, action, cli.format).await
        }
        Commands::Services { action } => {
            commands::services::run(config_handle, action, cli.format).await
        }
        Commands::Bookings { action } => {
            commands::bookings::run(config_handle, action, cli.format).await
        }
        Commands::Addresses { action } => {
            commands::addresses::run(config_handle, action, cli.format).await
        }
        Commands::Complaints { action } => {
            commands::complaints::run(config_handle, action, cli.format).await
        }
        Commands::Admin { action } => {
            commands::admin::run(config_handle, action, cli.format).await
        }
        Commands::Config { action } => {
            commands::config::run(config_handle, config_path, action, cli.format).await
        }
    }
}

fn init_file_logging(level: &str, dir: &Path, json_output: bool) -> Option<logging::LogGuard> {
    match logging::init_logging(level, dir, json_output) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_console_logging(level);
            warn!("file logging disabled: {e}");
            None
        }
    }
}
