//! Customer booking commands.

use clap::Subcommand;
use console::style;

use sb_core::config::ConfigHandle;
use sb_core::error::SbResult;
use sb_models::{BookingRequest, ReviewSubmission, SlotQuery};

use super::{json_label, new_table, or_dash, print_json, require_session};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum BookingsAction {
    /// List your bookings.
    List,
    /// Request a booking; matching providers are notified.
    Request {
        /// Service ID.
        #[arg(short, long)]
        service: i64,
        /// Date as YYYY-MM-DD.
        #[arg(short, long)]
        date: String,
        /// Time as HH:MM.
        #[arg(short, long)]
        time: String,
        /// Where the service is needed.
        #[arg(short, long)]
        address: String,
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
        /// Notes for the provider.
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Check which providers are free for a slot.
    Slots {
        /// Category name.
        #[arg(long)]
        category: String,
        /// Service ID.
        #[arg(short, long)]
        service: i64,
        #[arg(short, long)]
        date: String,
        #[arg(short, long)]
        time: String,
    },
    /// Rate a completed booking.
    Review {
        /// Booking ID.
        booking_id: i64,
        /// Rating from 1 to 5.
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(long, default_value = "")]
        feedback: String,
    },
}

pub async fn run(config: ConfigHandle, action: BookingsAction, format: OutputFormat) -> SbResult<()> {
    let (session, _user) = require_session(&config).await?;
    let api = session.api();

    match action {
        BookingsAction::List => {
            let bookings = api.customer_bookings().await?;
            match format {
                OutputFormat::Json => print_json(&bookings)?,
                OutputFormat::Text => {
                    if bookings.is_empty() {
                        println!("No bookings yet.");
                        return Ok(());
                    }
                    let mut table = new_table(vec!["ID", "Service", "Provider", "Date", "Time", "Status"]);
                    for booking in &bookings {
                        table.add_row(vec![
                            booking.id.to_string(),
                            booking.service_label(),
                            or_dash(booking.provider_name.as_deref()),
                            or_dash(booking.scheduled_date.as_deref()),
                            or_dash(booking.scheduled_time.as_deref()),
                            booking.status.to_string(),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        BookingsAction::Request {
            service,
            date,
            time,
            address,
            latitude,
            longitude,
            notes,
        } => {
            let receipt = api
                .request_booking(&BookingRequest {
                    service_id: service,
                    scheduled_date: date,
                    scheduled_time: time,
                    customer_latitude: latitude,
                    customer_longitude: longitude,
                    customer_address: address,
                    notes,
                })
                .await?;
            match format {
                OutputFormat::Json => print_json(&receipt)?,
                OutputFormat::Text => {
                    let id = receipt
                        .booking_id
                        .map(|id| format!(" #{id}"))
                        .unwrap_or_default();
                    println!(
                        "{}{id}: {} provider(s) notified",
                        style("Booking requested").green(),
                        receipt.notified_providers_count
                    );
                    if let Some(message) = receipt.message {
                        println!("  {message}");
                    }
                }
            }
        }
        BookingsAction::Slots {
            category,
            service,
            date,
            time,
        } => {
            let slots = api
                .available_slots(&SlotQuery {
                    category,
                    date,
                    service,
                    time,
                    location: None,
                })
                .await?;
            match format {
                OutputFormat::Json => print_json(&slots)?,
                OutputFormat::Text => {
                    println!("{} provider(s) available", slots.provider_count());
                    for provider in &slots.providers {
                        println!("  - {}", json_label(Some(provider)));
                    }
                }
            }
        }
        BookingsAction::Review {
            booking_id,
            rating,
            feedback,
        } => {
            api.review_booking(booking_id, &ReviewSubmission { rating, feedback })
                .await?;
            println!("{}", style("Thanks for your review.").green());
        }
    }
    Ok(())
}
