//! Complaint commands for customers.

use clap::Subcommand;
use console::style;

use sb_core::config::ConfigHandle;
use sb_core::error::SbResult;
use sb_models::{Complaint, ComplaintStatus, NewComplaint};

use super::{json_label, new_table, or_dash, print_json, require_session, truncate};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ComplaintsAction {
    /// List your complaints.
    List,
    /// File a complaint about a booking.
    File {
        /// Booking ID.
        #[arg(short, long)]
        booking: i64,
        /// Complaint category, e.g. quality or billing.
        #[arg(long)]
        category: String,
        #[arg(short, long)]
        description: String,
    },
}

pub async fn run(config: ConfigHandle, action: ComplaintsAction, format: OutputFormat) -> SbResult<()> {
    let (session, _user) = require_session(&config).await?;
    let api = session.api();

    match action {
        ComplaintsAction::List => {
            let complaints = api.complaints().await?;
            print_complaints(&complaints, format)?;
        }
        ComplaintsAction::File {
            booking,
            category,
            description,
        } => {
            let complaint = api
                .file_complaint(&NewComplaint {
                    booking,
                    category,
                    description,
                })
                .await?;
            match format {
                OutputFormat::Json => print_json(&complaint)?,
                OutputFormat::Text => {
                    println!("{} #{}", style("Complaint filed").green(), complaint.id);
                }
            }
        }
    }
    Ok(())
}

/// Shared with the admin complaint listing.
pub fn print_complaints(complaints: &[Complaint], format: OutputFormat) -> SbResult<()> {
    match format {
        OutputFormat::Json => print_json(complaints)?,
        OutputFormat::Text => {
            let mut table = new_table(vec!["ID", "Booking", "Category", "Status", "Description", "Note"]);
            for complaint in complaints {
                let status = match complaint.status {
                    ComplaintStatus::Pending => style(complaint.status.as_str()).yellow(),
                    ComplaintStatus::Resolved => style(complaint.status.as_str()).green(),
                    ComplaintStatus::Rejected => style(complaint.status.as_str()).red(),
                };
                table.add_row(vec![
                    complaint.id.to_string(),
                    json_label(Some(&complaint.booking)),
                    or_dash(complaint.category.as_deref()),
                    status.to_string(),
                    truncate(&complaint.description, 40),
                    truncate(&or_dash(complaint.admin_note.as_deref()), 30),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
