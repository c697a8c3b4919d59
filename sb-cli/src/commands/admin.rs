//! Admin back-office commands.

use clap::Subcommand;
use console::style;
use dialoguer::Confirm;

use sb_api::AdminCollection;
use sb_core::config::ConfigHandle;
use sb_core::error::{SbError, SbResult};
use sb_models::{AuditLogFilter, BookingUpdate, ComplaintStatus, Material, ProviderProfile, User};

use super::{json_label, new_table, or_dash, print_json, prompt_error, require_session, truncate};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum AdminAction {
    /// List user accounts.
    Users,
    /// Show one user account.
    User { id: i64 },
    /// Delete a user account.
    RemoveUser {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
    /// List service providers.
    Providers,
    /// Approve a provider so they receive booking offers.
    ApproveProvider { id: i64 },
    /// List customers.
    Customers,
    /// List administrators.
    Admins,
    /// Create an administrator.
    AddAdmin {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        super_admin: bool,
    },
    /// List all bookings.
    Bookings,
    /// Move a booking to a new date or time.
    Reschedule {
        id: i64,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Cancel a booking.
    CancelBooking {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
    /// List materials.
    Materials,
    /// Add a material.
    AddMaterial {
        #[arg(short, long)]
        name: String,
        /// Unit price, e.g. 12.50.
        #[arg(short, long)]
        price: String,
        /// Unit of sale, e.g. piece or metre.
        #[arg(short, long)]
        unit: String,
        #[arg(long)]
        qr_code: Option<String>,
    },
    /// Change a material's price or unit.
    UpdateMaterial {
        id: i64,
        #[arg(short, long)]
        price: Option<String>,
        #[arg(short, long)]
        unit: Option<String>,
    },
    /// Delete a material.
    RemoveMaterial {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
    /// Browse the audit log.
    Audit {
        /// Free-text search.
        #[arg(short, long)]
        search: Option<String>,
        /// Only entries at or after this time (ISO 8601).
        #[arg(long)]
        since: Option<String>,
        /// Only entries at or before this time (ISO 8601).
        #[arg(long)]
        until: Option<String>,
    },
    /// Unread notifications, newest first.
    Notifications,
    /// Mark a notification as read.
    ReadNotification { id: i64 },
    /// List customer complaints.
    Complaints,
    /// Resolve or reject a complaint.
    ResolveComplaint {
        id: i64,
        /// New status: resolved or rejected.
        #[arg(short, long, default_value = "resolved")]
        status: String,
        /// Note shown to the customer.
        #[arg(short, long)]
        note: Option<String>,
    },
}

pub async fn run(config: ConfigHandle, action: AdminAction, format: OutputFormat) -> SbResult<()> {
    let (session, _user) = require_session(&config).await?;
    let api = session.api();

    match action {
        AdminAction::Users => {
            let users = api.admin_users().await?;
            print_users(&users, format)?;
        }
        AdminAction::User { id } => {
            let user: User = api.admin_get(AdminCollection::Users, id).await?;
            print_users(std::slice::from_ref(&user), format)?;
        }
        AdminAction::RemoveUser { id, yes } => {
            if confirm(yes, &format!("Delete user {id}?"))? {
                api.admin_delete(AdminCollection::Users, id).await?;
                println!("{} user {id}", style("Deleted").green());
            }
        }
        AdminAction::Providers => {
            let providers = api.admin_providers().await?;
            print_providers(&providers, format)?;
        }
        AdminAction::ApproveProvider { id } => {
            let provider: ProviderProfile = api
                .admin_patch(
                    AdminCollection::Providers,
                    id,
                    &serde_json::json!({ "is_approved": true }),
                )
                .await?;
            println!(
                "{} {}",
                style("Approved provider").green(),
                json_label(provider.user.as_ref())
            );
        }
        AdminAction::Customers => {
            let customers = api.admin_customers().await?;
            match format {
                OutputFormat::Json => print_json(&customers)?,
                OutputFormat::Text => {
                    let mut table = new_table(vec!["ID", "User", "Email", "Phone", "Address"]);
                    for customer in &customers {
                        table.add_row(vec![
                            customer.id.to_string(),
                            json_label(customer.user.as_ref()),
                            or_dash(customer.email.as_deref()),
                            or_dash(customer.phone.as_deref()),
                            truncate(&or_dash(customer.address.as_deref()), 40),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        AdminAction::Admins => {
            let admins = api.admin_admins().await?;
            match format {
                OutputFormat::Json => print_json(&admins)?,
                OutputFormat::Text => {
                    let mut table = new_table(vec!["ID", "User", "Phone", "Super admin", "Created"]);
                    for admin in &admins {
                        table.add_row(vec![
                            admin.id.to_string(),
                            json_label(admin.user.as_ref()),
                            or_dash(admin.phone.as_deref()),
                            if admin.super_admin { "yes".into() } else { "no".into() },
                            admin
                                .created_at
                                .map(|t| t.format("%Y-%m-%d").to_string())
                                .unwrap_or_else(|| "-".into()),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        AdminAction::AddAdmin {
            username,
            email,
            phone,
            super_admin,
        } => {
            let mut body = serde_json::json!({
                "user": { "username": username, "email": email },
                "superAdmin": super_admin,
            });
            if let Some(phone) = phone {
                body["phone"] = serde_json::json!(phone);
            }
            let admin = api.create_admin(&body).await?;
            println!("{} #{}", style("Created admin").green(), admin.id);
        }
        AdminAction::Bookings => {
            let bookings = api.admin_bookings().await?;
            match format {
                OutputFormat::Json => print_json(&bookings)?,
                OutputFormat::Text => {
                    let mut table =
                        new_table(vec!["ID", "Service", "Customer", "Provider", "Date", "Time", "Status"]);
                    for booking in &bookings {
                        table.add_row(vec![
                            booking.id.to_string(),
                            booking.service_label(),
                            booking.customer_label(),
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
        AdminAction::Reschedule { id, date, time } => {
            if date.is_none() && time.is_none() {
                return Err(SbError::Config("give --date and/or --time".into()));
            }
            let booking = api
                .admin_update_booking(
                    id,
                    &BookingUpdate {
                        scheduled_date: date,
                        scheduled_time: time,
                        ..Default::default()
                    },
                )
                .await?;
            println!(
                "{} booking {} to {} {}",
                style("Moved").green(),
                booking.id,
                or_dash(booking.scheduled_date.as_deref()),
                or_dash(booking.scheduled_time.as_deref())
            );
        }
        AdminAction::CancelBooking { id, yes } => {
            if confirm(yes, &format!("Cancel booking {id}?"))? {
                let booking = api.admin_cancel_booking(id).await?;
                println!("{} booking {} is {}", style("Done:").green(), booking.id, booking.status);
            }
        }
        AdminAction::Materials => {
            let materials = api.materials().await?;
            match format {
                OutputFormat::Json => print_json(&materials)?,
                OutputFormat::Text => {
                    let mut table = new_table(vec!["ID", "Name", "Price", "Unit", "QR code"]);
                    for material in &materials {
                        table.add_row(vec![
                            material.id.map(|id| id.to_string()).unwrap_or_default(),
                            material.name.clone(),
                            material.price.clone(),
                            material.unit.clone(),
                            or_dash(material.qr_code.as_deref()),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        AdminAction::AddMaterial {
            name,
            price,
            unit,
            qr_code,
        } => {
            let material = api
                .create_material(&Material {
                    id: None,
                    name,
                    qr_code,
                    price,
                    unit,
                })
                .await?;
            println!("{} {}", style("Added material").green(), material.name);
        }
        AdminAction::UpdateMaterial { id, price, unit } => {
            let mut material: Material = api.admin_get(AdminCollection::Materials, id).await?;
            if let Some(price) = price {
                material.price = price;
            }
            if let Some(unit) = unit {
                material.unit = unit;
            }
            let material = api.update_material(id, &material).await?;
            println!(
                "{} {}: {} per {}",
                style("Updated").green(),
                material.name,
                material.price,
                material.unit
            );
        }
        AdminAction::RemoveMaterial { id, yes } => {
            if confirm(yes, &format!("Delete material {id}?"))? {
                api.admin_delete(AdminCollection::Materials, id).await?;
                println!("{} material {id}", style("Deleted").green());
            }
        }
        AdminAction::Audit {
            search,
            since,
            until,
        } => {
            let logs = api
                .audit_logs(&AuditLogFilter {
                    search,
                    since,
                    until,
                })
                .await?;
            match format {
                OutputFormat::Json => print_json(&logs)?,
                OutputFormat::Text => {
                    let mut table = new_table(vec!["Time", "User", "Action", "Target"]);
                    for log in &logs {
                        let target = match (&log.target_type, &log.target_id) {
                            (Some(kind), id) => format!("{kind} {}", json_label(id.as_ref())),
                            (None, _) => "-".into(),
                        };
                        table.add_row(vec![
                            log.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                            json_label(log.user.as_ref()),
                            log.action.clone(),
                            target,
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        AdminAction::Notifications => {
            let notifications = api.unread_notifications().await?;
            match format {
                OutputFormat::Json => print_json(&notifications)?,
                OutputFormat::Text => {
                    if notifications.is_empty() {
                        println!("No unread notifications.");
                    }
                    for n in &notifications {
                        println!(
                            "{} {} {}",
                            style(format!("#{}", n.id)).dim(),
                            style(n.timestamp.format("%Y-%m-%d %H:%M")).cyan(),
                            n.message
                        );
                    }
                }
            }
        }
        AdminAction::ReadNotification { id } => {
            api.mark_notification_read(id).await?;
            println!("{} notification {id} as read", style("Marked").green());
        }
        AdminAction::Complaints => {
            let complaints = api.admin_complaints().await?;
            super::complaints::print_complaints(&complaints, format)?;
        }
        AdminAction::ResolveComplaint { id, status, note } => {
            let status = ComplaintStatus::parse(&status)
                .ok_or_else(|| SbError::Config(format!("unknown complaint status: {status}")))?;
            let complaint = api
                .admin_set_complaint_status(id, status, note.as_deref())
                .await?;
            println!(
                "{} complaint {} is {}",
                style("Done:").green(),
                complaint.id,
                complaint.status.as_str()
            );
        }
    }
    Ok(())
}

fn confirm(skip: bool, prompt: &str) -> SbResult<bool> {
    if skip {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(prompt_error)
}

fn print_users(users: &[User], format: OutputFormat) -> SbResult<()> {
    match format {
        OutputFormat::Json => print_json(users)?,
        OutputFormat::Text => {
            let mut table = new_table(vec!["ID", "Username", "Name", "Email", "Role", "Active"]);
            for user in users {
                table.add_row(vec![
                    user.id.to_string(),
                    user.username.clone(),
                    user.display_name(),
                    or_dash(user.email.as_deref()),
                    user.user_type.to_string(),
                    match user.is_active {
                        Some(false) => "no".into(),
                        _ => "yes".into(),
                    },
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn print_providers(providers: &[ProviderProfile], format: OutputFormat) -> SbResult<()> {
    match format {
        OutputFormat::Json => print_json(providers)?,
        OutputFormat::Text => {
            let mut table = new_table(vec!["ID", "User", "Service", "Approved", "Available", "Rating", "Jobs"]);
            for provider in providers {
                table.add_row(vec![
                    provider.id.to_string(),
                    json_label(provider.user.as_ref()),
                    json_label(provider.service.as_ref()),
                    if provider.is_approved { "yes".into() } else { "no".into() },
                    if provider.is_available { "yes".into() } else { "no".into() },
                    format!("{:.1}", provider.rating),
                    provider.total_jobs_completed.to_string(),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
