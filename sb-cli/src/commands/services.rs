//! Catalog commands - browse categories and their services.

use clap::Subcommand;

use sb_core::config::ConfigHandle;
use sb_core::error::SbResult;

use super::{create_api_client, new_table, or_dash, print_json, truncate};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ServicesAction {
    /// List service categories.
    Categories,
    /// List the services in a category.
    List {
        /// Category ID.
        category_id: i64,
    },
}

/// The catalog is public; no session is needed.
pub async fn run(config: ConfigHandle, action: ServicesAction, format: OutputFormat) -> SbResult<()> {
    let api = create_api_client(&config).await?;

    match action {
        ServicesAction::Categories => {
            let categories = api.service_categories().await?;
            match format {
                OutputFormat::Json => print_json(&categories)?,
                OutputFormat::Text => {
                    let mut table = new_table(vec!["ID", "Name", "Description"]);
                    for category in &categories {
                        table.add_row(vec![
                            category.id.to_string(),
                            category.name.clone(),
                            truncate(&or_dash(category.description.as_deref()), 60),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        ServicesAction::List { category_id } => {
            let services = api.category_services(category_id).await?;
            match format {
                OutputFormat::Json => print_json(&services)?,
                OutputFormat::Text => {
                    let mut table = new_table(vec!["ID", "Name", "Price", "Duration", "Description"]);
                    for service in &services {
                        table.add_row(vec![
                            service.id.to_string(),
                            service.name.clone(),
                            service.price_label(),
                            service
                                .duration
                                .map(|m| format!("{m} min"))
                                .unwrap_or_else(|| "-".into()),
                            truncate(&or_dash(service.description.as_deref()), 50),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
    }
    Ok(())
}
