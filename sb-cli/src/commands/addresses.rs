//! Saved address commands.

use clap::Subcommand;
use console::style;
use dialoguer::{Confirm, Input};

use sb_core::config::ConfigHandle;
use sb_core::error::SbResult;
use sb_models::Address;

use super::{new_table, print_json, prompt_error, require_session};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum AddressesAction {
    /// List saved addresses.
    List,
    /// Save a new address (prompts for missing fields).
    Add {
        /// Short name, e.g. Home.
        #[arg(short, long)]
        label: Option<String>,
        /// Street address.
        #[arg(short, long)]
        address: Option<String>,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        state: String,
        #[arg(long, default_value = "")]
        zip: String,
        /// Make this the default address.
        #[arg(long)]
        default: bool,
    },
    /// Delete a saved address.
    Remove {
        id: i64,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Make a saved address the default.
    SetDefault { id: i64 },
}

pub async fn run(config: ConfigHandle, action: AddressesAction, format: OutputFormat) -> SbResult<()> {
    let (session, _user) = require_session(&config).await?;
    let api = session.api();

    match action {
        AddressesAction::List => {
            let addresses = api.addresses().await?;
            match format {
                OutputFormat::Json => print_json(&addresses)?,
                OutputFormat::Text => {
                    let mut table = new_table(vec!["ID", "Label", "Address", "Default"]);
                    for address in &addresses {
                        table.add_row(vec![
                            address.id.map(|id| id.to_string()).unwrap_or_default(),
                            address.label.clone(),
                            address.one_line(),
                            if address.is_default { "✓".into() } else { String::new() },
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        AddressesAction::Add {
            label,
            address,
            city,
            state,
            zip,
            default,
        } => {
            let label = match label {
                Some(l) => l,
                None => Input::new()
                    .with_prompt("Label")
                    .default("Home".to_string())
                    .interact_text()
                    .map_err(prompt_error)?,
            };
            let address = match address {
                Some(a) => a,
                None => Input::new()
                    .with_prompt("Street address")
                    .interact_text()
                    .map_err(prompt_error)?,
            };
            let saved = api
                .create_address(&Address {
                    id: None,
                    label,
                    address,
                    city,
                    state,
                    zip_code: zip,
                    is_default: default,
                })
                .await?;
            match format {
                OutputFormat::Json => print_json(&saved)?,
                OutputFormat::Text => {
                    println!("{} {}", style("Saved").green(), saved.one_line());
                }
            }
        }
        AddressesAction::Remove { id, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete address {id}?"))
                    .default(false)
                    .interact()
                    .map_err(prompt_error)?;
                if !confirmed {
                    return Ok(());
                }
            }
            api.delete_address(id).await?;
            println!("{} address {id}", style("Deleted").green());
        }
        AddressesAction::SetDefault { id } => {
            let saved = api
                .update_address(id, &serde_json::json!({ "is_default": true }))
                .await?;
            println!("{} {}", style("Default address:").green(), saved.one_line());
        }
    }
    Ok(())
}
