//! Account commands: login, register, logout, whoami, passwd.

use console::style;
use dialoguer::{Input, Password};

use sb_core::config::ConfigHandle;
use sb_core::error::SbResult;
use sb_models::{Credentials, PasswordChange, Registration, SocialLogin, User};
use sb_services::SessionState;

use super::{open_session, or_dash, print_json, prompt_error, require_session};
use crate::OutputFormat;

/// Sign in with a password or a Google access token.
pub async fn login(
    config: ConfigHandle,
    username: Option<String>,
    google_token: Option<String>,
    format: OutputFormat,
) -> SbResult<()> {
    let session = open_session(&config).await?;

    let user = match google_token {
        Some(access_token) => {
            session
                .social_login(&SocialLogin {
                    provider: "google".into(),
                    access_token,
                })
                .await?
        }
        None => {
            let username = match username {
                Some(u) => u,
                None => Input::new()
                    .with_prompt("Username")
                    .interact_text()
                    .map_err(prompt_error)?,
            };
            let password = Password::new()
                .with_prompt("Password")
                .interact()
                .map_err(prompt_error)?;
            session.login(&Credentials { username, password }).await?
        }
    };

    print_user(&user, format, "Signed in as")
}

/// Create an account, then sign in with it.
pub async fn register(
    config: ConfigHandle,
    username: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    format: OutputFormat,
) -> SbResult<()> {
    let username = match username {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_error)?,
    };
    let email = match email {
        Some(e) => e,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_error)?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(prompt_error)?;

    let session = open_session(&config).await?;
    let user = session
        .register_and_login(&Registration {
            username,
            email,
            password,
            phone,
        })
        .await?;

    print_user(&user, format, "Registered and signed in as")
}

pub async fn logout(config: ConfigHandle) -> SbResult<()> {
    let session = open_session(&config).await?;
    session.logout().await?;
    println!("{}", style("Signed out.").green());
    Ok(())
}

/// Show the stored session's user, checking it against the server.
pub async fn whoami(config: ConfigHandle, format: OutputFormat) -> SbResult<()> {
    let session = open_session(&config).await?;
    match session.restore().await? {
        SessionState::Authenticated { user } => print_user(&user, format, "Signed in as"),
        SessionState::Anonymous => {
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "authenticated": false }))?,
                OutputFormat::Text => println!("{}", style("Not signed in.").yellow()),
            }
            Ok(())
        }
    }
}

pub async fn change_password(config: ConfigHandle) -> SbResult<()> {
    let (session, _user) = require_session(&config).await?;

    let old_password = Password::new()
        .with_prompt("Current password")
        .interact()
        .map_err(prompt_error)?;
    let new_password = Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()
        .map_err(prompt_error)?;

    session
        .api()
        .change_password(&PasswordChange {
            old_password,
            new_password,
        })
        .await?;
    println!("{}", style("Password changed.").green());
    Ok(())
}

fn print_user(user: &User, format: OutputFormat, heading: &str) -> SbResult<()> {
    match format {
        OutputFormat::Json => print_json(user)?,
        OutputFormat::Text => {
            println!(
                "{} {}",
                style(heading).green(),
                style(user.display_name()).bold()
            );
            println!("  Username: {}", user.username);
            println!("  Email:    {}", or_dash(user.email.as_deref()));
            println!("  Role:     {}", user.user_type);
        }
    }
    Ok(())
}
