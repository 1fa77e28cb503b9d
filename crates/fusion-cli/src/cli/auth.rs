//! Account commands: login, login-google, register, logout, whoami.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password};

use fusion_types::auth::{Credentials, Identity, Registration, ThirdPartyLogin};
use fusion_types::error::ApiError;

use crate::cli::output::{print_json, spinner, success};
use crate::state::AppState;

fn prompt_or(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

fn print_identity(identity: &Identity, json: bool) -> Result<()> {
    if json {
        return print_json(identity);
    }
    let role = if identity.is_privileged { "staff" } else { "customer" };
    success(format!(
        "Logged in as {} ({})",
        style(&identity.email).cyan(),
        style(role).dim()
    ));
    Ok(())
}

/// Log in with email and password.
///
/// # Examples
///
/// ```bash
/// fusion login --email ada@example.com
/// ```
pub async fn login(state: &AppState, email: Option<String>, json: bool) -> Result<()> {
    let email = prompt_or(email, "Email")?;
    let password = Password::new().with_prompt("Password").interact()?;

    let spinner = spinner("Logging in...");
    let result = state.api.login(&Credentials { email, password }).await;
    spinner.finish_and_clear();

    let identity = result.map_err(|e| login_error(e, "Login failed. Please check your credentials."))?;
    print_identity(&identity, json)
}

/// Exchange an identity-provider token for a session.
pub async fn login_google(state: &AppState, token: Option<String>, json: bool) -> Result<()> {
    let token = match token {
        Some(t) => t,
        None => Password::new().with_prompt("Google ID token").interact()?,
    };

    let spinner = spinner("Logging in...");
    let result = state.api.login_third_party(&ThirdPartyLogin { token }).await;
    spinner.finish_and_clear();

    let identity = result.map_err(|e| login_error(e, "Google login failed."))?;
    print_identity(&identity, json)
}

/// Create an account and log straight in with it.
pub async fn register(
    state: &AppState,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    json: bool,
) -> Result<()> {
    let email = prompt_or(email, "Email")?;
    let first_name = prompt_or(first_name, "First name")?;
    let last_name = prompt_or(last_name, "Last name")?;
    let password = Password::new().with_prompt("Password").interact()?;
    let password2 = Password::new().with_prompt("Confirm password").interact()?;

    let spinner = spinner("Creating account...");
    let registration = Registration {
        email: email.clone(),
        password: password.clone(),
        password2,
        first_name,
        last_name,
    };
    if let Err(e) = state.api.register(&registration).await {
        spinner.finish_and_clear();
        return Err(login_error(e, "Registration failed. The email may already be in use."));
    }

    spinner.set_message("Logging in...");
    let result = state.api.login(&Credentials { email, password }).await;
    spinner.finish_and_clear();

    let identity = result.map_err(|e| login_error(e, "Login failed. Please check your credentials."))?;
    print_identity(&identity, json)
}

/// Server message when it sent one, the form's generic message otherwise.
fn login_error(err: ApiError, fallback: &str) -> anyhow::Error {
    tracing::debug!(error = %err, "authentication request failed");
    anyhow::anyhow!(err.user_message(fallback))
}

pub fn logout(state: &AppState, json: bool) -> Result<()> {
    let was_logged_in = state.client.session.is_logged_in();
    state.client.logout();

    if json {
        return print_json(&serde_json::json!({ "logged_out": was_logged_in }));
    }
    if was_logged_in {
        success("Logged out. Cart and chat history cleared.");
    } else {
        success("Already logged out.");
    }
    Ok(())
}

pub fn whoami(state: &AppState, json: bool) -> Result<()> {
    let identity = state
        .require_login()
        .context("No active session")?;

    if json {
        return print_json(&identity);
    }
    println!();
    println!("  {}  {}", style("Email:").bold(), style(&identity.email).cyan());
    println!("  {}  {}", style("User ID:").bold(), identity.id);
    println!(
        "  {}  {}",
        style("Role:").bold(),
        if identity.is_privileged { "staff" } else { "customer" }
    );
    println!(
        "  {}  {}",
        style("Data:").bold(),
        style(state.data_dir.display()).dim()
    );
    println!();
    Ok(())
}
