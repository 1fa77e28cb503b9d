//! Line formatting for chat output.

use chrono::Local;
use console::style;
use std::time::Duration;

use fusion_core::chat::ChatEvent;
use fusion_types::chat::{ChatMessage, ConnectionState};

pub const AUTH_FAILURE_TEXT: &str =
    "Connection failed. Your session may have expired. Please log in again.";

pub fn message_line(message: &ChatMessage, own_email: &str) -> String {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M").to_string();
    let author = match message.user.as_str() {
        user if user == own_email => style("You".to_string()).green().bold(),
        "System" => style("System".to_string()).yellow().bold(),
        "FusionBot" => style("FusionBot".to_string()).magenta().bold(),
        user => style(user.to_string()).cyan().bold(),
    };
    format!("  {} {}: {}", style(time).dim(), author, message.message)
}

pub fn state_line(state: ConnectionState) -> String {
    let dot = match state {
        ConnectionState::Open => style("●").green(),
        ConnectionState::Connecting | ConnectionState::Closing => style("●").yellow(),
        ConnectionState::Closed => style("●").red(),
    };
    format!("  {} {}", dot, style(state.label()).dim())
}

fn seconds(delay: Duration) -> String {
    format!("{:.0}s", delay.as_secs_f64())
}

/// Text for driver events that are not chat messages. `None` for events the
/// user does not need to see.
pub fn event_line(event: &ChatEvent) -> Option<String> {
    match event {
        ChatEvent::State(state) => Some(state_line(*state)),
        ChatEvent::AuthFailure { logout_in } => Some(format!(
            "  {} {} {}",
            style("!").red().bold(),
            AUTH_FAILURE_TEXT,
            style(format!("(logging out in {})", seconds(*logout_in))).dim()
        )),
        ChatEvent::LoggedOut => Some(format!("  {} Logged out.", style("!").red().bold())),
        ChatEvent::Reconnecting { attempt, delay } => Some(format!(
            "  {}",
            style(format!("Reconnecting in {} (attempt {attempt})...", seconds(*delay))).dim()
        )),
        ChatEvent::GaveUp { attempts } => Some(format!(
            "  {} Could not reconnect after {attempts} attempt(s).",
            style("!").yellow().bold()
        )),
        ChatEvent::Message(_) | ChatEvent::EchoConfirmed { .. } => None,
    }
}

pub fn prompt(state: ConnectionState) -> String {
    match state {
        ConnectionState::Open => "> ".to_string(),
        _ => format!("({}) > ", state.label()),
    }
}
