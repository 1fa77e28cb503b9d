//! Chat loop orchestration.
//!
//! Opens a driver for the surface, prints what is already in the
//! conversation, then races user input against driver events until the user
//! quits, the driver gives up, or the session is logged out.

use std::io::Write;

use anyhow::Result;
use console::style;
use tokio::sync::broadcast::error::RecvError;

use fusion_core::chat::{ChatEvent, load_admin_history};
use fusion_types::auth::{Identity, UserId};
use fusion_types::chat::ChatSurface;
use fusion_types::error::ChatError;

use super::input::{ChatInput, InputEvent};
use super::render::{event_line, message_line, prompt};
use crate::cli::output::spinner;
use crate::state::AppState;

enum Exit {
    User,
    LoggedOut,
    GaveUp,
}

fn print_banner(title: &str, identity: &Identity) {
    println!();
    println!("  {} {}", style("*").cyan(), style(title).cyan().bold());
    println!("  {}", style(format!("Signed in as {}", identity.email)).dim());
    println!();
    println!("  {}", style("Type /quit or press Ctrl+D to leave").dim());
    println!("  {}", style("---").dim());
    println!();
}

/// Customer support widget.
pub async fn run_support_chat(state: &AppState) -> Result<()> {
    let identity = state.require_login()?;
    run_chat(state, ChatSurface::Support, &identity, "Fusion Support").await
}

/// Admin view of one customer's conversation. History is loaded over REST
/// before the socket opens.
pub async fn run_admin_chat(state: &AppState, customer_id: i64) -> Result<()> {
    let identity = state.require_admin()?;
    let customer = UserId(customer_id);

    let spinner = spinner("Loading conversation...");
    let loaded = load_admin_history(&state.api, &state.client.conversations, customer).await;
    spinner.finish_and_clear();
    loaded?;

    let surface = ChatSurface::Admin {
        customer_id: customer,
    };
    run_chat(state, surface, &identity, &format!("Conversation with customer #{customer}")).await
}

async fn run_chat(state: &AppState, surface: ChatSurface, identity: &Identity, title: &str) -> Result<()> {
    let client = state.chat_client();
    let (handle, mut events) = client.open(surface)?;

    print_banner(title, identity);
    let (mut input, mut out) = ChatInput::new(prompt(handle.state()))?;

    for message in state.client.conversations.messages(surface.counterpart()) {
        writeln!(out, "{}", message_line(&message, &identity.email))?;
    }

    let exit = loop {
        tokio::select! {
            line = input.read_line() => match line {
                InputEvent::Message(text) if text.is_empty() => {}
                InputEvent::Message(text) if text == "/quit" || text == "/exit" => break Exit::User,
                InputEvent::Message(text) if text == "/help" => {
                    writeln!(out, "  {}", style("/quit  leave the chat").dim())?;
                }
                InputEvent::Message(text) => match handle.send(text).await {
                    Ok(()) => {}
                    Err(ChatError::NotConnected) => {
                        writeln!(out, "  {} Not connected; message not sent.", style("!").yellow().bold())?;
                    }
                    Err(e) => {
                        writeln!(out, "  {} {e}", style("!").red().bold())?;
                    }
                },
                InputEvent::Eof | InputEvent::Interrupted => break Exit::User,
            },
            event = events.recv() => match event {
                Ok(ChatEvent::Message(message)) => {
                    writeln!(out, "{}", message_line(&message, &identity.email))?;
                }
                Ok(ChatEvent::State(connection)) => {
                    input.update_prompt(&prompt(connection));
                    if let Some(line) = event_line(&ChatEvent::State(connection)) {
                        writeln!(out, "{line}")?;
                    }
                }
                Ok(event) => {
                    if let Some(line) = event_line(&event) {
                        writeln!(out, "{line}")?;
                    }
                    match event {
                        ChatEvent::LoggedOut => break Exit::LoggedOut,
                        ChatEvent::GaveUp { .. } => break Exit::GaveUp,
                        _ => {}
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "chat output fell behind");
                }
                Err(RecvError::Closed) => break Exit::GaveUp,
            },
        }
    };

    input.finish();
    handle.shutdown().await;

    match exit {
        Exit::User => println!("\n  {}", style("Chat closed.").dim()),
        Exit::LoggedOut => anyhow::bail!("Your session has ended. Run: fusion login"),
        Exit::GaveUp => anyhow::bail!("Lost connection to the chat server."),
    }
    Ok(())
}
