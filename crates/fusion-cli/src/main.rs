//! Fusion storefront and back-office CLI entry point.
//!
//! Binary name: `fusion`
//!
//! Parses CLI arguments, restores the persisted client state, then dispatches
//! to the appropriate command handler.

mod cli;
mod state;

use std::process::ExitCode;

use clap::Parser;
use clap_complete::generate;
use console::style;
use tracing::Instrument;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,fusion=debug",
        _ => "trace",
    };
    if let Err(e) = fusion_observe::tracing_setup::init_tracing(filter, cli.otel) {
        eprintln!("  {} tracing disabled: {e}", style("!").yellow().bold());
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "fusion", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    let outcome = run(cli).await;
    fusion_observe::tracing_setup::shutdown_tracing();

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {} {e:#}", style("✗").red().bold());
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;
    let span = tracing::info_span!("command", name = cli.command.name());
    let result = dispatch(&state, cli.command, cli.json).instrument(span).await;
    // Flushes pending persistence even when the command failed.
    state.shutdown().await;
    result
}

async fn dispatch(state: &AppState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Login { email } => cli::auth::login(state, email, json).await,
        Commands::LoginGoogle { token } => cli::auth::login_google(state, token, json).await,
        Commands::Register {
            email,
            first_name,
            last_name,
        } => cli::auth::register(state, email, first_name, last_name, json).await,
        Commands::Logout => cli::auth::logout(state, json),
        Commands::Whoami => cli::auth::whoami(state, json),

        Commands::Products { page } => cli::catalog::list_products(state, page, json).await,
        Commands::Product { id } => cli::catalog::show_product(state, id, json).await,
        Commands::Categories => cli::catalog::list_categories(state, json).await,
        Commands::Review {
            product,
            rating,
            text,
        } => cli::catalog::add_review(state, product, rating, text, json).await,

        Commands::Cart { action } => cli::cart::handle_cart_command(action, state, json).await,
        Commands::Checkout {
            payment_method,
            yes,
        } => cli::cart::checkout(state, &payment_method, yes, json).await,
        Commands::Orders { page } => cli::orders::list_orders(state, page, json).await,

        Commands::Chat => cli::chat::run_support_chat(state).await,
        Commands::Admin { action } => cli::admin::handle_admin_command(action, state, json).await,

        Commands::Completions { .. } => unreachable!("handled in main"),
    }
}
