//! CLI command definitions for the `fusion` binary.
//!
//! Uses clap derive macros for argument parsing. Storefront commands sit at
//! the top level (`fusion products`, `fusion cart add 3`); back-office
//! commands live under `fusion admin`.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod orders;
pub mod output;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Terminal client for the Fusion storefront.
#[derive(Parser)]
#[command(name = "fusion", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(
        long,
        global = true,
        env = "FUSION_OTEL",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password.
    Login {
        /// Account email (prompted when omitted).
        #[arg(long)]
        email: Option<String>,
    },

    /// Log in with a token issued by the Google identity provider.
    #[command(name = "login-google")]
    LoginGoogle {
        /// ID token from the provider (prompted when omitted).
        #[arg(long)]
        token: Option<String>,
    },

    /// Create an account, then log in with it.
    Register {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Log out and clear the cart and chat history.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Browse the product catalog.
    Products {
        /// Page number (starting at 1).
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Show one product with its reviews and recommendations.
    Product {
        /// Product id.
        id: i64,
    },

    /// List product categories.
    Categories,

    /// Review a product.
    Review {
        /// Product id.
        product: i64,

        /// Rating from 1 to 5.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,

        /// Review text.
        #[arg(long)]
        text: String,
    },

    /// Manage the shopping cart.
    Cart {
        #[command(subcommand)]
        action: cart::CartCommand,
    },

    /// Pay for the cart.
    Checkout {
        /// Payment method reference issued by the processor (e.g. `pm_card_visa`).
        #[arg(long)]
        payment_method: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Show order history.
    Orders {
        /// Page number (starting at 1).
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Chat with customer support.
    Chat,

    /// Back-office commands (staff accounts only).
    Admin {
        #[command(subcommand)]
        action: admin::AdminCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Commands {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::LoginGoogle { .. } => "login-google",
            Commands::Register { .. } => "register",
            Commands::Logout => "logout",
            Commands::Whoami => "whoami",
            Commands::Products { .. } => "products",
            Commands::Product { .. } => "product",
            Commands::Categories => "categories",
            Commands::Review { .. } => "review",
            Commands::Cart { .. } => "cart",
            Commands::Checkout { .. } => "checkout",
            Commands::Orders { .. } => "orders",
            Commands::Chat => "chat",
            Commands::Admin { .. } => "admin",
            Commands::Completions { .. } => "completions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn page_zero_is_rejected() {
        assert!(Cli::try_parse_from(["fusion", "products", "--page", "0"]).is_err());
        assert!(Cli::try_parse_from(["fusion", "orders", "--page", "0"]).is_err());
        assert!(Cli::try_parse_from(["fusion", "orders", "--page", "2"]).is_ok());
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_cart_add_with_quantity() {
        let cli = Cli::try_parse_from(["fusion", "cart", "add", "3", "--quantity", "2"]).unwrap();
        match cli.command {
            Commands::Cart {
                action: cart::CartCommand::Add { id, quantity },
            } => {
                assert_eq!(id, 3);
                assert_eq!(quantity, 2);
            }
            _ => panic!("expected cart add"),
        }
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["fusion", "review", "1", "--rating", "6", "--text", "x"]).is_err());
        assert!(Cli::try_parse_from(["fusion", "review", "1", "--rating", "5", "--text", "x"]).is_ok());
    }

    #[test]
    fn admin_inventory_sort_flags() {
        let cli = Cli::try_parse_from(["fusion", "--json", "admin", "inventory", "--sort", "days", "--desc"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.command.name(), "admin");
    }
}
