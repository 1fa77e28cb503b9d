//! Back-office commands. Every handler requires a staff session.

pub mod documents;
pub mod inventory;
pub mod products;

use anyhow::Result;
use clap::Subcommand;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Create, update or delete products.
    Products {
        #[command(subcommand)]
        action: products::ProductCommand,
    },

    /// Draft product copy from a name, category and image.
    #[command(name = "generate-content")]
    GenerateContent {
        /// Product name.
        #[arg(long)]
        name: String,

        /// Category name.
        #[arg(long)]
        category: String,

        /// Path to the product image.
        #[arg(long)]
        image: String,
    },

    /// Inventory insight dashboard.
    Inventory {
        /// Column to sort by.
        #[arg(long, value_enum, default_value = "status")]
        sort: inventory::SortColumn,

        /// Sort descending.
        #[arg(long)]
        desc: bool,
    },

    /// Manage knowledge-base documents used by the support bot.
    Documents {
        #[command(subcommand)]
        action: documents::DocumentCommand,
    },

    /// Chat with a customer.
    Chat {
        /// Customer user id.
        customer_id: i64,
    },
}

pub async fn handle_admin_command(cmd: AdminCommand, state: &AppState, json: bool) -> Result<()> {
    state.require_admin()?;
    match cmd {
        AdminCommand::Products { action } => products::handle_product_command(action, state, json).await,
        AdminCommand::GenerateContent { name, category, image } => {
            products::generate_content(state, name, category, &image, json).await
        }
        AdminCommand::Inventory { sort, desc } => inventory::show_inventory(state, sort, desc, json).await,
        AdminCommand::Documents { action } => documents::handle_document_command(action, state, json).await,
        AdminCommand::Chat { customer_id } => crate::cli::chat::run_admin_chat(state, customer_id).await,
    }
}
