//! Cart commands. The cart lives in the local data directory and survives
//! restarts; it is cleared on logout and after a successful checkout.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{presets, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use fusion_core::cart::Cart;
use fusion_core::payment::checkout as pay;
use fusion_types::catalog::ProductId;

use crate::cli::output::{notice, print_json, spinner, success};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart.
    #[command(alias = "ls")]
    List,

    /// Add a product to the cart.
    Add {
        /// Product id.
        id: i64,

        /// Units to add.
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },

    /// Set the quantity of a cart line (minimum 1).
    Set {
        /// Product id.
        id: i64,

        quantity: u32,
    },

    /// Remove a product from the cart.
    #[command(alias = "rm")]
    Remove {
        /// Product id.
        id: i64,
    },

    /// Empty the cart.
    Clear {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_cart_command(cmd: CartCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        CartCommand::List => show_cart(state, json),
        CartCommand::Add { id, quantity } => add_to_cart(state, id, quantity, json).await,
        CartCommand::Set { id, quantity } => set_quantity(state, id, quantity, json),
        CartCommand::Remove { id } => remove(state, id, json),
        CartCommand::Clear { force } => clear(state, force, json),
    }
}

fn cart_table(cart: &Cart) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Price").fg(Color::Cyan),
            Cell::new("Qty").fg(Color::Cyan),
            Cell::new("Subtotal").fg(Color::Cyan),
        ]);
    for item in cart.items() {
        table.add_row(vec![
            Cell::new(item.id),
            Cell::new(&item.name),
            Cell::new(format!("${}", item.price)).set_alignment(CellAlignment::Right),
            Cell::new(item.quantity).set_alignment(CellAlignment::Right),
            Cell::new(format!("${}", item.line_total())).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn cart_json(cart: &Cart) -> serde_json::Value {
    serde_json::json!({
        "items": cart.items(),
        "item_count": cart.item_count(),
        "total": cart.total(),
    })
}

pub fn show_cart(state: &AppState, json: bool) -> Result<()> {
    let cart = state.client.cart.snapshot();
    if json {
        return print_json(&cart_json(&cart));
    }
    if cart.is_empty() {
        notice("Your cart is empty.");
        return Ok(());
    }

    println!();
    println!("{}", cart_table(&cart));
    println!(
        "  {}  {} item(s), {}",
        style("Total:").bold(),
        cart.item_count(),
        style(format!("${}", cart.total())).green().bold()
    );
    println!();
    println!(
        "  {}",
        style("Check out with: fusion checkout --payment-method <pm_...>").dim()
    );
    println!();
    Ok(())
}

async fn add_to_cart(state: &AppState, id: i64, quantity: u32, json: bool) -> Result<()> {
    let spinner = spinner("Looking up product...");
    let result = state.api.get_product(ProductId(id)).await;
    spinner.finish_and_clear();
    let product = result?;

    if product.quantity == 0 {
        anyhow::bail!("'{}' is out of stock.", product.name);
    }

    let existing = state.client.cart.snapshot().get(product.id).map_or(0, |item| item.quantity);
    if existing == 0 {
        state.client.cart.add(&product);
        if quantity > 1 {
            state.client.cart.set_quantity(product.id, quantity);
        }
    } else {
        state.client.cart.set_quantity(product.id, existing.saturating_add(quantity));
    }

    let cart = state.client.cart.snapshot();
    if json {
        return print_json(&cart_json(&cart));
    }
    success(format!(
        "Added {} x {} (cart: {} item(s), ${})",
        quantity,
        style(&product.name).cyan(),
        cart.item_count(),
        cart.total()
    ));
    Ok(())
}

fn require_line(state: &AppState, id: ProductId) -> Result<()> {
    if state.client.cart.snapshot().get(id).is_none() {
        anyhow::bail!("Product {id} is not in your cart.");
    }
    Ok(())
}

fn set_quantity(state: &AppState, id: i64, quantity: u32, json: bool) -> Result<()> {
    let id = ProductId(id);
    require_line(state, id)?;
    state.client.cart.set_quantity(id, quantity);

    let cart = state.client.cart.snapshot();
    if json {
        return print_json(&cart_json(&cart));
    }
    let applied = cart.get(id).map_or(quantity, |item| item.quantity);
    success(format!("Quantity set to {applied} (total ${})", cart.total()));
    Ok(())
}

fn remove(state: &AppState, id: i64, json: bool) -> Result<()> {
    let id = ProductId(id);
    require_line(state, id)?;
    state.client.cart.remove(id);

    if json {
        return print_json(&cart_json(&state.client.cart.snapshot()));
    }
    success(format!("Removed product {id} from the cart"));
    Ok(())
}

fn clear(state: &AppState, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt("Empty the cart?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }
    state.client.cart.clear();

    if json {
        return print_json(&serde_json::json!({ "cleared": true }));
    }
    success("Cart cleared");
    Ok(())
}

/// Pay for the cart through the payment processor.
pub async fn checkout(state: &AppState, payment_method: &str, yes: bool, json: bool) -> Result<()> {
    state.require_login()?;
    let processor = state.payment_processor().map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let cart = state.client.cart.snapshot();
    if cart.is_empty() {
        anyhow::bail!("Your cart is empty.");
    }
    if !yes && !json {
        println!();
        println!("{}", cart_table(&cart));
        let confirmed = Confirm::new()
            .with_prompt(format!("Pay ${}?", cart.total()))
            .default(true)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let spinner = spinner("Processing payment...");
    let result = pay(&state.api, &processor, &state.client.cart, payment_method).await;
    spinner.finish_and_clear();

    let receipt = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    if json {
        return print_json(&serde_json::json!({
            "intent_id": receipt.intent_id,
            "total": receipt.total,
            "item_count": receipt.item_count,
        }));
    }
    success(format!(
        "Payment successful: {} item(s), {}",
        receipt.item_count,
        style(format!("${}", receipt.total)).green().bold()
    ));
    println!("  {}", style(format!("Reference: {}", receipt.intent_id)).dim());
    println!("  {}", style("See your orders with: fusion orders").dim());
    println!();
    Ok(())
}
