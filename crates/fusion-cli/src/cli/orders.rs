//! Order history.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use fusion_types::order::Order;

use crate::cli::output::{
    format_time, notice, page_request_error, paginate, print_json, print_page_footer, spinner,
};
use crate::state::AppState;

fn items_summary(order: &Order) -> String {
    order
        .items
        .iter()
        .map(|item| format!("{} x {}", item.quantity, item.product.name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn list_orders(state: &AppState, page: u32, json: bool) -> Result<()> {
    state.require_login()?;

    let spinner = spinner("Loading orders...");
    let result = state.api.list_orders(page).await;
    spinner.finish_and_clear();
    let orders = result.map_err(|e| page_request_error(e, page))?;

    if json {
        return print_json(&orders);
    }
    if orders.is_empty() {
        notice("No Order History");
        return Ok(());
    }

    let paginator = paginate(orders.count, state.config.page_size, page)?;
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Order").fg(Color::Cyan),
            Cell::new("Date").fg(Color::Cyan),
            Cell::new("Items").fg(Color::Cyan),
            Cell::new("Total").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
        ]);
    for order in &orders.results {
        let status = if order.paid {
            Cell::new("paid").fg(Color::Green)
        } else {
            Cell::new("pending").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(format!("#{}", order.id)),
            Cell::new(format_time(&order.created_at)),
            Cell::new(items_summary(order)),
            Cell::new(format!("${}", order.total_price)),
            status,
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style(format!("{} order(s) in total", orders.count)).dim()
    );
    println!();
    print_page_footer(&paginator, "fusion orders");
    Ok(())
}
