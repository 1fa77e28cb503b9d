//! Inventory insight dashboard.

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{presets, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

use fusion_core::inventory::{InventoryColumn, InventorySort, SortDirection, sort_insights};
use fusion_types::inventory::{InventoryInsight, InventoryStatus};

use crate::cli::output::{notice, print_json, spinner};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortColumn {
    Status,
    Name,
    Quantity,
    Sold,
    /// Units sold in the last 30 days.
    Recent,
    /// Predicted days until stockout.
    Days,
}

impl From<SortColumn> for InventoryColumn {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Status => InventoryColumn::Status,
            SortColumn::Name => InventoryColumn::Name,
            SortColumn::Quantity => InventoryColumn::Quantity,
            SortColumn::Sold => InventoryColumn::Sold,
            SortColumn::Recent => InventoryColumn::SoldLast30Days,
            SortColumn::Days => InventoryColumn::DaysUntilStockout,
        }
    }
}

fn status_cell(status: InventoryStatus) -> Cell {
    let color = match status {
        InventoryStatus::Critical => Color::Red,
        InventoryStatus::Warning => Color::DarkYellow,
        InventoryStatus::LowStock => Color::Yellow,
        InventoryStatus::SlowMoving | InventoryStatus::Unsold => Color::DarkGrey,
        InventoryStatus::Healthy => Color::Green,
    };
    Cell::new(status.as_str()).fg(color)
}

fn insight_table(rows: &[InventoryInsight]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Status").fg(Color::Cyan),
            Cell::new("Product").fg(Color::Cyan),
            Cell::new("Stock").fg(Color::Cyan),
            Cell::new("Sold").fg(Color::Cyan),
            Cell::new("30 days").fg(Color::Cyan),
            Cell::new("Stockout in").fg(Color::Cyan),
            Cell::new("Insight").fg(Color::Cyan),
        ]);
    for row in rows {
        let stockout = match row.predicted_days_until_stockout {
            Some(days) => Cell::new(format!("{days} d")),
            None => Cell::new("-").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            status_cell(row.status),
            Cell::new(&row.name),
            Cell::new(row.quantity).set_alignment(CellAlignment::Right),
            Cell::new(row.total_units_sold).set_alignment(CellAlignment::Right),
            Cell::new(row.sales_last_30_days).set_alignment(CellAlignment::Right),
            stockout.set_alignment(CellAlignment::Right),
            Cell::new(&row.insight),
        ]);
    }
    table
}

pub async fn show_inventory(state: &AppState, column: SortColumn, desc: bool, json: bool) -> Result<()> {
    let spinner = spinner("Analyzing inventory...");
    let result = state.api.inventory_insights().await;
    spinner.finish_and_clear();
    let mut rows = result?;

    let direction = if desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    sort_insights(&mut rows, InventorySort::new(column.into(), direction));

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        notice("No products to analyze.");
        return Ok(());
    }

    let critical = rows
        .iter()
        .filter(|r| r.status == InventoryStatus::Critical)
        .count();
    println!();
    println!("{}", insight_table(&rows));
    if critical > 0 {
        println!(
            "  {} {} product(s) need restocking now.",
            style("!").red().bold(),
            critical
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_columns_map_to_core_columns() {
        assert_eq!(InventoryColumn::from(SortColumn::Days), InventoryColumn::DaysUntilStockout);
        assert_eq!(InventoryColumn::from(SortColumn::Recent), InventoryColumn::SoldLast30Days);
        assert_eq!(InventoryColumn::from(SortColumn::Status), InventoryColumn::default());
    }
}
