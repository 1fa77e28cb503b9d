//! Sorting for the inventory insight dashboard.

use std::cmp::Ordering;

use fusion_types::inventory::InventoryInsight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryColumn {
    #[default]
    Status,
    Name,
    Quantity,
    Sold,
    SoldLast30Days,
    DaysUntilStockout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventorySort {
    pub column: InventoryColumn,
    pub direction: SortDirection,
}

impl InventorySort {
    pub fn new(column: InventoryColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// Stable sort of `rows` by `sort`. Missing values always go last,
/// whichever the direction.
pub fn sort_insights(rows: &mut [InventoryInsight], sort: InventorySort) {
    rows.sort_by(|a, b| {
        if sort.column == InventoryColumn::DaysUntilStockout {
            return match (a.predicted_days_until_stockout, b.predicted_days_until_stockout) {
                (Some(x), Some(y)) => directed(x.cmp(&y), sort.direction),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
        }
        let ordering = match sort.column {
            InventoryColumn::Status => a.status.cmp(&b.status),
            InventoryColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            InventoryColumn::Quantity => a.quantity.cmp(&b.quantity),
            InventoryColumn::Sold => a.total_units_sold.cmp(&b.total_units_sold),
            InventoryColumn::SoldLast30Days => a.sales_last_30_days.cmp(&b.sales_last_30_days),
            InventoryColumn::DaysUntilStockout => Ordering::Equal,
        };
        directed(ordering, sort.direction)
    });
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}
