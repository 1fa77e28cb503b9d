//! Inventory insight rows for the admin dashboard.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::ProductId;

/// Stock health classification computed by the backend.
///
/// Variant order is severity order, most urgent first; sorting by status uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryStatus {
    Critical,
    Warning,
    LowStock,
    SlowMoving,
    Unsold,
    Healthy,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Critical => "CRITICAL",
            InventoryStatus::Warning => "WARNING",
            InventoryStatus::LowStock => "LOW_STOCK",
            InventoryStatus::SlowMoving => "SLOW_MOVING",
            InventoryStatus::Unsold => "UNSOLD",
            InventoryStatus::Healthy => "HEALTHY",
        }
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryInsight {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub total_units_sold: u32,
    pub sales_last_30_days: u32,
    pub status: InventoryStatus,
    pub insight: String,
    /// `None` when there were no recent sales to project from.
    pub predicted_days_until_stockout: Option<u32>,
}
