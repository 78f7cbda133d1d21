//! Threshold-based stock status derivation.

use serde::{Deserialize, Serialize};

use crate::part::Part;

/// Derived status band for a part, from comparing stock to two thresholds.
///
/// Never persisted; recomputed wherever it is shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    CriticalLow,
    LowStock,
    Normal,
}

impl StockStatus {
    /// Pure derivation. The critical band wins when the thresholds overlap:
    /// `stock <= critical` first, then `stock <= low`.
    pub fn derive(stock: i64, critical_threshold: i64, low_stock_threshold: i64) -> Self {
        if stock <= critical_threshold {
            StockStatus::CriticalLow
        } else if stock <= low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::Normal
        }
    }

    /// Display string used on the wire and in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::CriticalLow => "Critical Low",
            StockStatus::LowStock => "Low Stock",
            StockStatus::Normal => "Normal",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate counts across the catalogue (served by `GET /parts/summary`).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_items: u64,
    pub critical_count: u64,
    pub low_stock_count: u64,
}

/// Fold a set of parts into summary counts.
pub fn summarize<'a>(parts: impl IntoIterator<Item = &'a Part>) -> InventorySummary {
    let mut summary = InventorySummary::default();
    for part in parts {
        summary.total_items += 1;
        match part.status() {
            StockStatus::CriticalLow => summary.critical_count += 1,
            StockStatus::LowStock => summary.low_stock_count += 1,
            StockStatus::Normal => {}
        }
    }
    summary
}
