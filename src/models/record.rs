use serde::{Deserialize, Serialize};

use super::lenient;

// ---------------------------------------------------------------------------
// AnalyticsRecord: one reconciled item for the requested period
// ---------------------------------------------------------------------------

/// Per-item analytics for one period and location.
///
/// Serialized with camelCase keys; the server-side aggregation function
/// returns rows in the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    pub item_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub registered_at: Option<String>,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub physical_qty: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub available_qty: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub reserved_qty: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub received_qty: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub stock_limit: f64,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub quantity_sold: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_sales_value: f64,
    /// Weighted by quantity: total sales value / quantity sold.
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub average_sale_price: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub average_cost: f64,
    #[serde(default)]
    pub last_sale_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub average_daily_sales: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub turnover_ratio: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub percent_sold: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub coverage_days: f64,
    #[serde(default)]
    pub is_new_product: bool,
    /// Dense rank by quantity sold; `None` for items that did not sell.
    #[serde(default)]
    pub sales_rank: Option<u32>,
    #[serde(default)]
    pub is_sample_data: bool,
}
