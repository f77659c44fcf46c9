use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::error::{AnalyticsError, Result};
use crate::query::Row;

// ---------------------------------------------------------------------------
// StockRow: physical stock snapshot for one location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockRow {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub item_code: Option<String>,
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
    /// Used when the item master has no row for this code.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub group_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub registered_at: Option<String>,
}

impl StockRow {
    pub const COLUMNS: &'static [&'static str] = &[
        "item_code",
        "physical_qty",
        "available_qty",
        "reserved_qty",
        "received_qty",
        "stock_limit",
        "description",
        "group_description",
        "registered_at",
    ];
}

// ---------------------------------------------------------------------------
// TransactionRow: one sales or purchase movement line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRow {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub item_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub issued_at: Option<String>,
    /// Direction flag: outbound sale or inbound movement.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub transaction_type: Option<String>,
}

impl TransactionRow {
    pub const COLUMNS: &'static [&'static str] = &[
        "item_code",
        "quantity",
        "unit_price",
        "issued_at",
        "kind",
        "transaction_type",
    ];
}

// ---------------------------------------------------------------------------
// ItemMasterRow: descriptive item attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemMasterRow {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub item_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub group_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub registered_at: Option<String>,
}

impl ItemMasterRow {
    pub const COLUMNS: &'static [&'static str] =
        &["item_code", "description", "group_description", "registered_at"];
}

/// Deserialize raw store rows into a typed model.
///
/// Fails on the first row whose shape does not fit `T`, naming its position.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let value = serde_json::Value::Object(row.into_iter().collect());
            serde_json::from_value(value)
                .map_err(|e| AnalyticsError::Malformed(format!("row {i}: {e}")))
        })
        .collect()
}
