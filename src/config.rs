//! Engine configuration: table names, transaction codes and batch sizes.
//!
//! Every value has a default matching the observed deployment, so an empty
//! JSON object (or no config file at all) is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Coverage reported for items with stock on hand but no sales in the period.
pub const COVERAGE_SENTINEL_DAYS: f64 = 999.0;

/// Items registered within this many days of "today" are flagged as new.
pub const NEW_PRODUCT_WINDOW_DAYS: u64 = 60;

pub const DEFAULT_LOCATION: &str = "01";

/// Page and chunk sizes used by each acquisition step.
///
/// A page shorter than requested ends a read, so no page size may exceed the
/// store's per-response row cap (PostgREST `max-rows`, commonly 1000).
/// Anything above the cap silently truncates the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSizes {
    pub stock_page: usize,
    pub item_master_page: usize,
    /// Keys per `IN (...)` condition when loading the item master.
    pub item_master_chunk: usize,
    pub transactions_page: usize,
    pub cost_view_page: usize,
    pub function_page: usize,
}

impl Default for BatchSizes {
    fn default() -> Self {
        Self {
            stock_page: 1000,
            item_master_page: 1000,
            item_master_chunk: 500,
            transactions_page: 1000,
            cost_view_page: 1000,
            function_page: 1000,
        }
    }
}

/// Names of the remote tables and the codes that classify movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub stock_table: String,
    pub item_master_table: String,
    /// Table holding both sales and purchase movements.
    pub movements_table: String,
    pub cost_view: String,
    /// Server-side aggregation function returning analytics rows directly.
    pub analytics_function: String,
    pub default_location: String,
    /// Value of the movement `kind` column for outbound sales.
    pub sales_kind: String,
    /// Value of the movement `kind` column for inbound movements.
    pub purchase_kind: String,
    /// `transaction_type` code that marks an inbound movement as a purchase.
    pub purchase_transaction_type: String,
    pub new_product_window_days: u64,
    pub batch: BatchSizes,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stock_table: "stock_snapshot".to_string(),
            item_master_table: "item_master".to_string(),
            movements_table: "movements".to_string(),
            cost_view: "item_cost_view".to_string(),
            analytics_function: "inventory_analytics".to_string(),
            default_location: DEFAULT_LOCATION.to_string(),
            sales_kind: "S".to_string(),
            purchase_kind: "E".to_string(),
            purchase_transaction_type: "1102".to_string(),
            new_product_window_days: NEW_PRODUCT_WINDOW_DAYS,
            batch: BatchSizes::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load `config.json` from the platform config directory, or fall back
    /// to defaults when the file does not exist.
    pub fn from_default_location() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading engine config");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/stock-analytics/config.json`, e.g.
/// `~/.config/stock-analytics/config.json` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stock-analytics").join("config.json"))
}
