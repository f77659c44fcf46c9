//! Average-cost sources.
//!
//! Cost comes either from a precomputed cost view ([`CostResolver`]) or from
//! the period's purchase movements ([`PurchaseCosts`]). Both answer the same
//! [`CostLookup`] question so the metrics step does not care which one the
//! acquisition path could reach.

use super::keys::KeyedLookup;
use super::transactions::TransactionTotals;
use crate::models::lenient::{value_as_f64, value_as_string};
use crate::query::Row;

const ITEM_CODE_ALIASES: &[&str] = &["itemcode", "code", "productcode"];
const AVERAGE_COST_ALIASES: &[&str] = &[
    "averagecost",
    "avgcost",
    "weightedaveragecost",
    "averageunitcost",
    "unitcost",
];
const RECEIVED_QTY_ALIASES: &[&str] = &[
    "receivedqty",
    "receivedquantity",
    "totalreceived",
    "qtyreceived",
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostEntry {
    pub average_cost: f64,
    pub received_qty: f64,
}

pub trait CostLookup {
    fn cost_for(&self, item_code: &str) -> Option<CostEntry>;
}

// ---------------------------------------------------------------------------
// CostResolver: precomputed cost view
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CostResolver {
    entries: KeyedLookup<CostEntry>,
    missing_cost: usize,
}

impl CostResolver {
    /// Normalize raw cost-view rows into canonical entries.
    ///
    /// Column names are matched ignoring case and underscores against known
    /// aliases. Rows without an item code are dropped. Rows whose cost is
    /// absent or unparseable are kept with a zero cost so the item still
    /// resolves, and reported as data-quality warnings.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut resolver = CostResolver::default();
        for row in rows {
            let normalized = NormalizedCostRow::from_row(row);
            let Some(code) = normalized.item_code else {
                tracing::warn!(columns = ?row.keys().collect::<Vec<_>>(), "cost row without item code skipped");
                continue;
            };
            let average_cost = match normalized.average_cost {
                Some(cost) => cost,
                None => {
                    resolver.missing_cost += 1;
                    tracing::warn!(item_code = %code, "cost row has no recognizable cost field; using 0");
                    0.0
                }
            };
            let entry = CostEntry {
                average_cost: average_cost.max(0.0),
                received_qty: normalized.received_qty.unwrap_or(0.0).max(0.0),
            };
            if !resolver.entries.insert_first(&code, entry) {
                tracing::debug!(item_code = %code, "duplicate cost row ignored");
            }
        }
        resolver
    }

    /// Number of rows recorded with a zero cost because the field was missing.
    pub fn missing_cost_count(&self) -> usize {
        self.missing_cost
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CostLookup for CostResolver {
    fn cost_for(&self, item_code: &str) -> Option<CostEntry> {
        self.entries.get(item_code).copied()
    }
}

struct NormalizedCostRow {
    item_code: Option<String>,
    average_cost: Option<f64>,
    received_qty: Option<f64>,
}

impl NormalizedCostRow {
    fn from_row(row: &Row) -> Self {
        let mut out = NormalizedCostRow {
            item_code: None,
            average_cost: None,
            received_qty: None,
        };
        for (key, value) in row {
            let folded = fold_key(key);
            if out.item_code.is_none() && ITEM_CODE_ALIASES.contains(&folded.as_str()) {
                out.item_code = value_as_string(value);
            } else if out.average_cost.is_none() && AVERAGE_COST_ALIASES.contains(&folded.as_str()) {
                out.average_cost = value_as_f64(value);
            } else if out.received_qty.is_none() && RECEIVED_QTY_ALIASES.contains(&folded.as_str()) {
                out.received_qty = value_as_f64(value);
            }
        }
        out
    }
}

/// `AVERAGE_COST`, `averageCost` and `average_cost` all fold to `averagecost`.
fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// PurchaseCosts: cost derived from purchase movements
// ---------------------------------------------------------------------------

/// Average cost per item computed as purchase value / purchased quantity.
#[derive(Debug, Default)]
pub struct PurchaseCosts {
    totals: KeyedLookup<TransactionTotals>,
}

impl PurchaseCosts {
    pub fn new(totals: KeyedLookup<TransactionTotals>) -> Self {
        Self { totals }
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl CostLookup for PurchaseCosts {
    fn cost_for(&self, item_code: &str) -> Option<CostEntry> {
        self.totals.get(item_code).map(|t| CostEntry {
            average_cost: t.average_unit_value(),
            received_qty: t.quantity,
        })
    }
}

/// No cost information at all.
pub struct NoCosts;

impl CostLookup for NoCosts {
    fn cost_for(&self, _item_code: &str) -> Option<CostEntry> {
        None
    }
}
