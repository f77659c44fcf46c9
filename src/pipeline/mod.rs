//! The shared reconciliation pipeline.
//!
//! Every non-synthetic acquisition path ends here: raw rows are aggregated,
//! joined by item code, turned into [`AnalyticsRecord`]s and ranked. Paths
//! differ only in which inputs they could obtain.

pub mod cost;
pub mod items;
pub mod keys;
pub mod metrics;
pub mod ranking;
pub mod transactions;

pub use cost::{CostEntry, CostLookup, CostResolver, NoCosts, PurchaseCosts};
pub use items::{ItemDetails, ItemMaster};
pub use keys::KeyedLookup;
pub use metrics::MetricsContext;
pub use transactions::{aggregate_purchases, aggregate_sales, TransactionTotals};

use crate::models::{AnalyticsRecord, StockRow};

/// Inputs gathered by one acquisition path.
pub struct PipelineInputs<'a> {
    pub stock: &'a [StockRow],
    pub sales: &'a KeyedLookup<TransactionTotals>,
    pub costs: &'a dyn CostLookup,
    pub items: &'a ItemMaster,
}

/// Compute and rank the analytics records for one report.
pub fn reconcile(inputs: &PipelineInputs<'_>, ctx: &MetricsContext) -> Vec<AnalyticsRecord> {
    let mut records = metrics::calculate(inputs.stock, inputs.sales, inputs.costs, inputs.items, ctx);
    ranking::assign_ranks(&mut records);
    records
}
