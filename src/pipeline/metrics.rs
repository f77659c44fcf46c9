//! Per-item analytics from stock, sales, cost and item master inputs.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::cost::CostLookup;
use super::items::ItemMaster;
use super::keys::KeyedLookup;
use super::transactions::TransactionTotals;
use crate::config::COVERAGE_SENTINEL_DAYS;
use crate::models::{AnalyticsRecord, StockRow};
use crate::period::{parse_date_prefix, ReportPeriod};

/// Period-wide parameters shared by every record of one report.
#[derive(Debug, Clone, Copy)]
pub struct MetricsContext {
    pub period: ReportPeriod,
    /// Items registered strictly after this date are new products.
    pub new_product_cutoff: NaiveDate,
}

/// Build one record per distinct stock item code, in snapshot order.
///
/// Codes are trimmed; the first snapshot row for a code wins. Sales match on
/// the trimmed code only, so codes differing in case never share sales. Missing sales
/// default to zero, missing costs to zero cost with the snapshot's received
/// quantity, and missing master rows to the snapshot's own descriptive
/// fields. Ranks are left unset.
pub fn calculate(
    stock: &[StockRow],
    sales: &KeyedLookup<TransactionTotals>,
    costs: &dyn CostLookup,
    items: &ItemMaster,
    ctx: &MetricsContext,
) -> Vec<AnalyticsRecord> {
    let days = ctx.period.days_diff();
    let mut seen: HashSet<String> = HashSet::with_capacity(stock.len());
    let mut records = Vec::with_capacity(stock.len());
    let mut without_cost = 0usize;

    for row in stock {
        let Some(code) = row.item_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
            tracing::warn!("stock row without item code skipped");
            continue;
        };
        if !seen.insert(code.to_string()) {
            tracing::debug!(item_code = code, "duplicate stock row ignored");
            continue;
        }

        let sold = sales.get_trimmed(code).cloned().unwrap_or_default();
        let cost = costs.cost_for(code);
        if cost.is_none() {
            without_cost += 1;
        }
        let details = items.get(code);

        let description = details
            .and_then(|d| d.description.clone())
            .or_else(|| row.description.clone())
            .unwrap_or_default();
        let group = details
            .and_then(|d| d.group_description.clone())
            .or_else(|| row.group_description.clone())
            .unwrap_or_default();
        let registered_at = details
            .and_then(|d| d.registered_at.clone())
            .or_else(|| row.registered_at.clone());

        let mut record = AnalyticsRecord {
            item_code: code.to_string(),
            description,
            group,
            is_new_product: is_new_product(registered_at.as_deref(), ctx.new_product_cutoff),
            registered_at,
            physical_qty: row.physical_qty,
            available_qty: row.available_qty,
            reserved_qty: row.reserved_qty,
            received_qty: cost.map_or(row.received_qty, |c| c.received_qty),
            stock_limit: row.stock_limit,
            quantity_sold: sold.quantity,
            total_sales_value: sold.value,
            average_cost: cost.map_or(0.0, |c| c.average_cost),
            last_sale_date: sold.last_date,
            ..AnalyticsRecord::default()
        };
        apply_indicators(&mut record, days);
        records.push(record);
    }

    if without_cost > 0 {
        tracing::warn!(items = without_cost, "items without a matching cost entry; average cost set to 0");
    }
    records
}

/// Fill the derived indicators of `record` from its quantities.
pub fn apply_indicators(record: &mut AnalyticsRecord, days_diff: u32) {
    let sold = record.quantity_sold.max(0.0);
    let physical = record.physical_qty.max(0.0);
    let days = f64::from(days_diff.max(1));

    record.average_sale_price = if sold > 0.0 {
        record.total_sales_value / sold
    } else {
        0.0
    };
    record.average_daily_sales = sold / days;
    record.turnover_ratio = if physical > 0.0 { sold / physical } else { 0.0 };
    record.percent_sold = if sold + physical > 0.0 {
        sold / (sold + physical) * 100.0
    } else {
        0.0
    };
    record.coverage_days = coverage_days(physical, record.average_daily_sales);
}

/// Days of stock left at the current daily pace.
///
/// No stock means no coverage; stock that is not moving gets the sentinel.
pub fn coverage_days(physical: f64, average_daily_sales: f64) -> f64 {
    if physical <= 0.0 {
        0.0
    } else if average_daily_sales > 0.0 {
        physical / average_daily_sales
    } else {
        COVERAGE_SENTINEL_DAYS
    }
}

pub fn is_new_product(registered_at: Option<&str>, cutoff: NaiveDate) -> bool {
    registered_at
        .and_then(parse_date_prefix)
        .is_some_and(|date| date > cutoff)
}
