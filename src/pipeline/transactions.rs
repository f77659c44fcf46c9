//! Sales and purchase aggregation by item code.

use chrono::NaiveDateTime;

use super::keys::KeyedLookup;
use crate::models::TransactionRow;
use crate::period::parse_timestamp;

/// Accumulated movement totals for one item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTotals {
    pub quantity: f64,
    /// Sum of quantity × unit price.
    pub value: f64,
    /// Latest movement date, as written by the source.
    pub last_date: Option<String>,
    last_seen: Option<NaiveDateTime>,
}

impl TransactionTotals {
    fn add(&mut self, row: &TransactionRow) {
        let quantity = non_negative(row.quantity);
        let price = non_negative(row.unit_price);
        self.quantity += quantity;
        self.value += quantity * price;

        if let Some(raw) = row.issued_at.as_deref() {
            if let Some(ts) = parse_timestamp(raw) {
                if self.last_seen.map_or(true, |seen| ts > seen) {
                    self.last_seen = Some(ts);
                    self.last_date = Some(raw.trim().to_string());
                }
            }
        }
    }

    /// `value / quantity`, or 0 when nothing moved.
    pub fn average_unit_value(&self) -> f64 {
        if self.quantity > 0.0 {
            self.value / self.quantity
        } else {
            0.0
        }
    }
}

/// Group outbound sales by item code.
///
/// Rows without an item code are skipped, as are rows explicitly flagged
/// with another kind. Negative or missing quantities and prices count as 0.
pub fn aggregate_sales(rows: &[TransactionRow], sales_kind: &str) -> KeyedLookup<TransactionTotals> {
    aggregate(rows, |row| flag_matches(row.kind.as_deref(), sales_kind))
}

/// Group inbound purchases by item code. A row counts when its kind and
/// transaction type match the purchase codes (or are absent because the
/// store already filtered on them).
pub fn aggregate_purchases(
    rows: &[TransactionRow],
    purchase_kind: &str,
    transaction_type: &str,
) -> KeyedLookup<TransactionTotals> {
    aggregate(rows, |row| {
        flag_matches(row.kind.as_deref(), purchase_kind)
            && flag_matches(row.transaction_type.as_deref(), transaction_type)
    })
}

fn aggregate<F>(rows: &[TransactionRow], include: F) -> KeyedLookup<TransactionTotals>
where
    F: Fn(&TransactionRow) -> bool,
{
    let mut totals: KeyedLookup<TransactionTotals> = KeyedLookup::new();
    let mut skipped = 0usize;
    for row in rows {
        let Some(code) = row.item_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
            skipped += 1;
            continue;
        };
        if !include(row) {
            skipped += 1;
            continue;
        }
        totals.entry_or_default(code).add(row);
    }
    if skipped > 0 {
        tracing::debug!(skipped, "movement rows skipped during aggregation");
    }
    totals
}

fn flag_matches(actual: Option<&str>, expected: &str) -> bool {
    actual.map_or(true, |a| a.trim().eq_ignore_ascii_case(expected.trim()))
}

fn non_negative(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}
