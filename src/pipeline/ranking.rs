//! Dense sales ranking over a whole result set.

use std::cmp::Ordering;

use crate::models::AnalyticsRecord;

/// Sort `records` by quantity sold (descending, then item code) and assign
/// ranks.
///
/// An item's rank is the number of items that sold strictly more, plus one.
/// Tied items share a rank and the next lower quantity's rank skips by the
/// tie group's size. Items that sold nothing get no rank.
pub fn assign_ranks(records: &mut [AnalyticsRecord]) {
    records.sort_by(|a, b| {
        b.quantity_sold
            .partial_cmp(&a.quantity_sold)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item_code.cmp(&b.item_code))
    });

    let mut current_rank = 0u32;
    let mut previous: Option<f64> = None;
    for (position, record) in records.iter_mut().enumerate() {
        if record.quantity_sold.is_nan() || record.quantity_sold <= 0.0 {
            record.sales_rank = None;
            continue;
        }
        if previous != Some(record.quantity_sold) {
            current_rank = position as u32 + 1;
            previous = Some(record.quantity_sold);
        }
        record.sales_rank = Some(current_rank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sold(code: &str, qty: f64) -> AnalyticsRecord {
        AnalyticsRecord {
            item_code: code.to_string(),
            quantity_sold: qty,
            ..AnalyticsRecord::default()
        }
    }

    fn rank_of(records: &[AnalyticsRecord], code: &str) -> Option<u32> {
        records.iter().find(|r| r.item_code == code).and_then(|r| r.sales_rank)
    }

    #[test]
    fn ties_share_rank_and_next_rank_skips_group() {
        let mut records = vec![
            sold("A", 50.0),
            sold("B", 80.0),
            sold("C", 50.0),
            sold("D", 10.0),
            sold("E", 0.0),
        ];
        assign_ranks(&mut records);
        assert_eq!(rank_of(&records, "B"), Some(1));
        assert_eq!(rank_of(&records, "A"), Some(2));
        assert_eq!(rank_of(&records, "C"), Some(2));
        assert_eq!(rank_of(&records, "D"), Some(4));
        assert_eq!(rank_of(&records, "E"), None);
    }

    #[test]
    fn rank_equals_strictly_greater_count_plus_one() {
        let quantities = [3.0, 9.0, 3.0, 1.0, 9.0, 0.0, 4.0];
        let mut records: Vec<_> = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| sold(&format!("I{i}"), *q))
            .collect();
        assign_ranks(&mut records);
        for r in &records {
            let expected = if r.quantity_sold > 0.0 {
                Some(records.iter().filter(|o| o.quantity_sold > r.quantity_sold).count() as u32 + 1)
            } else {
                None
            };
            assert_eq!(r.sales_rank, expected, "item {}", r.item_code);
        }
    }

    #[test]
    fn nothing_sold_means_no_ranks() {
        let mut records = vec![sold("A", 0.0), sold("B", 0.0)];
        assign_ranks(&mut records);
        assert!(records.iter().all(|r| r.sales_rank.is_none()));
    }
}
