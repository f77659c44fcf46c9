//! Synthetic report used when no real acquisition path produced data.
//!
//! Records are generated from a fixed catalog with a seeded RNG, pushed
//! through the same indicator and ranking code as real data, and flagged
//! with `is_sample_data`. Generation cannot fail.

use chrono::{Datelike, Days};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::AnalyticsRecord;
use crate::pipeline::metrics::{apply_indicators, is_new_product};
use crate::pipeline::ranking::assign_ranks;
use crate::pipeline::MetricsContext;

const SAMPLE_SEED: u64 = 0x5eed_0f_57_0c;

/// (code, description, group)
const CATALOG: &[(&str, &str, &str)] = &[
    ("SMP-001", "Cordless drill 18V", "Power tools"),
    ("SMP-002", "Impact driver bit set", "Accessories"),
    ("SMP-003", "Claw hammer 16oz", "Hand tools"),
    ("SMP-004", "Measuring tape 5m", "Hand tools"),
    ("SMP-005", "Safety goggles", "Safety"),
    ("SMP-006", "Work gloves (pair)", "Safety"),
    ("SMP-007", "Wood screws 4x40 (box)", "Fasteners"),
    ("SMP-008", "Wall anchors 8mm (box)", "Fasteners"),
    ("SMP-009", "Angle grinder 115mm", "Power tools"),
    ("SMP-010", "Cutting disc 115mm", "Accessories"),
    ("SMP-011", "Spirit level 60cm", "Hand tools"),
    ("SMP-012", "Extension cord 10m", "Electrical"),
];

/// Build the synthetic record set for `ctx`. Deterministic per period.
pub fn sample_records(ctx: &MetricsContext) -> Vec<AnalyticsRecord> {
    let seed = SAMPLE_SEED ^ u64::from(ctx.period.start.num_days_from_ce().unsigned_abs());
    let mut rng = StdRng::seed_from_u64(seed);
    let days = ctx.period.days_diff();

    let mut records: Vec<AnalyticsRecord> = CATALOG
        .iter()
        .enumerate()
        .map(|(i, (code, description, group))| {
            let physical = f64::from(rng.gen_range(0u32..400));
            let reserved = (physical * rng.gen_range(0.0..0.2)).floor();
            // Every fourth item did not sell, so the sentinel paths show up.
            let sold = if i % 4 == 3 {
                0.0
            } else {
                f64::from(rng.gen_range(1u32..150))
            };
            let price = (rng.gen_range(2.0..250.0_f64) * 100.0).round() / 100.0;
            let cost = (price * rng.gen_range(0.45..0.8) * 100.0).round() / 100.0;

            // Alternate registrations inside and outside the new-product window.
            let registered = if i % 3 == 0 {
                ctx.new_product_cutoff.checked_add_days(Days::new(rng.gen_range(1..30)))
            } else {
                ctx.new_product_cutoff.checked_sub_days(Days::new(rng.gen_range(30..720)))
            };
            let registered_at = registered.map(|d| d.format("%Y-%m-%d").to_string());

            let mut record = AnalyticsRecord {
                item_code: code.to_string(),
                description: description.to_string(),
                group: group.to_string(),
                is_new_product: is_new_product(registered_at.as_deref(), ctx.new_product_cutoff),
                registered_at,
                physical_qty: physical,
                available_qty: physical - reserved,
                reserved_qty: reserved,
                received_qty: physical + sold,
                stock_limit: (physical * 1.5).ceil(),
                quantity_sold: sold,
                total_sales_value: sold * price,
                average_cost: cost,
                last_sale_date: (sold > 0.0).then(|| ctx.period.end.format("%Y-%m-%d").to_string()),
                is_sample_data: true,
                ..AnalyticsRecord::default()
            };
            apply_indicators(&mut record, days);
            record
        })
        .collect();

    assign_ranks(&mut records);
    records
}
