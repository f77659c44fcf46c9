//! Query construction: the SqlBuilder and how a TableQuery renders for each
//! backend.

use stock_analytics::rest::query_pairs;
use stock_analytics::{SqlBuilder, TableQuery};

// ---------------------------------------------------------------------------
// SqlBuilder
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_quoted_table() {
    let (sql, params) = SqlBuilder::new("stock_snapshot").build();
    assert_eq!(sql, "SELECT *\nFROM \"stock_snapshot\"");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("stock_snapshot")
        .select(&["item_code", "physical_qty"])
        .build();
    assert!(sql.starts_with("SELECT \"item_code\", \"physical_qty\"\n"));
}

#[test]
fn comparison_filters_bind_params_in_order() {
    let (sql, params) = SqlBuilder::new("movements")
        .where_eq("kind", "S")
        .where_gte("issued_at", "2024-03-01 00:00:00")
        .where_lte("issued_at", "2024-03-31 23:59:59")
        .build();
    assert!(sql.contains("WHERE \"kind\" = ? AND \"issued_at\" >= ? AND \"issued_at\" <= ?"));
    assert_eq!(params, vec!["S", "2024-03-01 00:00:00", "2024-03-31 23:59:59"]);
}

#[test]
fn strict_comparisons() {
    let (sql, params) = SqlBuilder::new("t").where_gt("a", "1").where_lt("b", "2").build();
    assert!(sql.contains("\"a\" > ? AND \"b\" < ?"));
    assert_eq!(params, vec!["1", "2"]);
}

#[test]
fn where_in_adds_in_clause() {
    let (sql, params) = SqlBuilder::new("item_master")
        .where_in("item_code", &["A", "B", "C"])
        .build();
    assert!(sql.contains("\"item_code\" IN (?, ?, ?)"));
    assert_eq!(params, vec!["A", "B", "C"]);
}

#[test]
fn where_in_empty_produces_false() {
    let (sql, params) = SqlBuilder::new("item_master")
        .where_in("item_code", &[])
        .build();
    assert!(sql.contains("WHERE FALSE"));
    assert!(params.is_empty());
}

#[test]
fn where_clause_passes_condition_through() {
    let (sql, params) = SqlBuilder::new("movements")
        .where_clause("quantity > ?", &["0"])
        .build();
    assert!(sql.contains("WHERE quantity > ?"));
    assert_eq!(params, vec!["0"]);
}

#[test]
fn order_limit_offset_come_last() {
    let (sql, _) = SqlBuilder::new("stock_snapshot")
        .order_by(&["item_code"])
        .limit(1000)
        .offset(2000)
        .build();
    assert!(sql.ends_with("ORDER BY \"item_code\"\nLIMIT 1000\nOFFSET 2000"));
}

#[test]
fn identifiers_with_quotes_are_escaped() {
    let (sql, _) = SqlBuilder::new("odd\"name").build();
    assert!(sql.contains("FROM \"odd\"\"name\""));
}

// ---------------------------------------------------------------------------
// TableQuery rendering
// ---------------------------------------------------------------------------

fn sales_query() -> TableQuery {
    let mut q = TableQuery::new("movements");
    q.select(&["item_code", "quantity"])
        .where_eq("kind", "S")
        .where_gte("issued_at", "2024-03-01 00:00:00")
        .order_by(&["item_code"]);
    q
}

#[test]
fn table_query_renders_to_sql() {
    let (sql, params) = SqlBuilder::from_query(&sales_query().window(500, 1000)).build();
    assert_eq!(
        sql,
        "SELECT \"item_code\", \"quantity\"\n\
         FROM \"movements\"\n\
         WHERE \"kind\" = ? AND \"issued_at\" >= ?\n\
         ORDER BY \"item_code\"\n\
         LIMIT 500\n\
         OFFSET 1000"
    );
    assert_eq!(params, vec!["S", "2024-03-01 00:00:00"]);
}

#[test]
fn numeric_filter_values_become_text_params() {
    let mut q = TableQuery::new("stock_snapshot");
    q.where_gt("physical_qty", 10).where_in("item_code", &["A", "B"]);
    let (sql, params) = SqlBuilder::from_query(&q).build();
    assert!(sql.contains("\"physical_qty\" > ? AND \"item_code\" IN (?, ?)"));
    assert_eq!(params, vec!["10", "A", "B"]);
}

#[test]
fn empty_membership_matches_nothing() {
    let mut q = TableQuery::new("item_master");
    q.where_in::<&str>("item_code", &[]);
    let (sql, _) = SqlBuilder::from_query(&q).build();
    assert!(sql.contains("WHERE FALSE"));
}

#[test]
fn table_query_renders_to_rest_pairs() {
    let pairs = query_pairs(&sales_query().window(500, 0));
    let get = |k: &str| -> Vec<&str> {
        pairs
            .iter()
            .filter(|(key, _)| key == k)
            .map(|(_, v)| v.as_str())
            .collect()
    };
    assert_eq!(get("select"), vec!["item_code,quantity"]);
    assert_eq!(get("kind"), vec!["eq.S"]);
    assert_eq!(get("issued_at"), vec!["gte.2024-03-01 00:00:00"]);
    assert_eq!(get("order"), vec!["item_code"]);
    assert_eq!(get("limit"), vec!["500"]);
    assert_eq!(get("offset"), vec!["0"]);
}

#[test]
fn window_leaves_the_original_untouched() {
    let base = sales_query();
    let page = base.window(10, 20);
    assert_eq!(base.limit, None);
    assert_eq!(page.limit, Some(10));
    assert_eq!(page.offset, Some(20));
    assert_eq!(page.filters, base.filters);
}
