//! Paged and chunked reads through BatchExecutor.

mod common;

use common::{MemoryStore, ScriptedStore};
use serde_json::json;
use stock_analytics::{AnalyticsError, BatchExecutor, FunctionCall, TableQuery};

fn numbered_rows(n: usize) -> Vec<serde_json::Value> {
    (0..n).map(|i| json!({"item_code": format!("I{i:04}")})).collect()
}

// ---------------------------------------------------------------------------
// fetch_all
// ---------------------------------------------------------------------------

#[test]
fn reads_until_a_short_page() {
    let store = MemoryStore::new(1000).with_table("stock_snapshot", numbered_rows(2500));
    let rows = BatchExecutor::new(&store)
        .fetch_all(&TableQuery::new("stock_snapshot"), 1000)
        .unwrap();
    assert_eq!(rows.len(), 2500);
    assert_eq!(*store.requests.borrow(), 3);
    assert_eq!(rows[2499]["item_code"], "I2499");
}

#[test]
fn exact_multiple_needs_one_empty_page() {
    let store = MemoryStore::new(1000).with_table("stock_snapshot", numbered_rows(2000));
    let rows = BatchExecutor::new(&store)
        .fetch_all(&TableQuery::new("stock_snapshot"), 1000)
        .unwrap();
    assert_eq!(rows.len(), 2000);
    assert_eq!(*store.requests.borrow(), 3);
}

#[test]
fn empty_table_takes_one_request() {
    let store = MemoryStore::new(1000).with_table("stock_snapshot", vec![]);
    let rows = BatchExecutor::new(&store)
        .fetch_all(&TableQuery::new("stock_snapshot"), 1000)
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(*store.requests.borrow(), 1);
}

#[test]
fn server_cap_below_page_size_stops_early() {
    // A server that caps responses below the requested page size looks like
    // a short page; the page size has to match the server limit.
    let store = MemoryStore::new(100).with_table("stock_snapshot", numbered_rows(250));
    let rows = BatchExecutor::new(&store)
        .fetch_all(&TableQuery::new("stock_snapshot"), 1000)
        .unwrap();
    assert_eq!(rows.len(), 100);
}

#[test]
fn zero_page_size_is_rejected() {
    let store = MemoryStore::new(10).with_table("t", numbered_rows(5));
    let err = BatchExecutor::new(&store)
        .fetch_all(&TableQuery::new("t"), 0)
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidArgument(_)));
    assert_eq!(*store.requests.borrow(), 0);
}

#[test]
fn failed_page_aborts_the_read() {
    let store = ScriptedStore::new(MemoryStore::new(10)).fail_table("stock_snapshot");
    let err = BatchExecutor::new(&store)
        .fetch_all(&TableQuery::new("stock_snapshot"), 10)
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::Remote { status: 503, .. }));
}

#[test]
fn pages_carry_consecutive_offsets() {
    let store = ScriptedStore::new(MemoryStore::new(10).with_table("t", numbered_rows(25)));
    let mut query = TableQuery::new("t");
    query.order_by(&["item_code"]);
    BatchExecutor::new(&store).fetch_all(&query, 10).unwrap();

    let fetches = store.fetches.borrow();
    let windows: Vec<(Option<usize>, Option<usize>)> =
        fetches.iter().map(|q| (q.limit, q.offset)).collect();
    assert_eq!(
        windows,
        vec![(Some(10), Some(0)), (Some(10), Some(10)), (Some(10), Some(20))]
    );
    assert!(fetches.iter().all(|q| q.order_by == vec!["item_code"]));
}

// ---------------------------------------------------------------------------
// fetch_chunked
// ---------------------------------------------------------------------------

#[test]
fn keys_are_split_into_chunks() {
    let store = ScriptedStore::new(MemoryStore::new(1000).with_table("item_master", numbered_rows(3)));
    let keys: Vec<String> = (0..1200).map(|i| format!("K{i}")).collect();
    let rows = BatchExecutor::new(&store)
        .fetch_chunked(&TableQuery::new("item_master"), "item_code", &keys, 500, 1000)
        .unwrap();

    // MemoryStore ignores filters, so each chunk returns the whole table.
    assert_eq!(rows.len(), 9);
    let fetches = store.fetches.borrow();
    let sizes: Vec<usize> = fetches.iter().map(|q| q.filters[0].values.len()).collect();
    assert_eq!(sizes, vec![500, 500, 200]);
    assert_eq!(fetches[2].filters[0].values[0], "K1000");
}

#[test]
fn chunked_read_over_duckdb_matches_keys() {
    let conn = common::setup_sample_db();
    let keys = vec!["A".to_string(), "C".to_string(), "MISSING".to_string()];
    let mut query = TableQuery::new("item_master");
    query.order_by(&["item_code"]);
    let rows = BatchExecutor::new(&conn)
        .fetch_chunked(&query, "item_code", &keys, 2, 1)
        .unwrap();
    let codes: Vec<&str> = rows.iter().map(|r| r["item_code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["A", "C"]);
}

#[test]
fn no_keys_means_no_requests() {
    let store = MemoryStore::new(10).with_table("item_master", numbered_rows(3));
    let rows = BatchExecutor::new(&store)
        .fetch_chunked(&TableQuery::new("item_master"), "item_code", &[], 500, 1000)
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(*store.requests.borrow(), 0);
}

#[test]
fn zero_chunk_size_is_rejected() {
    let store = MemoryStore::new(10);
    let err = BatchExecutor::new(&store)
        .fetch_chunked(&TableQuery::new("t"), "c", &["a".to_string()], 0, 10)
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// call_paginated
// ---------------------------------------------------------------------------

#[test]
fn function_pages_until_short_page() {
    let conn = common::setup_sample_db();
    let rows: Vec<serde_json::Value> = (0..5)
        .map(|i| json!({"location": "01", "itemCode": format!("F{i}")}))
        .collect();
    common::register_analytics_function(&conn, &rows);
    let store = ScriptedStore::new(conn);

    let mut call = FunctionCall::new("inventory_analytics");
    call.arg("p_location", "01");
    let out = BatchExecutor::new(&store).call_paginated(&call, 2).unwrap();

    assert_eq!(out.len(), 5);
    let offsets: Vec<Option<usize>> = store.calls.borrow().iter().map(|c| c.offset).collect();
    assert_eq!(offsets, vec![Some(0), Some(2), Some(4)]);
}

#[test]
fn failing_function_page_is_an_error() {
    let store = ScriptedStore::new(MemoryStore::new(10)).fail_function("inventory_analytics");
    let err = BatchExecutor::new(&store)
        .call_paginated(&FunctionCall::new("inventory_analytics"), 10)
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::Remote { status: 500, .. }));
}
