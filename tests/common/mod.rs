//! Shared test fixtures for the integration tests.
//!
//! `setup_sample_db()` creates an in-memory DuckDB connection populated with
//! small stock, item master, movement and cost tables via NDJSON temp files.
//! `ScriptedStore` wraps any store and injects failures per table/function.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use serde_json::json;
use stock_analytics::{AnalyticsError, Connection, FunctionCall, Result, Row, TableQuery, TabularStore};
use tempfile::NamedTempFile;

/// Create a `Connection` with the standard sample tables:
///
/// | code | physical | sold in March 2024      | cost view row          |
/// |------|----------|-------------------------|------------------------|
/// | A    | 500      | 50 (30 @ 10, 20 @ 12.5) | `A`, cost 6.5          |
/// | B    | 200      | 50 @ 8                  | `" b "`, cost 4.25     |
/// | C    | 0        | 5 @ 20                  | none                   |
/// | D    | 40       | 0                       | `d`, NULL cost         |
///
/// Stock also holds a row for another location, and movements hold sales
/// outside the period, neither of which may leak into results. Item codes
/// are unique per table so paged reads see a stable order.
pub fn setup_sample_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    register_stock(&conn);
    register_item_master(&conn);
    register_movements(&conn);
    register_cost_view(&conn);
    conn
}

fn register_stock(conn: &Connection) {
    let rows = vec![
        json!({"item_code": "A", "location": "01", "physical_qty": 500, "available_qty": 480, "reserved_qty": 20, "received_qty": 600, "stock_limit": 800, "description": "Snapshot A", "group_description": "Snap", "registered_at": "2023-06-01"}),
        json!({"item_code": "B", "location": "01", "physical_qty": 200, "available_qty": 200, "reserved_qty": 0, "received_qty": 250, "stock_limit": 300, "description": "Snapshot B", "group_description": "Snap", "registered_at": "2024-02-20"}),
        json!({"item_code": "C", "location": "01", "physical_qty": 0, "available_qty": 0, "reserved_qty": 0, "received_qty": 5, "stock_limit": 50, "description": "Snapshot C", "group_description": "Snap", "registered_at": "2023-01-01"}),
        json!({"item_code": "D", "location": "01", "physical_qty": 40, "available_qty": 40, "reserved_qty": 0, "received_qty": 40, "stock_limit": 60, "description": "Only in snapshot", "group_description": "Loose", "registered_at": "2024-03-05"}),
        json!({"item_code": "Z", "location": "02", "physical_qty": 10, "available_qty": 10, "reserved_qty": 0, "received_qty": 10, "stock_limit": 10, "description": "Other site", "group_description": "Snap", "registered_at": "2023-06-01"}),
    ];
    write_ndjson_and_register(conn, "stock_snapshot", &rows);
}

fn register_item_master(conn: &Connection) {
    let rows = vec![
        json!({"item_code": "A", "description": "Angle bracket", "group_description": "Hardware", "registered_at": "2023-06-01"}),
        json!({"item_code": "B", "description": "Box hinge", "group_description": "Hardware", "registered_at": "2024-02-20"}),
        json!({"item_code": "C", "description": "Cable tie", "group_description": "Electrical", "registered_at": "2023-01-01"}),
        json!({"item_code": "Q", "description": "Not stocked", "group_description": "Other", "registered_at": "2023-01-01"}),
    ];
    write_ndjson_and_register(conn, "item_master", &rows);
}

fn register_movements(conn: &Connection) {
    let rows = vec![
        // Sales inside March 2024
        sale("A", 30, 10.0, "2024-03-02 10:00:00"),
        sale("A", 20, 12.5, "2024-03-31 18:30:00"),
        sale("B", 50, 8.0, "2024-03-15 09:00:00"),
        sale("C", 5, 20.0, "2024-03-10 11:00:00"),
        // Outside the period
        sale("A", 1000, 1.0, "2024-02-28 12:00:00"),
        sale("B", 1000, 1.0, "2024-04-01 00:00:01"),
        // Purchases
        purchase("A", 100, 6.0, "1102", "2024-03-01 08:00:00"),
        purchase("A", 100, 7.0, "1102", "2024-03-20 08:00:00"),
        purchase("B", 10, 3.0, "1500", "2024-03-05 08:00:00"),
    ];
    write_ndjson_and_register(conn, "movements", &rows);
}

fn register_cost_view(conn: &Connection) {
    let rows = vec![
        json!({"ITEM_CODE": "A", "AVERAGE_COST": 6.5, "RECEIVED_QTY": 200}),
        json!({"ITEM_CODE": " b ", "AVERAGE_COST": 4.25, "RECEIVED_QTY": 30}),
        json!({"ITEM_CODE": "d", "AVERAGE_COST": null, "RECEIVED_QTY": 40}),
    ];
    write_ndjson_and_register(conn, "item_cost_view", &rows);
}

pub fn sale(code: &str, qty: i64, price: f64, at: &str) -> serde_json::Value {
    json!({"item_code": code, "quantity": qty, "unit_price": price, "issued_at": at, "kind": "S", "transaction_type": "5102"})
}

pub fn purchase(code: &str, qty: i64, price: f64, ty: &str, at: &str) -> serde_json::Value {
    json!({"item_code": code, "quantity": qty, "unit_price": price, "issued_at": at, "kind": "E", "transaction_type": ty})
}

/// Register the analytics function over a fixture table of ready-made rows.
pub fn register_analytics_function(conn: &Connection, rows: &[serde_json::Value]) {
    write_ndjson_and_register(conn, "analytics_fixture", rows);
    conn.register_function(
        "inventory_analytics",
        "SELECT * FROM analytics_fixture WHERE location = ? ORDER BY itemCode",
        &["p_location"],
    );
}

/// Write a slice of JSON values as NDJSON to a temp file and register it
/// as a DuckDB table via `Connection::register_table_from_ndjson`.
pub fn write_ndjson_and_register(conn: &Connection, table_name: &str, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_ndjson(table_name, path).unwrap();
    // DuckDB has copied the data into an in-memory table by now.
}

/// Wraps a store, records every request, and fails chosen tables/functions.
pub struct ScriptedStore<S> {
    inner: S,
    failing_tables: HashSet<String>,
    failing_functions: HashSet<String>,
    /// Fail a function only for windows at or beyond this offset.
    fail_function_from_offset: HashMap<String, usize>,
    pub fetches: RefCell<Vec<TableQuery>>,
    pub calls: RefCell<Vec<FunctionCall>>,
}

impl<S: TabularStore> ScriptedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_tables: HashSet::new(),
            failing_functions: HashSet::new(),
            fail_function_from_offset: HashMap::new(),
            fetches: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn fail_table(mut self, table: &str) -> Self {
        self.failing_tables.insert(table.to_string());
        self
    }

    pub fn fail_function(mut self, name: &str) -> Self {
        self.failing_functions.insert(name.to_string());
        self
    }

    pub fn fail_function_from(mut self, name: &str, offset: usize) -> Self {
        self.fail_function_from_offset.insert(name.to_string(), offset);
        self
    }

    pub fn fetch_count(&self, table: &str) -> usize {
        self.fetches.borrow().iter().filter(|q| q.table == table).count()
    }
}

impl<S: TabularStore> TabularStore for ScriptedStore<S> {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Row>> {
        self.fetches.borrow_mut().push(query.clone());
        if self.failing_tables.contains(&query.table) {
            return Err(AnalyticsError::Remote {
                status: 503,
                body: format!("{} unavailable", query.table),
            });
        }
        self.inner.fetch(query)
    }

    fn call(&self, call: &FunctionCall) -> Result<Vec<Row>> {
        self.calls.borrow_mut().push(call.clone());
        let offset = call.offset.unwrap_or(0);
        let fails_here = self
            .fail_function_from_offset
            .get(&call.name)
            .is_some_and(|from| offset >= *from);
        if self.failing_functions.contains(&call.name) || fails_here {
            return Err(AnalyticsError::Remote {
                status: 500,
                body: format!("{} failed", call.name),
            });
        }
        self.inner.call(call)
    }
}

/// A store where every request fails.
pub struct DownStore;

impl TabularStore for DownStore {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Row>> {
        Err(AnalyticsError::Remote {
            status: 503,
            body: format!("{} unreachable", query.table),
        })
    }

    fn call(&self, call: &FunctionCall) -> Result<Vec<Row>> {
        Err(AnalyticsError::Remote {
            status: 503,
            body: format!("{} unreachable", call.name),
        })
    }
}

/// A store serving fixed in-memory rows per table, honoring limit/offset.
pub struct MemoryStore {
    pub tables: HashMap<String, Vec<Row>>,
    pub max_rows: usize,
    pub requests: RefCell<usize>,
}

impl MemoryStore {
    pub fn new(max_rows: usize) -> Self {
        Self {
            tables: HashMap::new(),
            max_rows,
            requests: RefCell::new(0),
        }
    }

    pub fn with_table(mut self, name: &str, rows: Vec<serde_json::Value>) -> Self {
        let rows = rows
            .into_iter()
            .map(|v| serde_json::from_value::<Row>(v).unwrap())
            .collect();
        self.tables.insert(name.to_string(), rows);
        self
    }
}

impl TabularStore for MemoryStore {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Row>> {
        *self.requests.borrow_mut() += 1;
        let rows = self
            .tables
            .get(&query.table)
            .ok_or_else(|| AnalyticsError::NotFound(query.table.clone()))?;
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX).min(self.max_rows);
        Ok(rows.iter().skip(offset).take(limit).cloned().collect())
    }

    fn call(&self, call: &FunctionCall) -> Result<Vec<Row>> {
        Err(AnalyticsError::NotFound(call.name.clone()))
    }
}
