//! Embedded DuckDB store.
//!
//! Holds local mirrors of the remote tables (loaded from NDJSON exports) and
//! emulates server-side functions as named, parameterized SQL queries. Used
//! for offline analysis and as the backing store of the test suite.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection as DuckDbConnection;
use serde::de::DeserializeOwned;

use crate::error::{AnalyticsError, Result};
use crate::query::{value_to_param, FunctionCall, Row, TableQuery};
use crate::sql_builder::SqlBuilder;
use crate::store::TabularStore;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// A SQL query standing in for a server-side function. `params` lists the
/// argument names bound to the query's `?` placeholders, in order.
struct RegisteredFunction {
    sql: String,
    params: Vec<String>,
}

/// Wraps a DuckDB connection and implements [`TabularStore`] over it.
pub struct Connection {
    conn: DuckDbConnection,
    tables: RefCell<HashSet<String>>,
    functions: RefCell<HashMap<String, RegisteredFunction>>,
}

impl Connection {
    /// Open an in-memory DuckDB database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::wrap(DuckDbConnection::open_in_memory()?))
    }

    /// Open (or create) a DuckDB database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::wrap(DuckDbConnection::open(path)?))
    }

    fn wrap(conn: DuckDbConnection) -> Self {
        Self {
            conn,
            tables: RefCell::new(HashSet::new()),
            functions: RefCell::new(HashMap::new()),
        }
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// Dates and timestamps come back as ISO-8601 strings.
    pub fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>> {
        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        self.query_rows(sql, &param_values)
    }

    fn query_rows(&self, sql: &str, params: &[&dyn duckdb::ToSql]) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows_result = stmt.query(params)?;

        // Column metadata is only available after execution.
        let column_names: Vec<String> = {
            let executed = rows_result.as_ref().ok_or_else(|| {
                AnalyticsError::Malformed("statement finalized before reading columns".into())
            })?;
            executed
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect()
        };

        let mut out: Vec<Row> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Create (or replace) a table from a newline-delimited JSON file.
    ///
    /// Data is streamed from disk by DuckDB rather than parsed in Rust first.
    pub fn register_table_from_ndjson(&self, table_name: &str, ndjson_path: &str) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/").replace('\'', "''");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{table}\"; \
             CREATE TABLE \"{table}\" AS SELECT * FROM read_json_auto('{path}', format='newline_delimited')",
            table = table_name,
            path = path_fwd
        ))?;
        self.tables.borrow_mut().insert(table_name.to_string());
        tracing::debug!(table = table_name, path = %path_fwd, "registered table from ndjson");
        Ok(())
    }

    /// Register a named function backed by a SQL query.
    ///
    /// `params` names the function arguments bound, in order, to the `?`
    /// placeholders of `sql`. Calls supply arguments by name; missing ones
    /// are bound as NULL.
    pub fn register_function(&self, name: &str, sql: &str, params: &[&str]) {
        self.functions.borrow_mut().insert(
            name.to_string(),
            RegisteredFunction {
                sql: sql.to_string(),
                params: params.iter().map(|p| p.to_string()).collect(),
            },
        );
    }

    /// Check whether a table has been registered through this connection.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.borrow().contains(name)
    }

    /// Return the names of all tables registered through this connection.
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.borrow().iter().cloned().collect();
        names.sort();
        names
    }
}

impl TabularStore for Connection {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Row>> {
        let (sql, params) = SqlBuilder::from_query(query).build();
        self.execute(&sql, &params)
    }

    fn call(&self, call: &FunctionCall) -> Result<Vec<Row>> {
        let (sql, params) = {
            let functions = self.functions.borrow();
            let function = functions.get(&call.name).ok_or_else(|| {
                AnalyticsError::NotFound(format!("Unknown function: {}", call.name))
            })?;
            let mut sql = format!("SELECT * FROM ({}) AS fn_result", function.sql);
            if let Some(n) = call.limit {
                sql.push_str(&format!(" LIMIT {}", n));
            }
            if let Some(n) = call.offset {
                sql.push_str(&format!(" OFFSET {}", n));
            }
            let params: Vec<Option<String>> = function
                .params
                .iter()
                .map(|name| call.args.get(name).filter(|v| !v.is_null()).map(value_to_param))
                .collect();
            (sql, params)
        };

        let bound: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        self.query_rows(&sql, &bound)
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; fall back to a string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Date32(days) => NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_CE_DAYS)
            .map(|d| serde_json::Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Timestamp(unit, value) => {
            let micros = match unit {
                TimeUnit::Second => value.saturating_mul(1_000_000),
                TimeUnit::Millisecond => value.saturating_mul(1_000),
                TimeUnit::Microsecond => value,
                TimeUnit::Nanosecond => value / 1_000,
            };
            DateTime::from_timestamp_micros(micros)
                .map(|ts| {
                    serde_json::Value::String(ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
                })
                .unwrap_or(serde_json::Value::Null)
        }
        // Lists, structs, intervals and blobs have no place in the tabular rows
        // this engine reads.
        _ => serde_json::Value::Null,
    }
}
