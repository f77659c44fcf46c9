//! Store-agnostic query descriptions.
//!
//! A [`TableQuery`] names a table, the columns to project and a list of
//! filters. Each [`TabularStore`](crate::store::TabularStore) renders it into
//! its own dialect (parameterized SQL for DuckDB, query-string operators for
//! the REST backend). Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use stock_analytics::TableQuery;
//! let query = TableQuery::new("movements")
//!     .select(&["item_code", "quantity"])
//!     .where_eq("kind", "S")
//!     .where_gte("issued_at", "2024-01-01 00:00:00")
//!     .order_by(&["item_code"])
//!     .clone();
//! ```

use std::collections::HashMap;

use serde_json::{Map, Value};

/// A single row returned by a store, keyed by column name.
pub type Row = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
}

impl FilterOp {
    /// SQL comparison operator. `In` is rendered separately.
    pub fn sql_operator(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
        }
    }

    /// PostgREST operator prefix, as in `column=gte.value`.
    pub fn rest_operator(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gt => "gt",
            FilterOp::Lt => "lt",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
        }
    }
}

/// One condition on a column. Scalar operators carry exactly one value;
/// `In` carries the full membership list.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub table: String,
    /// Projected columns. Empty means all columns.
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order_by: Vec<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl TableQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Set the projected columns (replaces any previous selection).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.columns = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn where_eq<V: Into<Value>>(&mut self, column: &str, value: V) -> &mut Self {
        self.push(column, FilterOp::Eq, vec![value.into()])
    }

    pub fn where_gt<V: Into<Value>>(&mut self, column: &str, value: V) -> &mut Self {
        self.push(column, FilterOp::Gt, vec![value.into()])
    }

    pub fn where_lt<V: Into<Value>>(&mut self, column: &str, value: V) -> &mut Self {
        self.push(column, FilterOp::Lt, vec![value.into()])
    }

    pub fn where_gte<V: Into<Value>>(&mut self, column: &str, value: V) -> &mut Self {
        self.push(column, FilterOp::Gte, vec![value.into()])
    }

    pub fn where_lte<V: Into<Value>>(&mut self, column: &str, value: V) -> &mut Self {
        self.push(column, FilterOp::Lte, vec![value.into()])
    }

    /// Membership condition. An empty list matches nothing.
    pub fn where_in<V: Into<Value> + Clone>(&mut self, column: &str, values: &[V]) -> &mut Self {
        let values = values.iter().cloned().map(Into::into).collect();
        self.push(column, FilterOp::In, values)
    }

    /// Add ORDER BY columns. Pagination relies on a stable order, so paged
    /// reads should always set one.
    pub fn order_by(&mut self, cols: &[&str]) -> &mut Self {
        self.order_by.extend(cols.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Copy of this query restricted to one offset window.
    pub fn window(&self, limit: usize, offset: usize) -> TableQuery {
        let mut q = self.clone();
        q.limit = Some(limit);
        q.offset = Some(offset);
        q
    }

    fn push(&mut self, column: &str, op: FilterOp, values: Vec<Value>) -> &mut Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            values,
        });
        self
    }
}

/// Invocation of a server-side function with named arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Map<String, Value>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl FunctionCall {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Map::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn arg<V: Into<Value>>(&mut self, name: &str, value: V) -> &mut Self {
        self.args.insert(name.to_string(), value.into());
        self
    }

    pub fn window(&self, limit: usize, offset: usize) -> FunctionCall {
        let mut call = self.clone();
        call.limit = Some(limit);
        call.offset = Some(offset);
        call
    }
}

/// Render a scalar JSON value the way both backends expect it in a filter.
pub(crate) fn value_to_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
