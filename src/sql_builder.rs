//! SQL builder with parameterized query construction.
//!
//! All filter values go through DuckDB's parameter binding (`?` placeholders),
//! never through string interpolation. Builder methods return `&mut Self` for
//! chaining. [`SqlBuilder::from_query`] renders a store-agnostic
//! [`TableQuery`](crate::query::TableQuery).
//!
//! # Example
//!
//! ```rust
//! use stock_analytics::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("movements")
//!     .where_eq("kind", "S")
//!     .where_gte("issued_at", "2024-01-01 00:00:00")
//!     .order_by(&["item_code"])
//!     .limit(10)
//!     .build();
//! ```

use crate::query::{value_to_param, FilterOp, TableQuery};

/// Builds parameterized SQL queries safely.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table or view.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: quote_ident(table),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// Translate a [`TableQuery`] into a builder with the same projection,
    /// filters, ordering and window.
    pub fn from_query(query: &TableQuery) -> Self {
        let mut builder = SqlBuilder::new(&query.table);
        if !query.columns.is_empty() {
            let cols: Vec<&str> = query.columns.iter().map(String::as_str).collect();
            builder.select(&cols);
        }
        for filter in &query.filters {
            let values: Vec<String> = filter.values.iter().map(value_to_param).collect();
            if filter.op == FilterOp::In {
                let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                builder.where_in(&filter.column, &refs);
                continue;
            }
            let value = values.first().map(String::as_str).unwrap_or("");
            builder.where_op(&filter.column, filter.op.sql_operator(), value);
        }
        let order: Vec<&str> = query.order_by.iter().map(String::as_str).collect();
        builder.order_by(&order);
        if let Some(n) = query.limit {
            builder.limit(n);
        }
        if let Some(n) = query.offset {
            builder.offset(n);
        }
        builder
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| quote_ident(c)).collect();
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an IN condition with parameterized values.
    ///
    /// Empty values list produces `FALSE`.
    pub fn where_in(&mut self, column: &str, values: &[&str]) -> &mut Self {
        if values.is_empty() {
            self.where_clauses.push("FALSE".to_string());
            return self;
        }
        let placeholders: Vec<&str> = values.iter().map(|_| "?").collect();
        self.where_clauses.push(format!(
            "{} IN ({})",
            quote_ident(column),
            placeholders.join(", ")
        ));
        self.params.extend(values.iter().map(|v| v.to_string()));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_op(column, "=", value)
    }

    /// Add a greater-than condition: `{column} > ?`.
    pub fn where_gt(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_op(column, ">", value)
    }

    /// Add a less-than condition: `{column} < ?`.
    pub fn where_lt(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_op(column, "<", value)
    }

    /// Add a greater-than-or-equal condition: `{column} >= ?`.
    pub fn where_gte(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_op(column, ">=", value)
    }

    /// Add a less-than-or-equal condition: `{column} <= ?`.
    pub fn where_lte(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_op(column, "<=", value)
    }

    /// Add ORDER BY columns.
    pub fn order_by(&mut self, cols: &[&str]) -> &mut Self {
        self.order_by_cols.extend(cols.iter().map(|c| quote_ident(c)));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Set the number of rows to skip before returning results.
    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        if let Some(n) = self.offset_val {
            parts.push(format!("OFFSET {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }

    fn where_op(&mut self, column: &str, op: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} {} ?", quote_ident(column), op));
        self.params.push(value.to_string());
        self
    }
}

/// Double-quote an identifier, escaping embedded quotes. `*` passes through.
pub fn quote_ident(name: &str) -> String {
    if name == "*" {
        return name.to_string();
    }
    format!("\"{}\"", name.replace('"', "\"\""))
}
