//! The remote tabular store seam.
//!
//! The engine never owns data. It reads tables and invokes server-side
//! functions through this trait, so the same pipeline runs against the REST
//! backend ([`RestStore`](crate::rest::RestStore)) or an embedded DuckDB
//! mirror ([`Connection`](crate::connection::Connection)).

use crate::error::Result;
use crate::query::{FunctionCall, Row, TableQuery};

pub trait TabularStore {
    /// Run one table read. Implementations honor `limit`/`offset` when set
    /// and may cap the page at their own maximum rows per request.
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Row>>;

    /// Invoke a server-side function returning a set of rows.
    fn call(&self, call: &FunctionCall) -> Result<Vec<Row>>;
}

impl<T: TabularStore + ?Sized> TabularStore for &T {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Row>> {
        (**self).fetch(query)
    }

    fn call(&self, call: &FunctionCall) -> Result<Vec<Row>> {
        (**self).call(call)
    }
}

impl<T: TabularStore + ?Sized> TabularStore for Box<T> {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Row>> {
        (**self).fetch(query)
    }

    fn call(&self, call: &FunctionCall) -> Result<Vec<Row>> {
        (**self).call(call)
    }
}
