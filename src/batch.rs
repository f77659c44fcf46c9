//! Paginated reads over a [`TabularStore`].
//!
//! The store caps rows per response, so full result sets are collected by
//! requesting successive offset windows until a page comes back shorter than
//! the page size. Page requests are sequential; a failed page aborts the read
//! and the error goes to the caller, which decides whether to fall back.

use crate::error::{AnalyticsError, Result};
use crate::query::{FunctionCall, Row, TableQuery};
use crate::store::TabularStore;

pub struct BatchExecutor<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TabularStore + ?Sized> BatchExecutor<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Read every row matching `query`, `page_size` rows at a time.
    pub fn fetch_all(&self, query: &TableQuery, page_size: usize) -> Result<Vec<Row>> {
        check_page_size(page_size)?;
        let mut rows = Vec::new();
        let mut page = 0usize;
        loop {
            let batch = self.store.fetch(&query.window(page_size, page * page_size))?;
            page += 1;
            let len = batch.len();
            rows.extend(batch);
            tracing::debug!(
                table = %query.table,
                page,
                fetched = len,
                total = rows.len(),
                "fetched page"
            );
            if len < page_size {
                break;
            }
        }
        tracing::info!(table = %query.table, pages = page, total = rows.len(), "table read complete");
        Ok(rows)
    }

    /// Read rows whose `column` is in `keys`, splitting the keys into chunks
    /// of `chunk_size` so no single `IN` list exceeds the store's limits.
    /// Each chunk is itself paged.
    pub fn fetch_chunked(
        &self,
        query: &TableQuery,
        column: &str,
        keys: &[String],
        chunk_size: usize,
        page_size: usize,
    ) -> Result<Vec<Row>> {
        if chunk_size == 0 {
            return Err(AnalyticsError::InvalidArgument(
                "chunk size must be greater than zero".into(),
            ));
        }
        let mut rows = Vec::new();
        for (i, chunk) in keys.chunks(chunk_size).enumerate() {
            let mut chunk_query = query.clone();
            chunk_query.where_in(column, chunk);
            let batch = self.fetch_all(&chunk_query, page_size)?;
            tracing::debug!(
                table = %query.table,
                chunk = i + 1,
                keys = chunk.len(),
                fetched = batch.len(),
                "fetched key chunk"
            );
            rows.extend(batch);
        }
        Ok(rows)
    }

    /// Invoke a row-returning function window by window until a short page.
    pub fn call_paginated(&self, call: &FunctionCall, page_size: usize) -> Result<Vec<Row>> {
        check_page_size(page_size)?;
        let mut rows = Vec::new();
        let mut page = 0usize;
        loop {
            let batch = self.store.call(&call.window(page_size, page * page_size))?;
            page += 1;
            let len = batch.len();
            rows.extend(batch);
            tracing::debug!(
                function = %call.name,
                page,
                fetched = len,
                total = rows.len(),
                "fetched function page"
            );
            if len < page_size {
                break;
            }
        }
        Ok(rows)
    }
}

fn check_page_size(page_size: usize) -> Result<()> {
    if page_size == 0 {
        return Err(AnalyticsError::InvalidArgument(
            "page size must be greater than zero".into(),
        ));
    }
    Ok(())
}
