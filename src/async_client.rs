//! Async wrapper around [`AnalyticsEngine`] for use in async runtimes.
//!
//! Reports run on tokio's blocking thread pool via
//! [`tokio::task::spawn_blocking`]: page requests are sequential blocking
//! I/O, so the async event loop stays free while a report is assembled.
//!
//! # Example
//!
//! ```no_run
//! use stock_analytics::{AnalyticsEngine, AsyncAnalyticsEngine, ReportRequest, RestStore};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let store = RestStore::builder("https://project.example.co").build().unwrap();
//!     let engine = AsyncAnalyticsEngine::new(AnalyticsEngine::builder(store).build());
//!
//!     let request = ReportRequest::new("2024-03-01", "2024-03-31", "2024-01-31");
//!     let report = engine.report(request).await.unwrap();
//!     println!("{} records", report.records.len());
//! }
//! ```

use std::sync::{Arc, Mutex};

use crate::error::{AnalyticsError, Result};
use crate::orchestrator::AnalyticsReport;
use crate::request::ReportRequest;
use crate::store::TabularStore;
use crate::AnalyticsEngine;

/// Async wrapper around [`AnalyticsEngine`].
///
/// The engine is protected by a [`Mutex`] because stores such as
/// [`Connection`](crate::Connection) use `RefCell` internally. Cloning shares
/// the same engine.
pub struct AsyncAnalyticsEngine<S> {
    inner: Arc<Mutex<AnalyticsEngine<S>>>,
}

impl<S> Clone for AsyncAnalyticsEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: TabularStore + Send + 'static> AsyncAnalyticsEngine<S> {
    pub fn new(engine: AnalyticsEngine<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run a sync engine operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&AnalyticsEngine<S>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let guard = engine
                .lock()
                .map_err(|_| AnalyticsError::InvalidArgument("engine lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| AnalyticsError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Produce a report asynchronously. See [`AnalyticsEngine::report`].
    pub async fn report(&self, request: ReportRequest) -> Result<AnalyticsReport> {
        self.run(move |engine| engine.report(&request)).await
    }
}
