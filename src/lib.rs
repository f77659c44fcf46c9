//! Inventory and sales reconciliation engine.
//!
//! Given a date range and a stock location, joins the stock snapshot, sales
//! and purchase movements, a precomputed cost view and the item master by
//! item code, and produces one [`AnalyticsRecord`] per stocked item:
//! turnover, coverage days, weighted average sale price, average cost and a
//! dense sales rank.
//!
//! Data is read through a [`TabularStore`]: a PostgREST-style backend
//! ([`RestStore`]) or an embedded DuckDB mirror ([`Connection`]). Reads are
//! paged, and acquisition falls back through progressively simpler strategies
//! down to flagged sample data, so a report always comes back.
//!
//! # Quick start
//!
//! ```no_run
//! use stock_analytics::{AnalyticsEngine, ReportRequest, RestStore};
//!
//! let store = RestStore::builder("https://project.example.co")
//!     .api_key("anon-key")
//!     .build()
//!     .unwrap();
//! let engine = AnalyticsEngine::builder(store).build();
//!
//! let request = ReportRequest::new("2024-03-01", "2024-03-31", "2024-01-31");
//! let report = engine.report(&request).unwrap();
//! println!("{} items via {}", report.records.len(), report.strategy);
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod batch;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod period;
pub mod pipeline;
pub mod query;
pub mod request;
pub mod rest;
pub mod sample;
pub mod sql_builder;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncAnalyticsEngine;
pub use batch::BatchExecutor;
pub use config::{BatchSizes, EngineConfig};
pub use connection::Connection;
pub use error::{AnalyticsError, Result};
pub use models::AnalyticsRecord;
pub use orchestrator::{AnalyticsReport, Strategy, StrategyFailure};
pub use query::{FunctionCall, Row, TableQuery};
pub use request::ReportRequest;
pub use rest::RestStore;
pub use sql_builder::SqlBuilder;
pub use store::TabularStore;

use std::fmt;

use orchestrator::Orchestrator;

// ---------------------------------------------------------------------------
// AnalyticsEngineBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AnalyticsEngine`].
///
/// Use [`AnalyticsEngine::builder()`] to obtain one.
pub struct AnalyticsEngineBuilder<S> {
    store: S,
    config: EngineConfig,
}

impl<S: TabularStore> AnalyticsEngineBuilder<S> {
    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the batch sizes.
    pub fn batch_sizes(mut self, batch: BatchSizes) -> Self {
        self.config.batch = batch;
        self
    }

    /// Location used when a request does not name one.
    pub fn default_location(mut self, location: &str) -> Self {
        self.config.default_location = location.to_string();
        self
    }

    pub fn build(self) -> AnalyticsEngine<S> {
        AnalyticsEngine {
            store: self.store,
            config: self.config,
        }
    }
}

// ---------------------------------------------------------------------------
// AnalyticsEngine
// ---------------------------------------------------------------------------

/// Entry point: owns a store and a configuration, and runs reports.
///
/// The engine holds no per-report state; every [`report`](Self::report)
/// call is independent.
pub struct AnalyticsEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: TabularStore> AnalyticsEngine<S> {
    pub fn builder(store: S) -> AnalyticsEngineBuilder<S> {
        AnalyticsEngineBuilder {
            store,
            config: EngineConfig::default(),
        }
    }

    /// Produce the analytics report for `request`.
    ///
    /// Only request validation errors are returned. Acquisition failures are
    /// absorbed by the fallback chain; check [`AnalyticsReport::strategy`] or
    /// the records' `is_sample_data` flag to detect degraded output.
    pub fn report(&self, request: &ReportRequest) -> Result<AnalyticsReport> {
        let resolved = request.resolve(&self.config)?;
        tracing::info!(
            start = %resolved.context.period.start,
            end = %resolved.context.period.end,
            location = %resolved.location,
            "running analytics report"
        );
        Ok(Orchestrator::new(&self.store, &self.config).run(&resolved))
    }

    /// Run a single acquisition strategy without falling back.
    ///
    /// Empty results are reported as [`AnalyticsError::NoData`].
    pub fn report_with(&self, strategy: Strategy, request: &ReportRequest) -> Result<Vec<AnalyticsRecord>> {
        let resolved = request.resolve(&self.config)?;
        Orchestrator::new(&self.store, &self.config).attempt(strategy, &resolved)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Return a reference to the underlying store for advanced usage.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> fmt::Display for AnalyticsEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalyticsEngine(stock={}, movements={}, cost_view={}, function={}, location={})",
            self.config.stock_table,
            self.config.movements_table,
            self.config.cost_view,
            self.config.analytics_function,
            self.config.default_location
        )
    }
}
