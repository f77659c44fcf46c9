//! Acquisition fallback chain.
//!
//! Strategies are tried fastest first:
//!
//! 1. [`Strategy::AggregatedPaginated`]: the server-side aggregation function,
//!    paged with limit/offset.
//! 2. [`Strategy::AggregatedSingleShot`]: the same function in one call.
//! 3. [`Strategy::DirectBatched`]: raw table reads reconciled locally.
//! 4. [`Strategy::Synthetic`]: flagged sample data; never fails.
//!
//! A strategy that errors or yields no usable rows is logged and the next one
//! runs. The first success is returned as is.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::batch::BatchExecutor;
use crate::config::EngineConfig;
use crate::error::{AnalyticsError, Result};
use crate::models::{decode_rows, AnalyticsRecord, ItemMasterRow, StockRow, TransactionRow};
use crate::pipeline::metrics::{apply_indicators, is_new_product};
use crate::pipeline::{
    self, aggregate_purchases, aggregate_sales, CostLookup, CostResolver, ItemMaster, PipelineInputs,
    PurchaseCosts,
};
use crate::query::{FunctionCall, TableQuery};
use crate::request::ResolvedRequest;
use crate::sample::sample_records;
use crate::store::TabularStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    AggregatedPaginated,
    AggregatedSingleShot,
    DirectBatched,
    Synthetic,
}

impl Strategy {
    /// Fallback order.
    pub const CHAIN: [Strategy; 4] = [
        Strategy::AggregatedPaginated,
        Strategy::AggregatedSingleShot,
        Strategy::DirectBatched,
        Strategy::Synthetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::AggregatedPaginated => "aggregated_paginated",
            Strategy::AggregatedSingleShot => "aggregated_single_shot",
            Strategy::DirectBatched => "direct_batched",
            Strategy::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a strategy was abandoned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyFailure {
    pub strategy: Strategy,
    pub reason: String,
}

/// Outcome of one report: the records plus how they were obtained.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub strategy: Strategy,
    pub records: Vec<AnalyticsRecord>,
    pub failures: Vec<StrategyFailure>,
}

impl AnalyticsReport {
    /// True when every real strategy failed and the records are synthetic.
    pub fn is_sample_data(&self) -> bool {
        self.strategy == Strategy::Synthetic
    }
}

/// Runs the fallback chain for one request against one store.
pub struct Orchestrator<'a, S: ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: TabularStore + ?Sized> Orchestrator<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn run(&self, request: &ResolvedRequest) -> AnalyticsReport {
        let mut failures = Vec::new();
        for strategy in Strategy::CHAIN {
            match self.attempt(strategy, request) {
                Ok(records) => {
                    tracing::info!(
                        strategy = %strategy,
                        records = records.len(),
                        failed_attempts = failures.len(),
                        "analytics acquired"
                    );
                    return AnalyticsReport {
                        strategy,
                        records,
                        failures,
                    };
                }
                Err(e) => {
                    tracing::warn!(strategy = %strategy, error = %e, "acquisition strategy failed; falling back");
                    failures.push(StrategyFailure {
                        strategy,
                        reason: e.to_string(),
                    });
                }
            }
        }
        // The synthetic strategy cannot fail, so the loop always returns.
        AnalyticsReport {
            strategy: Strategy::Synthetic,
            records: sample_records(&request.context),
            failures,
        }
    }

    /// Run one strategy. Empty results count as failures.
    pub fn attempt(&self, strategy: Strategy, request: &ResolvedRequest) -> Result<Vec<AnalyticsRecord>> {
        let records = match strategy {
            Strategy::AggregatedPaginated => self.aggregated(request, true)?,
            Strategy::AggregatedSingleShot => self.aggregated(request, false)?,
            Strategy::DirectBatched => self.direct_batched(request)?,
            Strategy::Synthetic => sample_records(&request.context),
        };
        if records.is_empty() {
            return Err(AnalyticsError::NoData(format!("{strategy} returned no rows")));
        }
        Ok(records)
    }

    // -- Aggregated strategies ---------------------------------------------

    fn aggregated(&self, request: &ResolvedRequest, paginated: bool) -> Result<Vec<AnalyticsRecord>> {
        let call = self.analytics_call(request);
        let rows = if paginated {
            BatchExecutor::new(self.store).call_paginated(&call, self.config.batch.function_page)?
        } else {
            self.store.call(&call)?
        };
        if rows.is_empty() {
            return Err(AnalyticsError::NoData(format!(
                "function {} returned no rows",
                call.name
            )));
        }

        let decoded: Vec<AnalyticsRecord> = decode_rows(rows)?;
        let mut records = dedup_records(decoded);
        self.enrich_with_purchase_costs(&mut records, request);
        // Derived fields are recomputed locally; only quantities and values
        // are taken from the function.
        let days = request.context.period.days_diff();
        for record in records.iter_mut() {
            apply_indicators(record, days);
            if record.registered_at.is_some() {
                record.is_new_product =
                    is_new_product(record.registered_at.as_deref(), request.context.new_product_cutoff);
            }
        }
        pipeline::ranking::assign_ranks(&mut records);
        Ok(records)
    }

    fn analytics_call(&self, request: &ResolvedRequest) -> FunctionCall {
        let ctx = &request.context;
        let mut call = FunctionCall::new(&self.config.analytics_function);
        call.arg("p_start_date", ctx.period.start.format("%Y-%m-%d").to_string())
            .arg("p_end_date", ctx.period.end_bound())
            .arg("p_location", request.location.clone())
            .arg(
                "p_new_product_cutoff",
                ctx.new_product_cutoff.format("%Y-%m-%d").to_string(),
            );
        call
    }

    /// Replace function-provided costs with the period's purchase cost where
    /// purchases exist. Failure here leaves the function's costs in place.
    fn enrich_with_purchase_costs(&self, records: &mut [AnalyticsRecord], request: &ResolvedRequest) {
        let costs = match self.purchase_costs(request) {
            Ok(costs) => costs,
            Err(e) => {
                tracing::warn!(error = %e, "purchase cost enrichment skipped");
                return;
            }
        };
        let mut enriched = 0usize;
        for record in records.iter_mut() {
            if let Some(entry) = costs.cost_for(&record.item_code) {
                if entry.received_qty > 0.0 {
                    record.average_cost = entry.average_cost;
                    enriched += 1;
                }
            }
        }
        tracing::debug!(enriched, "applied purchase costs");
    }

    // -- Direct strategy ---------------------------------------------------

    fn direct_batched(&self, request: &ResolvedRequest) -> Result<Vec<AnalyticsRecord>> {
        let batch = &self.config.batch;
        let executor = BatchExecutor::new(self.store);

        let mut stock_query = TableQuery::new(&self.config.stock_table);
        stock_query
            .select(StockRow::COLUMNS)
            .where_eq("location", request.location.clone())
            .order_by(&["item_code"]);
        let stock: Vec<StockRow> = decode_rows(executor.fetch_all(&stock_query, batch.stock_page)?)?;
        if stock.is_empty() {
            return Err(AnalyticsError::NoData(format!(
                "no stock rows for location {}",
                request.location
            )));
        }

        let codes = distinct_codes(&stock);
        let mut master_query = TableQuery::new(&self.config.item_master_table);
        master_query
            .select(ItemMasterRow::COLUMNS)
            .order_by(&["item_code"]);
        let master_rows: Vec<ItemMasterRow> = decode_rows(executor.fetch_chunked(
            &master_query,
            "item_code",
            &codes,
            batch.item_master_chunk,
            batch.item_master_page,
        )?)?;
        let items = ItemMaster::from_rows(master_rows);

        let sales_rows = self.movements(request, &self.config.sales_kind, None)?;
        let sales = aggregate_sales(&sales_rows, &self.config.sales_kind);

        let costs: Box<dyn CostLookup> = match self.cost_view() {
            Ok(resolver) if !resolver.is_empty() => Box::new(resolver),
            Ok(_) => {
                tracing::warn!(view = %self.config.cost_view, "cost view is empty; deriving cost from purchases");
                Box::new(self.purchase_costs(request)?)
            }
            Err(e) => {
                tracing::warn!(view = %self.config.cost_view, error = %e, "cost view unavailable; deriving cost from purchases");
                Box::new(self.purchase_costs(request)?)
            }
        };

        tracing::info!(
            stock = stock.len(),
            items = items.len(),
            sold_items = sales.len(),
            "reconciling direct reads"
        );
        let inputs = PipelineInputs {
            stock: &stock,
            sales: &sales,
            costs: costs.as_ref(),
            items: &items,
        };
        Ok(pipeline::reconcile(&inputs, &request.context))
    }

    fn movements(
        &self,
        request: &ResolvedRequest,
        kind: &str,
        transaction_type: Option<&str>,
    ) -> Result<Vec<TransactionRow>> {
        let period = &request.context.period;
        let mut query = TableQuery::new(&self.config.movements_table);
        query
            .select(TransactionRow::COLUMNS)
            .where_eq("kind", kind)
            .where_gte("issued_at", period.start_bound())
            .where_lte("issued_at", period.end_bound())
            .order_by(&["item_code", "issued_at"]);
        if let Some(code) = transaction_type {
            query.where_eq("transaction_type", code);
        }
        let rows = BatchExecutor::new(self.store).fetch_all(&query, self.config.batch.transactions_page)?;
        decode_rows(rows)
    }

    fn purchase_costs(&self, request: &ResolvedRequest) -> Result<PurchaseCosts> {
        let rows = self.movements(
            request,
            &self.config.purchase_kind,
            Some(&self.config.purchase_transaction_type),
        )?;
        Ok(PurchaseCosts::new(aggregate_purchases(
            &rows,
            &self.config.purchase_kind,
            &self.config.purchase_transaction_type,
        )))
    }

    fn cost_view(&self) -> Result<CostResolver> {
        let query = TableQuery::new(&self.config.cost_view);
        let rows = BatchExecutor::new(self.store).fetch_all(&query, self.config.batch.cost_view_page)?;
        let resolver = CostResolver::from_rows(&rows);
        if resolver.missing_cost_count() > 0 {
            tracing::warn!(
                rows = resolver.missing_cost_count(),
                "cost view rows without a recognizable cost field"
            );
        }
        Ok(resolver)
    }
}

/// Trimmed, non-empty, distinct item codes in snapshot order.
fn distinct_codes(stock: &[StockRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    stock
        .iter()
        .filter_map(|row| row.item_code.as_deref().map(str::trim))
        .filter(|code| !code.is_empty() && seen.insert(code.to_string()))
        .map(str::to_string)
        .collect()
}

/// Keep the first record per trimmed item code.
fn dedup_records(records: Vec<AnalyticsRecord>) -> Vec<AnalyticsRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter_map(|mut record| {
            let code = record.item_code.trim().to_string();
            if code.is_empty() || !seen.insert(code.clone()) {
                return None;
            }
            record.item_code = code;
            Some(record)
        })
        .collect()
}
