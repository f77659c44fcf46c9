//! PostgREST-style backend-as-a-service client.
//!
//! Tables are read with `GET {base}/rest/v1/{table}?select=..&col=op.value`
//! and functions invoked with `POST {base}/rest/v1/rpc/{name}`. Windows are
//! requested through `limit`/`offset` query parameters. The backend caps
//! rows per response, which is why every read above this layer is paged.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::Url;

use crate::error::{AnalyticsError, Result};
use crate::query::{value_to_param, FilterOp, FunctionCall, Row, TableQuery};
use crate::store::TabularStore;

/// Builder for a [`RestStore`].
pub struct RestStoreBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl RestStoreBuilder {
    /// Project API key, sent both as `apikey` and as a bearer token.
    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Set the HTTP request timeout. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<RestStore> {
        let base_url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| AnalyticsError::InvalidArgument(format!("Invalid base URL: {e}")))?;
        let client = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(RestStore {
            base_url,
            api_key: self.api_key,
            client,
        })
    }
}

/// Blocking client for a PostgREST-compatible endpoint.
pub struct RestStore {
    base_url: Url,
    api_key: Option<String>,
    client: Client,
}

impl RestStore {
    pub fn builder(base_url: &str) -> RestStoreBuilder {
        RestStoreBuilder {
            base_url: base_url.to_string(),
            api_key: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Full URL for a table read, including filter and window parameters.
    pub fn table_url(&self, query: &TableQuery) -> Result<Url> {
        let mut url = self.endpoint(&["rest", "v1", &query.table])?;
        url.query_pairs_mut().extend_pairs(query_pairs(query));
        Ok(url)
    }

    /// Full URL for a function invocation (arguments travel in the body).
    pub fn rpc_url(&self, call: &FunctionCall) -> Result<Url> {
        let mut url = self.endpoint(&["rest", "v1", "rpc", &call.name])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(n) = call.limit {
                pairs.append_pair("limit", &n.to_string());
            }
            if let Some(n) = call.offset {
                pairs.append_pair("offset", &n.to_string());
            }
        }
        Ok(url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AnalyticsError::InvalidArgument("Base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    fn read_rows(response: Response) -> Result<Vec<Row>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalyticsError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        let value: serde_json::Value = response.json()?;
        match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
                    other => Err(AnalyticsError::Malformed(format!(
                        "expected row object, got {other}"
                    ))),
                })
                .collect(),
            other => Err(AnalyticsError::Malformed(format!(
                "expected an array of rows, got {}",
                type_name(&other)
            ))),
        }
    }
}

impl TabularStore for RestStore {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Row>> {
        let url = self.table_url(query)?;
        tracing::trace!(%url, "GET table");
        let response = self.authorize(self.client.get(url)).send()?;
        Self::read_rows(response)
    }

    fn call(&self, call: &FunctionCall) -> Result<Vec<Row>> {
        let url = self.rpc_url(call)?;
        tracing::trace!(%url, "POST rpc");
        let response = self
            .authorize(self.client.post(url))
            .json(&serde_json::Value::Object(call.args.clone()))
            .send()?;
        Self::read_rows(response)
    }
}

/// Render a [`TableQuery`] as PostgREST query-string pairs.
pub fn query_pairs(query: &TableQuery) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let select = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query.columns.join(",")
    };
    pairs.push(("select".to_string(), select));

    for filter in &query.filters {
        let rendered = if filter.op == FilterOp::In {
            let items: Vec<String> = filter
                .values
                .iter()
                .map(|v| quote_list_item(&value_to_param(v)))
                .collect();
            format!("in.({})", items.join(","))
        } else {
            let value = filter.values.first().map(value_to_param).unwrap_or_default();
            format!("{}.{}", filter.op.rest_operator(), value)
        };
        pairs.push((filter.column.clone(), rendered));
    }

    if !query.order_by.is_empty() {
        pairs.push(("order".to_string(), query.order_by.join(",")));
    }
    if let Some(n) = query.limit {
        pairs.push(("limit".to_string(), n.to_string()));
    }
    if let Some(n) = query.offset {
        pairs.push(("offset".to_string(), n.to_string()));
    }
    pairs
}

/// PostgREST list items containing reserved characters must be quoted.
fn quote_list_item(item: &str) -> String {
    if item.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        item.to_string()
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
