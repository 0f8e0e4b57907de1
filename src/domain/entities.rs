// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Domain Entities
//!
//! The nouns of the exporter: search parameters, the requests and responses
//! exchanged with the search backend, date windows and the dated batches
//! handed from the reader to the writer.
//!
//! Records are kept as JSON objects (`serde_json::Map`) because the backend
//! documents have no fixed schema.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One upstream hit, exactly as the backend returned it.
pub type RawRecord = Map<String, Value>;

/// A hit with its payload promoted to the top level and the envelope under `metadata`.
pub type NormalizedRecord = Map<String, Value>;

/// Where the query text goes depends on the syntax.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueryClause {
    /// Query-string syntax, sent as the `q` URL parameter.
    #[serde(rename = "q")]
    QueryString(String),
    /// Query DSL object, sent as the `query` body field.
    #[serde(rename = "query")]
    Dsl(Value),
}

/// Arguments for one search call, built once per date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParams {
    /// Stripped once a point-in-time handle scopes the search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<String>>,
    pub size: u64,
    #[serde(flatten)]
    pub query: QueryClause,
    pub timeout: String,
    pub batched_reduce_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<Vec<Value>>,
}

impl SearchParams {
    /// Narrows the query to documents whose `field` falls inside `window`.
    pub fn restrict_to_window(&mut self, field: &str, window: &DateWindow) {
        let start = window.start.format("%Y-%m-%d").to_string();
        let end = window.end.format("%Y-%m-%d").to_string();
        self.query = match &self.query {
            QueryClause::QueryString(q) => {
                QueryClause::QueryString(format!("({}) AND {}:[{} TO {}]", q, field, start, end))
            }
            QueryClause::Dsl(query) => {
                let mut range = Map::new();
                range.insert(
                    field.to_string(),
                    serde_json::json!({ "gte": start, "lte": end, "format": "yyyy-MM-dd" }),
                );
                QueryClause::Dsl(serde_json::json!({
                    "bool": {
                        "must": [query],
                        "filter": [{ "range": range }]
                    }
                }))
            }
        };
    }
}

/// Point-in-time binding attached to a search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitHandle {
    pub id: String,
    pub keep_alive: String,
}

/// A complete search call: the window's params plus pagination-specific extras.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub params: SearchParams,
    pub scroll: Option<String>,
    pub pit: Option<PitHandle>,
    pub sort: Option<Value>,
    pub track_total_hits: Option<bool>,
}

impl SearchRequest {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            scroll: None,
            pit: None,
            sort: None,
            track_total_hits: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShardStats {
    pub total: u64,
    pub successful: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub failed: u64,
}

impl ShardStats {
    /// True when some shards neither answered nor were skipped.
    pub fn is_partial(&self) -> bool {
        self.successful + self.skipped < self.total
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<RawRecord>,
}

/// The subset of a search/scroll response the paginators read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,
    #[serde(default)]
    pub pit_id: Option<String>,
    #[serde(rename = "_shards", default)]
    pub shards: Option<ShardStats>,
    #[serde(default)]
    pub hits: Hits,
}

impl SearchResponse {
    pub fn from_hits(hits: Vec<RawRecord>) -> Self {
        Self {
            hits: Hits { hits },
            ..Default::default()
        }
    }
}

/// One step of the date-range sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    /// `YYYY-MM-DD` of the window start.
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The label with its separators stripped (`YYYYMMDD`).
    pub fn compact_label(&self) -> String {
        self.label.replace('-', "")
    }
}

/// One window's extraction result, the only thing handed to the writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub date: String,
    pub index: String,
    pub data: Vec<NormalizedRecord>,
}
