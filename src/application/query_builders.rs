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

//! Query parameter builders for the two supported syntaxes.
//!
//! Both read the same config fields and differ only in where the query goes:
//! `q` for query-string syntax, `query` for the DSL.

use crate::config::ExtractionConfig;
use crate::domain::entities::{QueryClause, SearchParams};
use crate::domain::errors::{ExportError, Result};
use crate::ports::query_port::QueryParamBuilder;
use serde_json::Value;
use std::str::FromStr;

/// Query-string syntax (`syntax: sql`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlQuery;

/// Query DSL syntax (`syntax: dsl`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DslQuery;

fn base_params(config: &ExtractionConfig, query: QueryClause) -> Result<SearchParams> {
    if config.index.is_empty() {
        return Err(ExportError::missing("index"));
    }
    Ok(SearchParams {
        index: Some(config.index.clone()),
        size: config.size,
        query,
        timeout: format!("{}s", config.timeout),
        batched_reduce_size: config.batched_reduce_size,
        min_score: config.min_score,
        search_after: None,
    })
}

impl QueryParamBuilder for SqlQuery {
    fn build(&self, config: &ExtractionConfig) -> Result<SearchParams> {
        let q = match config.query()? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        base_params(config, QueryClause::QueryString(q))
    }
}

impl QueryParamBuilder for DslQuery {
    fn build(&self, config: &ExtractionConfig) -> Result<SearchParams> {
        base_params(config, QueryClause::Dsl(config.query()?.clone()))
    }
}

/// Registry of the supported query syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySyntax {
    Sql,
    Dsl,
}

impl FromStr for QuerySyntax {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sql" => Ok(QuerySyntax::Sql),
            "dsl" => Ok(QuerySyntax::Dsl),
            other => Err(ExportError::ConfigError(format!(
                "wrong value for 'syntax' in configs: expecting 'sql' or 'dsl', got '{}'",
                other
            ))),
        }
    }
}

impl QuerySyntax {
    pub fn builder(&self) -> Box<dyn QueryParamBuilder> {
        match self {
            QuerySyntax::Sql => Box::new(SqlQuery),
            QuerySyntax::Dsl => Box::new(DslQuery),
        }
    }
}
