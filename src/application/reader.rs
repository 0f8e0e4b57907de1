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

//! # Extraction Reader
//!
//! Drives the date-range sweep. For every window it builds search params,
//! pages through the hits, normalizes them and yields one `Batch`.
//!
//! A window without hits is not an error: it is logged, recorded as `false`
//! in the reader's `SuccessLog`, and skipped without yielding anything.
//! Any other failure ends the sweep.

use crate::application::normalizer::normalize;
use crate::application::pagination::PaginatorKind;
use crate::application::query_builders::QuerySyntax;
use crate::config::{load_file, ExtractionConfig, Secrets};
use crate::domain::dates::DateWindows;
use crate::domain::entities::{Batch, DateWindow, NormalizedRecord};
use crate::domain::errors::Result;
use crate::domain::success_log::SuccessLog;
use crate::ports::pagination_port::PaginationEngine;
use crate::ports::query_port::QueryParamBuilder;
use crate::ports::search_port::{Authenticator, SearchService};
use chrono::NaiveDate;
use log::{info, warn};

pub struct ExtractionReader {
    config: ExtractionConfig,
    secrets: Secrets,
    builder: Box<dyn QueryParamBuilder>,
    engine: Box<dyn PaginationEngine>,
    service: Option<Box<dyn SearchService>>,
    success: SuccessLog,
}

impl ExtractionReader {
    /// Resolves the syntax and paginator tags. Unknown tags fail here, before any I/O.
    pub fn new(config: ExtractionConfig, secrets: Secrets) -> Result<Self> {
        let syntax: QuerySyntax = config.syntax()?.parse()?;
        let paginator: PaginatorKind = config.paginator()?.parse()?;
        Ok(Self {
            builder: syntax.builder(),
            engine: paginator.engine(),
            config,
            secrets,
            service: None,
            success: SuccessLog::new(),
        })
    }

    pub fn from_files(config_path: &str, secrets_path: &str) -> Result<Self> {
        Self::new(load_file(config_path)?, load_file(secrets_path)?)
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn success(&self) -> &SuccessLog {
        &self.success
    }

    pub fn is_authenticated(&self) -> bool {
        self.service.is_some()
    }

    /// Sweeps `start_date..=end_date` relative to the local calendar day.
    pub fn run(&mut self, authenticator: &dyn Authenticator) -> Result<Batches<'_>> {
        self.run_on(authenticator, chrono::Local::now().date_naive())
    }

    /// Like `run`, with `today` pinned.
    ///
    /// Authenticates on first use; a failure aborts before any window is read.
    pub fn run_on(&mut self, authenticator: &dyn Authenticator, today: NaiveDate) -> Result<Batches<'_>> {
        let windows = DateWindows::from_exprs(
            &self.config.start_date,
            &self.config.end_date,
            &self.config.interval,
            today,
        )?;

        if self.service.is_none() {
            self.service = Some(authenticator.authenticate(&self.secrets)?);
            info!("Authenticated against {}:{}", self.secrets.host, self.secrets.port);
        }

        Ok(Batches {
            reader: self,
            windows,
            halted: false,
        })
    }
}

/// Lazy sequence of dated batches. Each `next()` reads windows until one has data.
pub struct Batches<'r> {
    reader: &'r mut ExtractionReader,
    windows: DateWindows,
    halted: bool,
}

impl Iterator for Batches<'_> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let ExtractionReader {
            config,
            builder,
            engine,
            service,
            success,
            ..
        } = &mut *self.reader;
        let service = service.as_deref()?;

        for window in self.windows.by_ref() {
            info!("Extracting window {}", window.label);
            let data = match extract_window(config, &**builder, &**engine, service, &window) {
                Ok(data) => data,
                Err(e) => {
                    self.halted = true;
                    return Some(Err(e));
                }
            };

            if data.is_empty() {
                warn!("No data for window {} with the provided configs", window.label);
                success.failure();
                continue;
            }

            success.success();
            info!("Window {} produced {} records", window.label, data.len());
            return Some(config.primary_index().map(|index| Batch {
                date: window.compact_label(),
                index: index.to_string(),
                data,
            }));
        }
        None
    }
}

fn extract_window(
    config: &ExtractionConfig,
    builder: &dyn QueryParamBuilder,
    engine: &dyn PaginationEngine,
    service: &dyn SearchService,
    window: &DateWindow,
) -> Result<Vec<NormalizedRecord>> {
    let mut params = builder.build(config)?;
    if let Some(field) = &config.date_field {
        params.restrict_to_window(field, window);
    }
    engine
        .paginate(service, config, params)
        .map(|record| normalize(record?, config.data_field()?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{QueryClause, SearchResponse};
    use crate::domain::errors::ExportError;
    use crate::testing::{hit, secrets, Call, MockAuthenticator, MockSearchService};
    use serde_json::{json, Value};

    fn config(value: Value) -> ExtractionConfig {
        serde_json::from_value(value).unwrap()
    }

    fn dsl_scroll_config() -> ExtractionConfig {
        config(json!({
            "index": ["movies"],
            "query": {"match_all": {}},
            "syntax": "dsl",
            "paginator": "scroll",
            "data_field": "_source",
            "start_date": "2023-01-28",
            "end_date": "2023-01-29",
            "interval": "day"
        }))
    }

    fn page(scroll_id: &str, hits: Vec<crate::domain::entities::RawRecord>) -> SearchResponse {
        let mut resp = SearchResponse::from_hits(hits);
        resp.scroll_id = Some(scroll_id.to_string());
        resp
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 29).unwrap()
    }

    #[test]
    fn test_unknown_tags_fail_at_construction() {
        let mut bad_syntax = dsl_scroll_config();
        bad_syntax.syntax = Some("eql".into());
        assert!(matches!(
            ExtractionReader::new(bad_syntax, secrets()),
            Err(ExportError::ConfigError(_))
        ));

        let mut bad_paginator = dsl_scroll_config();
        bad_paginator.paginator = Some("cursor".into());
        assert!(matches!(
            ExtractionReader::new(bad_paginator, secrets()),
            Err(ExportError::ConfigError(_))
        ));

        let mut missing = dsl_scroll_config();
        missing.paginator = None;
        assert!(matches!(
            ExtractionReader::new(missing, secrets()),
            Err(ExportError::MissingKey(_))
        ));
    }

    #[test]
    fn test_new_reader_is_idle() {
        let reader = ExtractionReader::new(dsl_scroll_config(), secrets()).unwrap();
        assert!(!reader.is_authenticated());
        assert!(reader.success().is_empty());
    }

    #[test]
    fn test_two_day_range_with_data_on_second_day() {
        let service = MockSearchService::new();
        service.push(Ok(SearchResponse::default()));
        service.push(Ok(page("s-1", vec![hit("1", "The Matrix", None), hit("2", "Heat", None)])));
        let auth = MockAuthenticator { service: service.clone(), refuse: false };

        let mut reader = ExtractionReader::new(dsl_scroll_config(), secrets()).unwrap();
        let batches: Vec<Batch> = reader
            .run_on(&auth, today())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].date, "20230129");
        assert_eq!(batches[0].index, "movies");
        assert_eq!(batches[0].data.len(), 2);
        assert_eq!(batches[0].data[0]["title"], "The Matrix");
        assert_eq!(batches[0].data[0]["metadata"]["_id"], "1");
        assert_eq!(reader.success().entries(), &[false, true]);
    }

    #[test]
    fn test_empty_range_yields_nothing() {
        let service = MockSearchService::new();
        let auth = MockAuthenticator { service, refuse: false };
        let mut reader = ExtractionReader::new(dsl_scroll_config(), secrets()).unwrap();

        let batches: Vec<_> = reader.run_on(&auth, today()).unwrap().collect();

        assert!(batches.is_empty());
        assert_eq!(reader.success().entries(), &[false, false]);
        assert!(!reader.success().any_success());
    }

    #[test]
    fn test_authentication_failure_is_fatal() {
        let auth = MockAuthenticator { service: MockSearchService::new(), refuse: true };
        let mut reader = ExtractionReader::new(dsl_scroll_config(), secrets()).unwrap();

        assert!(matches!(reader.run_on(&auth, today()), Err(ExportError::AuthError(_))));
        assert!(reader.success().is_empty());
        assert!(!reader.is_authenticated());
    }

    #[test]
    fn test_missing_payload_field_halts_the_sweep() {
        let service = MockSearchService::new();
        let mut broken = hit("1", "x", None);
        broken.remove("_source");
        service.push(Ok(page("s-0", vec![broken])));
        let auth = MockAuthenticator { service, refuse: false };

        let mut reader = ExtractionReader::new(dsl_scroll_config(), secrets()).unwrap();
        let results: Vec<_> = reader.run_on(&auth, today()).unwrap().collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ExportError::MissingKey(_))));
        assert!(reader.success().is_empty());
    }

    #[test]
    fn test_halted_sweep_clears_scroll_context() {
        let service = MockSearchService::new();
        let mut broken = hit("1", "x", None);
        broken.remove("_source");
        service.push(Ok(page("s-0", vec![broken, hit("2", "y", None)])));
        let auth = MockAuthenticator { service: service.clone(), refuse: false };

        let mut reader = ExtractionReader::new(dsl_scroll_config(), secrets()).unwrap();
        let results: Vec<_> = reader.run_on(&auth, today()).unwrap().collect();

        assert!(matches!(results[0], Err(ExportError::MissingKey(_))));
        assert_eq!(service.calls().last(), Some(&Call::ClearScroll("s-0".into())));
    }

    #[test]
    fn test_empty_windows_need_no_data_field() {
        let mut cfg = dsl_scroll_config();
        cfg.data_field = None;
        let auth = MockAuthenticator { service: MockSearchService::new(), refuse: false };

        let mut reader = ExtractionReader::new(cfg, secrets()).unwrap();
        let results: Vec<_> = reader.run_on(&auth, today()).unwrap().collect();

        assert!(results.is_empty());
        assert_eq!(reader.success().entries(), &[false, false]);
    }

    #[test]
    fn test_point_in_time_reader() {
        let mut cfg = dsl_scroll_config();
        cfg.paginator = Some("point_in_time".into());
        cfg.start_date = "2023-01-29".into();
        cfg.sort = Some(json!([{"year": "asc"}]));

        let service = MockSearchService::new();
        service.push(Ok(SearchResponse::from_hits(vec![hit("1", "a", Some(json!([1999])))])));
        let auth = MockAuthenticator { service: service.clone(), refuse: false };

        let mut reader = ExtractionReader::new(cfg, secrets()).unwrap();
        let batches: Vec<Batch> = reader.run_on(&auth, today()).unwrap().collect::<Result<_>>().unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].data[0]["title"], "a");
        assert_eq!(reader.success().entries(), &[true]);
    }

    #[test]
    fn test_date_field_restricts_each_window() {
        let mut cfg = dsl_scroll_config();
        cfg.syntax = Some("sql".into());
        cfg.query = Some(json!("title:matrix"));
        cfg.date_field = Some("released".into());

        let service = MockSearchService::new();
        let auth = MockAuthenticator { service: service.clone(), refuse: false };
        let mut reader = ExtractionReader::new(cfg, secrets()).unwrap();
        let _ = reader.run_on(&auth, today()).unwrap().count();

        let searches = service.searches();
        assert_eq!(searches.len(), 2);
        assert_eq!(
            searches[1].params.query,
            QueryClause::QueryString("(title:matrix) AND released:[2023-01-29 TO 2023-01-29]".into())
        );
    }

    #[test]
    fn test_lazy_sequence_stops_between_windows() {
        let service = MockSearchService::new();
        service.push(Ok(page("s-0", vec![hit("1", "a", None)])));
        let auth = MockAuthenticator { service: service.clone(), refuse: false };

        let mut reader = ExtractionReader::new(dsl_scroll_config(), secrets()).unwrap();
        let mut batches = reader.run_on(&auth, today()).unwrap();
        let first = batches.next().unwrap().unwrap();
        assert_eq!(first.date, "20230128");

        // the second window has not been searched yet
        assert_eq!(service.searches().len(), 1);
    }
}
