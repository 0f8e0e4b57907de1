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

//! # HTTP Search Client
//!
//! `SearchService` over the backend's REST API using a blocking `reqwest`
//! client. Every call goes through a retry session: transport failures and
//! statuses in the configured forcelist are retried with exponential backoff.

use crate::config::SessionConfig;
use crate::domain::entities::{QueryClause, SearchRequest, SearchResponse};
use crate::domain::errors::{ExportError, Result};
use crate::ports::search_port::SearchService;
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::thread;
use std::time::Duration;

/// Retry policy applied to every backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    total: u32,
    backoff_factor: f64,
    status_forcelist: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_session(session: &SessionConfig) -> Self {
        Self {
            total: session.total,
            backoff_factor: session.backoff_factor,
            status_forcelist: session.status_forcelist.clone(),
        }
    }

    /// Sleep before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16) as i32;
        Duration::from_secs_f64((self.backoff_factor * 2f64.powi(exponent)).max(0.0))
    }

    /// First attempt plus `total` retries.
    pub fn max_attempts(&self) -> u32 {
        self.total.saturating_add(1)
    }

    pub fn retries_status(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Sends the request built by `build` until it succeeds or attempts run out.
    fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let last = attempt >= self.max_attempts();
            match build().send() {
                Ok(resp) if !last && self.retries_status(resp.status().as_u16()) => {
                    warn!("Backend answered {}, retrying (attempt {})", resp.status(), attempt);
                }
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_connect() || e.is_timeout() => {
                    if last {
                        return Err(ExportError::TransportError(format!(
                            "giving up after {} attempts: {}",
                            attempt, e
                        )));
                    }
                    warn!("Transport failure, retrying (attempt {}): {}", attempt, e);
                }
                Err(e) => return Err(ExportError::Http(e)),
            }
            thread::sleep(self.backoff(attempt));
            attempt += 1;
        }
    }
}

#[derive(Deserialize)]
struct PitOpened {
    id: String,
}

pub struct HttpSearchService {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    retry: RetryPolicy,
    timeout_secs: u64,
}

impl HttpSearchService {
    /// `timeout_secs` bounds every single request, retries excluded.
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        session: &SessionConfig,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            timeout_secs,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            retry: RetryPolicy::from_session(session),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.username, Some(&self.password))
    }

    /// Maps a non-2xx answer to `SearchError` carrying the body.
    fn checked(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(ExportError::SearchError(format!("{}: {}", status, body)))
    }
}

/// `/<index,...>/_search`, or `/_search` when a point-in-time scopes the call.
pub fn search_path(request: &SearchRequest) -> String {
    match (&request.pit, &request.params.index) {
        (None, Some(index)) if !index.is_empty() => format!("/{}/_search", index.join(",")),
        _ => "/_search".to_string(),
    }
}

/// URL parameters of a search call.
pub fn search_query_params(request: &SearchRequest) -> Vec<(String, String)> {
    let params = &request.params;
    let mut query = Vec::new();
    if let QueryClause::QueryString(q) = &params.query {
        query.push(("q".to_string(), q.clone()));
    }
    query.push(("timeout".to_string(), params.timeout.clone()));
    query.push((
        "batched_reduce_size".to_string(),
        params.batched_reduce_size.to_string(),
    ));
    if let Some(scroll) = &request.scroll {
        query.push(("scroll".to_string(), scroll.clone()));
    }
    query
}

/// JSON body of a search call.
pub fn search_body(request: &SearchRequest) -> Value {
    let params = &request.params;
    let mut body = Map::new();
    body.insert("size".into(), json!(params.size));
    if let QueryClause::Dsl(query) = &params.query {
        body.insert("query".into(), query.clone());
    }
    if let Some(min_score) = params.min_score {
        body.insert("min_score".into(), json!(min_score));
    }
    if let Some(sort) = &request.sort {
        body.insert("sort".into(), sort.clone());
    }
    if let Some(search_after) = &params.search_after {
        body.insert("search_after".into(), json!(search_after));
    }
    if let Some(pit) = &request.pit {
        body.insert("pit".into(), json!({ "id": pit.id, "keep_alive": pit.keep_alive }));
    }
    if let Some(track) = request.track_total_hits {
        body.insert("track_total_hits".into(), json!(track));
    }
    Value::Object(body)
}

impl SearchService for HttpSearchService {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = self.url(&search_path(request));
        let query = search_query_params(request);
        let body = search_body(request);
        debug!("POST {} {:?}", url, query);

        let resp = self
            .retry
            .send(|| self.authed(self.client.post(&url).query(&query).json(&body)))?;
        Ok(Self::checked(resp)?.json()?)
    }

    fn scroll(&self, scroll_id: &str, keep_alive: &str) -> Result<SearchResponse> {
        let url = self.url("/_search/scroll");
        let body = json!({ "scroll": keep_alive, "scroll_id": scroll_id });

        let resp = self
            .retry
            .send(|| self.authed(self.client.post(&url).json(&body)))?;
        Ok(Self::checked(resp)?.json()?)
    }

    fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
        let url = self.url("/_search/scroll");
        let body = json!({ "scroll_id": [scroll_id] });

        let resp = self
            .retry
            .send(|| self.authed(self.client.delete(&url).json(&body)))?;
        Self::checked(resp)?;
        Ok(())
    }

    fn open_point_in_time(&self, index: &[String], keep_alive: &str) -> Result<String> {
        let url = self.url(&format!("/{}/_pit", index.join(",")));
        let query = [("keep_alive", keep_alive), ("ignore_unavailable", "true")];

        let resp = self
            .retry
            .send(|| self.authed(self.client.post(&url).query(&query)))?;
        let opened: PitOpened = Self::checked(resp)?.json()?;
        Ok(opened.id)
    }

    fn close_point_in_time(&self, pit_id: &str) -> Result<()> {
        let url = self.url("/_pit");
        let body = json!({ "id": pit_id });

        let resp = self
            .retry
            .send(|| self.authed(self.client.delete(&url).json(&body)))?;
        Self::checked(resp)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{PitHandle, SearchParams};

    fn request(query: QueryClause) -> SearchRequest {
        SearchRequest::new(SearchParams {
            index: Some(vec!["movies".into(), "series".into()]),
            size: 100,
            query,
            timeout: "60s".into(),
            batched_reduce_size: 20,
            min_score: None,
            search_after: None,
        })
    }

    #[test]
    fn test_query_string_goes_to_url() {
        let mut req = request(QueryClause::QueryString("title:matrix".into()));
        req.scroll = Some("5m".into());

        assert_eq!(search_path(&req), "/movies,series/_search");
        let params = search_query_params(&req);
        assert!(params.contains(&("q".into(), "title:matrix".into())));
        assert!(params.contains(&("scroll".into(), "5m".into())));
        assert!(params.contains(&("batched_reduce_size".into(), "20".into())));

        let body = search_body(&req);
        assert_eq!(body, json!({"size": 100}));
    }

    #[test]
    fn test_pit_request_drops_index_from_path() {
        let mut req = request(QueryClause::Dsl(json!({"match_all": {}})));
        req.params.index = None;
        req.params.search_after = Some(vec![json!(42)]);
        req.pit = Some(PitHandle { id: "pit-1".into(), keep_alive: "5m".into() });
        req.sort = Some(json!([{"released": "asc"}]));
        req.track_total_hits = Some(false);

        assert_eq!(search_path(&req), "/_search");
        assert!(!search_query_params(&req).iter().any(|(k, _)| k == "q"));

        let body = search_body(&req);
        assert_eq!(body["query"], json!({"match_all": {}}));
        assert_eq!(body["pit"], json!({"id": "pit-1", "keep_alive": "5m"}));
        assert_eq!(body["search_after"], json!([42]));
        assert_eq!(body["track_total_hits"], json!(false));
        assert_eq!(body["sort"], json!([{"released": "asc"}]));
    }

    #[test]
    fn test_retry_backoff_doubles() {
        let policy = RetryPolicy::from_session(&SessionConfig::default());
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.max_attempts(), 4);
        assert!(policy.retries_status(503));
        assert!(!policy.retries_status(404));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let service =
            HttpSearchService::new("http://localhost:9200/", "elastic", "pw", &SessionConfig::default(), 60)
                .unwrap();
        assert_eq!(service.base_url(), "http://localhost:9200");
    }

    #[test]
    fn test_no_retries_means_single_attempt() {
        let session = SessionConfig { total: 0, ..SessionConfig::default() };
        assert_eq!(RetryPolicy::from_session(&session).max_attempts(), 1);
    }

    #[test]
    fn test_request_timeout_is_configured() {
        let service =
            HttpSearchService::new("http://localhost:9200", "elastic", "pw", &SessionConfig::default(), 120)
                .unwrap();
        assert_eq!(service.timeout_secs(), 120);
    }
}
