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

//! Hand-written doubles for the ports, shared by the unit tests.

use crate::config::Secrets;
use crate::domain::entities::{RawRecord, SearchRequest, SearchResponse, ShardStats};
use crate::domain::errors::{ExportError, Result};
use crate::ports::search_port::{Authenticator, SearchService};
use crate::ports::storage_port::StorageSink;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(SearchRequest),
    Scroll(String),
    ClearScroll(String),
    OpenPit(Vec<String>, String),
    ClosePit(String),
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<SearchResponse>>,
    calls: Vec<Call>,
    fail_open: bool,
    fail_close: bool,
    pit_counter: u32,
}

/// Replays scripted responses to `search` and `scroll`, in order, and records
/// every call. Once the script runs out it answers with empty pages.
#[derive(Clone, Default)]
pub struct MockSearchService {
    state: Arc<Mutex<MockState>>,
}

impl MockSearchService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(pages: Vec<Vec<RawRecord>>) -> Self {
        let mock = Self::new();
        for (i, page) in pages.into_iter().enumerate() {
            let mut resp = SearchResponse::from_hits(page);
            resp.scroll_id = Some(format!("scroll-{}", i));
            mock.push(Ok(resp));
        }
        mock
    }

    pub fn push(&self, response: Result<SearchResponse>) {
        self.state.lock().unwrap().responses.push_back(response);
    }

    pub fn fail_open(&self) {
        self.state.lock().unwrap().fail_open = true;
    }

    pub fn fail_close(&self) {
        self.state.lock().unwrap().fail_close = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn next_response(&self, state: &mut MockState) -> Result<SearchResponse> {
        let mut resp = state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(SearchResponse::default()))?;
        if resp.shards.is_none() {
            resp.shards = Some(ShardStats { total: 1, successful: 1, skipped: 0, failed: 0 });
        }
        Ok(resp)
    }
}

impl SearchService for MockSearchService {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Search(request.clone()));
        let mut resp = self.next_response(&mut state)?;
        if request.pit.is_some() && resp.pit_id.is_none() {
            state.pit_counter += 1;
            resp.pit_id = Some(format!("pit-{}", state.pit_counter));
        }
        Ok(resp)
    }

    fn scroll(&self, scroll_id: &str, _keep_alive: &str) -> Result<SearchResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Scroll(scroll_id.to_string()));
        let mut resp = self.next_response(&mut state)?;
        if resp.scroll_id.is_none() {
            resp.scroll_id = Some(scroll_id.to_string());
        }
        Ok(resp)
    }

    fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ClearScroll(scroll_id.to_string()));
        Ok(())
    }

    fn open_point_in_time(&self, index: &[String], keep_alive: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::OpenPit(index.to_vec(), keep_alive.to_string()));
        if state.fail_open {
            return Err(ExportError::TransportError("open refused".into()));
        }
        Ok("pit-0".to_string())
    }

    fn close_point_in_time(&self, pit_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ClosePit(pit_id.to_string()));
        if state.fail_close {
            return Err(ExportError::TransportError("close refused".into()));
        }
        Ok(())
    }
}

/// Hands out a clone of the wrapped mock, or refuses.
pub struct MockAuthenticator {
    pub service: MockSearchService,
    pub refuse: bool,
}

impl Authenticator for MockAuthenticator {
    fn authenticate(&self, _secrets: &Secrets) -> Result<Box<dyn SearchService>> {
        if self.refuse {
            return Err(ExportError::AuthError("bad credentials".into()));
        }
        Ok(Box::new(self.service.clone()))
    }
}

/// Records every write instead of persisting it.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub writes: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
    pub fail: bool,
}

impl StorageSink for RecordingSink {
    fn write_to_destination(&self, write_path: &str, data: &[Value]) -> Result<()> {
        if self.fail {
            return Err(ExportError::StorageError("sink unavailable".into()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((write_path.to_string(), data.to_vec()));
        Ok(())
    }
}

/// A backend hit with an `_source` payload and optional sort values.
pub fn hit(id: &str, title: &str, sort: Option<Value>) -> RawRecord {
    let mut value = json!({
        "_index": "movies",
        "_id": id,
        "_score": 1.0,
        "_source": {"title": title}
    });
    if let Some(sort) = sort {
        value["sort"] = sort;
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

pub fn secrets() -> Secrets {
    Secrets {
        host: "http://localhost".into(),
        port: 9200,
        username: "elastic".into(),
        password: Some("changeme".into()),
    }
}
