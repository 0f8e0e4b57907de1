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

//! # Pagination Engines
//!
//! Two ways of walking a result set that is larger than one page:
//!
//! 1. **Scroll**: the server keeps the cursor. We issue the initial search with
//!    a scroll keep-alive, then follow `_scroll_id` until an empty page, then
//!    clear the context. Hits come back in index order (`_doc`), so no
//!    ordering is promised across pages.
//! 2. **Point in time**: we hold the cursor. A PIT handle is opened over the
//!    configured indices, every search is bound to it, and with a configured
//!    `sort` each page resumes `search_after` the last hit's sort values. The
//!    handle is released when a page comes back empty.
//!
//! Both are lazy: nothing is requested until the first `next()`, and each
//! further request happens only when the previous page has been drained.

use crate::config::ExtractionConfig;
use crate::domain::entities::{PitHandle, RawRecord, SearchParams, SearchRequest, SearchResponse};
use crate::domain::errors::{ExportError, Result};
use crate::ports::pagination_port::{PaginationEngine, RecordStream};
use crate::ports::search_port::SearchService;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::VecDeque;
use std::str::FromStr;

/// Registry of the supported paginators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorKind {
    Scroll,
    PointInTime,
}

impl FromStr for PaginatorKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scroll" => Ok(PaginatorKind::Scroll),
            "point_in_time" => Ok(PaginatorKind::PointInTime),
            other => Err(ExportError::ConfigError(format!(
                "wrong value for 'paginator': expecting 'scroll' or 'point_in_time', got '{}'",
                other
            ))),
        }
    }
}

impl PaginatorKind {
    pub fn engine(&self) -> Box<dyn PaginationEngine> {
        match self {
            PaginatorKind::Scroll => Box::new(ScrollPaginator),
            PaginatorKind::PointInTime => Box::new(PointInTimePaginator),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollPaginator;

impl ScrollPaginator {
    pub fn scan<'a>(
        &self,
        service: &'a dyn SearchService,
        config: &ExtractionConfig,
        params: SearchParams,
    ) -> ScrollPages<'a> {
        let mut request = SearchRequest::new(params);
        request.scroll = Some(config.scroll.clone());
        request.sort = Some(Value::String("_doc".to_string()));
        ScrollPages {
            service,
            keep_alive: config.scroll.clone(),
            state: ScrollState::Unstarted(request),
            scroll_id: None,
            buffer: VecDeque::new(),
            failure: None,
        }
    }
}

impl PaginationEngine for ScrollPaginator {
    fn paginate<'a>(
        &self,
        service: &'a dyn SearchService,
        config: &'a ExtractionConfig,
        params: SearchParams,
    ) -> RecordStream<'a> {
        Box::new(self.scan(service, config, params))
    }
}

enum ScrollState {
    Unstarted(SearchRequest),
    Active,
    Done,
}

/// Lazy iterator over a scroll context.
pub struct ScrollPages<'a> {
    service: &'a dyn SearchService,
    keep_alive: String,
    state: ScrollState,
    /// Live context id, cleared on the way out.
    scroll_id: Option<String>,
    buffer: VecDeque<RawRecord>,
    /// Partial-shard failure, raised once the page that reported it is drained.
    failure: Option<ExportError>,
}

impl ScrollPages<'_> {
    pub fn is_done(&self) -> bool {
        matches!(self.state, ScrollState::Done) && self.buffer.is_empty()
    }

    fn finish(&mut self) {
        self.state = ScrollState::Done;
        if let Some(id) = self.scroll_id.take() {
            if let Err(e) = self.service.clear_scroll(&id) {
                warn!("Failed to clear scroll context: {}", e);
            }
        }
    }

    fn absorb(&mut self, response: SearchResponse) -> bool {
        self.scroll_id = response.scroll_id;
        if self.scroll_id.is_none() || response.hits.hits.is_empty() {
            return false;
        }

        if let Some(shards) = response.shards.as_ref().filter(|s| s.is_partial()) {
            warn!(
                "Scroll request has only succeeded on {} (+{} skipped) shards out of {}",
                shards.successful, shards.skipped, shards.total
            );
            self.failure = Some(ExportError::SearchError(format!(
                "scroll request has only succeeded on {} (+{} skipped) shards out of {}",
                shards.successful, shards.skipped, shards.total
            )));
        }

        debug!("Scroll page with {} hits", response.hits.hits.len());
        self.buffer.extend(response.hits.hits);
        self.state = ScrollState::Active;
        true
    }
}

/// Clears a still-open context when the consumer stops early.
impl Drop for ScrollPages<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl Iterator for ScrollPages<'_> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if let Some(err) = self.failure.take() {
                self.finish();
                return Some(Err(err));
            }

            let response = match std::mem::replace(&mut self.state, ScrollState::Done) {
                ScrollState::Done => return None,
                ScrollState::Unstarted(request) => self.service.search(&request),
                ScrollState::Active => match self.scroll_id.clone() {
                    Some(id) => self.service.scroll(&id, &self.keep_alive),
                    None => return None,
                },
            };

            match response {
                Ok(resp) => {
                    if !self.absorb(resp) {
                        self.finish();
                        return None;
                    }
                }
                Err(e) => {
                    self.finish();
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Lifecycle of a point-in-time cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitState {
    Unopened,
    Open,
    Paging,
    Closed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PointInTimePaginator;

impl PointInTimePaginator {
    pub fn pages<'a>(
        &self,
        service: &'a dyn SearchService,
        config: &'a ExtractionConfig,
        params: SearchParams,
    ) -> PitPages<'a> {
        PitPages {
            service,
            index: &config.index,
            keep_alive: config.keep_alive(),
            sort: config.sort.clone(),
            params,
            state: PitState::Unopened,
            pit_id: None,
            pages_fetched: 0,
            last_sort: None,
            buffer: VecDeque::new(),
            released: None,
        }
    }

    /// Closes `pit_id`. Failures are logged and reported as `false`, never raised.
    pub fn close_handle(service: &dyn SearchService, pit_id: &str) -> bool {
        match service.close_point_in_time(pit_id) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to close point in time: {}", e);
                false
            }
        }
    }
}

impl PaginationEngine for PointInTimePaginator {
    fn paginate<'a>(
        &self,
        service: &'a dyn SearchService,
        config: &'a ExtractionConfig,
        params: SearchParams,
    ) -> RecordStream<'a> {
        Box::new(self.pages(service, config, params))
    }
}

/// Lazy iterator driving the `Unopened → Open → Paging → Closed` machine.
///
/// Only an empty page (or a failure detected here) releases the handle.
/// Dropping the iterator early leaves the handle to expire after `keep_alive`.
pub struct PitPages<'a> {
    service: &'a dyn SearchService,
    index: &'a [String],
    keep_alive: String,
    sort: Option<Value>,
    params: SearchParams,
    state: PitState,
    pit_id: Option<String>,
    pages_fetched: u64,
    last_sort: Option<Vec<Value>>,
    buffer: VecDeque<RawRecord>,
    released: Option<bool>,
}

impl PitPages<'_> {
    pub fn state(&self) -> PitState {
        self.state
    }

    /// Outcome of the close call, once one was attempted.
    pub fn released(&self) -> Option<bool> {
        self.released
    }

    pub fn pit_id(&self) -> Option<&str> {
        self.pit_id.as_deref()
    }

    fn open(&mut self) -> Result<()> {
        let id = self.service.open_point_in_time(self.index, &self.keep_alive)?;
        info!("Opened point in time over {:?} (keep_alive {})", self.index, self.keep_alive);
        self.pit_id = Some(id);
        // The handle scopes the indices; a PIT search must not name any.
        self.params.index = None;
        self.state = PitState::Open;
        Ok(())
    }

    fn close(&mut self) {
        let released = match self.pit_id.as_deref() {
            Some(id) => PointInTimePaginator::close_handle(self.service, id),
            None => false,
        };
        if released {
            info!("Closed point in time after {} pages", self.pages_fetched);
        }
        self.released = Some(released);
        self.state = PitState::Closed;
    }

    fn next_request(&mut self) -> SearchRequest {
        if self.pages_fetched > 0 && self.sort.is_some() {
            self.params.search_after = self.last_sort.clone();
        }
        let mut request = SearchRequest::new(self.params.clone());
        request.pit = self.pit_id.clone().map(|id| PitHandle {
            id,
            keep_alive: self.keep_alive.clone(),
        });
        request.sort = self.sort.clone();
        request.track_total_hits = Some(false);
        request
    }

    /// Fetches one page. `Ok(false)` means the page was empty.
    fn fetch_page(&mut self) -> Result<bool> {
        let request = self.next_request();
        let response = self.service.search(&request)?;

        // Server-issued ids rotate; always continue with the latest one.
        if let Some(id) = response.pit_id {
            self.pit_id = Some(id);
        }
        self.state = PitState::Paging;

        let hits = response.hits.hits;
        let Some(last) = hits.last() else {
            return Ok(false);
        };
        if self.sort.is_some() {
            let sort_values = last
                .get("sort")
                .and_then(Value::as_array)
                .cloned()
                .ok_or_else(|| ExportError::missing("sort"))?;
            self.last_sort = Some(sort_values);
        }

        self.pages_fetched += 1;
        debug!("Point in time page {} with {} hits", self.pages_fetched, hits.len());
        self.buffer.extend(hits);
        Ok(true)
    }
}

impl Iterator for PitPages<'_> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }

            match self.state {
                PitState::Closed => return None,
                PitState::Unopened => {
                    if let Err(e) = self.open() {
                        self.state = PitState::Closed;
                        return Some(Err(e));
                    }
                }
                PitState::Open | PitState::Paging => match self.fetch_page() {
                    Ok(true) => {}
                    Ok(false) => {
                        self.close();
                        return None;
                    }
                    Err(e) => {
                        self.close();
                        return Some(Err(e));
                    }
                },
            }
        }
    }
}
