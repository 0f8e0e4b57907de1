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

//! # Search Port
//!
//! The contract for talking to the search backend. The pagination engines
//! only ever see a `&dyn SearchService`, so the HTTP client and the test
//! doubles are interchangeable.

use crate::config::Secrets;
use crate::domain::entities::{SearchRequest, SearchResponse};
use crate::domain::errors::Result;

/// `SearchService` is an authenticated handle on the backend.
///
/// Every call is synchronous. Retries, if any, happen inside the
/// implementation; an `Err` here means the call is lost for good.
pub trait SearchService: Send + Sync {
    /// Runs one search. A request carrying a `pit` must not name an index.
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Fetches the next page of an open scroll context.
    fn scroll(&self, scroll_id: &str, keep_alive: &str) -> Result<SearchResponse>;

    /// Releases a scroll context.
    fn clear_scroll(&self, scroll_id: &str) -> Result<()>;

    /// Opens a point-in-time over `index` and returns its id.
    fn open_point_in_time(&self, index: &[String], keep_alive: &str) -> Result<String>;

    /// Releases a point-in-time.
    fn close_point_in_time(&self, pit_id: &str) -> Result<()>;
}

/// Turns secrets into a live `SearchService`.
pub trait Authenticator {
    fn authenticate(&self, secrets: &Secrets) -> Result<Box<dyn SearchService>>;
}
