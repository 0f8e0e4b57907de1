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

//! # Pagination Port
//!
//! A pagination engine turns one set of search parameters into a lazy,
//! finite, single-pass sequence of raw hits.

use crate::config::ExtractionConfig;
use crate::domain::entities::{RawRecord, SearchParams};
use crate::domain::errors::Result;
use crate::ports::search_port::SearchService;

/// Lazy record stream. Nothing is fetched until the first `next()`.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<RawRecord>> + 'a>;

pub trait PaginationEngine: Send + Sync {
    /// Streams every hit matching `params`.
    ///
    /// After an `Err` the stream ends. Dropping a scroll stream early clears
    /// its context; a point-in-time handle is left to expire on its own.
    fn paginate<'a>(
        &self,
        service: &'a dyn SearchService,
        config: &'a ExtractionConfig,
        params: SearchParams,
    ) -> RecordStream<'a>;
}
