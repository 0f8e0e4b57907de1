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

//! Port for turning an extraction config into backend search parameters.

use crate::config::ExtractionConfig;
use crate::domain::entities::SearchParams;
use crate::domain::errors::Result;

/// A pure strategy: no I/O, same config in, same params out.
///
/// The only failure is a required key missing from the config.
pub trait QueryParamBuilder: Send + Sync {
    fn build(&self, config: &ExtractionConfig) -> Result<SearchParams>;
}
