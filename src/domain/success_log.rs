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

//! # Success Log
//!
//! An append-only ledger of boolean outcomes, one entry per attempted unit of
//! work (a date window on the read side, a write on the write side).
//!
//! Every reader and writer owns its own log. Two instances never share one.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuccessLog {
    entries: Vec<bool>,
}

impl SuccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: bool) {
        self.entries.push(outcome);
    }

    pub fn success(&mut self) {
        self.record(true);
    }

    pub fn failure(&mut self) {
        self.record(false);
    }

    /// Outcomes in the order they were recorded.
    pub fn entries(&self) -> &[bool] {
        &self.entries
    }

    pub fn any_success(&self) -> bool {
        self.entries.iter().any(|ok| *ok)
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|ok| **ok).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
