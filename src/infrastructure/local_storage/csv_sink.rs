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

//! Local filesystem sink writing one fully-quoted CSV file per batch.

use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::local_storage::json_sink::ensure_parent;
use crate::ports::storage_port::StorageSink;
use csv::{QuoteStyle, WriterBuilder};
use log::info;
use serde_json::Value;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Writes `<root>/<write_path>.csv`.
///
/// The header is the union of all record keys in first-seen order. Strings
/// are written as-is, every other value as compact JSON, missing keys as "".
pub struct LocalCsvSink {
    root: PathBuf,
}

impl LocalCsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn target(&self, write_path: &str) -> PathBuf {
        self.root.join(format!("{}.csv", write_path))
    }

    fn columns(data: &[Value]) -> Result<Vec<String>> {
        let mut columns: Vec<String> = Vec::new();
        for record in data {
            let object = record
                .as_object()
                .ok_or_else(|| ExportError::type_mismatch("record", "object"))?;
            for key in object.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Ok(columns)
    }

    fn cell(value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl StorageSink for LocalCsvSink {
    fn write_to_destination(&self, write_path: &str, data: &[Value]) -> Result<()> {
        let columns = Self::columns(data)?;
        let target = self.target(write_path);
        ensure_parent(&target)?;

        let file = BufWriter::new(File::create(&target)?);
        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(file);

        wtr.write_record(&columns)?;
        for record in data {
            let row: Vec<String> = columns
                .iter()
                .map(|c| Self::cell(record.get(c)))
                .collect();
            wtr.write_record(&row)?;
        }
        wtr.flush()?;

        info!("Done writing {} rows to {}", data.len(), target.display());
        Ok(())
    }
}
