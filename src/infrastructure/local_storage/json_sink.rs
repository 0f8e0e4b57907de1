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

//! Local filesystem sink writing one pretty-printed JSON document per batch.

use crate::domain::errors::Result;
use crate::ports::storage_port::StorageSink;
use log::info;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `<root>/<write_path>.json`, creating parent directories as needed.
pub struct LocalJsonSink {
    root: PathBuf,
}

impl LocalJsonSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn target(&self, write_path: &str) -> PathBuf {
        self.root.join(format!("{}.json", write_path))
    }
}

/// Creates the parent directory of `target`.
pub(crate) fn ensure_parent(target: &Path) -> std::io::Result<()> {
    match target.parent() {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
}

impl StorageSink for LocalJsonSink {
    fn write_to_destination(&self, write_path: &str, data: &[Value]) -> Result<()> {
        let target = self.target(write_path);
        ensure_parent(&target)?;

        let mut writer = BufWriter::new(File::create(&target)?);
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        data.serialize(&mut ser)?;
        writer.flush()?;

        info!("Done writing {} records to {}", data.len(), target.display());
        Ok(())
    }
}
