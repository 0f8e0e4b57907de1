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

//! # Search Batch Exporter
//!
//! Sweeps a date range over a search index, pages through every window's
//! hits with either scroll or point-in-time pagination, and writes one dated
//! batch per non-empty window to local files, S3 or Cloud Storage.
//!
//! This application follows the **Hexagonal Architecture** (Ports and Adapters):
//! the reader and writer only see the `SearchService` and `StorageSink` ports.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

use crate::application::reader::ExtractionReader;
use crate::application::writer::BatchWriter;
use crate::config::{load_file, CliArgs, SinkConfig};
use crate::domain::errors::Result;
use crate::infrastructure::elasticsearch::auth::BasicAuthAuthenticator;
use clap::Parser;
use log::{error, info, warn};
use std::process;

fn main() {
    // 1. Initialize Logging
    env_logger::init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Run
    if let Err(e) = run(&args) {
        error!("Export failed: {}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let mut reader = ExtractionReader::from_files(&args.config, &args.secrets)?;

    let sink_config: SinkConfig = match &args.sink_config {
        Some(path) => load_file(path)?,
        None => SinkConfig::default(),
    };
    let mut writer = BatchWriter::new(&args.bucket, &args.folder_path, &args.destination, &sink_config)?;

    let authenticator = BasicAuthAuthenticator::from_config(reader.config());

    info!("Starting extraction...");
    for batch in reader.run(&authenticator)? {
        let batch = batch?;
        info!("Writing {} records for {} ({})", batch.data.len(), batch.index, batch.date);
        writer.write_batch(&batch)?;
    }

    let read = reader.success();
    let written = writer.success();
    if !read.any_success() {
        warn!("No window returned any hits");
    }
    info!(
        "Export finished. {}/{} windows had data, {}/{} batches written.",
        read.success_count(),
        read.len(),
        written.success_count(),
        written.len()
    );
    Ok(())
}
