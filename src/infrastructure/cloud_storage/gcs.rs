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

//! Google Cloud Storage sink, uploading through `gcloud storage cp`.

use crate::config::SinkConfig;
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::cloud_storage::cli;
use crate::ports::storage_port::StorageSink;
use log::info;
use serde_json::Value;

/// Service-account credentials the sink authenticates with.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceAccount {
    KeyFile(String),
    Info(Value),
}

impl ServiceAccount {
    /// Picks the key file first, then inline info.
    pub fn from_config(config: &SinkConfig) -> Result<Self> {
        if let Some(file) = &config.service_account_file {
            return Ok(ServiceAccount::KeyFile(file.clone()));
        }
        config
            .service_account_info
            .clone()
            .map(ServiceAccount::Info)
            .ok_or_else(|| ExportError::missing("service_account_file or service_account_info"))
    }

    /// Runs `gcloud auth activate-service-account` with these credentials.
    fn activate(&self) -> Result<()> {
        match self {
            ServiceAccount::KeyFile(path) => activation(path),
            ServiceAccount::Info(info) => {
                let staged = cli::stage(&serde_json::to_vec(info)?)?;
                activation(&cli::staged_path(&staged)?)
            }
        }
    }
}

fn activation(key_file: &str) -> Result<()> {
    cli::run(
        "gcloud",
        &[
            "auth".to_string(),
            "activate-service-account".to_string(),
            format!("--key-file={}", key_file),
        ],
    )
}

pub struct GcsSink {
    bucket: String,
}

impl GcsSink {
    /// Activates the configured service account, then returns the sink.
    pub fn connect(bucket: impl Into<String>, config: &SinkConfig) -> Result<Self> {
        let account = ServiceAccount::from_config(config)?;
        account.activate()?;
        Ok(Self::new(bucket))
    }

    /// A sink relying on the ambient gcloud credentials.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self { bucket: bucket.into() }
    }

    pub fn object_uri(&self, write_path: &str) -> String {
        format!("gs://{}/{}.json", self.bucket, write_path)
    }
}

impl StorageSink for GcsSink {
    fn write_to_destination(&self, write_path: &str, data: &[Value]) -> Result<()> {
        let uri = self.object_uri(write_path);
        let staged = cli::stage(&serde_json::to_vec_pretty(data)?)?;

        info!("Uploading {} records to {}", data.len(), uri);
        cli::run(
            "gcloud",
            &[
                "storage".to_string(),
                "cp".to_string(),
                cli::staged_path(&staged)?,
                uri.clone(),
            ],
        )?;
        info!("Done writing to {}", uri);
        Ok(())
    }
}
