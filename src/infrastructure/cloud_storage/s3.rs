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

//! Amazon S3 sinks, uploading through `aws s3 cp`.

use crate::domain::errors::Result;
use crate::infrastructure::cloud_storage::cli;
use crate::ports::storage_port::StorageSink;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use serde_json::Value;
use std::io::Write;

const GZIP_LEVEL: u32 = 7;

/// How the batch is encoded before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum S3Encoding {
    /// Pretty-printed JSON, `<path>.json`.
    Json,
    /// Compact JSON compressed with gzip, `<path>.gzip`.
    Gzip,
}

impl S3Encoding {
    fn extension(&self) -> &'static str {
        match self {
            S3Encoding::Json => "json",
            S3Encoding::Gzip => "gzip",
        }
    }
}

pub struct S3Sink {
    bucket: String,
    profile: Option<String>,
    encoding: S3Encoding,
}

impl S3Sink {
    pub fn new(bucket: impl Into<String>, profile: Option<String>, encoding: S3Encoding) -> Self {
        Self {
            bucket: bucket.into(),
            profile,
            encoding,
        }
    }

    pub fn object_uri(&self, write_path: &str) -> String {
        format!("s3://{}/{}.{}", self.bucket, write_path, self.encoding.extension())
    }

    pub fn encode(&self, data: &[Value]) -> Result<Vec<u8>> {
        match self.encoding {
            S3Encoding::Json => Ok(serde_json::to_vec_pretty(data)?),
            S3Encoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::new(GZIP_LEVEL));
                encoder.write_all(&serde_json::to_vec(data)?)?;
                Ok(encoder.finish()?)
            }
        }
    }

    /// Arguments of the `aws` invocation copying `staged` to `uri`.
    pub fn upload_args(&self, staged: &str, uri: &str) -> Vec<String> {
        let mut args: Vec<String> = ["s3", "cp", staged, uri]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push("--content-type".into());
        args.push("application/json".into());
        if self.encoding == S3Encoding::Gzip {
            args.push("--content-encoding".into());
            args.push("gzip".into());
        }
        if let Some(profile) = &self.profile {
            args.push("--profile".into());
            args.push(profile.clone());
        }
        args
    }
}

impl StorageSink for S3Sink {
    fn write_to_destination(&self, write_path: &str, data: &[Value]) -> Result<()> {
        let uri = self.object_uri(write_path);
        let staged = cli::stage(&self.encode(data)?)?;
        let args = self.upload_args(&cli::staged_path(&staged)?, &uri);

        info!("Uploading {} records to {}", data.len(), uri);
        cli::run("aws", &args)?;
        info!("Done writing to {}", uri);
        Ok(())
    }
}
