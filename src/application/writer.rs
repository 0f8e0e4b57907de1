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

//! # Batch Writer
//!
//! Validates batch payloads and routes them to the selected storage sink.
//!
//! A payload must be an object with `data` (array), `date` (`YYYYMMDD`) and
//! `index` (string). It lands at `<folder_path>/<index>/<date>`, the sink
//! appending its own extension. Every attempt appends one outcome to the
//! writer's `SuccessLog`.

use crate::config::SinkConfig;
use crate::domain::entities::Batch;
use crate::domain::errors::{ExportError, Result};
use crate::domain::success_log::SuccessLog;
use crate::infrastructure::cloud_storage::gcs::GcsSink;
use crate::infrastructure::cloud_storage::s3::{S3Encoding, S3Sink};
use crate::infrastructure::local_storage::csv_sink::LocalCsvSink;
use crate::infrastructure::local_storage::json_sink::LocalJsonSink;
use crate::ports::storage_port::StorageSink;
use chrono::NaiveDate;
use log::{info, warn};
use serde_json::Value;
use std::str::FromStr;

const REQUIRED_KEYS: [&str; 3] = ["data", "date", "index"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    LocalJson,
    LocalCsv,
    AwsS3Json,
    GcpCloudStorageJson,
    AwsS3Gzip,
}

impl FromStr for Destination {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local_json" => Ok(Destination::LocalJson),
            "local_csv" => Ok(Destination::LocalCsv),
            "aws_s3_json" => Ok(Destination::AwsS3Json),
            "gcp_cloudstorage_json" => Ok(Destination::GcpCloudStorageJson),
            "aws_s3_gzip" => Ok(Destination::AwsS3Gzip),
            other => Err(ExportError::ConfigError(format!(
                "unknown destination '{}': expecting local_json, local_csv, aws_s3_json, \
                 gcp_cloudstorage_json or aws_s3_gzip",
                other
            ))),
        }
    }
}

impl Destination {
    /// Instantiates the sink. For local destinations `bucket` is the root directory.
    pub fn build(&self, bucket: &str, config: &SinkConfig) -> Result<Box<dyn StorageSink>> {
        Ok(match self {
            Destination::LocalJson => Box::new(LocalJsonSink::new(bucket)),
            Destination::LocalCsv => Box::new(LocalCsvSink::new(bucket)),
            Destination::AwsS3Json => Box::new(S3Sink::new(
                bucket,
                config.profile_name.clone(),
                S3Encoding::Json,
            )),
            Destination::AwsS3Gzip => Box::new(S3Sink::new(
                bucket,
                config.profile_name.clone(),
                S3Encoding::Gzip,
            )),
            Destination::GcpCloudStorageJson => Box::new(GcsSink::connect(bucket, config)?),
        })
    }
}

pub struct BatchWriter {
    folder_path: String,
    sink: Box<dyn StorageSink>,
    success: SuccessLog,
}

impl BatchWriter {
    /// Resolves `destination` and builds its sink. Unknown destinations fail here.
    pub fn new(
        bucket: &str,
        folder_path: &str,
        destination: &str,
        sink_config: &SinkConfig,
    ) -> Result<Self> {
        let sink = destination.parse::<Destination>()?.build(bucket, sink_config)?;
        info!("Writing to '{}' under {}/{}", destination, bucket, folder_path);
        Ok(Self::with_sink(folder_path, sink))
    }

    pub fn with_sink(folder_path: &str, sink: Box<dyn StorageSink>) -> Self {
        Self {
            folder_path: folder_path.to_string(),
            sink,
            success: SuccessLog::new(),
        }
    }

    pub fn success(&self) -> &SuccessLog {
        &self.success
    }

    /// Checks the payload shape and returns its write path and records.
    pub fn verify<'p>(&self, payload: &'p Value) -> Result<(String, &'p [Value])> {
        let object = payload
            .as_object()
            .ok_or_else(|| ExportError::type_mismatch("payload", "object"))?;
        if let Some(key) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
            return Err(ExportError::missing(*key));
        }

        let data = object["data"]
            .as_array()
            .ok_or_else(|| ExportError::type_mismatch("data", "array"))?;
        let date = object["date"].as_str().unwrap_or_default();
        if !is_compact_date(date) {
            return Err(ExportError::InvalidValue {
                field: "date".to_string(),
                reason: format!("expecting YYYYMMDD, got {}", object["date"]),
            });
        }
        let index = object["index"]
            .as_str()
            .ok_or_else(|| ExportError::type_mismatch("index", "string"))?;

        Ok((format!("{}/{}/{}", self.folder_path, index, date), data.as_slice()))
    }

    /// Validates and writes one payload.
    ///
    /// Validation and sink failures are recorded as `false` and returned.
    /// An empty `data` array is recorded as `false` without touching the sink.
    pub fn write(&mut self, payload: &Value) -> Result<()> {
        let (write_path, data) = match self.verify(payload) {
            Ok(checked) => checked,
            Err(e) => {
                warn!("Rejected payload: {}", e);
                self.success.failure();
                return Err(e);
            }
        };

        if data.is_empty() {
            warn!("Nothing to write for {}", write_path);
            self.success.failure();
            return Ok(());
        }

        match self.sink.write_to_destination(&write_path, data) {
            Ok(()) => {
                self.success.success();
                Ok(())
            }
            Err(e) => {
                self.success.failure();
                Err(e)
            }
        }
    }

    pub fn write_batch(&mut self, batch: &Batch) -> Result<()> {
        self.write(&serde_json::to_value(batch)?)
    }
}

/// Exactly eight digits forming a real calendar date.
fn is_compact_date(date: &str) -> bool {
    date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;
    use serde_json::json;

    fn writer(sink: &RecordingSink) -> BatchWriter {
        BatchWriter::with_sink("elastic_search", Box::new(sink.clone()))
    }

    #[test]
    fn test_empty_payload_is_missing_key() {
        let sink = RecordingSink::default();
        let mut w = writer(&sink);
        assert!(matches!(w.verify(&json!({})), Err(ExportError::MissingKey(k)) if k == "data"));
        assert!(w.write(&json!({})).is_err());
        assert_eq!(w.success().entries(), &[false]);
    }

    #[test]
    fn test_dashed_date_is_invalid_value() {
        let sink = RecordingSink::default();
        let w = writer(&sink);
        let payload = json!({"data": [{"a": 1}], "date": "2023-01-29", "index": "movies"});
        assert!(matches!(w.verify(&payload), Err(ExportError::InvalidValue { .. })));

        let impossible = json!({"data": [], "date": "20230230", "index": "movies"});
        assert!(matches!(w.verify(&impossible), Err(ExportError::InvalidValue { .. })));
    }

    #[test]
    fn test_shape_mismatches() {
        let w = writer(&RecordingSink::default());
        let not_array = json!({"data": {"a": 1}, "date": "20230129", "index": "movies"});
        assert!(matches!(w.verify(&not_array), Err(ExportError::TypeMismatch { .. })));

        let numeric_index = json!({"data": [], "date": "20230129", "index": 7});
        assert!(matches!(w.verify(&numeric_index), Err(ExportError::TypeMismatch { .. })));
    }

    #[test]
    fn test_writes_to_folder_index_date() {
        let sink = RecordingSink::default();
        let mut w = writer(&sink);
        let payload = json!({"data": [{"title": "Heat"}], "date": "20230129", "index": "movies"});

        w.write(&payload).unwrap();

        let writes = sink.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "elastic_search/movies/20230129");
        assert_eq!(writes[0].1, vec![json!({"title": "Heat"})]);
        assert_eq!(w.success().entries(), &[true]);
    }

    #[test]
    fn test_folder_path_is_concatenated_verbatim() {
        let w = BatchWriter::with_sink("elastic_search/", Box::new(RecordingSink::default()));
        let payload = json!({"data": [{"a": 1}], "date": "20230129", "index": "movies"});
        let (path, _) = w.verify(&payload).unwrap();
        assert_eq!(path, "elastic_search//movies/20230129");
    }

    #[test]
    fn test_empty_data_skips_sink() {
        let sink = RecordingSink::default();
        let mut w = writer(&sink);
        let payload = json!({"data": [], "date": "20230129", "index": "movies"});

        assert!(w.write(&payload).is_ok());
        assert!(sink.writes.lock().unwrap().is_empty());
        assert_eq!(w.success().entries(), &[false]);
    }

    #[test]
    fn test_sink_failure_is_recorded_and_returned() {
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut w = writer(&sink);
        let payload = json!({"data": [{"a": 1}], "date": "20230129", "index": "movies"});

        assert!(matches!(w.write(&payload), Err(ExportError::StorageError(_))));
        assert_eq!(w.success().entries(), &[false]);
    }

    #[test]
    fn test_write_batch_serializes_batch() {
        let sink = RecordingSink::default();
        let mut w = writer(&sink);
        let mut record = serde_json::Map::new();
        record.insert("title".into(), json!("Heat"));
        let batch = Batch {
            date: "20230129".into(),
            index: "movies".into(),
            data: vec![record],
        };

        w.write_batch(&batch).unwrap();
        assert_eq!(sink.writes.lock().unwrap()[0].0, "elastic_search/movies/20230129");
    }

    #[test]
    fn test_destination_registry() {
        assert_eq!("aws_s3_gzip".parse::<Destination>().unwrap(), Destination::AwsS3Gzip);
        assert!(matches!("ftp".parse::<Destination>(), Err(ExportError::ConfigError(_))));

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let mut w = BatchWriter::new(root, "es", "local_json", &SinkConfig::default()).unwrap();
        w.write(&json!({"data": [{"a": 1}], "date": "20230129", "index": "movies"}))
            .unwrap();
        assert!(dir.path().join("es/movies/20230129.json").exists());

        assert!(matches!(
            BatchWriter::new(root, "es", "gcp_cloudstorage_json", &SinkConfig::default()),
            Err(ExportError::MissingKey(_))
        ));
    }
}
