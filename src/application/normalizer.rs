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

//! Flattens a raw hit: the payload field's contents move to the top level and
//! whatever else the hit carried is kept under `metadata`.

use crate::domain::entities::{NormalizedRecord, RawRecord};
use crate::domain::errors::{ExportError, Result};
use serde_json::Value;

pub fn normalize(mut record: RawRecord, payload_field: &str) -> Result<NormalizedRecord> {
    let payload = record
        .remove(payload_field)
        .ok_or_else(|| ExportError::missing(payload_field))?;

    let Value::Object(mut flattened) = payload else {
        return Err(ExportError::type_mismatch(payload_field, "object"));
    };
    flattened.insert("metadata".to_string(), Value::Object(record));
    Ok(flattened)
}
