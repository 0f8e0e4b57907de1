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

//! Shared plumbing for sinks that shell out to a cloud CLI.
//!
//! The payload is staged in a temporary file and handed to the CLI as a
//! local source path. Non-zero exits surface as `StorageError` with stderr.

use crate::domain::errors::{ExportError, Result};
use log::debug;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

/// Writes `bytes` to a temporary file that lives as long as the handle.
pub fn stage(bytes: &[u8]) -> Result<NamedTempFile> {
    let mut temp = NamedTempFile::new()?;
    temp.write_all(bytes)?;
    temp.flush()?;
    Ok(temp)
}

/// Path of a staged file as a CLI argument.
pub fn staged_path(temp: &NamedTempFile) -> Result<String> {
    temp.path()
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| ExportError::StorageError("staging path is not valid UTF-8".to_string()))
}

/// Runs `program args...` and fails with its stderr on a non-zero exit.
pub fn run(program: &str, args: &[String]) -> Result<()> {
    debug!("Running {} {}", program, args.join(" "));
    let output = Command::new(program).args(args).output().map_err(|e| {
        ExportError::StorageError(format!("failed to launch '{}': {}", program, e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExportError::StorageError(format!(
            "'{} {}' failed: {}",
            program,
            args.first().map(String::as_str).unwrap_or_default(),
            stderr.trim()
        )));
    }
    Ok(())
}
