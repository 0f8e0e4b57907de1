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

//! Core error definitions for the search batch exporter.
//!
//! This module provides a centralized `ExportError` enum and a `Result` type
//! used throughout the application to handle configuration, validation,
//! transport and storage errors.

use thiserror::Error;

/// Error types encountered during extraction and writing.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Unknown syntax/paginator/destination tag, bad file type, bad date expression.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required config or payload key is absent.
    #[error("Missing required key: {0}")]
    MissingKey(String),

    #[error("Type mismatch for '{field}': expected {expected}")]
    TypeMismatch { field: String, expected: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered but reported a failure (e.g. failed shards).
    #[error("Search failed: {0}")]
    SearchError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl ExportError {
    pub fn missing(key: impl Into<String>) -> Self {
        ExportError::MissingKey(key.into())
    }

    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>) -> Self {
        ExportError::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

/// A specialized Result type for the search batch exporter.
pub type Result<T> = std::result::Result<T, ExportError>;
