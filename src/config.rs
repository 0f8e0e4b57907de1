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

//! Configuration types and loaders.
//!
//! Extraction configs, backend secrets and sink settings are read from YAML or
//! JSON files. Required keys that have no sensible default (`query`,
//! `data_field`, `syntax`, `paginator`) are optional at parse time and
//! reported as `MissingKey` when first accessed.

use crate::domain::errors::{ExportError, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::Read;

/// Parameters of one extraction job.
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub index: Vec<String>,
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub syntax: Option<String>,
    #[serde(default)]
    pub paginator: Option<String>,
    #[serde(default = "default_size")]
    pub size: u64,
    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_batched_reduce_size")]
    pub batched_reduce_size: u64,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default = "default_keep_alive")]
    pub scroll: String,
    #[serde(default)]
    pub keep_alive: Option<KeepAlive>,
    #[serde(default)]
    pub sort: Option<Value>,
    #[serde(default = "default_today")]
    pub start_date: String,
    #[serde(default = "default_today")]
    pub end_date: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default)]
    pub data_field: Option<String>,
    /// When set, each window's search is restricted to that window on this field.
    #[serde(default)]
    pub date_field: Option<String>,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Point-in-time keep-alive: bare minutes or a duration string.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum KeepAlive {
    Minutes(u64),
    Duration(String),
}

fn default_size() -> u64 {
    10000
}
fn default_timeout() -> u64 {
    60
}
fn default_batched_reduce_size() -> u64 {
    20
}
fn default_keep_alive() -> String {
    "5m".to_string()
}
fn default_today() -> String {
    "today".to_string()
}
fn default_interval() -> String {
    "day".to_string()
}

impl ExtractionConfig {
    pub fn query(&self) -> Result<&Value> {
        self.query.as_ref().ok_or_else(|| ExportError::missing("query"))
    }

    pub fn data_field(&self) -> Result<&str> {
        self.data_field
            .as_deref()
            .ok_or_else(|| ExportError::missing("data_field"))
    }

    pub fn syntax(&self) -> Result<&str> {
        self.syntax.as_deref().ok_or_else(|| ExportError::missing("syntax"))
    }

    pub fn paginator(&self) -> Result<&str> {
        self.paginator
            .as_deref()
            .ok_or_else(|| ExportError::missing("paginator"))
    }

    /// The first configured index, which names every batch.
    pub fn primary_index(&self) -> Result<&str> {
        self.index
            .first()
            .map(String::as_str)
            .ok_or_else(|| ExportError::missing("index"))
    }

    /// Point-in-time keep-alive rendered for the backend (`"5m"` by default).
    pub fn keep_alive(&self) -> String {
        match &self.keep_alive {
            Some(KeepAlive::Minutes(m)) => format!("{}m", m),
            Some(KeepAlive::Duration(d)) => d.clone(),
            None => default_keep_alive(),
        }
    }
}

/// Retry policy of the transport session.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SessionConfig {
    /// Retries per call after the first attempt.
    #[serde(default = "default_total")]
    pub total: u32,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_status_forcelist")]
    pub status_forcelist: Vec<u16>,
}

fn default_total() -> u32 {
    3
}
fn default_backoff_factor() -> f64 {
    0.1
}
fn default_status_forcelist() -> Vec<u16> {
    vec![500, 502, 503, 504]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total: default_total(),
            backoff_factor: default_backoff_factor(),
            status_forcelist: default_status_forcelist(),
        }
    }
}

/// Backend credentials. Only the authenticator looks inside.
#[derive(Debug, Deserialize, Clone)]
pub struct Secrets {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
}

impl Secrets {
    /// The configured password, falling back to `ELASTIC_PASSWORD`.
    pub fn resolve_password(&self) -> String {
        self.password
            .clone()
            .or_else(|| std::env::var("ELASTIC_PASSWORD").ok())
            .unwrap_or_default()
    }
}

/// Settings consumed by the cloud sinks.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SinkConfig {
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub service_account_file: Option<String>,
    #[serde(default)]
    pub service_account_info: Option<Value>,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Extraction config (YAML or JSON)
    #[arg(short, long)]
    pub config: String,

    /// Backend secrets (YAML or JSON)
    #[arg(short, long)]
    pub secrets: String,

    /// Bucket name, or root directory for local destinations
    #[arg(short, long)]
    pub bucket: String,

    /// Folder prefix inside the bucket
    #[arg(long)]
    pub folder_path: String,

    /// local_json | local_csv | aws_s3_json | gcp_cloudstorage_json | aws_s3_gzip
    #[arg(short, long, default_value = "local_json")]
    pub destination: String,

    /// Sink settings (YAML or JSON)
    #[arg(long)]
    pub sink_config: Option<String>,
}

/// Loads a YAML or JSON file into `T`. Other extensions are rejected.
pub fn load_file<T: DeserializeOwned>(path: &str) -> Result<T> {
    let path = path.trim();
    let extension = path.rsplit('.').next().unwrap_or_default();
    if !matches!(extension, "json" | "yml" | "yaml") {
        return Err(ExportError::ConfigError(format!(
            "wrong file type for '{}': expecting only json and yaml files",
            path
        )));
    }

    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let loaded = if extension == "json" {
        serde_json::from_str(&contents)?
    } else {
        serde_yaml::from_str(&contents)?
    };
    Ok(loaded)
}
