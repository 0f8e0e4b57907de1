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

//! Basic-auth authenticator producing an `HttpSearchService`.

use crate::config::{ExtractionConfig, Secrets, SessionConfig};
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::elasticsearch::client::HttpSearchService;
use crate::ports::search_port::{Authenticator, SearchService};
use log::info;
use reqwest::Url;

pub struct BasicAuthAuthenticator {
    session: SessionConfig,
    timeout_secs: u64,
}

impl BasicAuthAuthenticator {
    pub fn new(session: SessionConfig, timeout_secs: u64) -> Self {
        Self { session, timeout_secs }
    }

    /// Retry session and per-request timeout taken from the extraction config.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.session.clone(), config.timeout)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// `<host>:<port>` validated as an absolute http(s) URL.
    pub fn endpoint(secrets: &Secrets) -> Result<Url> {
        let raw = format!("{}:{}", secrets.host.trim_end_matches('/'), secrets.port);
        let url = Url::parse(&raw)
            .map_err(|e| ExportError::AuthError(format!("invalid backend address '{}': {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ExportError::AuthError(format!(
                "invalid backend address '{}': expecting http(s)://host",
                raw
            )));
        }
        Ok(url)
    }
}

impl Authenticator for BasicAuthAuthenticator {
    fn authenticate(&self, secrets: &Secrets) -> Result<Box<dyn SearchService>> {
        let url = Self::endpoint(secrets)?;
        info!("Connecting to {} as {}", url, secrets.username);
        let service = HttpSearchService::new(
            url.as_str(),
            &secrets.username,
            &secrets.resolve_password(),
            &self.session,
            self.timeout_secs,
        )
        .map_err(|e| ExportError::AuthError(format!("cannot build client for {}: {}", url, e)))?;
        Ok(Box::new(service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(host: &str) -> Secrets {
        Secrets {
            host: host.into(),
            port: 9200,
            username: "elastic".into(),
            password: Some("pw".into()),
        }
    }

    #[test]
    fn test_endpoint_joins_host_and_port() {
        let url = BasicAuthAuthenticator::endpoint(&secrets("https://search.local")).unwrap();
        assert_eq!(url.as_str(), "https://search.local:9200/");
    }

    #[test]
    fn test_host_without_scheme_is_auth_error() {
        let result = BasicAuthAuthenticator::endpoint(&secrets("search.local"));
        assert!(matches!(result, Err(ExportError::AuthError(_))));
    }

    #[test]
    fn test_authenticate_returns_service() {
        let auth = BasicAuthAuthenticator::new(SessionConfig::default(), 60);
        assert!(auth.authenticate(&secrets("http://localhost")).is_ok());
    }

    #[test]
    fn test_request_timeout_follows_config() {
        let config: ExtractionConfig =
            serde_json::from_value(serde_json::json!({"timeout": 120})).unwrap();
        let auth = BasicAuthAuthenticator::from_config(&config);
        assert_eq!(auth.timeout_secs(), 120);
        assert!(auth.authenticate(&secrets("http://localhost")).is_ok());
    }
}
