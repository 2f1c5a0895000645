//! Centrum registry client.
//!
//! `GET {base}/v1/dispatchers` returns a JSON array of dispatcher URLs in
//! the order they should be tried. Anything but a 200 means the registry is
//! unavailable.

use std::time::Duration;

use gizo_core::GizoConfig;
use reqwest::StatusCode;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct RegistryClient {
    base: String,
    http: reqwest::Client,
    timeout: Option<Duration>,
}

impl RegistryClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            base: base.into(),
            http,
            timeout,
        }
    }

    /// Registry for the network selected in `config`.
    pub fn from_config(config: &GizoConfig, http: reqwest::Client) -> Self {
        Self::new(http, config.registry_base(), config.registry_timeout())
    }

    pub fn dispatchers_url(&self) -> String {
        format!("{}/v1/dispatchers", self.base)
    }

    /// Candidate dispatcher URLs, in priority order.
    pub async fn dispatchers(&self) -> Result<Vec<String>> {
        let url = self.dispatchers_url();
        let unavailable = |reason: String| Error::RegistryUnavailable {
            url: url.clone(),
            reason,
        };

        let mut req = self.http.get(&url);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let resp = req.send().await.map_err(|e| unavailable(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        let candidates: Vec<String> = resp.json().await.map_err(|e| Error::InvalidResponse {
            context: url.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(url = %url, count = candidates.len(), "registry listed dispatchers");
        Ok(candidates)
    }
}
