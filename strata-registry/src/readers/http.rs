use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use strata_core::{ConfigError, ConfigResult};
use tracing::{debug, info};
use url::Url;

use crate::registry::ReadFn;

const DEFAULT_USER_AGENT: &str = concat!("strata/", env!("CARGO_PKG_VERSION"));

/// Fetch a remote configuration document with the transport defaults
pub fn read_http(descriptor: &str) -> ConfigResult<Vec<u8>> {
    HttpReader::new().fetch(descriptor)
}

/// One-shot HTTP(S) fetcher.
///
/// There is no retry; falling back across sources is the caller's job.
/// Set a timeout when startup latency must be bounded.
#[derive(Debug, Clone)]
pub struct HttpReader {
    timeout: Option<Duration>,
    user_agent: String,
}

impl Default for HttpReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpReader {
    pub fn new() -> Self {
        Self {
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Wrap this reader for registration under any scheme
    pub fn into_read_fn(self) -> ReadFn {
        Arc::new(move |descriptor: &str| self.fetch(descriptor))
    }

    pub fn fetch(&self, descriptor: &str) -> ConfigResult<Vec<u8>> {
        let url = Url::parse(descriptor)
            .map_err(|e| ConfigError::unreachable(descriptor, format!("invalid URL: {}", e)))?;

        let mut builder = Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::unreachable(descriptor, e))?;

        info!("Fetching configuration from {}", url);
        let response = client
            .get(url)
            .send()
            .map_err(|e| ConfigError::unreachable(descriptor, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::unreachable(
                descriptor,
                format!("HTTP status {}", status),
            ));
        }

        let body = response
            .bytes()
            .map_err(|e| ConfigError::unreachable(descriptor, e))?;
        debug!("Fetched {} bytes from {}", body.len(), descriptor);
        Ok(body.to_vec())
    }
}
