//! HTTP fetch for documentation pages
//!
//! Retrieves the raw body of a result link with a bounded timeout and
//! response size. Any transport failure or non-success status is a
//! [`DocsError::Fetch`].

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::{DocsError, DocsResult, Stage};

/// Trait for anything that can produce the raw body of a result link
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> DocsResult<String>;
}

/// HTTP fetch service with configurable client
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    timeout_seconds: u64,
    max_response_size: usize,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            timeout_seconds: config.timeout_seconds,
            max_response_size: config.max_response_size,
        })
    }

    /// Fetch a URL and return the body as text
    pub async fn get(&self, url: &str) -> DocsResult<String> {
        tracing::debug!("Fetching {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP status {}", status),
            });
        }

        // Check Content-Length before downloading
        if let Some(len) = response.content_length() {
            if len as usize > self.max_response_size {
                return Err(self.too_large(url, len as usize));
            }
        }

        // Chunked responses carry no length, so the limit is enforced while reading
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(url, e))?
        {
            if bytes.len() + chunk.len() > self.max_response_size {
                return Err(self.too_large(url, bytes.len() + chunk.len()));
            }
            bytes.extend_from_slice(&chunk);
        }

        let body = String::from_utf8_lossy(&bytes).into_owned();
        tracing::debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(body)
    }

    fn too_large(&self, url: &str, size: usize) -> DocsError {
        DocsError::Fetch {
            url: url.to_string(),
            reason: format!(
                "response too large: {} bytes (max: {} bytes)",
                size, self.max_response_size
            ),
        }
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> DocsError {
        if err.is_timeout() {
            DocsError::Timeout {
                stage: Stage::Fetch,
                seconds: self.timeout_seconds,
            }
        } else {
            DocsError::Fetch {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str) -> DocsResult<String> {
        self.get(url).await
    }
}
