//! Fetching source documents over HTTP.

use crate::models::SyncError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Cloudflare's "invalid SSL certificate" status; retried once over plain HTTP.
const SSL_HANDSHAKE_FAILED: u16 = 526;

/// Anything that can turn a URL into its body text.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, SyncError>;
}

/// `https://` -> `http://`; `None` when the URL is not HTTPS.
pub fn http_fallback_url(url: &str) -> Option<String> {
    url.strip_prefix("https://").map(|rest| format!("http://{}", rest))
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, SyncError> {
        let client = Client::builder()
            .user_agent(concat!("player_sync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::Fetch {
                url: String::new(),
                status: None,
                message: format!("could not build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, SyncError> {
        self.client.get(url).send().await.map_err(|e| SyncError::Fetch {
            url: url.to_string(),
            status: None,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, SyncError> {
        let mut response = self.get(url).await?;
        let mut final_url = url.to_string();

        if response.status().as_u16() == SSL_HANDSHAKE_FAILED {
            if let Some(http_url) = http_fallback_url(url) {
                log::warn!("SSL error (526) for {}, trying HTTP fallback: {}", url, http_url);
                response = self.get(&http_url).await?;
                final_url = http_url;
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Fetch {
                url: final_url,
                status: Some(status.as_u16()),
                message: status.to_string(),
            });
        }

        response.text().await.map_err(|e| SyncError::Fetch {
            url: final_url,
            status: Some(status.as_u16()),
            message: e.to_string(),
        })
    }
}
