use crate::config::FetchConfig;
use crate::model::FetchError;
use crate::scraper::traits::PageFetcher;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches pages with browser-like headers, retrying once through a
/// read-only rendering proxy. The proxy request carries only the user agent.
pub struct HttpFetcher {
    client: Client,
    accept: String,
    accept_language: String,
    proxy_prefix: String,
}

impl HttpFetcher {
    pub fn new(cfg: &FetchConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(cfg.timeout_seconds);
        let client = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            accept: cfg.accept.clone(),
            accept_language: cfg.accept_language.clone(),
            proxy_prefix: cfg.proxy_prefix.clone(),
        })
    }

    fn proxy_url(&self, url: &str) -> String {
        format!("{}{}", self.proxy_prefix, url)
    }

    async fn fetch_direct(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, self.accept.as_str())
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");
        read_body(request, url).await
    }

    async fn fetch_via_proxy(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let proxy_url = self.proxy_url(url);
        debug!("Fetching via proxy: {}", proxy_url);
        read_body(self.client.get(&proxy_url), &proxy_url).await
    }
}

async fn read_body(request: reqwest::RequestBuilder, url: &str) -> Result<Vec<u8>, FetchError> {
    let http_err = |source: reqwest::Error| FetchError::Http {
        url: url.to_string(),
        source,
    };
    let response = request
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(http_err)?;
    let body = response.bytes().await.map_err(http_err)?;
    Ok(body.to_vec())
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        match self.fetch_direct(url).await {
            Ok(body) => Ok(body),
            Err(primary) => {
                warn!("Direct fetch failed ({}), retrying through proxy", primary);
                self.fetch_via_proxy(url)
                    .await
                    .map_err(|fallback| FetchError::FallbackFailed {
                        primary: Box::new(primary),
                        fallback: Box::new(fallback),
                    })
            }
        }
    }
}
