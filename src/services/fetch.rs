// src/services/fetch.rs

//! Page fetching: plain HTTP and headless-rendered DOM.
//!
//! All transport-level failures are wrapped into `Fetch`/`RenderTimeout`
//! here so the crawl engine's recovery path deals with a closed error set.

use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Retrieves page content for the crawl engine.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Fetch a resource as raw bytes (media downloads).
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Create a configured HTTP client.
pub fn create_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AppError::config(format!("cannot build HTTP client: {e}")))
}

/// Plain GET fetcher with a fixed timeout.
#[derive(Clone)]
pub struct StaticFetcher {
    client: reqwest::Client,
}

impl StaticFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::fetch(url, e))
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| AppError::fetch(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Headless-browser fetcher for pages whose content is built by scripts.
///
/// Each fetch launches a browser, navigates, waits up to the configured
/// bound for the selector to appear and extracts the rendered DOM. The
/// browser process is torn down when the instance drops, on every exit path
/// including the timeout one. Binary fetches delegate to the static path.
pub struct DynamicFetcher {
    inner: StaticFetcher,
    selector: String,
    render_timeout: Duration,
}

impl DynamicFetcher {
    pub fn new(client: reqwest::Client, selector: impl Into<String>, render_timeout: Duration) -> Self {
        Self {
            inner: StaticFetcher::new(client),
            selector: selector.into(),
            render_timeout,
        }
    }
}

#[async_trait]
impl PageFetcher for DynamicFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let owned_url = url.to_string();
        let selector = self.selector.clone();
        let timeout = self.render_timeout;

        tokio::task::spawn_blocking(move || render_page(&owned_url, &selector, timeout))
            .await
            .map_err(|e| AppError::fetch(url, e))?
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.inner.fetch_bytes(url).await
    }
}

/// Drive one headless render. Blocking; run via `spawn_blocking`.
fn render_page(url: &str, selector: &str, timeout: Duration) -> Result<String> {
    let browser = Browser::new(LaunchOptions::default()).map_err(|e| AppError::fetch(url, e))?;
    let tab = browser.new_tab().map_err(|e| AppError::fetch(url, e))?;

    tab.navigate_to(url).map_err(|e| AppError::fetch(url, e))?;
    tab.wait_until_navigated()
        .map_err(|e| AppError::fetch(url, e))?;

    if tab
        .wait_for_element_with_custom_timeout(selector, timeout)
        .is_err()
    {
        return Err(AppError::RenderTimeout {
            url: url.to_string(),
            selector: selector.to_string(),
        });
    }

    tab.get_content().map_err(|e| AppError::fetch(url, e))
    // Browser drops here, killing the chromium process on every path.
}
