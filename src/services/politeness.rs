// src/services/politeness.rs

//! Politeness controller: robots.txt advisory gate and randomized delays.

use std::time::Duration;

use rand::Rng;
use robotstxt::DefaultMatcher;

use crate::error::{AppError, Result};

/// Uniformly sampled inter-request delay range, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct DelayRange {
    min_secs: f64,
    max_secs: f64,
}

impl DelayRange {
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Draw one delay from `[min, max]`.
    pub fn sample(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs_f64(secs)
    }

    /// Sleep for one sampled delay. Applied before the next fetch whether or
    /// not the current one succeeded.
    pub async fn wait(&self) {
        tokio::time::sleep(self.sample()).await;
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(3.0, 7.0)
    }
}

/// Advisory robots.txt ruleset for one site.
///
/// Absence of a gate means "allow everything": robots.txt being unreachable
/// or unparseable must never stop a crawl.
#[derive(Debug, Clone)]
pub struct RobotsGate {
    content: String,
    user_agent: String,
}

impl RobotsGate {
    /// Build a gate from already-fetched robots.txt content.
    pub fn from_content(content: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Best-effort fetch of `base_url/robots.txt`.
    ///
    /// Any failure is logged and collapses to `None`.
    pub async fn fetch(
        client: &reqwest::Client,
        base_url: &str,
        user_agent: &str,
    ) -> Option<RobotsGate> {
        let robots_url = format!("{}/robots.txt", base_url.trim_end_matches('/'));
        match Self::try_fetch(client, &robots_url).await {
            Ok(content) => {
                log::info!("Loaded robots.txt from {robots_url}");
                Some(Self::from_content(content, user_agent))
            }
            Err(error) => {
                log::warn!("Could not read {robots_url}: {error}. Proceeding without ruleset.");
                None
            }
        }
    }

    async fn try_fetch(client: &reqwest::Client, robots_url: &str) -> Result<String> {
        let response = client
            .get(robots_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(robots_url, e))?;
        response
            .text()
            .await
            .map_err(|e| AppError::fetch(robots_url, e))
    }

    /// Whether the ruleset permits fetching this URL.
    pub fn is_allowed(&self, url: &str) -> bool {
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, &self.user_agent, url)
    }
}
