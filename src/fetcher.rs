use std::time::Duration;

use anyhow::{Context as _, bail};
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use url::Url;

const MAX_ATTEMPTS: usize = 5;
const MAX_REDIRECTS: usize = 10;
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Downloads quiz pages, backing off when the server throttles.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .context("build reqwest client")?;
        Ok(Self { client })
    }

    pub async fn get_page(&self, url: Url) -> anyhow::Result<String> {
        let body = self.get_bytes(url.clone()).await?;
        String::from_utf8(body.to_vec()).with_context(|| format!("page at {} is not valid utf-8", url))
    }

    async fn get_bytes(&self, url: Url) -> anyhow::Result<Bytes> {
        let mut backoff = Backoff::default();
        for attempt in 1..=MAX_ATTEMPTS {
            let resp = self
                .client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("request quiz page {url}"))?;

            let status = resp.status();
            if status.is_success() {
                return resp
                    .bytes()
                    .await
                    .with_context(|| format!("read quiz page body from {url}"));
            }
            let Some(wait) = backoff.throttled(status, resp.headers()) else {
                bail!("quiz page {url} answered {status}");
            };
            tracing::warn!(%url, %status, attempt, wait_ms = wait.as_millis(), "page fetch throttled");
            tokio::time::sleep(wait).await;
        }
        bail!("quiz page {url} still throttled after {MAX_ATTEMPTS} attempts")
    }
}

/// Exponential delay between throttled attempts, overridden by `Retry-After` seconds.
struct Backoff {
    next: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            next: INITIAL_BACKOFF,
        }
    }
}

impl Backoff {
    /// Wait before retrying, or `None` when the status is not a throttling one.
    fn throttled(&mut self, status: StatusCode, headers: &HeaderMap) -> Option<Duration> {
        if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::SERVICE_UNAVAILABLE {
            return None;
        }
        let fallback = self.next;
        self.next = (self.next * 2).min(MAX_BACKOFF);
        Some(retry_after(headers).unwrap_or(fallback))
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let seconds = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    Some(Duration::from_secs(seconds))
}
