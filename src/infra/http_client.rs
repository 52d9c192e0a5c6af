use crate::app::ports::PageFetcher;
use crate::config::FetchConfig;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};

/// reqwest-backed fetcher with a randomized delay before every request.
pub struct ReqwestFetcher {
    client: reqwest::Client,
    delay: Duration,
    jitter_ms: u64,
}

impl ReqwestFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScraperError::Config(format!("invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScraperError::Config(format!("invalid header value for '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            delay: Duration::from_millis(config.delay_ms),
            jitter_ms: config.jitter_ms,
        })
    }

    fn next_delay(&self) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        self.delay + Duration::from_millis(jitter)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        // reqwest decodes using the charset from Content-Type (Shift_JIS pages included)
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let wait = self.next_delay();
        debug!(url, wait_ms = wait.as_millis() as u64, "Waiting before request");
        tokio::time::sleep(wait).await;

        match self.get_text(url).await {
            Ok(body) => {
                debug!(url, bytes = body.len(), "Fetched page");
                Some(body)
            }
            Err(e) => {
                warn!("Error fetching {}: {}", url, e);
                metrics::counter!("scraper_fetch_failures_total").increment(1);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_without_jitter_is_fixed() {
        let config = FetchConfig {
            delay_ms: 250,
            jitter_ms: 0,
            ..FetchConfig::default()
        };
        let fetcher = ReqwestFetcher::new(&config).unwrap();
        assert_eq!(fetcher.next_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_delay_with_jitter_stays_in_range() {
        let config = FetchConfig {
            delay_ms: 100,
            jitter_ms: 50,
            ..FetchConfig::default()
        };
        let fetcher = ReqwestFetcher::new(&config).unwrap();
        for _ in 0..20 {
            let d = fetcher.next_delay();
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let mut config = FetchConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(matches!(
            ReqwestFetcher::new(&config),
            Err(ScraperError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_none() {
        let config = FetchConfig {
            delay_ms: 0,
            jitter_ms: 0,
            timeout_seconds: 2,
            ..FetchConfig::default()
        };
        let fetcher = ReqwestFetcher::new(&config).unwrap();
        assert!(fetcher.fetch("http://127.0.0.1:1/events").await.is_none());
    }
}
