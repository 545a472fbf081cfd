//! Bounded retry for network calls.

use crate::models::config::NetworkConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry policy: a fixed number of extra attempts with a fixed pause.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.retries, config.retry_delay())
    }

    /// Run `operation`, retrying while `is_transient` accepts the error.
    pub async fn run<F, Fut, T, E, P>(&self, what: &str, is_transient: P, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retries && is_transient(&e) => {
                    attempt += 1;
                    tracing::warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        what,
                        e,
                        attempt,
                        self.retries,
                        self.delay
                    );
                    sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a reqwest error is worth another attempt.
pub fn is_transient_http(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}
