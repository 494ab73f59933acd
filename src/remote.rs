//! Source retrieval with bounded retry.
//!
//! This module provides:
//! - The [`Fetch`] trait, the seam between the pipeline and the network
//! - [`HttpFetcher`], a blocking HTTP client that also reads local files
//! - [`RetryPolicy`] and [`fetch_with_retry`], a synchronous retry loop with
//!   increasing backoff

use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::{Error, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("k2merge/", env!("CARGO_PKG_VERSION"));

/// Something that turns a source location into raw text.
pub trait Fetch {
    /// Fetch the full text at `location`.
    fn fetch(&self, location: &str) -> Result<String>;
}

/// Blocking HTTP fetcher.
///
/// `http://` and `https://` locations are downloaded; `file://` locations and
/// bare paths are read from the local filesystem.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout and user agent.
    pub fn new() -> Result<Self> {
        Self::with_options(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Create a fetcher with a custom timeout and user agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP {}", status)));
        }

        let text = response.text().map_err(|e| Error::fetch(url, e))?;
        log::debug!("Downloaded {} ({} bytes)", url, text.len());
        Ok(text)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, location: &str) -> Result<String> {
        if is_remote(location) {
            return self.fetch_http(location);
        }

        let path = location.strip_prefix("file://").unwrap_or(location);
        fs::read_to_string(path).map_err(|e| Error::fetch(location, e))
    }
}

/// Check if a location should be fetched over HTTP.
pub fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Retry policy: a fixed number of attempts with growing delays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub attempts: u32,
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Factor applied to the delay after each retry
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay_ms: 2000,
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            initial_delay_ms: 0,
            multiplier: 1,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = u64::from(self.multiplier).saturating_pow(retry.saturating_sub(1));
        Duration::from_millis(self.initial_delay_ms.saturating_mul(factor))
    }
}

/// Fetch a location, retrying on failure according to `policy`.
///
/// Returns the last error once every attempt has failed.
pub fn fetch_with_retry<F: Fetch + ?Sized>(
    fetcher: &F,
    location: &str,
    policy: &RetryPolicy,
) -> Result<String> {
    let attempts = policy.attempts.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            let delay = policy.delay(attempt);
            log::debug!(
                "Retry {}/{} after {:?} for {}",
                attempt,
                attempts - 1,
                delay,
                location
            );
            std::thread::sleep(delay);
        }

        match fetcher.fetch(location) {
            Ok(text) => return Ok(text),
            Err(e) => {
                log::warn!(
                    "Fetch attempt {}/{} failed for {}: {}",
                    attempt + 1,
                    attempts,
                    location,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::fetch(location, "no attempts made")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;

    /// Fails a fixed number of times, then succeeds.
    struct FlakyFetcher {
        failures: u32,
        calls: Cell<u32>,
    }

    impl Fetch for FlakyFetcher {
        fn fetch(&self, location: &str) -> Result<String> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call <= self.failures {
                Err(Error::fetch(location, "connection reset"))
            } else {
                Ok("10.*.*.*".to_string())
            }
        }
    }

    #[test]
    fn test_retry_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_millis(2000));
        assert_eq!(policy.delay(2), Duration::from_millis(4000));
        assert_eq!(policy.delay(3), Duration::from_millis(8000));
        assert_eq!(RetryPolicy::immediate(5).delay(4), Duration::ZERO);
    }

    #[test]
    fn test_retry_until_success() {
        let fetcher = FlakyFetcher {
            failures: 2,
            calls: Cell::new(0),
        };
        let text = fetch_with_retry(&fetcher, "http://test", &RetryPolicy::immediate(3)).unwrap();
        assert_eq!(text, "10.*.*.*");
        assert_eq!(fetcher.calls.get(), 3);
    }

    #[test]
    fn test_retry_exhausted() {
        let fetcher = FlakyFetcher {
            failures: u32::MAX,
            calls: Cell::new(0),
        };
        let err = fetch_with_retry(&fetcher, "http://test", &RetryPolicy::immediate(3)).unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
        assert_eq!(fetcher.calls.get(), 3);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let fetcher = FlakyFetcher {
            failures: 0,
            calls: Cell::new(0),
        };
        assert!(fetch_with_retry(&fetcher, "http://test", &RetryPolicy::immediate(0)).is_ok());
        assert_eq!(fetcher.calls.get(), 1);
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://raw.githubusercontent.com/a/b"));
        assert!(is_remote("HTTP://example.com"));
        assert!(!is_remote("file:///tmp/list.txt"));
        assert!(!is_remote("./white-list.sorl"));
    }

    #[test]
    fn test_fetch_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "*.bank.com").unwrap();

        let fetcher = HttpFetcher::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(fetcher.fetch(path).unwrap(), "*.bank.com\n");
        assert_eq!(
            fetcher.fetch(&format!("file://{}", path)).unwrap(),
            "*.bank.com\n"
        );
        assert!(matches!(
            fetcher.fetch("/nonexistent/k2merge/list.txt"),
            Err(Error::Fetch { .. })
        ));
    }
}
