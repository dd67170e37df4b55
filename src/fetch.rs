//! Blocking HTTP client for previous-sitemap recovery and freshness probes.
//!
//! Every request is bounded by the configured timeout. Non-success statuses
//! surface as errors; callers decide whether that is soft (previous-state
//! load) or fatal (a required content fetch).

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::LAST_MODIFIED;
use std::time::Duration;

/// HTTP client wrapper used for GET/HEAD probes.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with the given per-request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch a resource body as bytes. Non-success status is an error.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }

        Ok(response
            .bytes()
            .with_context(|| format!("Failed to read body of {url}"))?
            .to_vec())
    }

    /// Fetch a resource body as text. Non-success status is an error.
    pub fn get_text(&self, url: &str) -> Result<String> {
        let bytes = self.get_bytes(url)?;
        String::from_utf8(bytes).with_context(|| format!("Body of {url} is not valid UTF-8"))
    }

    /// HEAD request returning the raw `Last-Modified` header, if any.
    ///
    /// `Ok(None)` means the server answered without the header; an error
    /// means the probe itself failed.
    pub fn head_last_modified(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .head(url)
            .send()
            .with_context(|| format!("HEAD {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HEAD {url} returned {status}");
        }

        Ok(response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_build() {
        assert!(Fetcher::new(Duration::from_secs(10), "freshmap-test/0").is_ok());
    }

    #[test]
    fn test_get_bytes_unresolvable_host() {
        let fetcher = Fetcher::new(Duration::from_secs(1), "freshmap-test/0").unwrap();
        // .invalid is reserved and never resolves
        assert!(fetcher.get_bytes("https://host.invalid/sitemap.xml").is_err());
    }

    #[test]
    fn test_head_unresolvable_host() {
        let fetcher = Fetcher::new(Duration::from_secs(1), "freshmap-test/0").unwrap();
        assert!(fetcher.head_last_modified("https://host.invalid/").is_err());
    }
}
