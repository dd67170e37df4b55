//! `[fetch]` section configuration.
//!
//! Bounds and identifies outgoing HTTP requests.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[fetch]` section in freshmap.toml - HTTP request settings.
///
/// # Example
/// ```toml
/// [fetch]
/// timeout = 10
/// offline = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FetchSection {
    /// Per-request timeout in seconds.
    #[serde(default = "defaults::fetch::timeout")]
    #[educe(Default = defaults::fetch::timeout())]
    pub timeout: u64,

    /// User-Agent header for outgoing requests.
    #[serde(default = "defaults::fetch::user_agent")]
    #[educe(Default = defaults::fetch::user_agent())]
    pub user_agent: String,

    /// Disable all network access: previous-state fetch, freshness probes
    /// and network hashing all degrade to local signals.
    #[serde(default)]
    pub offline: bool,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_fetch_section_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.fetch.timeout, 10);
        assert!(config.fetch.user_agent.starts_with("freshmap/"));
        assert!(!config.fetch.offline);
    }

    #[test]
    fn test_fetch_section_custom() {
        let config = r#"
            [fetch]
            timeout = 30
            user_agent = "my-bot/1.0"
            offline = true
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.fetch.timeout, 30);
        assert_eq!(config.fetch.user_agent, "my-bot/1.0");
        assert!(config.fetch.offline);
    }
}
