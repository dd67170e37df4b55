//! Configuration management for `freshmap.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[site]`     | Site identity (base url, timezone, root)         |
//! | `[previous]` | Previous-sitemap recovery (remote, git, none)    |
//! | `[fetch]`    | HTTP settings (timeout, user agent, offline)     |
//! | `[filter]`   | Path eligibility (skip extensions, reserved)     |
//! | `[[external]]` | Unconditional cross-domain entries             |
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://example.github.io/info"
//! timezone = "-05:00"
//!
//! [previous]
//! source = "remote"
//! url = "https://example.github.io/info/sitemap-internal.xml"
//!
//! [fetch]
//! timeout = 10
//!
//! [[external]]
//! base = "https://example.github.io/"
//! ```

pub mod defaults;
mod error;
mod external;
mod fetch;
mod filter;
mod previous;
mod site;

// Re-export public types used by other modules
pub use external::ExternalEntry;
pub use previous::PreviousSource;

// Internal imports used in this module
use error::ConfigError;
use fetch::FetchSection;
use filter::FilterSection;
use previous::PreviousSection;
use site::SiteSection;

use crate::cli::Cli;
use crate::utils::date;
use anyhow::{Result, bail};
use chrono::FixedOffset;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing freshmap.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site identity
    #[serde(default)]
    pub site: SiteSection,

    /// Previous-state recovery settings
    #[serde(default)]
    pub previous: PreviousSection,

    /// HTTP settings
    #[serde(default)]
    pub fetch: FetchSection,

    /// Path eligibility settings
    #[serde(default)]
    pub filter: FilterSection,

    /// Unconditional external entries
    #[serde(default)]
    pub external: Vec<ExternalEntry>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.site.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.site.root = Some(path.to_path_buf());
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Base URL with a trailing slash, ready for `loc` concatenation.
    ///
    /// Only valid after `validate()` has confirmed `[site].url` is set.
    pub fn base_url(&self) -> String {
        let url = self.site.url.as_deref().unwrap_or_default();
        format!("{}/", url.trim_end_matches('/'))
    }

    /// URL of the previously published public sitemap, used as the
    /// last-known-good fallback artifact.
    pub fn published_sitemap_url(&self) -> String {
        format!("{}sitemap.xml", self.base_url())
    }

    /// Canonical timezone offset parsed from `[site].timezone`.
    pub fn tz(&self) -> Result<FixedOffset> {
        date::parse_offset(&self.site.timezone)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = Self::normalize_path(&root);
        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.set_root(&root);

        if let Some(base_url) = &cli.base_url {
            self.site.url = Some(base_url.clone());
        }
        if cli.offline {
            self.fetch.offline = true;
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current run
    pub fn validate(&self) -> Result<()> {
        match self.site.url.as_deref() {
            None => bail!("[site.url] is required (or pass --base-url)"),
            Some(url) if !url.starts_with("http") => {
                bail!(ConfigError::Validation(
                    "[site.url] must start with http:// or https://".into()
                ))
            }
            _ => {}
        }

        self.tz()?;

        if self.fetch.timeout == 0 {
            bail!(ConfigError::Validation(
                "[fetch.timeout] must be positive".into()
            ));
        }

        if self.previous.source == PreviousSource::Remote && self.previous.url.is_none() {
            bail!(ConfigError::Validation(
                "[previous.source] = \"remote\" requires [previous.url]".into()
            ));
        }

        for entry in &self.external {
            if !entry.base.starts_with("http") {
                bail!(ConfigError::Validation(format!(
                    "[[external]] base `{}` must start with http:// or https://",
                    entry.base
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let config_str = r#"
            [site]
            url = "https://example.com/info"
        "#;
        let result = SiteConfig::from_str(config_str);

        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.site.url, Some("https://example.com/info".to_string()));
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let invalid_config = r#"
            [site
            url = "https://example.com"
        "#;
        let result = SiteConfig::from_str(invalid_config);

        assert!(result.is_err());
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let mut config = SiteConfig::default();
        config.site.url = Some("https://example.com/info".to_string());
        assert_eq!(config.base_url(), "https://example.com/info/");

        config.site.url = Some("https://example.com/info/".to_string());
        assert_eq!(config.base_url(), "https://example.com/info/");
    }

    #[test]
    fn test_published_sitemap_url() {
        let mut config = SiteConfig::default();
        config.site.url = Some("https://example.com/info".to_string());
        assert_eq!(
            config.published_sitemap_url(),
            "https://example.com/info/sitemap.xml"
        );
    }

    #[test]
    fn test_validate_requires_url() {
        let config = SiteConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_url_scheme() {
        let mut config = SiteConfig::default();
        config.site.url = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());

        config.site.url = Some("https://example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_timezone() {
        let mut config = SiteConfig::default();
        config.site.url = Some("https://example.com".to_string());
        config.site.timezone = "eastern".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = SiteConfig::default();
        config.site.url = Some("https://example.com".to_string());
        config.fetch.timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_remote_requires_previous_url() {
        let mut config = SiteConfig::default();
        config.site.url = Some("https://example.com".to_string());
        config.previous.source = PreviousSource::Remote;
        assert!(config.validate().is_err());

        config.previous.url = Some("https://example.com/sitemap-internal.xml".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_external_base_scheme() {
        let config = r#"
            [site]
            url = "https://example.com"

            [[external]]
            base = "gopher://example.org/"
        "#;
        let config = SiteConfig::from_str(config).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tz_parses_configured_offset() {
        let mut config = SiteConfig::default();
        config.site.timezone = "+09:00".to_string();
        assert_eq!(config.tz().unwrap().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [unknown_section]
            field = "value"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
