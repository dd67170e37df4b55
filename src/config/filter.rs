//! `[filter]` section configuration.
//!
//! Controls which candidate paths are excluded from the sitemap.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[filter]` section in freshmap.toml - path eligibility rules.
///
/// # Example
/// ```toml
/// [filter]
/// skip_extensions = [".js", ".css", ".png"]
/// reserved_names = ["404.html", "robots.txt"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// File suffixes that are never pages (assets, data, archives).
    #[serde(default = "defaults::filter::skip_extensions")]
    #[educe(Default = defaults::filter::skip_extensions())]
    pub skip_extensions: Vec<String>,

    /// Filenames that exist but must not be indexed.
    #[serde(default = "defaults::filter::reserved_names")]
    #[educe(Default = defaults::filter::reserved_names())]
    pub reserved_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_filter_section_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert!(config.filter.skip_extensions.contains(&".js".to_string()));
        assert!(config.filter.skip_extensions.contains(&".jpg".to_string()));
        assert!(config.filter.reserved_names.contains(&"404.html".to_string()));
        assert!(config.filter.reserved_names.contains(&"LICENSE".to_string()));
    }

    #[test]
    fn test_filter_section_override() {
        let config = r#"
            [filter]
            skip_extensions = [".wasm"]
            reserved_names = ["drafts.html"]
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.filter.skip_extensions, vec![".wasm".to_string()]);
        assert_eq!(config.filter.reserved_names, vec!["drafts.html".to_string()]);
    }
}
