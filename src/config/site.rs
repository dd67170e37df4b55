//! `[site]` section configuration.
//!
//! Identifies the site the sitemap describes: its base URL, the canonical
//! timezone for `lastmod` values, and the root of the built output tree.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[site]` section in freshmap.toml - the site under description.
///
/// # Example
/// ```toml
/// [site]
/// url = "https://example.github.io/info"
/// timezone = "-05:00"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Base URL under which candidate paths are published.
    /// Required; may also be supplied via `--base-url`.
    pub url: Option<String>,

    /// Canonical UTC offset for `lastmod` values (e.g. "-05:00").
    #[serde(default = "defaults::site::timezone")]
    #[educe(Default = defaults::site::timezone())]
    pub timezone: String,

    /// Root of the built site tree that candidate paths are relative to.
    /// Defaults to the working directory; may be supplied via `--root`.
    pub root: Option<PathBuf>,
}
