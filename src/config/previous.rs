//! `[previous]` section configuration.
//!
//! Selects where the previously published sitemap (the baseline for change
//! detection) is recovered from.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// Where to recover the previous sitemap from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviousSource {
    /// HTTP GET of the published sitemap URL.
    Remote,
    /// Read the committed sitemap file at a git ref.
    Git,
    /// Start with no prior state; every entry counts as freshly modified.
    #[default]
    None,
}

/// `[previous]` section in freshmap.toml - previous-state recovery.
///
/// # Example
/// ```toml
/// [previous]
/// source = "remote"
/// url = "https://example.com/info/sitemap-internal.xml"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PreviousSection {
    /// Recovery source. Defaults to `none`.
    #[serde(default)]
    pub source: PreviousSource,

    /// URL of the previously published (internal) sitemap.
    /// Required when `source = "remote"`.
    pub url: Option<String>,

    /// Git revision to read the committed sitemap from.
    #[serde(default = "defaults::previous::git_ref")]
    #[educe(Default = defaults::previous::git_ref())]
    pub git_ref: String,

    /// Repository-relative path of the committed sitemap file.
    #[serde(default = "defaults::previous::git_path")]
    #[educe(Default = defaults::previous::git_path())]
    pub git_path: String,
}
