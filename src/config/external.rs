//! `[[external]]` entries configuration.
//!
//! Fixed entries emitted unconditionally alongside the filtered candidates:
//! the host root and externally-hosted sibling projects or subdomains. These
//! bypass the path filter entirely.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One `[[external]]` entry in freshmap.toml.
///
/// # Example
/// ```toml
/// [[external]]
/// base = "https://example.github.io/"
/// path = ""
/// online = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ExternalEntry {
    /// Scheme + host + path prefix the resource lives under.
    pub base: String,

    /// Path suffix; empty for the base itself.
    #[serde(default)]
    pub path: String,

    /// Local file to hash instead of fetching the resource body.
    pub file: Option<PathBuf>,

    /// Probe the resource's `Last-Modified` over HTTP each run.
    #[serde(default = "defaults::external::online")]
    #[educe(Default = defaults::external::online())]
    pub online: bool,
}
