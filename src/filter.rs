//! Path eligibility filtering.
//!
//! Decides whether a candidate path belongs in the sitemap. A pure
//! predicate over filesystem state at call time; results are only valid
//! for the duration of one run.

use crate::config::SiteConfig;
use std::path::{Component, Path};

/// Filter for candidate paths, configured from `[filter]`.
pub struct PathFilter {
    config: &'static SiteConfig,
}

impl PathFilter {
    pub const fn new(config: &'static SiteConfig) -> Self {
        Self { config }
    }

    /// Whether `path` (relative to the site root, already normalized) is
    /// eligible for inclusion.
    ///
    /// Rejection rules, applied in order, any match rejects:
    /// 1. any component is hidden (name starts with `.`)
    /// 2. the root sentinel `.` (emitted separately)
    /// 3. skip-listed extension
    /// 4. reserved filename
    /// 5. directory without an `index.html` (not browsable)
    pub fn is_eligible(&self, path: &str) -> bool {
        if has_hidden_component(path) {
            return false;
        }

        if path == "." {
            return false;
        }

        let filter = &self.config.filter;
        if filter
            .skip_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
        {
            return false;
        }

        let filename = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        if filter
            .reserved_names
            .iter()
            .any(|reserved| filename == reserved.as_str())
        {
            return false;
        }

        let full = self.config.get_root().join(path);
        if full.is_dir() && !full.join("index.html").is_file() {
            return false;
        }

        true
    }
}

/// Whether any path segment names a hidden (dot-prefixed) file or directory.
///
/// Walks segments iteratively; `.` and `..` components do not count.
fn has_hidden_component(path: &str) -> bool {
    Path::new(path).components().any(|component| {
        matches!(
            component,
            Component::Normal(name) if name.to_string_lossy().starts_with('.')
        )
    })
}

// ============================================================================
// Tests
// ============================================================================
