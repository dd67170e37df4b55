//! Effective `lastmod` resolution.
//!
//! For each entry the resolver combines the fresh content hash, the
//! previous-sitemap record, and an optional HTTP probe into the timestamp
//! that best represents when the content last meaningfully changed. A hash
//! match carries the previously published `lastmod` forward, which stops
//! the sitemap from churning on every rebuild; an online probe, when
//! requested, supersedes that carry-over.

use crate::{
    fetch::Fetcher,
    log,
    previous::PreviousState,
    utils::{date, git::GitBaseline, hash},
};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use std::{fs, path::Path};

/// The resolved freshness signal for one entry.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Effective `lastmod` in the canonical timezone (or carried forward
    /// verbatim from the previous sitemap).
    pub lastmod: DateTime<FixedOffset>,
    /// Fresh content hash, absent only when offline with no local file.
    pub hash: Option<String>,
}

/// Resolver over the run's read-only inputs.
///
/// All collaborators are explicit fields; nothing is captured implicitly.
pub struct FreshnessResolver<'a> {
    pub previous: &'a PreviousState,
    /// `None` in offline mode.
    pub fetcher: Option<&'a Fetcher>,
    /// Committed baseline for diff-based change detection, when configured.
    pub git: Option<&'a GitBaseline>,
    /// Site root that relative file paths resolve against.
    pub root: &'a Path,
    /// Canonical timezone for freshly observed times.
    pub tz: FixedOffset,
}

impl FreshnessResolver<'_> {
    /// Decide the effective `lastmod` and content hash for one entry.
    ///
    /// * `key` — normalized path used for previous-state lookup.
    /// * `url` — full URL, used for network hashing and the HEAD probe.
    /// * `fallback` — local mtime, or wall-clock for synthetic entries.
    /// * `file` — root-relative file to hash; `None` hashes the fetched
    ///   resource body instead (fatal if that fetch fails).
    /// * `check_online` — probe `Last-Modified` and let it override.
    pub fn resolve(
        &self,
        key: &str,
        url: &str,
        fallback: DateTime<FixedOffset>,
        file: Option<&str>,
        check_online: bool,
    ) -> Result<Resolved> {
        let fresh_hash = self.fresh_hash(url, file)?;
        let prev = self.previous.get(key);

        let mut effective = fallback;
        if let Some(prev) = prev
            && self.is_unchanged(prev.hash.as_deref(), fresh_hash.as_deref(), file)
        {
            effective = date::parse_lastmod(&prev.lastmod)?;
        }

        if check_online && let Some(probed) = self.probe_last_modified(url) {
            effective = probed;
        }

        if let Some(prev) = prev {
            let formatted = date::format_lastmod(&effective);
            if formatted != prev.lastmod {
                log!("sitemap"; "changed: {key} ({} -> {formatted})", prev.lastmod);
            }
        }

        Ok(Resolved {
            lastmod: effective,
            hash: fresh_hash,
        })
    }

    /// Hash the local file when given, the fetched body otherwise.
    ///
    /// A required network fetch that fails is fatal for the entry: an
    /// unreachable resource means an incomplete sitemap, which is worse
    /// than a failed run.
    fn fresh_hash(&self, url: &str, file: Option<&str>) -> Result<Option<String>> {
        match file {
            Some(rel) => {
                let full = self.root.join(rel);
                let bytes = fs::read(&full)
                    .with_context(|| format!("Failed to read {}", full.display()))?;
                Ok(Some(hash::digest(&bytes)))
            }
            None => match self.fetcher {
                Some(fetcher) => Ok(Some(hash::digest(&fetcher.get_bytes(url)?))),
                None => Ok(None),
            },
        }
    }

    /// Whether the entry's content is unchanged relative to the baseline:
    /// hashes match, or the committed copy is byte-identical to the
    /// working tree.
    fn is_unchanged(
        &self,
        prev_hash: Option<&str>,
        fresh_hash: Option<&str>,
        file: Option<&str>,
    ) -> bool {
        if let (Some(prev), Some(fresh)) = (prev_hash, fresh_hash)
            && prev == fresh
        {
            return true;
        }

        if let (Some(git), Some(rel)) = (self.git, file) {
            match git.file_unchanged(rel) {
                Ok(unchanged) => return unchanged,
                Err(err) => log!("git"; "baseline check failed for {rel}: {err:#}"),
            }
        }

        false
    }

    /// HEAD probe for `Last-Modified`, converted to the canonical timezone.
    ///
    /// Failures and missing headers are soft: warn and return `None`.
    fn probe_last_modified(&self, url: &str) -> Option<DateTime<FixedOffset>> {
        let fetcher = self.fetcher?;
        match fetcher.head_last_modified(url) {
            Ok(Some(raw)) => {
                let parsed = date::parse_http_date(&raw, self.tz);
                if parsed.is_none() {
                    log!("fetch"; "unparseable Last-Modified for {url}: {raw}");
                }
                parsed
            }
            Ok(None) => {
                log!("fetch"; "no Last-Modified for {url}, using local time");
                None
            }
            Err(err) => {
                log!("fetch"; "probe failed for {url}: {err:#}");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
