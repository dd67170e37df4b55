//! Previous-sitemap recovery.
//!
//! The previously published sitemap is the baseline for change detection:
//! it maps each URL path to the `lastmod` and content hash recorded last
//! run. Recovery failures are soft — the run proceeds with an empty table,
//! which degrades to treating every entry as freshly modified.

use crate::{
    config::{PreviousSource, SiteConfig},
    fetch::Fetcher,
    log,
    utils::{date, git::GitBaseline},
};
use anyhow::{Context, Result, anyhow};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// One record recovered from the previous sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrevRecord {
    /// The `lastmod` value as published (a valid RFC 3339 string).
    pub lastmod: String,
    /// The content hash, when the internal format carried one.
    pub hash: Option<String>,
}

/// Lookup table from normalized URL path to previous record.
///
/// Keys are relative to the site base URL with no leading or trailing
/// slashes; the site root itself keys as `""`.
#[derive(Debug, Default)]
pub struct PreviousState {
    records: HashMap<String, PrevRecord>,
}

impl PreviousState {
    /// An empty table: every entry counts as freshly modified.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Recover the previous state per `[previous]` configuration.
    ///
    /// All failures here are soft: they log a warning and yield an empty
    /// table.
    pub fn load(
        config: &SiteConfig,
        fetcher: Option<&Fetcher>,
        git: Option<&GitBaseline>,
    ) -> Self {
        let result = match config.previous.source {
            PreviousSource::None => return Self::empty(),
            PreviousSource::Remote => Self::load_remote(config, fetcher),
            PreviousSource::Git => Self::load_git(config, git),
        };

        result.unwrap_or_else(|err| {
            log!("sitemap"; "no previous state ({err:#}); treating all entries as modified");
            Self::empty()
        })
    }

    fn load_remote(config: &SiteConfig, fetcher: Option<&Fetcher>) -> Result<Self> {
        let fetcher = fetcher.context("offline mode")?;
        let url = config
            .previous
            .url
            .as_deref()
            .context("[previous.url] not set")?;
        let xml = fetcher.get_text(url)?;
        Self::parse(&xml, &config.base_url())
    }

    fn load_git(config: &SiteConfig, git: Option<&GitBaseline>) -> Result<Self> {
        let git = git.context("git baseline unavailable")?;
        let path = &config.previous.git_path;
        let bytes = git
            .show_file(path)?
            .ok_or_else(|| anyhow!("`{path}` not found at configured ref"))?;
        let xml = String::from_utf8(bytes).context("committed sitemap is not valid UTF-8")?;
        Self::parse(&xml, &config.base_url())
    }

    /// Parse a previously published sitemap document.
    ///
    /// Entries missing a location or timestamp, carrying an invalid
    /// timestamp, or pointing outside `base_url` are skipped with a
    /// warning. A malformed document is an error (absorbed by `load`).
    pub fn parse(xml: &str, base_url: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut records = HashMap::new();

        let mut in_url = false;
        let mut field: Option<Field> = None;
        let mut buf = String::new();
        let mut loc: Option<String> = None;
        let mut lastmod: Option<String> = None;
        let mut hash: Option<String> = None;

        loop {
            match reader.read_event().context("previous sitemap is not well-formed XML")? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"url" => {
                        in_url = true;
                        loc = None;
                        lastmod = None;
                        hash = None;
                    }
                    b"loc" if in_url => {
                        field = Some(Field::Loc);
                        buf.clear();
                    }
                    b"lastmod" if in_url => {
                        field = Some(Field::Lastmod);
                        buf.clear();
                    }
                    b"filehash" if in_url => {
                        field = Some(Field::Hash);
                        buf.clear();
                    }
                    _ => field = None,
                },
                Event::Text(text) => {
                    if field.is_some() {
                        let decoded = text
                            .decode()
                            .context("previous sitemap has invalid character data")?;
                        buf.push_str(&decoded);
                    }
                }
                Event::GeneralRef(r) => {
                    if field.is_some() {
                        let decoded = r
                            .decode()
                            .context("previous sitemap has invalid character data")?;
                        let entity = format!("&{decoded};");
                        let unescaped = quick_xml::escape::unescape(&entity)
                            .context("previous sitemap has invalid character data")?;
                        buf.push_str(&unescaped);
                    }
                }
                Event::End(e) => {
                    if let Some(current) = field {
                        let value = buf.trim().to_string();
                        match current {
                            Field::Loc => loc = Some(value),
                            Field::Lastmod => lastmod = Some(value),
                            Field::Hash => hash = Some(value),
                        }
                    }
                    if e.local_name().as_ref() == b"url" {
                        in_url = false;
                        insert_record(
                            &mut records,
                            base_url,
                            loc.take(),
                            lastmod.take(),
                            hash.take(),
                        );
                    }
                    field = None;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { records })
    }

    /// Look up the record for a normalized path.
    pub fn get(&self, key: &str) -> Option<&PrevRecord> {
        self.records.get(key.trim_matches('/'))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Field {
    Loc,
    Lastmod,
    Hash,
}

/// Validate one parsed `<url>` element and store it, warning on skips.
fn insert_record(
    records: &mut HashMap<String, PrevRecord>,
    base_url: &str,
    loc: Option<String>,
    lastmod: Option<String>,
    hash: Option<String>,
) {
    let (Some(loc), Some(lastmod)) = (loc, lastmod) else {
        log!("sitemap"; "skipping previous entry with missing loc or lastmod");
        return;
    };

    let Some(rel) = strip_base(&loc, base_url) else {
        log!("sitemap"; "skipping previous entry outside site root: {loc}");
        return;
    };

    if date::parse_lastmod(&lastmod).is_err() {
        log!("sitemap"; "skipping previous entry with invalid lastmod: {loc}");
        return;
    }

    records.insert(rel.to_owned(), PrevRecord { lastmod, hash });
}

/// Strip the base URL from a location, yielding the normalized key.
///
/// Returns `None` when the location does not live under `base_url`.
fn strip_base<'a>(loc: &'a str, base_url: &str) -> Option<&'a str> {
    let base = base_url.trim_end_matches('/');
    let rest = loc.strip_prefix(base)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        // e.g. base ".../info" must not match ".../infothing"
        return None;
    }
    Some(rest.trim_matches('/'))
}

// ============================================================================
// Tests
// ============================================================================
