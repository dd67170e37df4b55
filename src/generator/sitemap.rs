//! Sitemap assembly.
//!
//! Collects candidate paths from the build system, filters them, resolves
//! each entry's effective `lastmod`, and serializes two parallel documents:
//! the public sitemap and an internal variant carrying content hashes that
//! the next run compares against.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/about.html</loc>
//!     <lastmod>2025-01-01T00:00:00-05:00</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::{ExternalEntry, SiteConfig},
    filter::PathFilter,
    freshness::FreshnessResolver,
    log,
    utils::date,
};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use std::{collections::BTreeSet, fs};

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// XML Schema instance namespace, for the public document's schemaLocation
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Schema location advertised by the public document
const SCHEMA_LOCATION: &str = "http://www.sitemaps.org/schemas/sitemap/0.9 \
     http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd";

/// Namespace of the internal `filehash` extension element
const FILEHASH_NS: &str = "urn:freshmap:filehash";

// ============================================================================
// Sitemap Implementation
// ============================================================================

/// Single URL entry, buffered until all entries are resolved and sorted.
struct UrlEntry {
    /// Scheme + host + path prefix
    base: String,
    /// Path suffix, possibly empty for a root
    path: String,
    /// Effective last-modification time
    lastmod: DateTime<FixedOffset>,
    /// Content hash (internal document only)
    filehash: Option<String>,
}

impl UrlEntry {
    fn loc(&self) -> String {
        format!("{}{}", self.base, self.path)
    }
}

/// Assembles both sitemap documents from candidate input lines.
pub struct SitemapAssembler<'a> {
    config: &'static SiteConfig,
    filter: PathFilter,
    resolver: FreshnessResolver<'a>,
}

impl<'a> SitemapAssembler<'a> {
    pub fn new(config: &'static SiteConfig, resolver: FreshnessResolver<'a>) -> Self {
        Self {
            config,
            filter: PathFilter::new(config),
            resolver,
        }
    }

    /// Build the public and internal documents.
    ///
    /// Candidate lines are deduplicated and processed in lexicographic
    /// order (diagnostics only); emitted entries are ordered newest first.
    pub fn build<I>(&self, lines: I) -> Result<(String, String)>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let candidates: BTreeSet<String> = lines
            .into_iter()
            .filter_map(|line| normalize_line(line.as_ref()))
            .collect();

        let base = self.config.base_url();
        let mut entries = Vec::with_capacity(candidates.len() + self.config.external.len() + 1);

        for path in &candidates {
            if !self.filter.is_eligible(path) {
                continue;
            }
            log!("sitemap"; "processing {path}");
            entries.push(self.local_entry(&base, path)?);
        }

        // The site root and cross-domain siblings bypass the filter and are
        // always probed per their configuration.
        let root_entry = ExternalEntry {
            base: base.clone(),
            path: String::new(),
            file: None,
            online: true,
        };
        for external in std::iter::once(&root_entry).chain(self.config.external.iter()) {
            entries.push(self.external_entry(external)?);
        }

        // Newest first; stable, so equal timestamps keep processing order
        entries.sort_by(|a, b| b.lastmod.cmp(&a.lastmod));

        Ok((render(&entries, false), render(&entries, true)))
    }

    /// Resolve one filtered candidate path into an entry.
    ///
    /// Directories are emitted with a trailing `/` and hash their
    /// `index.html`; the fallback time is the path's own mtime.
    fn local_entry(&self, base: &str, path: &str) -> Result<UrlEntry> {
        let full = self.config.get_root().join(path);
        let metadata =
            fs::metadata(&full).with_context(|| format!("Cannot stat {}", full.display()))?;
        let modified = metadata
            .modified()
            .with_context(|| format!("No modification time for {}", full.display()))?;
        let fallback = date::from_system_time(modified, self.resolver.tz);

        let (url_path, file_rel) = if metadata.is_dir() {
            (format!("{path}/"), format!("{path}/index.html"))
        } else {
            (path.to_owned(), path.to_owned())
        };

        let url = format!("{base}{url_path}");
        let resolved = self
            .resolver
            .resolve(path, &url, fallback, Some(&file_rel), false)?;

        Ok(UrlEntry {
            base: base.to_owned(),
            path: url_path,
            lastmod: resolved.lastmod,
            filehash: resolved.hash,
        })
    }

    /// Resolve one unconditional external entry.
    ///
    /// Wall-clock is the fallback time; the content hash comes from the
    /// configured local file or the fetched resource body.
    fn external_entry(&self, external: &ExternalEntry) -> Result<UrlEntry> {
        let url = format!("{}{}", external.base, external.path);
        let key = self.external_key(&url);
        let fallback = date::now(self.resolver.tz);
        let file = external
            .file
            .as_ref()
            .and_then(|file| file.to_str());

        let resolved = self
            .resolver
            .resolve(&key, &url, fallback, file, external.online)?;

        Ok(UrlEntry {
            base: external.base.clone(),
            path: external.path.clone(),
            lastmod: resolved.lastmod,
            filehash: resolved.hash,
        })
    }

    /// Previous-state key for an external entry: relative when it lives
    /// under the site base, the full URL otherwise (cross-domain locations
    /// are never recorded, so such keys simply miss).
    fn external_key(&self, url: &str) -> String {
        let base = self.config.base_url();
        url.strip_prefix(base.trim_end_matches('/'))
            .map(|rest| rest.trim_matches('/').to_owned())
            .unwrap_or_else(|| url.to_owned())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Normalize one raw input line into a candidate path.
///
/// Strips the `./` prefix and surrounding slashes, folds a trailing
/// `index.html` into its directory, and drops empty lines (the site root
/// is emitted separately).
fn normalize_line(line: &str) -> Option<String> {
    let s = line.trim().trim_start_matches("./").trim_matches('/');

    let s = if s == "index.html" {
        ""
    } else if let Some(dir) = s.strip_suffix("/index.html") {
        dir.trim_end_matches('/')
    } else {
        s
    };

    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}

/// Serialize buffered entries into one XML document.
fn render(entries: &[UrlEntry], internal: bool) -> String {
    let mut xml = String::with_capacity(4096);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    if internal {
        xml.push_str(&format!(
            r#"<urlset xmlns="{SITEMAP_NS}" xmlns:fh="{FILEHASH_NS}">"#
        ));
    } else {
        xml.push_str(&format!(
            "<urlset\n  xmlns=\"{SITEMAP_NS}\"\n  xmlns:xsi=\"{XSI_NS}\"\n  xsi:schemaLocation=\"{SCHEMA_LOCATION}\">"
        ));
    }
    xml.push('\n');

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc())));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            date::format_lastmod(&entry.lastmod)
        ));
        if internal && let Some(hash) = &entry.filehash {
            xml.push_str(&format!("    <fh:filehash>{hash}</fh:filehash>\n"));
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::previous::PreviousState;
    use crate::utils::hash;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const BASE: &str = "https://example.com/info/";

    fn leaked_config(root: &Path) -> &'static SiteConfig {
        let mut config = SiteConfig::default();
        config.site.url = Some("https://example.com/info".to_string());
        config.set_root(root);
        Box::leak(Box::new(config))
    }

    fn resolver<'a>(
        config: &'static SiteConfig,
        previous: &'a PreviousState,
    ) -> FreshnessResolver<'a> {
        FreshnessResolver {
            previous,
            fetcher: None,
            git: None,
            root: config.get_root(),
            tz: config.tz().unwrap(),
        }
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.html"), b"about page").unwrap();
        fs::create_dir_all(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/logo.png"), b"png").unwrap();
        fs::create_dir_all(dir.path().join("posts/2021")).unwrap();
        fs::write(dir.path().join("posts/2021/index.html"), b"post index").unwrap();
        dir
    }

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("about.html"), Some("about.html".to_string()));
        assert_eq!(normalize_line("./about.html"), Some("about.html".to_string()));
        assert_eq!(normalize_line("  posts/2021/  "), Some("posts/2021".to_string()));
        assert_eq!(
            normalize_line("posts/2021/index.html"),
            Some("posts/2021".to_string())
        );
        assert_eq!(normalize_line("index.html"), None);
        assert_eq!(normalize_line("./"), None);
        assert_eq!(normalize_line(""), None);
        // Not an index page, just an unfortunate name
        assert_eq!(
            normalize_line("myindex.html"),
            Some("myindex.html".to_string())
        );
    }

    #[test]
    fn test_end_to_end_example() {
        // The canonical three-line example: one filtered asset, one
        // hash-matched page, one directory without prior record.
        let dir = sample_tree();
        let config = leaked_config(dir.path());

        let about_hash = hash::digest(b"about page");
        let xml = format!(
            r#"<urlset><url><loc>{BASE}about.html</loc><lastmod>2022-01-01T00:00:00-05:00</lastmod><fh:filehash>{about_hash}</fh:filehash></url></urlset>"#
        );
        let previous = PreviousState::parse(&xml, BASE).unwrap();

        let assembler = SitemapAssembler::new(config, resolver(config, &previous));
        let (public, internal) = assembler
            .build(["about.html", "img/logo.png", "posts/2021/index.html"])
            .unwrap();

        // about.html carries the previous timestamp forward
        assert!(public.contains(&format!("<loc>{BASE}about.html</loc>")));
        assert!(public.contains("<lastmod>2022-01-01T00:00:00-05:00</lastmod>"));

        // the directory appears with a trailing slash and its own mtime
        assert!(public.contains(&format!("<loc>{BASE}posts/2021/</loc>")));

        // the filtered asset appears in neither document
        assert!(!public.contains("logo.png"));
        assert!(!internal.contains("logo.png"));

        // the root entry is always present
        assert!(public.contains(&format!("<loc>{BASE}</loc>")));
    }

    #[test]
    fn test_internal_superset_of_public() {
        let dir = sample_tree();
        let config = leaked_config(dir.path());
        let previous = PreviousState::empty();

        let assembler = SitemapAssembler::new(config, resolver(config, &previous));
        let (public, internal) = assembler
            .build(["about.html", "posts/2021/index.html"])
            .unwrap();

        for line in public.lines() {
            if line.contains("<loc>") || line.contains("<lastmod>") {
                assert!(internal.contains(line.trim()), "missing in internal: {line}");
            }
        }
        // hashes only in the internal document
        assert!(internal.contains("<fh:filehash>"));
        assert!(!public.contains("filehash"));
    }

    #[test]
    fn test_entries_sorted_newest_first() {
        let dir = sample_tree();
        let config = leaked_config(dir.path());
        let previous = PreviousState::empty();

        let assembler = SitemapAssembler::new(config, resolver(config, &previous));
        let (public, _) = assembler
            .build(["about.html", "posts/2021/index.html"])
            .unwrap();

        let times: Vec<&str> = public
            .lines()
            .filter(|line| line.contains("<lastmod>"))
            .collect();
        assert!(times.len() >= 3);
        let mut sorted = times.clone();
        // RFC 3339 strings with identical offsets sort chronologically
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(times, sorted);
    }

    #[test]
    fn test_idempotent_against_own_output() {
        let dir = sample_tree();
        let config = leaked_config(dir.path());

        let empty = PreviousState::empty();
        let assembler = SitemapAssembler::new(config, resolver(config, &empty));
        let (_, first_internal) = assembler
            .build(["about.html", "posts/2021/index.html"])
            .unwrap();

        let recovered = PreviousState::parse(&first_internal, BASE).unwrap();
        let assembler = SitemapAssembler::new(config, resolver(config, &recovered));
        let (_, second_internal) = assembler
            .build(["about.html", "posts/2021/index.html"])
            .unwrap();

        // Every path-backed entry carries its lastmod forward byte-identically.
        // (The root entry refreshes its wall-clock fallback each run when
        // offline, so it is exempt here.)
        let first = PreviousState::parse(&first_internal, BASE).unwrap();
        let second = PreviousState::parse(&second_internal, BASE).unwrap();
        for key in ["about.html", "posts/2021"] {
            assert_eq!(
                first.get(key).unwrap().lastmod,
                second.get(key).unwrap().lastmod,
                "lastmod churned for {key}"
            );
            assert_eq!(
                first.get(key).unwrap().hash,
                second.get(key).unwrap().hash
            );
        }
    }

    #[test]
    fn test_dedup_candidates() {
        let dir = sample_tree();
        let config = leaked_config(dir.path());
        let previous = PreviousState::empty();

        let assembler = SitemapAssembler::new(config, resolver(config, &previous));
        let (public, _) = assembler
            .build(["about.html", "./about.html", "about.html/"])
            .unwrap();

        assert_eq!(
            public
                .matches(&format!("<loc>{BASE}about.html</loc>"))
                .count(),
            1
        );
    }

    #[test]
    fn test_directory_without_index_never_emitted() {
        let dir = sample_tree();
        let config = leaked_config(dir.path());
        let previous = PreviousState::empty();

        let assembler = SitemapAssembler::new(config, resolver(config, &previous));
        let (public, internal) = assembler.build(["img"]).unwrap();

        assert!(!public.contains("img"));
        assert!(!internal.contains("img"));
    }

    #[test]
    fn test_configured_external_entries_emitted() {
        let dir = sample_tree();
        let mut config = SiteConfig::default();
        config.site.url = Some("https://example.com/info".to_string());
        config.set_root(dir.path());
        config.external.push(ExternalEntry {
            base: "https://sibling.example.org/".to_string(),
            path: "demo.html".to_string(),
            file: None,
            online: false,
        });
        let config: &'static SiteConfig = Box::leak(Box::new(config));
        let previous = PreviousState::empty();

        let assembler = SitemapAssembler::new(config, resolver(config, &previous));
        let (public, _) = assembler.build(Vec::<String>::new()).unwrap();

        assert!(public.contains("<loc>https://sibling.example.org/demo.html</loc>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn test_render_empty() {
        let public = render(&[], false);
        assert!(public.contains(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(public.contains("xsi:schemaLocation"));
        assert!(public.contains("</urlset>"));
        assert!(!public.contains("<url>"));

        let internal = render(&[], true);
        assert!(internal.contains(&format!(r#"xmlns:fh="{FILEHASH_NS}""#)));
    }

    #[test]
    fn test_render_escapes_loc() {
        let entries = vec![UrlEntry {
            base: BASE.to_string(),
            path: "search?q=a&b=c".to_string(),
            lastmod: date::parse_lastmod("2022-01-01T00:00:00-05:00").unwrap(),
            filehash: None,
        }];
        let xml = render(&entries, false);
        assert!(xml.contains(&format!("<loc>{BASE}search?q=a&amp;b=c</loc>")));
    }
}
