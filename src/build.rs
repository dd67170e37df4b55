//! Run orchestration.
//!
//! Wires the configured collaborators together and owns the output-file
//! guarantees: a partially written output is removed rather than left
//! truncated, and on a failed build the previously published sitemap is
//! fetched and reused verbatim as a last-known-good artifact.
//!
//! # Data Flow
//!
//! ```text
//! stdin lines ──► SitemapAssembler
//!                     │  PathFilter ──► FreshnessResolver
//!                     │                     │  PreviousState (remote/git)
//!                     │                     │  ContentHasher
//!                     │                     └  HEAD probes
//!                     ▼
//!            (public_xml, internal_xml) ──► output files
//! ```

use crate::{
    config::{PreviousSource, SiteConfig},
    fetch::Fetcher,
    freshness::FreshnessResolver,
    generator::sitemap::SitemapAssembler,
    log,
    previous::PreviousState,
    utils::git::GitBaseline,
};
use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, BufRead},
    path::Path,
    time::Duration,
};

/// Generate both sitemaps from the candidate paths on standard input.
pub fn run(config: &'static SiteConfig) -> Result<()> {
    let cli = config.get_cli();
    let tz = config.tz()?;

    let fetcher = if config.fetch.offline {
        None
    } else {
        Some(Fetcher::new(
            Duration::from_secs(config.fetch.timeout),
            &config.fetch.user_agent,
        )?)
    };

    let git = match config.previous.source {
        PreviousSource::Git => Some(GitBaseline::open(
            config.get_root(),
            &config.previous.git_ref,
        )?),
        _ => None,
    };

    let previous = PreviousState::load(config, fetcher.as_ref(), git.as_ref());
    log!("sitemap"; "previous state: {} entries", previous.len());

    let lines: Vec<String> = io::stdin()
        .lock()
        .lines()
        .collect::<io::Result<_>>()
        .context("Failed to read candidate paths from stdin")?;

    let resolver = FreshnessResolver {
        previous: &previous,
        fetcher: fetcher.as_ref(),
        git: git.as_ref(),
        root: config.get_root(),
        tz,
    };
    let assembler = SitemapAssembler::new(config, resolver);

    let (public_xml, internal_xml) = match assembler.build(lines) {
        Ok(documents) => documents,
        Err(err) => {
            log!("error"; "build failed: {err:#}");
            restore_published(&cli.output, fetcher.as_ref(), config);
            return Err(err);
        }
    };

    write_output(&cli.output, &public_xml)?;
    log!("sitemap"; "wrote {}", cli.output.display());

    if let Some(internal_path) = &cli.internal_output {
        write_output(internal_path, &internal_xml)?;
        log!("sitemap"; "wrote {}", internal_path.display());
    }

    Ok(())
}

/// Write one output document, removing the file on partial failure.
fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Err(err) = fs::write(path, contents) {
        let _ = fs::remove_file(path);
        return Err(err).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// Attempt to reuse the last published public sitemap as a substitute
/// artifact, so a failed run still leaves something servable in place.
fn restore_published(path: &Path, fetcher: Option<&Fetcher>, config: &SiteConfig) {
    let Some(fetcher) = fetcher else {
        return;
    };

    let url = config.published_sitemap_url();
    match fetcher.get_text(&url) {
        Ok(published) => {
            if write_output(path, &published).is_ok() {
                log!("sitemap"; "reused previously published sitemap as {}", path.display());
            }
        }
        Err(err) => {
            log!("error"; "could not recover published sitemap: {err:#}");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitemap.xml");

        write_output(&path, "<urlset/>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<urlset/>");
    }

    #[test]
    fn test_write_output_unwritable_path() {
        let dir = TempDir::new().unwrap();
        // Parent directory does not exist
        let path = dir.path().join("missing/sitemap.xml");

        let result = write_output(&path, "<urlset/>");
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_restore_published_offline_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitemap.xml");
        let config = SiteConfig::default();

        restore_published(&path, None, &config);
        assert!(!path.exists());
    }
}
