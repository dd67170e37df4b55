//! Command-line interface definitions.
//!
//! Defines all CLI arguments using clap. Candidate paths arrive on standard
//! input, one per line; outputs are positional file paths.

use clap::Parser;
use std::path::PathBuf;

/// Freshmap sitemap generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Public sitemap output file
    pub output: PathBuf,

    /// Internal sitemap output file (carries content hashes for the next run)
    pub internal_output: Option<PathBuf>,

    /// Site root directory that candidate paths are relative to
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: freshmap.toml)
    #[arg(short = 'C', long, default_value = "freshmap.toml")]
    pub config: PathBuf,

    /// Override base URL for the site.
    ///
    /// Useful for CI/CD deployments where the production URL differs from
    /// the one in freshmap.toml, keeping the source file clean.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Disable all network access (previous-state fetch and freshness probes)
    #[arg(long)]
    pub offline: bool,
}
