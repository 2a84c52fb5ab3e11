// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
//   mirror <root-url> <destination-dir> [--workers N] [--log PATH]
//          [--user U --password P] [--connect-timeout SECS] [--json]
//
// We use clap's "derive" API: the struct fields below become arguments, and
// the doc comments become the --help text.
// =============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Credentials, MirrorConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to generate the parsing code, and the
// #[command(...)] attributes fill in the --help and --version output
#[derive(Parser, Debug)]
#[command(
    name = "mirror",
    version,
    about = "Mirror an nginx/Apache autoindexed folder to a local directory",
    long_about = "mirror walks a server-generated directory listing, recreates its folders locally \
                  and downloads every file in parallel. Individual download failures are logged \
                  and skipped, so one bad link never aborts the whole mirror."
)]
pub struct Cli {
    /// URL of the autoindexed folder (e.g., https://data.example.org/pub/dr3/)
    // Positional and required; a missing trailing '/' is added later
    pub url: String,

    /// Local directory to save the downloaded files into
    pub destination: PathBuf,

    /// Number of concurrent downloads
    // Listing fetches count against the same limit; 0 is raised to 1.
    // --threads is kept as an alias for the name older scripts use
    #[arg(long, short = 'w', visible_alias = "threads", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// File where failed downloads are recorded (appended to)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Username for HTTP Basic authentication
    // `requires` makes clap reject --user without --password (and the other
    // way round) with exit code 2
    #[arg(long, requires = "password")]
    pub user: Option<String>,

    /// Password for HTTP Basic authentication
    #[arg(long, requires = "user")]
    pub password: Option<String>,

    /// Seconds to wait for a connection before giving up on a request
    // Only the connect phase is bounded, a large file may stream for hours
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub connect_timeout: u64,

    /// Print the final report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    // Turns the raw arguments into the settings of one run. This is where a
    // bad URL is rejected, before any request is made
    pub fn to_config(&self) -> Result<MirrorConfig> {
        Ok(MirrorConfig::new(&self.url, &self.destination)?
            .with_workers(self.workers)
            .with_timeout(Duration::from_secs(self.connect_timeout))
            .with_log_path(self.log.clone()))
    }

    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.user.clone(), self.password.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["mirror", "http://example.com/data", "out"]).unwrap();
        let config = cli.to_config().unwrap();

        assert_eq!(config.root_url, "http://example.com/data/");
        assert_eq!(config.destination, PathBuf::from("out"));
        assert_eq!(config.workers, 5);
        assert_eq!(config.log_path, None);
        assert!(cli.credentials().is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "mirror",
            "https://example.com/hips/",
            "/tmp/hips",
            "--threads",
            "16",
            "--log",
            "failed.log",
            "--user",
            "alice",
            "--password",
            "secret",
            "--json",
        ])
        .unwrap();
        let config = cli.to_config().unwrap();

        assert_eq!(config.workers, 16);
        assert_eq!(config.log_path, Some(PathBuf::from("failed.log")));
        assert_eq!(cli.credentials(), Some(Credentials::new("alice", "secret")));
        assert!(cli.json);
    }

    #[test]
    fn test_user_requires_password() {
        let result = Cli::try_parse_from(["mirror", "http://h/", "out", "--user", "alice"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_destination() {
        assert!(Cli::try_parse_from(["mirror", "http://h/"]).is_err());
    }

    #[test]
    fn test_invalid_url_rejected_by_config() {
        let cli = Cli::try_parse_from(["mirror", "example.com/data", "out"]).unwrap();
        assert!(cli.to_config().is_err());
    }
}
