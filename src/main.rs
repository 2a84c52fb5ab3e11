// src/main.rs
// =============================================================================
// This is the entry point of the mirror CLI.
//
// What happens here:
// 1. Set up logging (tracing, filtered through RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Build the transport, the optional failure log and the Ctrl+C handler
// 4. Run the mirror and print a summary (or JSON with --json)
// 5. Exit: 0 = mirror completed (even with recorded failures),
//          2 = bad arguments or the root listing could not be mirrored,
//          130 = interrupted by Ctrl+C
// =============================================================================

mod cli;
mod config;
mod error;
mod listing;
mod mirror;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use mirror::{FailureLog, FailureRecord, FailureSink, Mirror, MirrorReport, Shutdown};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use transport::HttpTransport;

/// Exit code when the user interrupted the crawl
const EXIT_INTERRUPTED: i32 = 130;

/// Filter used when RUST_LOG is not set.
///
/// Log targets start with the crate name ("mirror::mirror::file"), which is
/// the binary name, not the package name.
const DEFAULT_LOG_FILTER: &str = concat!(env!("CARGO_CRATE_NAME"), "=info");

// Logs go to stderr so that --json output on stdout stays machine readable.
// LOG_FORMAT=json switches the log lines themselves to JSON.
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

// The #[tokio::main] attribute builds a multi-threaded tokio runtime, so
// downloads spread over every core
#[tokio::main]
async fn main() {
    init_tracing();

    // Run the mirror and turn the outcome into a process exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Bad root URL, unreachable root listing, unwritable destination...
            // {:#} prints the whole anyhow context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0)   = the whole tree was walked (failed files are in the report)
//   Ok(130) = Ctrl+C stopped the mirror early
//   Err     = the root could not be mirrored at all
async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // clap exits with code 2 on its own for bad arguments, and handles --help
    let cli = Cli::parse();

    // Validate the root URL and normalize it to end with '/'
    let config = cli.to_config()?;

    if !cli.json {
        println!("-----------------------------------");
        println!("📂 Mirroring {}", config.root_url);
        println!("💾 Into {}", config.destination.display());
        println!("🧵 Workers: {}", config.workers);
    }

    // One HTTP client for the whole crawl; credentials are attached to every
    // request it sends
    let transport =
        HttpTransport::new(config.timeout, cli.credentials()).context("Failed to create HTTP client")?;

    // Ctrl+C does not kill the process. It raises the shutdown signal, the
    // walkers stop handing out new work and downloads in flight finish
    let shutdown = Shutdown::shared();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl+C received - finishing downloads in progress...");
                shutdown.request();
            }
        }
    });

    let mut mirror = Mirror::new(Arc::new(transport), config.workers).with_shutdown(shutdown.clone());

    // The failure log is opened once here and shared by every task
    if let Some(path) = &config.log_path {
        let log = FailureLog::open(path)
            .await
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        if !cli.json {
            println!("📝 Failures logged to {}", log.path().display());
        }
        let sink: Arc<dyn FailureSink> = Arc::new(log);
        mirror = mirror.with_sink(sink);
    }

    // Only a failure of the root itself comes back as an error; everything
    // below it is counted in the report
    let report = mirror
        .run(&config.root_url, &config.destination)
        .await
        .context("Could not mirror the root listing")?;

    print_report(&report, cli.json)?;

    if shutdown.is_requested() {
        Ok(EXIT_INTERRUPTED)
    } else {
        Ok(0)
    }
}

fn print_report(report: &MirrorReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("-----------------------------------");
    println!("📊 Summary:");
    println!("   📁 Directories: {}", report.directories_mirrored);
    println!("   ✅ Files downloaded: {}", report.files_downloaded);
    println!("   ❌ Files failed: {}", report.files_failed);
    if report.directories_failed > 0 {
        println!("   🚫 Directories failed: {}", report.directories_failed);
    }
    if report.skipped > 0 {
        println!("   ⏹️  Skipped (interrupted): {}", report.skipped);
    }

    if !report.is_clean() {
        print_failures(&report.failures);
    }
    println!("-----------------------------------");

    Ok(())
}

fn print_failures(failures: &[FailureRecord]) {
    if failures.is_empty() {
        return;
    }

    println!();
    println!("{:<70} {}", "URL", "ERROR");
    println!("{}", "=".repeat(100));
    for failure in failures {
        // Truncate long URLs so the table stays readable
        let url_display = if failure.url.chars().count() > 67 {
            let head: String = failure.url.chars().take(67).collect();
            format!("{}...", head)
        } else {
            failure.url.clone()
        };
        println!("{:<70} {}", url_display, failure.message);
    }
}
