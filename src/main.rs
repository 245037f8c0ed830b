//! Docs-Mapper main entry point
//!
//! This is the command-line interface for the Docs-Mapper site crawler.

use anyhow::{bail, Context};
use clap::Parser;
use docs_mapper::config::{load_config_with_hash, validate, CrawlConfig};
use docs_mapper::crawler::Coordinator;
use docs_mapper::output::{export, print_statistics};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Docs-Mapper: a breadth-first documentation site mapper
///
/// Docs-Mapper crawls a documentation site from a seed page, follows its
/// navigation within the configured host and path prefixes, and writes a
/// depth-grouped markdown map plus a plain URL list.
#[derive(Parser, Debug)]
#[command(name = "docs-mapper")]
#[command(version = "1.0.0")]
#[command(about = "A breadth-first documentation site mapper", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum link depth from the seed page
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum concurrent requests (1 = sequential)
    #[arg(long, value_name = "N")]
    max_concurrent: Option<u32>,

    /// Delay before each request, in seconds
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Per-request timeout, in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Also extract the main content text of every page
    #[arg(long)]
    content: bool,

    /// Host allowed in scope (`*.example.com` matches subdomains)
    #[arg(long, value_name = "HOST")]
    allowed_host: Option<String>,

    /// Allowed path prefix; repeat to allow several
    #[arg(long = "path-prefix", value_name = "PREFIX")]
    path_prefixes: Vec<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Markdown export file name
    #[arg(long, value_name = "FILE")]
    output: Option<String>,

    /// Directory the exports are written into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Validate the configuration and seed, then exit without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        // Only show errors
        "error"
    } else {
        match verbose {
            0 => "docs_mapper=info,warn",
            1 => "docs_mapper=debug,info",
            2 => "docs_mapper=trace,debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.url);
        return Ok(ExitCode::SUCCESS);
    }

    handle_crawl(config, &cli.url).await
}

/// Loads the config file (if any), applies CLI overrides, and validates
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => CrawlConfig::default(),
    };

    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(concurrency) = cli.max_concurrent {
        config.crawler.max_concurrency = concurrency;
    }
    if let Some(delay) = cli.delay {
        if !delay.is_finite() || delay < 0.0 {
            bail!("--delay must be a non-negative number of seconds, got {}", delay);
        }
        config.crawler.request_delay_ms = (delay * 1000.0).round() as u64;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if cli.content {
        config.crawler.extract_content = true;
    }
    if let Some(host) = &cli.allowed_host {
        config.scope.allowed_host = host.clone();
    }
    if !cli.path_prefixes.is_empty() {
        config.scope.allowed_path_prefixes = cli.path_prefixes.clone();
    }
    if let Some(output) = &cli.output {
        config.output.markdown_file = output.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &CrawlConfig, seed: &str) {
    println!("=== Docs-Mapper Dry Run ===\n");

    println!("Seed: {}", seed);
    println!(
        "  In scope: {}",
        if docs_mapper::is_in_scope(seed.trim(), &config.scope) {
            "yes"
        } else {
            "no"
        }
    );

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max concurrent requests: {}", config.crawler.max_concurrency);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Extract content: {}", config.crawler.extract_content);

    println!("\nScope:");
    println!("  Allowed host: {}", config.scope.allowed_host);
    for prefix in &config.scope.allowed_path_prefixes {
        println!("  - {}", prefix);
    }
    println!("  Blocked extensions: {}", config.scope.blocked_extensions.join(", "));

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Markdown: {}", config.output.markdown_file);
    println!("  URL list: {}", config.output.urls_file_name());
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig, seed: &str) -> anyhow::Result<ExitCode> {
    let cancel = CancellationToken::new();
    let coordinator = Coordinator::new(config.clone())?.with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing up with the pages crawled so far");
            cancel.cancel();
        }
    });

    let report = coordinator.run(seed).await?;

    if report.store.is_empty() {
        println!("No pages found");
        print_statistics(&report.stats);
        return Ok(ExitCode::FAILURE);
    }

    let paths = export(&report.store, &config)?;

    println!();
    print_statistics(&report.stats);
    println!("\nMarkdown: {}", paths.markdown.display());
    println!("URL list: {}", paths.urls.display());

    Ok(ExitCode::SUCCESS)
}
