//! Crawl Engine main entry point
//!
//! This is the command-line interface for running page-title crawls defined
//! in a TOML configuration file.

use anyhow::Context as _;
use clap::Parser;
use crawl_engine::config::{load_config_with_hash, Config};
use crawl_engine::output::print_statistics;
use crawl_engine::tasks::title_task;
use crawl_engine::{Engine, Fetcher, HttpFetcher, LogSink, TaskRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Crawl Engine: a concurrent crawl scheduler
///
/// Crawl Engine fetches the seed URLs of every configured task, records
/// page titles, and follows links up to each task's max depth while
/// deduplicating and retrying failed fetches once.
#[derive(Parser, Debug)]
#[command(name = "crawl-engine")]
#[command(version)]
#[command(about = "A concurrent crawl scheduler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_engine=info,warn"),
            1 => EnvFilter::new("crawl_engine=debug,info"),
            2 => EnvFilter::new("crawl_engine=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the parsed configuration and seeds
fn handle_dry_run(config: &Config) {
    println!("=== Crawl Engine Dry Run ===\n");

    println!("Engine Configuration:");
    println!("  Workers: {}", config.engine.worker_count);
    println!("  Minimum body length: {} bytes", config.engine.min_body_length);
    println!("  Push buffer: {}", config.engine.push_buffer);
    println!("  Result buffer: {}", config.engine.result_buffer);
    println!("  Exit when idle: {}", config.engine.exit_when_idle);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent());

    println!("\nTasks ({}):", config.tasks.len());
    for entry in &config.tasks {
        println!(
            "  - {} (max depth {}, wait {}ms, reload: {}, follow links: {})",
            entry.name, entry.max_depth, entry.wait_time, entry.reload, entry.follow_links
        );
        for seed in &entry.seeds {
            println!("    * {}", seed);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.tasks.iter().map(|t| t.seeds.len()).sum::<usize>()
    );
}

/// Builds one title task per config entry, all sharing one HTTP fetcher
fn build_registry(config: &Config) -> anyhow::Result<TaskRegistry> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(
        HttpFetcher::new(&config.user_agent).context("Failed to build HTTP client")?,
    );

    let mut registry = TaskRegistry::new();
    for entry in &config.tasks {
        registry.register(title_task(
            entry.name.clone(),
            entry.seeds.clone(),
            entry.options(),
            entry.follow_links,
            Arc::clone(&fetcher),
        ))?;
    }

    Ok(registry)
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let registry = build_registry(&config)?;
    tracing::info!(
        "Tasks: {}, total seed URLs: {}",
        registry.len(),
        config.tasks.iter().map(|t| t.seeds.len()).sum::<usize>()
    );

    let engine = Engine::new(config.engine, Arc::new(registry), Arc::new(LogSink));

    let shutdown = engine.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing in-flight requests");
            shutdown.trigger();
        }
    });

    match engine.run().await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
