//! Newsbot crawler main entry point
//!
//! This is the command-line host of the news feed crawler.

use anyhow::Context;
use clap::Parser;
use newsbot_crawler::analysis::DefaultAnalyzer;
use newsbot_crawler::config::{default_config, load_config_with_hash, Config};
use newsbot_crawler::crawler::build_http_client;
use newsbot_crawler::source::default_roster;
use newsbot_crawler::storage::{ArticleStore, SqliteStore};
use newsbot_crawler::Crawler;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Newsbot crawler: a periodic news feed harvester
///
/// Fetches the feeds of the built-in news sources, follows every entry to its
/// article page and stores the extracted articles. Cycles repeat on a fixed
/// interval until interrupted.
#[derive(Parser, Debug)]
#[command(name = "newsbot-crawler")]
#[command(version)]
#[command(about = "A periodic news feed harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Environment file loaded before configuration
    #[arg(long, value_name = "FILE", default_value = "env/local.env")]
    env_file: PathBuf,

    /// Run a single crawl cycle and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    once: bool,

    /// Validate config and show the source roster without crawling
    #[arg(long, conflicts_with_all = ["once", "stats"])]
    dry_run: bool,

    /// Show article counts from the database and exit
    #[arg(long, conflicts_with_all = ["once", "dry_run"])]
    stats: bool,
}

/// Deployment environment, taken from `ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Environment {
    Development,
    Production,
    Local,
}

impl Environment {
    fn from_env() -> Self {
        match std::env::var("ENV").as_deref() {
            Ok("dev") => Self::Development,
            Ok("prod") => Self::Production,
            _ => Self::Local,
        }
    }

    fn is_deployed(self) -> bool {
        self != Self::Local
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Local => "local",
        };
        write!(f, "{}", name)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ENV may come from the env file, so load it before logging is set up
    let env_file = dotenvy::from_path(&cli.env_file);
    let environment = Environment::from_env();
    setup_logging(cli.verbose, cli.quiet, environment);

    if let Err(e) = env_file {
        tracing::warn!("Could not load {}: {}", cli.env_file.display(), e);
    }
    let version = std::env::var("VERSION").unwrap_or_else(|_| "default".to_string());
    tracing::info!("Version: {}", version);
    tracing::info!("Environment: {}", environment);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            default_config().context("Invalid default configuration")?
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.once {
        handle_once(&config).await?;
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence over the flags. Deployed environments get
/// plain output without colours or timestamps.
fn setup_logging(verbose: u8, quiet: bool, environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("newsbot_crawler=info,warn"),
                1 => EnvFilter::new("newsbot_crawler=debug,info"),
                2 => EnvFilter::new("newsbot_crawler=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    if environment.is_deployed() {
        builder.with_ansi(false).without_time().init();
    } else {
        builder.init();
    }
}

fn build_crawler(config: &Config) -> anyhow::Result<Arc<Crawler>> {
    let store = SqliteStore::new(Path::new(&config.storage.database_path))
        .with_context(|| format!("Failed to open {}", config.storage.database_path))?;
    let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
    let sources = default_roster()?;

    Ok(Arc::new(Crawler::from_config(
        sources,
        &config.crawler,
        client,
        Arc::new(store),
        Arc::new(DefaultAnalyzer::default()),
    )))
}

/// Handles the --dry-run mode: validates config and shows the roster
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Newsbot Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Interval: {:?}", config.crawler.interval());
    println!("  Channel capacity: {}", config.crawler.channel_capacity);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Entry delay: {}ms", config.crawler.entry_delay_ms);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    let sources = default_roster()?;
    println!("\nSources ({}):", sources.len());
    for source in &sources {
        println!("  - {} ({})", source.name(), source.domain());
        if let Some(options) = source.options() {
            println!(
                "    body: {:?}, meta description: {}",
                options.body_selector, options.use_meta_desc
            );
        }
        for link in source.links() {
            println!("    * {}", link);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} feed links",
        sources.iter().map(|s| s.links().len()).sum::<usize>()
    );

    Ok(())
}

/// Handles the --stats mode: shows article counts from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let store = SqliteStore::new(Path::new(&config.storage.database_path))?;

    println!("Articles: {}", store.count_articles()?);
    for (topic, count) in store.count_articles_by_topic()? {
        println!("  {:<16} {}", topic, count);
    }

    Ok(())
}

/// Handles the --once mode: runs a single cycle with the dispatch loop
async fn handle_once(config: &Config) -> anyhow::Result<()> {
    let crawler = build_crawler(config)?;

    let listener = {
        let crawler = Arc::clone(&crawler);
        tokio::spawn(async move { crawler.listen().await })
    };

    let report = crawler.run().await;
    crawler.stop();
    listener.await??;

    println!(
        "Cycle {}: {} new articles in {:.1}s",
        report.cycle,
        report.discovered,
        report.elapsed.as_secs_f64()
    );

    Ok(())
}

/// Handles the main crawl operation: cycles until Ctrl-C
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let crawler = build_crawler(config)?;
    tracing::info!(
        "Crawling {} sources every {:?}",
        crawler.sources().len(),
        crawler.interval()
    );

    let listener = {
        let crawler = Arc::clone(&crawler);
        tokio::spawn(async move { crawler.listen().await })
    };
    let schedule = crawler.start()?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Interrupt received, shutting down");

    crawler.stop();
    listener.await??;

    tracing::info!("Waiting for the current cycle to finish (Ctrl-C again to exit now)");
    tokio::select! {
        result = schedule => result?,
        _ = tokio::signal::ctrl_c() => tracing::warn!("Exiting before the cycle finished"),
    }

    Ok(())
}
