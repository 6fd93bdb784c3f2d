//! Harvester CLI
//!
//! Collects the comment list of one post and saves it as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use harvester::{
    error::{AppError, Result},
    models::{CollectionResult, Config},
    pipeline,
    storage::{LocalStorage, ResultStorage},
};

/// Harvester - social post comment collector
#[derive(Parser, Debug)]
#[command(
    name = "harvester",
    version,
    about = "Incrementally collects lazily loaded post comments"
)]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "harvester.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect comments from a post URL
    Collect {
        /// Post URL
        url: String,

        /// Output JSON file
        #[arg(short, long, default_value = "comments.json")]
        output: PathBuf,

        /// Maximum scroll rounds (default: collector.max_rounds)
        #[arg(long, alias = "max-scroll")]
        max_rounds: Option<usize>,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,

        /// WebDriver endpoint (default: browser.webdriver_url)
        #[arg(long)]
        webdriver: Option<String>,

        /// Abort the whole run after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },

    /// Validate the configuration file
    Validate,

    /// Summarize a saved result file
    Info {
        /// Result JSON file
        file: PathBuf,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Completes on Ctrl-C or when the deadline passes.
async fn cancellation(deadline: Option<Duration>) {
    let deadline = async {
        match deadline {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => log::warn!("Interrupted, shutting down..."),
        _ = deadline => log::warn!("Deadline reached, shutting down..."),
    }
}

fn print_summary(result: &CollectionResult) {
    let summary = result.summary();
    log::info!("Title: {}", result.title);
    log::info!("URL: {}", result.url);
    log::info!("Collected at: {}", result.crawl_time);
    log::info!("Comments: {}", summary.comments);
    log::info!("Author replies: {}", summary.author_replies);
    log::info!("Total likes: {}", summary.total_likes);
    log::info!("Nested replies: {}", summary.replies);
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        log::debug!("No config at {}, using defaults", cli.config.display());
        Config::default()
    };

    match cli.command {
        Command::Collect {
            url,
            output,
            max_rounds,
            headless,
            webdriver,
            deadline_secs,
        } => {
            if headless {
                config.browser.headless = true;
            }
            if let Some(endpoint) = webdriver {
                config.browser.webdriver_url = endpoint;
            }
            if let Some(rounds) = max_rounds {
                config.collector.max_rounds = rounds;
            }
            config.validate()?;

            let config = Arc::new(config);
            let max_rounds = config.collector.max_rounds;
            let cancel = cancellation(deadline_secs.map(Duration::from_secs));

            let result = match pipeline::run_collector(Arc::clone(&config), &url, max_rounds, cancel)
                .await
            {
                Ok(result) => result,
                Err(e) if e.is_fatal() => {
                    log::error!("Collection aborted: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    log::error!("Could not start collection: {}", e);
                    return Err(e);
                }
            };

            let (storage, key) = LocalStorage::for_file(&output)?;
            let meta = storage.save(&key, &result).await?;
            log::info!(
                "Saved {} comments to {} ({} bytes)",
                meta.comment_count,
                meta.location,
                meta.bytes
            );
            print_summary(&result);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (timing values and all selectors)");
        }

        Command::Info { file } => {
            let (storage, key) = LocalStorage::for_file(&file)?;
            let result = storage
                .load(&key)
                .await?
                .ok_or_else(|| AppError::config(format!("{} not found", file.display())))?;
            print_summary(&result);
        }
    }

    Ok(())
}
