//! SwitchGear CLI

mod loader;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use loader::load_config;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;
use switchgear_breaker::{Breaker, BreakerConfig, CallError, FailureRecord, StateStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "switchgear")]
#[command(about = "SwitchGear circuit breaker", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info", env = "SWITCHGEAR_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated workload through a breaker
    Demo {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of calls to make
        #[arg(short = 'n', long, default_value_t = 20)]
        calls: usize,

        /// Probability that a call to the simulated service fails
        #[arg(short, long, default_value_t = 0.5)]
        failure_rate: f64,

        /// Pause between calls in milliseconds
        #[arg(short, long, default_value_t = 100)]
        interval_ms: u64,
    },

    /// Show the state of a circuit
    Status {
        /// Path to configuration file
        #[arg(short, long, default_value = "breaker.yaml")]
        config: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clear all failures and close a circuit
    Reset {
        /// Path to configuration file
        #[arg(short, long, default_value = "breaker.yaml")]
        config: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "breaker.yaml")]
        config: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Demo {
            config,
            calls,
            failure_rate,
            interval_ms,
        } => {
            let config = match config {
                Some(path) => load_config(path, true)?,
                None => BreakerConfig::default(),
            };
            run_demo(
                config,
                calls,
                failure_rate.clamp(0.0, 1.0),
                Duration::from_millis(interval_ms),
            )
        }

        Commands::Status { config, json } => {
            let config = load_config(&config, true)?;
            let store = open_shared(&config)?;
            let status = Status::read(&config, &*store)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("Namespace:     {}", status.namespace);
                println!("Store:         {}", status.store);
                println!("State:         {}", status.state);
                println!("Failures:      {}/{}", status.failure_count, status.failure_limit);
                if let Some(failure) = &status.most_recent_failure {
                    println!("Last failure:  {failure}");
                    println!("Failed at:     {}", failure.timestamp().to_rfc3339());
                }
            }
            Ok(())
        }

        Commands::Reset { config } => {
            let config = load_config(&config, true)?;
            let store = open_shared(&config)?;
            store.reset()?;

            tracing::info!(
                namespace = config.namespace.as_deref().unwrap_or("-"),
                "Circuit reset"
            );
            Ok(())
        }

        Commands::Validate { config } => {
            tracing::info!("Validating configuration: {}", config.display());

            match load_config(&config, true) {
                Ok(cfg) => {
                    tracing::info!("✓ Configuration is valid");
                    tracing::info!("  Failure limit: {}", cfg.failure_limit);
                    tracing::info!("  Reset timeout: {:?}", cfg.reset_timeout);
                    tracing::info!("  Namespace: {}", cfg.namespace.as_deref().unwrap_or("-"));
                    tracing::info!("  Store: {}", cfg.store.kind());
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("✗ Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("SwitchGear circuit breaker");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

/// Open the configured store for inspection from outside the breaker's process
///
/// A memory store only exists inside the process running the breaker, so
/// opening one here would report and reset a fresh, unrelated circuit.
fn open_shared(config: &BreakerConfig) -> Result<Box<dyn StateStore + Send + Sync>> {
    if !config.store.is_shared() {
        bail!(
            "{} store is process-local; status and reset need a shared store",
            config.store.kind()
        );
    }
    Ok(config.store.open(config.namespace.as_deref())?)
}

/// Circuit summary printed by `status`
#[derive(Debug, Serialize)]
struct Status {
    namespace: String,
    store: &'static str,
    state: String,
    failure_count: usize,
    failure_limit: usize,
    most_recent_failure: Option<FailureRecord>,
}

impl Status {
    fn read(config: &BreakerConfig, store: &dyn StateStore) -> Result<Self> {
        Ok(Self {
            namespace: config.namespace.clone().unwrap_or_else(|| "-".to_string()),
            store: config.store.kind(),
            state: store.state()?.to_string(),
            failure_count: store.failure_count()?,
            failure_limit: config.failure_limit,
            most_recent_failure: store.most_recent_failure()?,
        })
    }
}

/// Failure of the simulated remote service
#[derive(Debug)]
struct RemoteUnavailable;

impl fmt::Display for RemoteUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Remote system unavailable")
    }
}

impl std::error::Error for RemoteUnavailable {}

fn run_demo(
    config: BreakerConfig,
    calls: usize,
    failure_rate: f64,
    interval: Duration,
) -> Result<()> {
    let get_tweets = move |handle: &str| {
        if fastrand::f64() < failure_rate {
            Err(RemoteUnavailable)
        } else {
            Ok(vec![format!("@{handle}: hello"), format!("@{handle}: again")])
        }
    };

    let breaker = Breaker::builder(get_tweets)
        .config(config)
        .build_from_config()?;

    tracing::info!(
        calls,
        failure_rate,
        failure_limit = breaker.failure_limit(),
        reset_timeout_ms = breaker.reset_timeout().as_millis() as u64,
        "Starting demo"
    );

    let (mut succeeded, mut failed, mut rejected) = (0usize, 0usize, 0usize);

    for call in 1..=calls {
        match breaker.call("joe") {
            Ok(tweets) => {
                succeeded += 1;
                tracing::info!(call, tweets = tweets.len(), "Call succeeded");
            }
            Err(CallError::Open(open)) => {
                rejected += 1;
                tracing::info!(
                    call,
                    retry_after_ms = open.retry_after.as_millis() as u64,
                    "Call rejected, waiting for reset timeout"
                );
                sleep(open.retry_after);
                continue;
            }
            Err(CallError::Operation(err)) => {
                failed += 1;
                tracing::info!(call, error = %err, "Call failed");
            }
            Err(CallError::Store(err)) => return Err(err.into()),
        }
        sleep(interval);
    }

    println!(
        "{succeeded} succeeded, {failed} failed, {rejected} rejected; circuit is {}",
        breaker.state()?
    );
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(filter.into())
                .add_directive("redis=warn".parse()?),
        )
        .init();

    Ok(())
}
