//! dockbench-cleanup: remove Docker resources left behind by a benchmark run
//!
//! Finds containers, networks and images whose names were generated for the
//! given owner id and deletes them in dependency order.

use anyhow::{Context, Result};
use clap::Parser;
use dockbench_cleanup::{BollardDocker, CleanupConfig, CleanupHook, KindRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dockbench-cleanup")]
#[command(about = "Remove Docker resources left behind by a benchmark run")]
#[command(version)]
struct Args {
    /// Owner id of the run whose resources should be removed
    #[arg(long, env = "DOCKBENCH_OWNER_ID")]
    owner_id: String,

    /// Comma-separated resource kinds to clean (default: all)
    #[arg(long, value_delimiter = ',')]
    kinds: Vec<String>,

    /// JSON config file
    #[arg(long, env = "DOCKBENCH_CLEANUP_CONFIG")]
    config: Option<PathBuf>,

    /// Docker endpoint (unix:///path, tcp://host:port)
    #[arg(long, env = "DOCKER_HOST")]
    docker_host: Option<String>,

    /// Concurrent delete workers per resource kind
    #[arg(long)]
    threads: Option<usize>,

    /// Seconds to wait for each resource to disappear
    #[arg(long)]
    timeout: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Build the effective config: file (or defaults), then flag overrides
    fn cleanup_config(&self) -> Result<CleanupConfig> {
        let mut config = match &self.config {
            Some(path) => CleanupConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => CleanupConfig::default(),
        };

        if let Some(host) = &self.docker_host {
            config.docker_host = Some(host.clone());
        }
        if let Some(threads) = self.threads {
            config.cleanup_threads = threads;
        }
        if let Some(timeout) = self.timeout {
            config.deletion_timeout_secs = timeout;
        }

        config.validate().context("Invalid cleanup configuration")?;
        Ok(config)
    }

    fn kind_names(&self) -> Vec<String> {
        self.kinds
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let config = args.cleanup_config()?;
    let registry = KindRegistry::docker_defaults(&config);
    let hook = CleanupHook::new(registry, args.kind_names())?;

    let endpoint = config.endpoint();
    let docker = BollardDocker::connect(&endpoint)
        .with_context(|| format!("Failed to connect to Docker at {endpoint:?}"))?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping cleanup");
                cancel.cancel();
            }
        });
    }

    info!(owner_id = %args.owner_id, "Cleaning up benchmark resources");
    hook.setup();
    let report = hook
        .cleanup(Arc::new(docker), Vec::new(), &args.owner_id, cancel)
        .await;

    println!("\n=== Cleanup Report ===");
    println!("Owner: {}", args.owner_id);
    println!();
    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>10} {:>10} {:>12}",
        "KIND", "LISTED", "MATCHED", "DELETED", "ABANDONED", "TIMED_OUT", "INTERRUPTED"
    );
    println!("{}", "-".repeat(74));
    for (kind, pass) in &report.passes {
        println!(
            "{:<12} {:>8} {:>8} {:>8} {:>10} {:>10} {:>12}",
            kind,
            pass.listed,
            pass.matched,
            pass.deleted,
            pass.abandoned,
            pass.timed_out,
            pass.interrupted
        );
    }
    for kind in &report.failed_kinds {
        println!("{kind:<12} failed, see log");
    }

    let total = report.total();
    println!();
    println!("Deleted:  {}", total.deleted);
    println!("Residual: {}", total.residual());

    Ok(())
}
