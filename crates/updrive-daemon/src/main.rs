//! updrive Daemon - Background one-way mirror service
//!
//! Mirrors a local directory into a remote object-storage folder on a
//! fixed poll interval:
//! - Validates configuration and the watched directory at startup (fatal)
//! - Runs one reconciliation pass per tick; every failure inside a pass
//!   is logged and survived
//! - Writes all pass and operation outcomes to a rotating file log
//! - Shuts down gracefully on SIGINT
//!
//! # Architecture
//!
//! The binary wires the HTTP adapter into the sync engine and enters a
//! single-threaded poll loop. Passes never overlap: each one runs to
//! completion before the loop sleeps again. The loop is controlled by a
//! `CancellationToken` triggered from the ctrl-c handler.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use updrive_api::DiskRemoteStore;
use updrive_core::config::{Config, ConfigError, LoggingConfig};
use updrive_core::ports::IRemoteStore;
use updrive_sync::{LocalInventory, Reconciler, SyncSession};

/// One-way local-to-cloud folder mirror daemon
#[derive(Debug, Parser)]
#[command(name = "updrived", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single reconciliation pass and exit
    #[arg(long)]
    once: bool,
}

// ============================================================================
// Startup checks
// ============================================================================

/// Verifies that the watched directory exists and is readable
///
/// Runs before the poll loop; a failure here is fatal. Once the loop is
/// running, the same conditions surface as per-pass scan errors instead.
fn check_local_dir(path: &Path) -> Result<(), ConfigError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::LocalDirMissing(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ConfigError::LocalDirUnreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(ConfigError::LocalDirNotADirectory(path.to_path_buf()));
    }

    std::fs::read_dir(path).map_err(|source| ConfigError::LocalDirUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Whether an error chain contains a credential rejection
fn is_auth_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .and_then(reqwest::Error::status)
            .is_some_and(|status| {
                status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
            })
    })
}

// ============================================================================
// Logging
// ============================================================================

/// Initializes tracing: stderr output plus a rotating file log
///
/// The file appender rolls daily and keeps `max_files` archives. The
/// returned guard flushes the non-blocking writer and must stay alive for
/// the lifetime of the process.
fn init_logging(logging: &LoggingConfig) -> Result<WorkerGuard> {
    let log_dir = logging.file.parent().unwrap_or_else(|| Path::new("."));
    let log_name = logging
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "updrive.log".to_string());

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_name)
        .max_log_files(logging.max_files as usize)
        .build(log_dir)
        .context("Failed to create rolling log appender")?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

// ============================================================================
// Daemon
// ============================================================================

/// Main daemon service wiring configuration into the sync engine
struct Daemon {
    config: Config,
    /// Token for signalling graceful shutdown to the poll loop
    shutdown: CancellationToken,
}

impl Daemon {
    fn new(config: Config) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Builds the store and session, then runs once or enters the loop
    async fn run(&self, once: bool) -> Result<()> {
        let store = Arc::new(DiskRemoteStore::from_config(&self.config));

        // Startup connectivity probe. Rejected credentials are a
        // configuration problem and fatal; a transient network failure is
        // not, the loop will keep trying.
        if let Err(err) = store.list().await {
            if is_auth_error(&err) {
                return Err(err.context("Remote endpoint rejected the configured credentials"));
            }
            warn!(
                error = %format!("{err:#}"),
                "Remote endpoint unreachable at startup, continuing"
            );
        }

        let inventory = LocalInventory::new(&self.config.sync.local_dir);
        let session = SyncSession::new(Reconciler::new(inventory, store));

        if once {
            session.run_once().await;
            return Ok(());
        }

        self.install_signal_handler();
        self.poll_loop(&session).await;
        Ok(())
    }

    /// Cancels the shutdown token on SIGINT
    fn install_signal_handler(&self) {
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("SIGINT received, shutting down");
                token.cancel();
            }
        });
    }

    /// Fixed-interval poll loop
    ///
    /// One pass per tick, strictly sequential. The first tick fires
    /// immediately so the mirror converges right after startup.
    async fn poll_loop(&self, session: &SyncSession) {
        let poll_secs = self.config.sync.poll_interval;
        info!(poll_interval_secs = poll_secs, "Starting poll loop");

        let mut interval = tokio::time::interval(Duration::from_secs(poll_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    session.run_once().await;
                }
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Poll loop terminated");
    }
}

// Passes are strictly sequential; everything runs on one worker thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    let problems = config.validate();
    if !problems.is_empty() {
        return Err(ConfigError::from_validation(&problems).into());
    }
    check_local_dir(&config.sync.local_dir)?;

    let _log_guard = init_logging(&config.logging)?;
    info!(
        config_path = %config_path.display(),
        dir = %config.sync.local_dir.display(),
        remote_dir = %config.sync.remote_dir,
        "updrived starting"
    );

    Daemon::new(config).run(args.once).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_local_dir_accepts_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_local_dir(dir.path()).is_ok());
    }

    #[test]
    fn test_check_local_dir_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        assert!(matches!(
            check_local_dir(&missing),
            Err(ConfigError::LocalDirMissing(_))
        ));
    }

    #[test]
    fn test_check_local_dir_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"not a dir").unwrap();

        assert!(matches!(
            check_local_dir(&file),
            Err(ConfigError::LocalDirNotADirectory(_))
        ));
    }

    #[test]
    fn test_args_parse_once_flag() {
        let args = Args::parse_from(["updrived", "--once", "--config", "/tmp/c.yaml"]);
        assert!(args.once);
        assert_eq!(args.config.as_deref(), Some(Path::new("/tmp/c.yaml")));
    }
}
