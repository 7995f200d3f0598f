use std::sync::Arc;
use std::time::Duration;

use accounts_auth::{Credentials, SessionService};
use accounts_config::AppConfig;
use accounts_database::{initialize_database, AccountRepository, Pool};
use accounts_users::{AccountWorkflow, DatabaseWorkflow};
use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Install the global fmt subscriber, filtered by `RUST_LOG` (default `info`).
    /// Logs go to stderr so command output on stdout stays clean.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything the server and the CLI commands run on
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: Pool,
    pub sessions: SessionService,
    pub workflow: Arc<DatabaseWorkflow>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .with_context(|| format!("failed to open database {}", config.database.url))?;

        let sessions = SessionService::new(db_pool.clone(), &config.auth);
        let workflow = Arc::new(AccountWorkflow::new(
            AccountRepository::new(db_pool.clone()),
            Credentials,
            sessions.clone(),
        ));

        let purged = sessions
            .purge_expired()
            .await
            .context("failed to purge expired sessions")?;

        info!(
            database = %config.database.url,
            session_ttl_seconds = sessions.session_ttl().num_seconds(),
            purged,
            "backend services ready"
        );

        Ok(Self {
            db_pool,
            sessions,
            workflow,
        })
    }

    /// Periodically delete expired sessions until the task is aborted
    pub fn spawn_session_purge(&self, every: Duration) -> JoinHandle<()> {
        let sessions = self.sessions.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately; startup already purged.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(error) = sessions.purge_expired().await {
                    warn!(%error, "expired session purge failed");
                }
            }
        })
    }
}

/// Resolves on ctrl-c, or on SIGTERM where the platform has it.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(?error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(?error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
