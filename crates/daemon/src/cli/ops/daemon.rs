use std::path::PathBuf;

use clap::Args;
use url::Url;

use vanish_daemon::state::{AppState, StateError};
use vanish_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override HTTP server port (default from config)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Public URL share links are built on (default from config)
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<Url>,

    /// SQLite database URL (default: db.sqlite in the config directory)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<Url>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value_t = tracing::Level::INFO)]
    pub log_level: tracing::Level,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;

        let base_url = match (&self.base_url, &state.config.base_url) {
            (Some(url), _) => Some(url.clone()),
            (None, Some(raw)) => Some(Url::parse(raw).map_err(|e| {
                DaemonError::InvalidConfig(format!("base_url {:?}: {}", raw, e))
            })?),
            (None, None) => None,
        };

        let database_url = match &self.database_url {
            Some(url) => url.clone(),
            None => Url::parse(&format!("sqlite://{}", state.db_path.display())).map_err(|e| {
                DaemonError::InvalidConfig(format!("database path {:?}: {}", state.db_path, e))
            })?,
        };

        let config = ServiceConfig {
            listen_port: self.port.unwrap_or(state.config.listen_port),
            base_url,
            max_upload_bytes: state.config.max_upload_bytes,
            database_url: Some(database_url),
            purge_interval: state.config.purge_interval(),
            vault: state.config.vault_config(),
            log_level: self.log_level,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
