use clap::Args;

use vanish_daemon::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// HTTP server listen port
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Public URL share links are built on (e.g. https://vanish.example.com)
    #[arg(long)]
    pub base_url: Option<url::Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] vanish_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            listen_port: self.port,
            base_url: self.base_url.as_ref().map(|url| url.to_string()),
            ..AppConfig::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized vanish directory at: {}\n\
             - Database: {}\n\
             - Config: {}\n\
             - Listen port: {}\n\
             - Share links: {}",
            state.vanish_dir.display(),
            state.db_path.display(),
            state.config_path.display(),
            state.config.listen_port,
            state
                .config
                .base_url
                .clone()
                .unwrap_or_else(|| format!("http://localhost:{}", state.config.listen_port)),
        );

        Ok(output)
    }
}
