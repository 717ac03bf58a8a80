use std::path::PathBuf;
use std::time::Duration;

use common::prelude::VaultConfig;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the HTTP server (UI + API combined)
    pub listen_port: u16,
    /// Public URL share links are built on,
    ///  if not set then http://localhost:<listen_port> will be used
    pub base_url: Option<Url>,
    /// Largest note plus attachment accepted over HTTP
    pub max_upload_bytes: usize,

    // data store configuration
    /// a sqlite URL (`sqlite://<path>`), if not set then an
    ///  in-memory database will be used
    pub database_url: Option<Url>,
    /// How often expired secrets are swept out of the store
    pub purge_interval: Duration,

    // secret lifecycle
    pub vault: VaultConfig,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Base URL share links are built on
    pub fn public_url(&self) -> Result<Url, url::ParseError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(&format!("http://localhost:{}", self.listen_port)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: Option<Url>) -> Config {
        Config {
            listen_port: 3000,
            base_url,
            max_upload_bytes: 1024,
            database_url: None,
            purge_interval: Duration::from_secs(60),
            vault: VaultConfig::default(),
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }

    #[test]
    fn test_public_url_defaults_to_localhost() {
        assert_eq!(
            config(None).public_url().unwrap().as_str(),
            "http://localhost:3000/"
        );
    }

    #[test]
    fn test_public_url_override() {
        let url = Url::parse("https://vanish.example.com").unwrap();
        assert_eq!(config(Some(url.clone())).public_url().unwrap(), url);
    }
}
