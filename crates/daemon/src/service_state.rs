use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use url::Url;

use common::prelude::*;
use secret_store::{SqliteStore, SqliteStoreError};

use crate::service_config::Config;

/// Shared handle passed to every request handler.
#[derive(Clone)]
pub struct State {
    vault: Vault<SqliteStore>,
    public_url: Url,
    max_upload_bytes: usize,
    shutting_down: Arc<AtomicBool>,
}

impl State {
    pub fn new(vault: Vault<SqliteStore>, public_url: Url, max_upload_bytes: usize) -> Self {
        Self {
            vault,
            public_url,
            max_upload_bytes,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let store = match &config.database_url {
            Some(url) => {
                tracing::info!("opening secret database at {}", url);
                SqliteStore::connect(url).await?
            }
            None => {
                tracing::warn!("no database configured, secrets are held in memory");
                SqliteStore::in_memory().await?
            }
        };

        let public_url = config.public_url()?;
        tracing::info!(public_url = %public_url, "share links will use this base");

        let vault = Vault::new(store, config.vault.clone());
        Ok(Self::new(vault, public_url, config.max_upload_bytes))
    }

    pub fn vault(&self) -> &Vault<SqliteStore> {
        &self.vault
    }

    pub fn public_url(&self) -> &Url {
        &self.public_url
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Link a recipient opens to read the secret
    pub fn share_url(&self, id: &SecretId) -> String {
        format!(
            "{}/{}",
            self.public_url.as_str().trim_end_matches('/'),
            id
        )
    }

    pub fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("public_url", &self.public_url.as_str())
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("secret database error: {0}")]
    Database(#[from] SqliteStoreError),
    #[error("invalid public url: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_share_url_has_single_separator() {
        let store = SqliteStore::in_memory().await.unwrap();
        let vault = Vault::new(store, VaultConfig::default());
        let state = State::new(
            vault,
            Url::parse("https://vanish.example.com/").unwrap(),
            1024,
        );

        let id = SecretId::generate();
        assert_eq!(
            state.share_url(&id),
            format!("https://vanish.example.com/{}", id)
        );
    }

    #[tokio::test]
    async fn test_shutdown_flag() {
        let store = SqliteStore::in_memory().await.unwrap();
        let state = State::new(
            Vault::new(store, VaultConfig::default()),
            Url::parse("http://localhost:3000").unwrap(),
            1024,
        );
        let other = state.clone();

        assert!(!other.is_shutting_down());
        state.begin_shutdown();
        assert!(other.is_shutting_down());
    }
}
