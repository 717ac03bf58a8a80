use std::time::Duration;

use tokio::time::timeout;

use crate::secret::{File, Note, Secret, SecretId, SecretKind};
use crate::store::{SecretStore, StoreError};

/// Retention of a secret that is not burned on read
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24);
/// Safety net for burn-after-read secrets. The real expiry is the first read.
pub const DESTRUCTIVE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365);
/// Upper bound on any single store call
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub default_ttl: Duration,
    pub destructive_ttl: Duration,
    pub operation_timeout: Duration,
    /// Combined size limit for note text plus attachment,
    ///  unlimited if not set
    pub max_secret_bytes: Option<usize>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            destructive_ttl: DESTRUCTIVE_TTL,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            max_secret_bytes: None,
        }
    }
}

impl VaultConfig {
    pub fn ttl_for(&self, destructive: bool) -> Duration {
        if destructive {
            self.destructive_ttl
        } else {
            self.default_ttl
        }
    }
}

/// A file submitted together with a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("invalid secret: {0}")]
    ValidationFailed(String),
    /// Absent, expired, already burned or unreadable. Callers
    ///  are never told which.
    #[error("secret not found")]
    NotFound,
    #[error("failed to store secret: {0}")]
    StoreWriteFailed(String),
    /// The secret was read but could not be destroyed, so the
    ///  read must not be trusted
    #[error("failed to destroy secret after read: {0}")]
    StoreDeleteFailed(String),
}

/// Creates secrets and hands them back out, burning destructive
///  ones on their first read.
///
/// Cheap to clone; every clone shares the same store handle.
#[derive(Debug, Clone)]
pub struct Vault<S: SecretStore> {
    store: S,
    config: VaultConfig,
}

impl<S: SecretStore> Vault<S> {
    pub fn new(store: S, config: VaultConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Store a new note, and its attachment if there is one
    ///
    /// The attachment is written first under the `file_` key so a
    ///  note never advertises an attachment that failed to store. If
    ///  the note write fails after that, the attachment is left to
    ///  expire with its TTL.
    ///
    /// # Returns
    /// * `Ok(SecretId)` - The id to share
    /// * `Err(VaultError::ValidationFailed)` - The payload is over the size limit
    /// * `Err(VaultError::StoreWriteFailed)` - Either write failed
    pub async fn create_secret(
        &self,
        text: impl Into<Vec<u8>>,
        attachment: Option<Attachment>,
        destructive: bool,
    ) -> Result<SecretId, VaultError> {
        let text = text.into();
        self.validate(&text, attachment.as_ref())?;

        let ttl = self.config.ttl_for(destructive);
        let id = SecretId::generate();
        let has_attachment = attachment.is_some();

        if let Some(attachment) = attachment {
            let file = File::new(attachment.content, &attachment.filename, destructive);
            self.write(&id.file_key(), &file.into(), ttl).await?;
        }

        let note = Note::new(text, has_attachment, destructive);
        self.write(&id.note_key(), &note.into(), ttl).await?;

        tracing::debug!(
            id = %id,
            destructive,
            has_attachment,
            ttl_secs = ttl.as_secs(),
            "secret created"
        );
        Ok(id)
    }

    /// Read whatever is stored under a raw key, burning it if it is
    ///  destructive
    pub async fn retrieve(&self, key: &str) -> Result<Secret, VaultError> {
        self.retrieve_checked(key, None).await
    }

    pub async fn fetch_note(&self, id: &SecretId) -> Result<Note, VaultError> {
        self.retrieve_checked(&id.note_key(), Some(SecretKind::Note))
            .await?
            .into_note()
            .ok_or(VaultError::NotFound)
    }

    pub async fn fetch_file(&self, id: &SecretId) -> Result<File, VaultError> {
        self.retrieve_checked(&id.file_key(), Some(SecretKind::File))
            .await?
            .into_file()
            .ok_or(VaultError::NotFound)
    }

    fn validate(&self, text: &[u8], attachment: Option<&Attachment>) -> Result<(), VaultError> {
        let Some(limit) = self.config.max_secret_bytes else {
            return Ok(());
        };

        let size = text.len() + attachment.map_or(0, |a| a.content.len());
        if size > limit {
            return Err(VaultError::ValidationFailed(format!(
                "secret is {} bytes, the limit is {} bytes",
                size, limit
            )));
        }
        Ok(())
    }

    async fn write(&self, key: &str, secret: &Secret, ttl: Duration) -> Result<(), VaultError> {
        let value = secret
            .encode()
            .map_err(|e| VaultError::StoreWriteFailed(e.to_string()))?;

        match timeout(self.config.operation_timeout, self.store.set(key, value, ttl)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(VaultError::StoreWriteFailed(e.to_string())),
            Err(_) => Err(VaultError::StoreWriteFailed(format!(
                "store write timed out after {:?}",
                self.config.operation_timeout
            ))),
        }
    }

    async fn retrieve_checked(
        &self,
        key: &str,
        expected: Option<SecretKind>,
    ) -> Result<Secret, VaultError> {
        let bytes = match timeout(self.config.operation_timeout, self.store.get(key)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(StoreError::NotFound(_))) => return Err(VaultError::NotFound),
            Ok(Err(e)) => {
                tracing::warn!(key, error = %e, "store read failed, reporting not found");
                return Err(VaultError::NotFound);
            }
            Err(_) => {
                tracing::warn!(key, "store read timed out, reporting not found");
                return Err(VaultError::NotFound);
            }
        };

        let secret = Secret::decode(&bytes).map_err(|e| {
            tracing::warn!(key, error = %e, "undecodable entry, reporting not found");
            VaultError::NotFound
        })?;

        // never burn an entry the caller did not ask for
        if let Some(expected) = expected {
            if secret.kind() != expected {
                return Err(VaultError::NotFound);
            }
        }

        if !secret.is_destructive() {
            return Ok(secret);
        }

        self.burn(key).await
    }

    /// Atomically remove a destructive entry. Only the caller whose
    ///  take actually removed the entry gets the secret back.
    async fn burn(&self, key: &str) -> Result<Secret, VaultError> {
        let bytes = match timeout(self.config.operation_timeout, self.store.take(key)).await {
            Ok(Ok(bytes)) => bytes,
            // another reader got there first
            Ok(Err(StoreError::NotFound(_))) => return Err(VaultError::NotFound),
            Ok(Err(e)) => return Err(VaultError::StoreDeleteFailed(e.to_string())),
            Err(_) => {
                return Err(VaultError::StoreDeleteFailed(format!(
                    "store delete timed out after {:?}",
                    self.config.operation_timeout
                )))
            }
        };

        tracing::debug!(key, "destructive secret burned");
        Secret::decode(&bytes).map_err(|_| VaultError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn vault() -> Vault<MemoryStore> {
        Vault::new(MemoryStore::new(), VaultConfig::default())
    }

    #[test]
    fn test_ttl_for() {
        let config = VaultConfig::default();
        assert_eq!(config.ttl_for(false), Duration::from_secs(86_400));
        assert_eq!(config.ttl_for(true), Duration::from_secs(86_400 * 365));
    }

    #[tokio::test]
    async fn test_create_writes_note_and_file_keys() {
        let vault = vault();
        let id = vault
            .create_secret("hi", Some(Attachment::new("a.txt", b"abc".to_vec())), false)
            .await
            .unwrap();

        assert_eq!(vault.store().len(), 2);
        assert!(vault.store().get(&id.note_key()).await.is_ok());
        assert!(vault.store().get(&id.file_key()).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_without_file_writes_one_key() {
        let vault = vault();
        let id = vault.create_secret("hi", None, true).await.unwrap();

        assert_eq!(vault.store().len(), 1);
        let note = vault.fetch_note(&id).await.unwrap();
        assert!(!note.has_attachment);
        assert!(note.destructive);
    }

    #[tokio::test]
    async fn test_retrieve_raw_keys() {
        let vault = vault();
        let id = vault
            .create_secret("hi", Some(Attachment::new("a.txt", b"abc".to_vec())), false)
            .await
            .unwrap();

        let note = vault.retrieve(&id.note_key()).await.unwrap();
        assert_eq!(note.kind(), SecretKind::Note);
        let file = vault.retrieve(&format!("file_{}", id)).await.unwrap();
        assert_eq!(file.kind(), SecretKind::File);
    }

    #[tokio::test]
    async fn test_size_limit() {
        let config = VaultConfig {
            max_secret_bytes: Some(8),
            ..VaultConfig::default()
        };
        let vault = Vault::new(MemoryStore::new(), config);

        assert!(vault.create_secret("12345678", None, false).await.is_ok());

        let err = vault
            .create_secret("1234", Some(Attachment::new("f", b"56789".to_vec())), false)
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::ValidationFailed(_)));
        // nothing written on rejection
        assert_eq!(vault.store().len(), 1);
    }

    #[tokio::test]
    async fn test_kind_mismatch_does_not_burn() {
        let vault = vault();
        let id = vault
            .create_secret("hi", Some(Attachment::new("a.txt", b"abc".to_vec())), true)
            .await
            .unwrap();

        // a file key asked for as a note
        let file_as_note = vault
            .retrieve_checked(&id.file_key(), Some(SecretKind::Note))
            .await;
        assert_eq!(file_as_note.unwrap_err(), VaultError::NotFound);

        // still there for the real download
        let file = vault.fetch_file(&id).await.unwrap();
        assert_eq!(file.content, b"abc");
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_not_found() {
        let vault = vault();
        vault
            .store()
            .set("garbage", vec![0xde, 0xad], DEFAULT_TTL)
            .await
            .unwrap();

        assert_eq!(
            vault.retrieve("garbage").await.unwrap_err(),
            VaultError::NotFound
        );
    }
}
