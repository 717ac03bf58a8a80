/**
 * Secret payload types and the identifiers
 *  they are stored under.
 * A secret is either a text note or the single
 *  file attached to one.
 */
pub mod secret;
/**
 * The ephemeral key/value contract the rest of
 *  the system is written against, plus an
 *  in-process implementation.
 */
pub mod store;
/**
 * Lifecycle of a secret: keying, writing with
 *  a TTL, and read-once enforcement.
 */
pub mod vault;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::secret::{File, Note, Secret, SecretId, SecretKind, FILE_KEY_PREFIX};
    pub use crate::store::{MemoryStore, SecretStore, StoreError};
    pub use crate::vault::{Attachment, Vault, VaultConfig, VaultError};
    pub use crate::version::{build_info, BuildInfo};
}
