//! SQLite Secret Store
//!
//! This crate provides a [`common::store::SecretStore`] implementation backed
//! by SQLite, for deployments that want secrets to survive a restart.
//!
//! # Features
//!
//! - Per-key expiry, enforced on every read (expired rows are never returned)
//! - Atomic take via `DELETE ... RETURNING`, so a destructive secret can only
//!   ever be handed to one reader
//! - File-backed (WAL) or in-memory databases
//!
//! # Example
//!
//! ```rust,no_run
//! use common::prelude::{Vault, VaultConfig};
//! use secret_store::SqliteStore;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), secret_store::SqliteStoreError> {
//! let store = SqliteStore::new(Path::new("/tmp/vanish.sqlite")).await?;
//! let _vault = Vault::new(store, VaultConfig::default());
//! # Ok(())
//! # }
//! ```

mod database;
mod error;

pub use database::SqliteStore;
pub use error::{Result, SqliteStoreError};
