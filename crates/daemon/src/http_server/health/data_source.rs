use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use http::request::Parts;

use common::prelude::SecretStore;
use secret_store::SqliteStore;

use crate::ServiceState;

#[async_trait]
pub trait DataSource {
    /// Perform various checks on the system to ensure its healthy and ready to accept requests.
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("one or more dependent services aren't available")]
    DependencyFailure,

    #[error("service has received signal indicating it should shutdown")]
    ShuttingDown,
}

pub type DynDataSource = Arc<dyn DataSource + Send + Sync>;

pub struct StateDataSource(DynDataSource);

impl Debug for StateDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDataSource").finish()
    }
}

impl StateDataSource {
    #[cfg(test)]
    pub fn new(dds: DynDataSource) -> Self {
        Self(dds)
    }
}

impl Deref for StateDataSource {
    type Target = DynDataSource;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

struct StoreSource {
    store: SqliteStore,
    shutting_down: bool,
}

#[async_trait]
impl DataSource for StoreSource {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        if self.shutting_down {
            return Err(DataSourceError::ShuttingDown);
        }

        self.store.ping().await.map_err(|e| {
            tracing::warn!("secret store not reachable: {}", e);
            DataSourceError::DependencyFailure
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StateDataSource
where
    ServiceState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ();

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = ServiceState::from_ref(state);
        Ok(StateDataSource(Arc::new(StoreSource {
            store: state.vault().store().clone(),
            shutting_down: state.is_shutting_down(),
        })))
    }
}
