use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use common::prelude::{SecretId, VaultError};

pub mod create;
pub mod file;
pub mod note;

pub use create::{CreateRequest, CreateResponse, FilePayload};
pub use file::{FileRequest, FileResponse};
pub use note::{NoteRequest, NoteResponse};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(create::handler))
        .route("/:id", get(note::handler))
        .route("/:id/file", get(file::handler))
        .with_state(state)
}

/// Parse an id from the path. Malformed ids name no secret.
fn parse_id(raw: &str) -> Result<SecretId, SecretApiError> {
    raw.parse().map_err(|_| SecretApiError::Vault(VaultError::NotFound))
}

#[derive(Debug, thiserror::Error)]
pub enum SecretApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl IntoResponse for SecretApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            SecretApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SecretApiError::Vault(VaultError::ValidationFailed(_)) => StatusCode::BAD_REQUEST,
            SecretApiError::Vault(VaultError::NotFound) => StatusCode::NOT_FOUND,
            SecretApiError::Vault(VaultError::StoreWriteFailed(_))
            | SecretApiError::Vault(VaultError::StoreDeleteFailed(_)) => {
                tracing::error!("SECRET API ERROR: {:?}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let msg = match &self {
            SecretApiError::Vault(VaultError::StoreWriteFailed(_)) => {
                "failed to store secret".to_string()
            }
            SecretApiError::Vault(VaultError::StoreDeleteFailed(_)) => {
                "failed to destroy secret after read".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "msg": msg }))).into_response()
    }
}
