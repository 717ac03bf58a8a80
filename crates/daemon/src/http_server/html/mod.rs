use askama::Template;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use common::prelude::VaultError;

use crate::http_server::handlers::not_found_page;
use crate::ServiceState;

mod create;
mod download;
mod index;
mod note;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(index::handler).post(create::handler))
        .route("/:id", get(note::handler))
        .route("/download/:id", get(download::handler))
        .with_state(state)
}

/// Generic page with a title and a single escaped message
#[derive(Template)]
#[template(path = "message.html")]
pub struct MessageTemplate {
    pub title: String,
    pub message: String,
}

impl MessageTemplate {
    pub fn plain(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Failures surfaced to a browser
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Invalid form data posted.")]
    InvalidForm,
    #[error("{0}")]
    Vault(#[from] VaultError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = match &self {
            PageError::InvalidForm => StatusCode::BAD_REQUEST,
            PageError::Vault(VaultError::NotFound) => return not_found_page(),
            PageError::Vault(VaultError::ValidationFailed(_)) => StatusCode::BAD_REQUEST,
            PageError::Vault(VaultError::StoreWriteFailed(_))
            | PageError::Vault(VaultError::StoreDeleteFailed(_)) => {
                tracing::error!("page request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            // store details stay in the logs
            PageError::Vault(VaultError::StoreWriteFailed(_)) => {
                "The secret could not be saved. Please try again.".to_string()
            }
            PageError::Vault(VaultError::StoreDeleteFailed(_)) => {
                "The secret could not be destroyed, so it will not be shown.".to_string()
            }
            other => other.to_string(),
        };

        (status, MessageTemplate::plain("", message)).into_response()
    }
}
