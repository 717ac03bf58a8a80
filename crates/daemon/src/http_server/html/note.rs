use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use common::prelude::{SecretId, VaultError};

use super::PageError;
use crate::ServiceState;

#[derive(Template)]
#[template(path = "note.html")]
pub struct NoteTemplate {
    pub text: String,
    pub destructive: bool,
    pub download_url: Option<String>,
}

#[instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    // anything that isn't an id can't name a secret
    let id: SecretId = id.parse().map_err(|_| VaultError::NotFound)?;

    let note = state.vault().fetch_note(&id).await?;

    let download_url = note
        .has_attachment
        .then(|| format!("/download/{}", id));

    Ok(NoteTemplate {
        text: note.text_lossy().into_owned(),
        destructive: note.destructive,
        download_url,
    }
    .into_response())
}
