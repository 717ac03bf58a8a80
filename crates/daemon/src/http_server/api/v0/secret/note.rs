use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{parse_id, SecretApiError};
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone)]
pub struct NoteRequest {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub text: String,
    pub has_attachment: bool,
    pub destructive: bool,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, SecretApiError> {
    let id = parse_id(&id)?;
    let note = state.vault().fetch_note(&id).await?;

    Ok(Json(NoteResponse {
        text: note.text_lossy().into_owned(),
        has_attachment: note.has_attachment,
        destructive: note.destructive,
    }))
}

impl ApiRequest for NoteRequest {
    type Response = NoteResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join(&format!("/api/v0/secret/{}", self.id))?;
        Ok(client.get(full_url))
    }
}
