use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{parse_id, SecretApiError};
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone)]
pub struct FileRequest {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    pub filename: String,
    /// Standard base64 of the file bytes
    pub content: String,
    pub size: usize,
    pub mime_type: String,
}

impl FileResponse {
    pub fn decode_content(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.content.as_bytes())
    }
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, SecretApiError> {
    let id = parse_id(&id)?;
    let file = state.vault().fetch_file(&id).await?;

    let mime_type = mime_guess::from_path(&file.filename)
        .first_or_octet_stream()
        .to_string();

    Ok(Json(FileResponse {
        size: file.content.len(),
        content: STANDARD.encode(&file.content),
        filename: file.filename,
        mime_type,
    }))
}

impl ApiRequest for FileRequest {
    type Response = FileResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join(&format!("/api/v0/secret/{}/file", self.id))?;
        Ok(client.get(full_url))
    }
}
