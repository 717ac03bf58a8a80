use axum::extract::{Json, State};
use axum::response::IntoResponse;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::Attachment;

use super::SecretApiError;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePayload {
    pub filename: String,
    /// Standard base64 of the file bytes
    pub content: String,
}

impl FilePayload {
    pub fn new(filename: impl Into<String>, content: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content: STANDARD.encode(content),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FilePayload>,
    /// Burn the secret on its first read
    #[serde(default)]
    pub destructive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub id: String,
    pub url: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, SecretApiError> {
    let attachment = match req.file {
        Some(file) => {
            let content = STANDARD.decode(file.content.as_bytes()).map_err(|e| {
                tracing::warn!("CREATE SECRET: undecodable file content: {}", e);
                SecretApiError::InvalidRequest("file content must be base64".into())
            })?;
            Some(Attachment::new(file.filename, content))
        }
        None => None,
    };

    let id = state
        .vault()
        .create_secret(req.text, attachment, req.destructive)
        .await?;
    let url = state.share_url(&id);

    tracing::info!(id = %id, destructive = req.destructive, "CREATE SECRET: created");

    Ok((
        http::StatusCode::CREATED,
        Json(CreateResponse {
            id: id.to_string(),
            url,
        }),
    ))
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateRequest {
    type Response = CreateResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/secret")?;
        Ok(client.post(full_url).json(&self))
    }
}
