use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use common::prelude::{SecretId, VaultError};

use super::PageError;
use crate::ServiceState;

#[instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let id: SecretId = id.parse().map_err(|_| VaultError::NotFound)?;

    let file = state.vault().fetch_file(&id).await?;
    let mime_type = mime_guess::from_path(&file.filename)
        .first_or_octet_stream()
        .to_string();

    tracing::info!(
        id = %id,
        size = file.content.len(),
        mime_type = %mime_type,
        "serving attachment"
    );

    let disposition = content_disposition(&file.filename);
    let content_type = HeaderValue::from_str(&mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(file.content),
    )
        .into_response())
}

/// `attachment` disposition carrying an ASCII fallback name and the
///  exact UTF-8 name as an RFC 5987 extended parameter.
pub fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                if c == '"' || c == '\\' {
                    '_'
                } else {
                    c
                }
            } else {
                '_'
            }
        })
        .collect();

    let value = if fallback == filename {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(filename)
        )
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_filename_is_quoted() {
        assert_eq!(
            content_disposition("report final.pdf"),
            "attachment; filename=\"report final.pdf\""
        );
    }

    #[test]
    fn test_unicode_filename_gets_extended_parameter() {
        assert_eq!(
            content_disposition("résumé.pdf"),
            "attachment; filename=\"r_sum_.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
        );
    }

    #[test]
    fn test_extended_parameter_encodes_spaces() {
        assert_eq!(
            content_disposition("mé 1.txt"),
            "attachment; filename=\"m_ 1.txt\"; filename*=UTF-8''m%C3%A9%201.txt"
        );
    }
}
