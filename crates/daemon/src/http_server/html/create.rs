use std::time::Duration;

use askama::Template;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use tracing::instrument;

use common::prelude::{Attachment, SecretId};

use super::PageError;
use crate::ServiceState;

/// Form value of the `ttl` field that selects burn-after-read
pub const UNTIL_READ: &str = "untilRead";

#[derive(Debug, Clone)]
pub struct ShareLink {
    pub label: &'static str,
    pub href: String,
}

#[derive(Template)]
#[template(path = "share.html")]
pub struct ShareTemplate {
    pub note_url: String,
    pub destructive: bool,
    pub expires_in: String,
    pub share_links: Vec<ShareLink>,
}

/// Links for handing the note URL to common messengers, in display order
pub fn share_links(note_url: &str) -> Vec<ShareLink> {
    vec![
        ShareLink {
            label: "Share via Email",
            href: format!("mailto:?subject=Secure%20Link&body={}", note_url),
        },
        ShareLink {
            label: "Share via Facebook",
            href: format!("https://www.facebook.com/sharer/sharer.php?u={}", note_url),
        },
        ShareLink {
            label: "Share via Twitter",
            href: format!(
                "https://twitter.com/intent/tweet?url={}&text=Secure%20Link",
                note_url
            ),
        },
        ShareLink {
            label: "Share via WhatsApp",
            href: format!(
                "https://api.whatsapp.com/send?text=Secure%20Link:%20{}",
                note_url
            ),
        },
        ShareLink {
            label: "Share via Telegram",
            href: format!("https://t.me/share/url?url={}&text=Secure%20Link", note_url),
        },
    ]
}

fn describe(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    let (count, unit) = if secs >= 86_400 && secs % 86_400 == 0 {
        (secs / 86_400, "day")
    } else if secs >= 3600 {
        (secs / 3600, "hour")
    } else {
        ((secs / 60).max(1), "minute")
    };

    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

#[derive(Debug, Default)]
struct CreateForm {
    message: String,
    attachment: Option<Attachment>,
    destructive: bool,
}

async fn read_form(multipart: &mut Multipart) -> Result<CreateForm, PageError> {
    let mut form = CreateForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Multipart parsing error: {}", e);
        PageError::InvalidForm
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "message" => {
                form.message = field.text().await.map_err(|e| {
                    tracing::warn!("Error reading message field: {}", e);
                    PageError::InvalidForm
                })?;
            }
            "ttl" => {
                let ttl = field.text().await.map_err(|e| {
                    tracing::warn!("Error reading ttl field: {}", e);
                    PageError::InvalidForm
                })?;
                form.destructive = ttl == UNTIL_READ;
            }
            "fileInput" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content = field.bytes().await.map_err(|e| {
                    tracing::warn!("Error reading file data for {}: {}", filename, e);
                    PageError::InvalidForm
                })?;

                // browsers submit an empty, unnamed part when no file was picked
                if filename.is_empty() && content.is_empty() {
                    continue;
                }
                form.attachment = Some(Attachment::new(filename, content.to_vec()));
            }
            _ => {
                tracing::debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

#[instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, PageError> {
    let form = read_form(&mut multipart).await?;
    let destructive = form.destructive;

    let id: SecretId = state
        .vault()
        .create_secret(form.message, form.attachment, destructive)
        .await?;

    let note_url = state.share_url(&id);
    tracing::info!(id = %id, destructive, "secret created from form");

    Ok(ShareTemplate {
        share_links: share_links(&note_url),
        expires_in: describe(state.vault().config().ttl_for(destructive)),
        note_url,
        destructive,
    })
}
