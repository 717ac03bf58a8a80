use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use clap::Args;

use vanish_daemon::http_server::api::client::ApiError;
use vanish_daemon::http_server::api::v0::secret::{FileRequest, NoteRequest};

#[derive(Args, Debug, Clone)]
pub struct Read {
    /// Secret id, or the full share link
    pub id: String,

    /// Directory to save the attachment into (skipped if not set)
    #[arg(long)]
    pub download: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("secret not found (it may have expired or already been read)")]
    NotFound,
    #[error("API error: {0}")]
    Api(ApiError),
    #[error("attachment content is corrupt: {0}")]
    Corrupt(#[from] base64::DecodeError),
    #[error("failed to write {0}: {1}")]
    Write(String, std::io::Error),
}

impl From<ApiError> for ReadError {
    fn from(e: ApiError) -> Self {
        if e.is_not_found() {
            ReadError::NotFound
        } else {
            ReadError::Api(e)
        }
    }
}

/// Accept either a bare id or a share link ending in one
fn id_from_arg(arg: &str) -> String {
    arg.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Final component of a server-supplied filename, so the write stays in `dir`
fn download_path(dir: &Path, filename: &str) -> PathBuf {
    let name = Path::new(filename)
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| OsStr::new("unnamed"));
    dir.join(name)
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Read {
    type Error = ReadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let id = id_from_arg(&self.id);
        let note = ctx.client.call(NoteRequest { id: id.clone() }).await?;

        let mut lines = vec![note.text];

        if note.has_attachment {
            match &self.download {
                Some(dir) => {
                    let file = ctx.client.call(FileRequest { id }).await?;
                    let content = file.decode_content()?;
                    let path = download_path(dir, &file.filename);
                    tokio::fs::write(&path, &content)
                        .await
                        .map_err(|e| ReadError::Write(path.display().to_string(), e))?;
                    lines.push(format!(
                        "[attachment saved: {} ({} bytes, {})]",
                        path.display(),
                        file.size,
                        file.mime_type
                    ));
                }
                None => {
                    lines.push("[note has an attachment, pass --download <dir> to save it]".into())
                }
            }
        }

        if note.destructive {
            lines.push("[this note has now been destroyed]".to_string());
        }

        Ok(lines.join("\n"))
    }
}
