use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use vanish_daemon::http_server::api::client::ApiError;
use vanish_daemon::http_server::api::v0::secret::{CreateRequest, FilePayload};

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Note text (read from stdin if not given)
    #[arg(long)]
    pub text: Option<String>,

    /// File to attach to the note
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Destroy the secret the first time it is read
    #[arg(long)]
    pub burn: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to read {0}: {1}")]
    Read(String, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let text = match &self.text {
            Some(text) => text.clone(),
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| CreateError::Read("stdin".to_string(), e))?;
                buf
            }
        };

        let file = match &self.file {
            Some(path) => {
                let content = tokio::fs::read(path)
                    .await
                    .map_err(|e| CreateError::Read(path.display().to_string(), e))?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                Some(FilePayload::new(filename, &content))
            }
            None => None,
        };

        let response = ctx
            .client
            .call(CreateRequest {
                text,
                file,
                destructive: self.burn,
            })
            .await?;

        Ok(response.url)
    }
}
