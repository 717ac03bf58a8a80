use clap::Args;

use vanish_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

async fn probe(ctx: &crate::cli::op::OpContext, path: &str) -> String {
    let base = ctx.client.base_url();
    let url = format!("{}/_status/{}", base.as_str().trim_end_matches('/'), path);

    match ctx.client.http_client().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => "OK".to_string(),
        Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
        Err(_) => "NOT REACHABLE".to_string(),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.vanish_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                let db_status = if state.db_path.exists() {
                    "OK"
                } else {
                    "not created yet"
                };
                lines.push(format!("  db.sqlite:    {}", db_status));
                lines.push(format!("  listen_port:  {}", state.config.listen_port));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", ctx.client.base_url()));
        lines.push(format!("  livez:  {}", probe(ctx, "livez").await));
        lines.push(format!("  readyz: {}", probe(ctx, "readyz").await));

        Ok(lines.join("\n"))
    }
}
