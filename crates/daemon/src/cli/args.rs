pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "vanish")]
#[command(about = "Share notes and files that destroy themselves")]
#[command(version)]
pub struct Args {
    /// Daemon URL (defaults to localhost on the configured port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the vanish config directory (defaults to ~/.vanish)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
