// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Create, Daemon, Health, Init, Read, Version};

command_enum! {
    (Create, Create),
    (Daemon, Daemon),
    (Health, Health),
    (Init, Init),
    (Read, Read),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let remote = match cli::op::resolve_remote(args.remote, args.config_path.clone()) {
        Ok(remote) => remote,
        Err(e) => {
            eprintln!("Error: invalid remote URL: {}", e);
            std::process::exit(1);
        }
    };

    // Build context - always has API client initialized
    let ctx = match cli::op::OpContext::new(remote, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
