use clap::Parser;
use tracing_subscriber::EnvFilter;

use lodestar_cli::{chat, eval, index, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Chat(args) => chat::run(args).await,
        Command::Index(args) => index::run(args).await,
        Command::Eval(args) => eval::run(args).await,
    }
}
