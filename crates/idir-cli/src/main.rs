use anyhow::Result;
use tracing_subscriber::EnvFilter;

use idir_cli::cli::{Cli, Command};
use idir_cli::context::Context;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::init();
    let ctx = Context::from_cli(&cli).await?;

    match cli.command {
        Command::Members(cmd) => cmd.run(&ctx).await,
        Command::Payments(cmd) => cmd.run(&ctx).await,
        Command::Posts(cmd) => cmd.run(&ctx).await,
        Command::Forms(cmd) => cmd.run(&ctx).await,
        Command::Obituaries(cmd) => cmd.run(&ctx).await,
        Command::Board(cmd) => cmd.run(&ctx).await,
        Command::Admins(cmd) => cmd.run(&ctx).await,
        Command::Register(cmd) => cmd.run(&ctx).await,
    }?;

    Ok(())
}
