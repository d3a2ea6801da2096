use anyhow::Context;
use chat_ox_demo::{Cli, run};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = cli.client().context("failed to configure chat client")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&client, &cli, &mut out).await?;

    Ok(())
}
