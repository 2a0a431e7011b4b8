use clap::Parser;
use kb_ingest::cli::{self, Cli};
use kb_ingest::infrastructure::logging;
use kb_ingest::{create_ingestion_stack, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let cli = Cli::parse();
    let stack = create_ingestion_stack(&config)?;

    stack.browser.spawn_shutdown_hook();

    let result = cli::run(&stack, cli.command).await;

    // Close the shared browser before exiting so no Chromium process is
    // orphaned.
    stack.browser.shutdown().await;

    result
}
