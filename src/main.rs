use clap::Parser;
use merchant_console_lib::bootstrap::{self, tracing::init_tracing_subscriber};
use merchant_console_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::resolve_config(cli.config)?;
    if let Err(err) = init_tracing_subscriber(Some(&config.data_dir.join("logs"))) {
        eprintln!("Failed to initialize tracing: {err}");
    }

    let console = bootstrap::wire_console(config)?;
    bootstrap::run_command(&console, cli.command).await
}
