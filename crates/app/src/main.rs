//! Scrim - headless entry point

use clap::Parser;
use scrim::cli::{Cli, Command, load_config, run_render};
use scrim::logging::init_logging;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    init_logging(level)?;

    let config = load_config(cli.config.as_ref())?;
    match cli.command {
        Command::Render(args) => {
            let out = args.out.clone();
            let bytes = run_render(config, args).await?;
            info!("Done: {} bytes written to {}", bytes.len(), out.display());
        }
    }
    Ok(())
}
