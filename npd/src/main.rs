use anyhow::Result;
use clap::Parser;

use npd::cli::Cli;
use npd::logging::init_logging;
use npd::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = init_logging(cli.verbose)?;
    tracing::info!(log = %log_path.display(), "npd starting");

    let settings = Settings::new().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("\nCreate npd.toml (or point NPD_CONFIG at one), for example:");
        eprintln!("\n[client]");
        eprintln!("default_inn = \"123456789012\"");
        anyhow::anyhow!(e)
    })?;
    settings.validate().map_err(|e| {
        eprintln!("Configuration validation failed: {}", e);
        anyhow::anyhow!(e)
    })?;

    npd::run(cli, settings).await
}
