use clap::Parser;
use tracing::info;

use grid_exporter::cli::Cli;
use grid_exporter::config::Config;
use grid_exporter::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config)?;

    // CLI flags take priority over file and environment values
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(hub) = cli.hub {
        config.hub.url = hub;
    }
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        hub = %config.hub.base_url(),
        "starting grid-exporter"
    );

    server::run(config).await?;

    Ok(())
}
