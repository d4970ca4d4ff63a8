use clap::Parser;
use std::path::PathBuf;

/// Prometheus exporter for Selenium Grid clusters
#[derive(Parser, Debug)]
#[command(name = "grid-exporter", version)]
#[command(about = "Export metrics from a Selenium Grid hub", long_about = None)]
pub struct Cli {
    /// Port the exporter will listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Full base URL of the remote Grid hub to export metrics from
    #[arg(long)]
    pub hub: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
