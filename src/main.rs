use clap::Parser;
use std::path::PathBuf;

use dotmap::{config::AppConfig, data};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::load_from_file(&cli.config)?;
    let markers = data::load_markers(&config.input.markers_file)?;
    tracing::info!(
        count = markers.len(),
        endpoint = %config.server.endpoint,
        "loaded marker records"
    );

    dotmap::run(config, markers).map_err(|e| anyhow::anyhow!("failed to start UI: {e}"))
}
