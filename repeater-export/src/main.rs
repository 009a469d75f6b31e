use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use repeater_export::config::{DEFAULT_CONFIG_PATH, ExportConfig};
use repeater_export::pipeline;

/// Build radio channel and zone tables from the repeater directory
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for channels.csv and zones.csv (overrides the config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = ExportConfig::from_file(&cli.config)?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    // Initialize logging
    let _logging_guard = repeater_export::logging::init_logging(
        "logs",
        "repeater-export",
        &config.log_level,
    )?;

    tracing::info!(
        "Exporting {} zones for {} from the {} directory",
        config.zones.len(),
        config.country,
        config.data_source
    );

    let outcome = pipeline::export(&config).await?;
    let (channels_path, zones_path) = pipeline::write_outputs(&config, &outcome)?;
    outcome.report.log();

    tracing::info!(
        "Generated {} and {} successfully.",
        zones_path.display(),
        channels_path.display()
    );

    Ok(())
}
