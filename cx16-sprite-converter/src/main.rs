use std::path::PathBuf;

use clap::Parser;
use cx16_sprite_converter::{ConverterConfig, convert_sprite};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Convert an indexed png into a 4bpp bitmap and palette for the Commander X16
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Indexed png to convert, defaults to dragonsprite.png
    #[arg(conflicts_with = "config")]
    input: Option<PathBuf>,

    /// Read the input and output paths from a toml file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the packed bitmap
    #[arg(long)]
    bitmap: Option<PathBuf>,

    /// Where to write the packed palette
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn converter_config(&self) -> anyhow::Result<ConverterConfig> {
        let mut config = match (&self.config, &self.input) {
            (Some(config), _) => ConverterConfig::from_toml_file(config)?,
            (None, Some(input)) => ConverterConfig::with_input(input),
            (None, None) => ConverterConfig::default(),
        };

        if let Some(bitmap) = &self.bitmap {
            config.bitmap_output = bitmap.clone();
        }
        if let Some(palette) = &self.palette {
            config.palette_output = palette.clone();
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={level}", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let config = args.converter_config()?;
    tracing::debug!(?config, "Using configuration");

    let sprite = convert_sprite(&config)?;
    tracing::info!(
        bitmap = sprite.bitmap().len(),
        palette = sprite.palette().len(),
        "Converted sprite"
    );

    Ok(())
}
