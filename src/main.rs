use anyhow::Context;
use clap::Parser;
use lasertrace::{convert_file, init_logging, Config, BUILD_DATE, VERSION};
use std::path::PathBuf;
use tracing::{info, warn};

/// Convert SVG line art into laser cutter G-code.
///
/// Red paths are cut, all other paths are drawn at drawing power.
#[derive(Debug, Parser)]
#[command(name = "lasertrace", version, about)]
struct Cli {
    /// SVG file to convert
    #[arg(short, long)]
    input: PathBuf,

    /// G-code file to write; defaults to the input with a `.gcode` extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (.toml or .json); defaults to the user config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hatch filled areas
    #[arg(long)]
    hatch: bool,

    /// Draw elements hidden through visibility or opacity
    #[arg(long)]
    draw_hidden: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;
    info!("lasertrace {} (built {})", VERSION, BUILD_DATE);

    let mut config = Config::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    config.hatch.enabled |= cli.hatch;
    config.document.draw_hidden |= cli.draw_hidden;

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("gcode"));
    let warnings = convert_file(&cli.input, &output, &config)?;

    if !warnings.is_empty() {
        warn!("Finished with {} warning(s)", warnings.len());
        for warning in &warnings {
            warn!("  {}", warning);
        }
    }
    Ok(())
}
