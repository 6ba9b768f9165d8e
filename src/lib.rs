//! # LaserTrace
//!
//! Converts SVG line art into G-code for a laser cutter.
//!
//! ## Architecture
//!
//! LaserTrace is organized as a workspace with multiple crates:
//!
//! 1. **lasertrace-core** - Vectors, affine transforms, errors, warnings, units
//! 2. **lasertrace-designer** - Path data interpreter, curve flattening, SVG traversal
//! 3. **lasertrace-camtools** - Toolpath compiler, G-code encoder, hatch filling
//! 4. **lasertrace-settings** - Configuration files
//! 5. **lasertrace** - Conversion pipeline and command-line binary
//!
//! Red paths (`#ff0000`) are cut, everything else is drawn. Cutting is
//! repeated per pass with the z axis stepped down between passes.

use anyhow::Context;
use std::path::Path;
use tracing::info;

pub use lasertrace_camtools::{
    GcodeEncoder, HatchFiller, HatchOrientation, Instruction, MachineParameters, Program,
    ToolpathCompiler,
};
pub use lasertrace_core::{Error, Result, Transform, Unit, Vector, Warning};
pub use lasertrace_designer::{parse_file, parse_path, DocumentOptions, Flattener, ParsedDocument};
pub use lasertrace_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Honours `RUST_LOG` and falls back to `info`. Logs go to stderr so the
/// G-code can be piped from stdout; `json` switches to one JSON object per
/// event.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

/// Loads the document's curves (and areas when hatching is enabled) into a
/// compiler configured from `config`.
fn prepare(document: &ParsedDocument, config: &Config) -> anyhow::Result<ToolpathCompiler> {
    let mut compiler = ToolpathCompiler::new(config.machine.clone())
        .context("invalid machine parameters")?;
    let flattener = config.flattening.flattener();

    compiler.append_curves(&document.curves, &flattener);
    if config.hatch.enabled {
        compiler.append_areas(&document.areas, &config.hatch.filler(), &flattener);
    }
    Ok(compiler)
}

fn collect_warnings(document: ParsedDocument, compiler: &ToolpathCompiler) -> Vec<Warning> {
    let mut warnings = document.warnings;
    warnings.extend_from_slice(compiler.warnings());
    warnings
}

/// Compiles an already parsed document into G-code text.
///
/// Returns the text together with every warning raised while parsing and
/// compiling.
pub fn convert_document(
    document: ParsedDocument,
    config: &Config,
) -> anyhow::Result<(String, Vec<Warning>)> {
    let mut compiler = prepare(&document, config)?;
    let text = compiler.compile_to_string(&mut config.output.encoder());
    Ok((text, collect_warnings(document, &compiler)))
}

/// Converts the SVG at `input` into G-code written to `output`.
pub fn convert_file(input: &Path, output: &Path, config: &Config) -> anyhow::Result<Vec<Warning>> {
    info!("Converting {} to {}", input.display(), output.display());
    let document = parse_file(input, &config.document.options())
        .with_context(|| format!("failed to read {}", input.display()))?;
    info!(
        curves = document.curves.len(),
        areas = document.areas.len(),
        "Parsed document"
    );

    let mut compiler = prepare(&document, config)?;
    compiler
        .compile_to_file(output, &mut config.output.encoder())
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(collect_warnings(document, &compiler))
}
