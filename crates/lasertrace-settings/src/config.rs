//! Configuration file handling for LaserTrace
//!
//! Configuration is organized into sections:
//! - Machine parameters (speeds, powers, z heights, passes)
//! - Flattening (tolerance, subdivision depth, arc sweep)
//! - Document traversal (hidden elements, origin flip)
//! - Hatch filling
//! - G-code output formatting
//!
//! Files are TOML or JSON, chosen by extension. Missing keys fall back to
//! their defaults so a config file only needs the values it changes.

use crate::error::{SettingsError, SettingsResult};
use lasertrace_camtools::{GcodeEncoder, HatchFiller, HatchOrientation, MachineParameters};
use lasertrace_core::constants::{
    APPROXIMATION_TOLERANCE, MAX_ARC_SWEEP_DEGREES, MAX_SUBDIVISION_DEPTH,
};
use lasertrace_designer::{DocumentOptions, Flattener};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "lasertrace";
const CONFIG_FILE: &str = "config.toml";

/// Curve linearization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatteningSettings {
    /// Maximum deviation between a curve and its line segments
    pub tolerance: f64,
    pub max_depth: u32,
    pub max_arc_sweep_degrees: f64,
}

impl Default for FlatteningSettings {
    fn default() -> Self {
        Self {
            tolerance: APPROXIMATION_TOLERANCE,
            max_depth: MAX_SUBDIVISION_DEPTH,
            max_arc_sweep_degrees: MAX_ARC_SWEEP_DEGREES,
        }
    }
}

impl FlatteningSettings {
    pub fn flattener(&self) -> Flattener {
        Flattener::new(self.tolerance)
            .with_max_depth(self.max_depth)
            .with_max_arc_sweep(self.max_arc_sweep_degrees)
    }
}

/// SVG traversal settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    pub draw_hidden: bool,
    /// Move the origin to the bottom-left corner of the canvas
    pub transform_origin: bool,
    pub canvas_height: Option<f64>,
}

impl DocumentSettings {
    pub fn options(&self) -> DocumentOptions {
        DocumentOptions {
            draw_hidden: self.draw_hidden,
            transform_origin: self.transform_origin,
            canvas_height: self.canvas_height,
        }
    }
}

/// Hatch fill settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchSettings {
    /// Hatch the filled areas of the document
    pub enabled: bool,
    pub laser_diameter: f64,
    pub min_density: f64,
    pub orientation: HatchOrientation,
}

impl Default for HatchSettings {
    fn default() -> Self {
        let filler = HatchFiller::default();
        Self {
            enabled: false,
            laser_diameter: filler.laser_diameter,
            min_density: filler.min_density,
            orientation: filler.orientation,
        }
    }
}

impl HatchSettings {
    pub fn filler(&self) -> HatchFiller {
        HatchFiller {
            laser_diameter: self.laser_diameter,
            min_density: self.min_density,
            orientation: self.orientation,
        }
    }
}

/// G-code text formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Decimal places for coordinates
    pub precision: usize,
    /// Spindle value for full laser power
    pub power_scale: f64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            precision: lasertrace_camtools::interface::DEFAULT_PRECISION,
            power_scale: lasertrace_camtools::interface::DEFAULT_POWER_SCALE,
        }
    }
}

impl OutputSettings {
    pub fn encoder(&self) -> GcodeEncoder {
        GcodeEncoder::new(self.precision, self.power_scale)
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub machine: MachineParameters,
    pub flattening: FlatteningSettings,
    pub document: DocumentSettings,
    pub hatch: HatchSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/lasertrace/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Loads the file at `path`, or the defaults when `path` is `None` and
    /// no file exists at [`Config::default_path`].
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Ok(default) if default.is_file() => Self::load_from_file(&default),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.machine.validate()?;

        let flattening = &self.flattening;
        if !flattening.tolerance.is_finite() || flattening.tolerance <= 0.0 {
            return Err(SettingsError::invalid(
                "flattening.tolerance",
                format!("must be positive, got {}", flattening.tolerance),
            ));
        }
        if flattening.max_depth == 0 {
            return Err(SettingsError::invalid(
                "flattening.max_depth",
                "must be at least 1",
            ));
        }
        let sweep = flattening.max_arc_sweep_degrees;
        if !(sweep > 0.0 && sweep <= 180.0) {
            return Err(SettingsError::invalid(
                "flattening.max_arc_sweep_degrees",
                format!("must be in (0, 180], got {sweep}"),
            ));
        }

        if let Some(height) = self.document.canvas_height {
            if !height.is_finite() || height <= 0.0 {
                return Err(SettingsError::invalid(
                    "document.canvas_height",
                    format!("must be positive, got {height}"),
                ));
            }
        }

        if self.hatch.laser_diameter <= 0.0 {
            return Err(SettingsError::invalid(
                "hatch.laser_diameter",
                "must be positive",
            ));
        }
        if self.hatch.min_density < 0.0 {
            return Err(SettingsError::invalid(
                "hatch.min_density",
                "must not be negative",
            ));
        }

        if self.output.power_scale <= 0.0 {
            return Err(SettingsError::invalid(
                "output.power_scale",
                "must be positive",
            ));
        }

        Ok(())
    }
}
