//! LaserTrace Settings Crate
//!
//! Loads, validates and saves the conversion configuration, and turns its
//! sections into the designer and camtools types that run a conversion.

pub mod config;
pub mod error;

pub use config::{
    Config, DocumentSettings, FlatteningSettings, HatchSettings, OutputSettings,
};
pub use error::{SettingsError, SettingsResult};
