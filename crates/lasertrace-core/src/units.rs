//! Machine units
//!
//! The compiler accepts an optional unit; when present it must be one of the
//! recognized labels in [`Unit::ALLOWED`].

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit the machine should interpret coordinates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Millimeters (metric)
    #[serde(rename = "mm")]
    Millimeters,
    /// Inches (imperial)
    #[serde(rename = "in")]
    Inches,
}

impl Unit {
    /// Labels accepted by [`Unit::from_str`]
    pub const ALLOWED: [&'static str; 2] = ["mm", "in"];

    /// Get the unit label ("mm" or "in")
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Millimeters => "mm",
            Unit::Inches => "in",
        }
    }

    /// Validate an optional unit setting.
    ///
    /// `None` means the program does not select a unit at all.
    pub fn parse_setting(unit: Option<&str>) -> Result<Option<Unit>, ConfigurationError> {
        unit.map(str::parse).transpose()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Unit {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mm" => Ok(Unit::Millimeters),
            "in" => Ok(Unit::Inches),
            _ => Err(ConfigurationError::UnknownUnit {
                unit: s.to_string(),
                allowed: Unit::ALLOWED.join(", "),
            }),
        }
    }
}
