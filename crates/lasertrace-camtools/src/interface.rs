//! # Machine Instructions
//!
//! The compiler emits abstract [`Instruction`]s; an [`InstructionEncoder`]
//! turns them into the text of a concrete machine dialect. [`GcodeEncoder`]
//! targets GRBL-style laser firmware.

use lasertrace_core::Unit;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Default number of decimals written for coordinates
pub const DEFAULT_PRECISION: usize = 6;

/// Default spindle value for full laser power
pub const DEFAULT_POWER_SCALE: f64 = 255.0;

/// Abstract machine operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    SetAbsolute,
    SetRelative,
    /// Feed rate for the following moves
    SetMovementSpeed(f64),
    /// Laser power in `[0, 1]`; turns the laser on
    SetLaserPower(f64),
    LaserOff,
    LinearMove {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        z: Option<f64>,
    },
    SetUnit(Unit),
    /// Pause, in milliseconds
    Dwell(u64),
    Comment(String),
}

impl Instruction {
    /// Planar move to `(x, y)`
    pub fn move_to(x: f64, y: f64) -> Self {
        Instruction::LinearMove {
            x: Some(x),
            y: Some(y),
            z: None,
        }
    }

    /// Move along the z axis only
    pub fn move_z(z: f64) -> Self {
        Instruction::LinearMove {
            x: None,
            y: None,
            z: Some(z),
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Instruction::Comment(text.into())
    }
}

/// Encodes instructions into machine text
///
/// Encoders may be stateful; an empty string means the instruction produces
/// no line of its own.
pub trait InstructionEncoder {
    fn encode(&mut self, instruction: &Instruction) -> String;
}

/// G-code encoder
///
/// Feed changes are deferred: `SetMovementSpeed` produces no text and the next
/// `G1` carries the `F` word, only when the feed actually changed.
#[derive(Debug, Clone, PartialEq)]
pub struct GcodeEncoder {
    pub precision: usize,
    pub power_scale: f64,
    next_speed: Option<f64>,
    current_speed: Option<f64>,
}

impl Default for GcodeEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION, DEFAULT_POWER_SCALE)
    }
}

impl GcodeEncoder {
    pub fn new(precision: usize, power_scale: f64) -> Self {
        Self {
            precision,
            power_scale,
            next_speed: None,
            current_speed: None,
        }
    }

    fn linear_move(&mut self, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> String {
        let mut line = String::from("G1");
        if let Some(speed) = self.next_speed {
            if self.current_speed != Some(speed) {
                let _ = write!(line, " F{speed}");
                self.current_speed = Some(speed);
            }
        }
        let precision = self.precision;
        for (axis, value) in [('X', x), ('Y', y), ('Z', z)] {
            if let Some(value) = value {
                let _ = write!(line, " {axis}{value:.precision$}");
            }
        }
        line.push(';');
        line
    }
}

impl InstructionEncoder for GcodeEncoder {
    fn encode(&mut self, instruction: &Instruction) -> String {
        match instruction {
            Instruction::SetAbsolute => "G90;".to_string(),
            Instruction::SetRelative => "G91;".to_string(),
            Instruction::SetMovementSpeed(speed) => {
                self.next_speed = Some(*speed);
                String::new()
            }
            Instruction::SetLaserPower(power) => {
                format!("M3 S{};", (power * self.power_scale).trunc() as i64)
            }
            Instruction::LaserOff => "M5;".to_string(),
            Instruction::LinearMove { x, y, z } => self.linear_move(*x, *y, *z),
            Instruction::SetUnit(Unit::Millimeters) => "G21;".to_string(),
            Instruction::SetUnit(Unit::Inches) => "G20;".to_string(),
            Instruction::Dwell(ms) => format!("G4 P{ms}"),
            Instruction::Comment(text) => format!("; {text}"),
        }
    }
}
