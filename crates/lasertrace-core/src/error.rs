//! Error handling for LaserTrace
//!
//! Provides error types for every stage of the pipeline:
//! - Parse errors (path data, transform attributes, colours)
//! - Configuration errors (machine parameters)
//! - Geometry errors (hatch-fill outlines)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Parse error type
///
/// Raised while interpreting path data, transform attributes or colour values.
/// A parse error aborts only the element being interpreted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Command letter that is not part of the path grammar
    #[error("Unknown path command '{token}' at position {position}")]
    UnknownCommand {
        /// The offending token.
        token: String,
        /// Byte offset of the token in the path data.
        position: usize,
    },

    /// Command is missing one of its numeric operands
    #[error("Missing operand for command '{command}' at position {position}")]
    MissingOperand {
        /// The command whose operand group is incomplete.
        command: char,
        /// Byte offset where the operand was expected.
        position: usize,
    },

    /// Token looks like a number but cannot be parsed as one
    #[error("Invalid number '{token}' at position {position}")]
    InvalidNumber {
        /// The offending token.
        token: String,
        /// Byte offset of the token.
        position: usize,
    },

    /// Operands found where a command letter was expected
    #[error("Expected a path command, found '{token}' at position {position}")]
    MissingCommand {
        /// The first token found.
        token: String,
        /// Byte offset of the token.
        position: usize,
    },

    /// Malformed transform attribute
    #[error("Invalid transform '{token}' at position {position}: {reason}")]
    InvalidTransform {
        /// The offending transform function or fragment.
        token: String,
        /// Byte offset of the fragment in the attribute.
        position: usize,
        /// Why the fragment was rejected.
        reason: String,
    },

    /// Colour value that cannot be decoded into RGB channels
    #[error("Invalid color '{value}'")]
    InvalidColor {
        /// The colour string as written in the document.
        value: String,
    },
}

/// Configuration error type
///
/// Raised when the compiler is constructed with unsafe or unknown machine parameters.
/// Configuration errors abort the whole run before any instruction is emitted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The cumulative pass depth would drive the tool below the stock surface
    #[error(
        "Too many passes: {passes} passes x {pass_depth} depth exceeds cutting z {cutting_z}, the laser would collide with the material"
    )]
    TooManyPasses {
        /// Number of cutting passes.
        passes: u32,
        /// Z step per pass.
        pass_depth: f64,
        /// Cutting z-height.
        cutting_z: f64,
    },

    /// Measurement unit outside the recognized set
    #[error("Unknown unit '{unit}'. Please specify one of the following: {allowed}")]
    UnknownUnit {
        /// The rejected unit string.
        unit: String,
        /// Comma separated list of accepted units.
        allowed: String,
    },

    /// Laser power outside the normalized range
    #[error("Laser power '{name}' must be between 0 and 1, got {value}")]
    PowerOutOfRange {
        /// Name of the parameter.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// Any other invalid parameter value
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue {
        /// Name of the parameter.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Geometry error type
///
/// Raised while preparing a filled outline for hatching. Caught per area.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Outline with fewer than three distinct points or zero area
    #[error("Degenerate outline: {reason}")]
    DegenerateOutline {
        /// Description of the degeneracy.
        reason: String,
    },

    /// Two non-adjacent outline edges cross each other
    #[error("Self-intersecting outline: edge {first} crosses edge {second}")]
    SelfIntersecting {
        /// Index of the first edge.
        first: usize,
        /// Index of the second edge.
        second: usize,
    },

    /// Fill colour that cannot be converted to a luma value
    #[error("Cannot derive hatch density from color '{value}'")]
    InvalidColor {
        /// The colour string.
        value: String,
    },
}

/// Main error type for LaserTrace
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Parse error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The input document could not be read as SVG
    #[error("Invalid document: {reason}")]
    Document {
        /// The reason the document was rejected.
        reason: String,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
