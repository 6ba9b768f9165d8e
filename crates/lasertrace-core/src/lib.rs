//! # LaserTrace Core
//!
//! Core types shared by every LaserTrace crate:
//! - 2-D points and affine transforms
//! - Error taxonomy (parse, configuration, geometry)
//! - Non-fatal warnings surfaced to callers
//! - Machine units and tolerance constants

pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod units;

pub use diagnostics::Warning;
pub use error::{ConfigurationError, Error, GeometryError, ParseError, Result};
pub use geometry::{Transform, Vector};
pub use units::Unit;
